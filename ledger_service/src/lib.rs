//! Ledger Service Library
//!
//! This library acts as the core of the Ledger Service, exporting the necessary modules
//! for the application binary and integration tests.
//!
//! # Modules
//!
//! * `api` - Contains the API interfaces (HTTP/gRPC).
//! * `domain` - Contains the domain entities and business rules.
//! * `infrastructure` - Contains the concrete implementations of the accounting store.
//! * `use_cases` - Contains the application business logic.

pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod use_cases;
