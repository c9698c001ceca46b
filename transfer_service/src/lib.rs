//! Transfer Service Library
//!
//! This library acts as the core of the Transfer Service, exporting the necessary modules
//! for the application binary and integration tests.
//!
//! # Modules
//!
//! * `api` - Contains the API interfaces (HTTP).
//! * `domain` - Contains the domain entities, errors and ports.
//! * `infrastructure` - Contains the concrete implementations of repositories,
//!   gateways and the in-process workflow runtime.
//! * `use_cases` - Contains the application business logic.
//! * `workflows` - Contains the durable authorization/presentment state machines.

pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod use_cases;
pub mod workflows;
