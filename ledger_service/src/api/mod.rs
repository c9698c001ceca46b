pub mod error;
pub mod grpc_service;
pub mod http_routes;
pub mod proto;
pub mod response;
