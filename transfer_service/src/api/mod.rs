pub mod error;
pub mod http_routes;
pub mod proto;
pub mod response;
