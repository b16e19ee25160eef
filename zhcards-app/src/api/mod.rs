pub mod dto;
pub mod routes;
pub mod server;
pub mod translate;
