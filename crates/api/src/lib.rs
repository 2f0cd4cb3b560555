//! HTTP API: server bootstrap, authorization middleware, and routes.

pub mod app;
pub mod context;
pub mod middleware;
pub mod response;
