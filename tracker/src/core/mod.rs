//! Core: Application, route table, error mapping.

pub mod app;
pub mod error;
pub mod routing;

pub use app::Application;
pub use error::{respond, ApiError};
pub use routing::build_router;
