mod app;
mod config;
mod engine;
mod executor;
mod http;
mod report;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use engine::EngineError;
pub use executor::SendError;
pub use http::HttpError;
pub use report::ReportError;
pub use validation::{ValidationError, ValidationErrors};
