pub mod config;
pub mod entities;
pub mod error;
pub mod models;
pub mod services;
pub mod tasks;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{DrawOutcome, Prize, Quantity};
pub use services::DrawEngine;
