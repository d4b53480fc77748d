pub mod admission_service;
pub mod draw_service;

pub use admission_service::*;
pub use draw_service::*;
