pub mod catalog;
pub mod outcome;
pub mod prize;

pub use catalog::*;
pub use outcome::*;
pub use prize::*;
