pub mod random;
pub mod request_id;

pub use random::{RandomSource, SeededRandomSource, SequenceRandomSource, ThreadRngSource};
pub use request_id::generate_request_id;
