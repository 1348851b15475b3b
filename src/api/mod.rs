pub mod extract;
pub mod payload;
pub mod validation;

pub use extract::{JsonBody, RecordId};
pub use payload::Payload;
