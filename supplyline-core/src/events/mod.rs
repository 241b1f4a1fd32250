pub mod decoder;
pub mod types;

pub use decoder::{DecodeError, decode};
pub use types::{ContractKind, DecodedEvent, EventKind};
