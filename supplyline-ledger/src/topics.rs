//! Deterministic identifiers derived from event and function signatures.

use alloy_primitives::{B256, keccak256};
use thiserror::Error;

/// Invalid signature input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopicError {
    #[error("signature must not be empty")]
    EmptySignature,
}

/// Topic hash for a canonical event signature such as
/// `OrderPlaced(uint256,uint256,uint256,address)`.
///
/// Pure and deterministic; the only failure mode is an empty signature.
pub fn event_topic(signature: &str) -> Result<B256, TopicError> {
    if signature.is_empty() {
        return Err(TopicError::EmptySignature);
    }
    Ok(keccak256(signature.as_bytes()))
}

/// Four-byte selector for a canonical function signature.
pub fn function_selector(signature: &str) -> Result<[u8; 4], TopicError> {
    let hash = event_topic(signature)?;
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    Ok(selector)
}
