#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

//! Narrow client surface for the supply-chain ledger.
//!
//! The smart contracts and key management live outside this codebase; this
//! crate only defines the shape the listener pipeline depends on (log
//! filtering, current block height, contract-call submission) plus a JSON-RPC
//! implementation of that shape.

pub mod client;
pub mod topics;
pub mod types;

pub use client::{HttpLedgerClient, LedgerClient, LedgerError};
pub use types::{CallArg, ContractCall, LogFilter, RawLogEntry};
