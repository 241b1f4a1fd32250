#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod directory;
pub mod entities;
pub mod events;
pub mod framework;
pub mod processors;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
