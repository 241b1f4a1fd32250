//! Pure decoding of raw log entries into typed events.
//!
//! The contracts emit every argument un-indexed, so a log carries the topic
//! hash in `topics[0]` and the arguments as consecutive 32-byte ABI words in
//! `data`.

use super::types::{DecodedEvent, EventKind};
use supplyline_ledger::RawLogEntry;
use thiserror::Error;

/// A log whose structure does not match the expected event schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("log carries no topic")]
    MissingTopic,

    #[error("log topic does not match {expected}")]
    TopicMismatch { expected: EventKind },

    #[error("log data is {len} bytes, expected {words} words for {kind}")]
    DataLength {
        kind: EventKind,
        words: usize,
        len: usize,
    },

    #[error("word {index} of {kind} log is not a valid {field}")]
    BadWord {
        kind: EventKind,
        index: usize,
        field: &'static str,
    },
}

/// Decode a raw log as an event of the given kind.
///
/// Pure, no side effects; fails with [`DecodeError`] on any schema mismatch.
pub fn decode(log: &RawLogEntry, kind: EventKind) -> Result<DecodedEvent, DecodeError> {
    let topic0 = log.topics.first().ok_or(DecodeError::MissingTopic)?;
    if *topic0 != kind.topic() {
        return Err(DecodeError::TopicMismatch { expected: kind });
    }

    let words = Words::new(log, kind)?;
    let event = match kind {
        EventKind::OrderPlaced => DecodedEvent::OrderPlaced {
            order_id: words.uint(0, "order id")?,
            product_id: words.uint(1, "product id")?,
            quantity: words.uint(2, "quantity")?,
            retail_store: words.address(3)?,
        },
        EventKind::OrderProcessed => DecodedEvent::OrderProcessed {
            order_id: words.uint(0, "order id")?,
            product_id: words.uint(1, "product id")?,
            quantity: words.uint(2, "quantity")?,
            is_available: words.boolean(3)?,
        },
        EventKind::DeliveryInitiated => DecodedEvent::DeliveryInitiated {
            order_id: words.uint(0, "order id")?,
            product_id: words.uint(1, "product id")?,
            quantity: words.uint(2, "quantity")?,
            retail_store: words.address(3)?,
        },
        EventKind::DeliveryConfirmed => DecodedEvent::DeliveryConfirmed {
            order_id: words.uint(0, "order id")?,
            retail_store: words.address(1)?,
        },
        EventKind::ManufacturerContacted => DecodedEvent::ManufacturerContacted {
            order_id: words.uint(0, "order id")?,
            product_id: words.uint(1, "product id")?,
            quantity: words.uint(2, "quantity")?,
        },
        EventKind::ProductCreated => DecodedEvent::ProductCreated {
            order_id: words.uint(0, "order id")?,
            product_id: words.uint(1, "product id")?,
            quantity: words.uint(2, "quantity")?,
        },
        EventKind::ManufacturerNotified => DecodedEvent::ManufacturerNotified {
            order_id: words.uint(0, "order id")?,
            product_id: words.uint(1, "product id")?,
            quantity: words.uint(2, "quantity")?,
        },
    };
    Ok(event)
}

/// Number of ABI words each event kind encodes in its data section.
fn word_count(kind: EventKind) -> usize {
    match kind {
        EventKind::DeliveryConfirmed => 2,
        EventKind::ManufacturerContacted
        | EventKind::ProductCreated
        | EventKind::ManufacturerNotified => 3,
        EventKind::OrderPlaced | EventKind::OrderProcessed | EventKind::DeliveryInitiated => 4,
    }
}

/// View of a log's data section as fixed 32-byte words.
struct Words<'a> {
    kind: EventKind,
    data: &'a [u8],
}

impl<'a> Words<'a> {
    fn new(log: &'a RawLogEntry, kind: EventKind) -> Result<Self, DecodeError> {
        let words = word_count(kind);
        if log.data.len() != words * 32 {
            return Err(DecodeError::DataLength {
                kind,
                words,
                len: log.data.len(),
            });
        }
        Ok(Self {
            kind,
            data: &log.data,
        })
    }

    fn word(&self, index: usize) -> &'a [u8] {
        &self.data[index * 32..(index + 1) * 32]
    }

    /// A uint256 word that must fit in an i64 (database ids and quantities).
    fn uint(&self, index: usize, field: &'static str) -> Result<i64, DecodeError> {
        let word = self.word(index);
        let bad = || DecodeError::BadWord {
            kind: self.kind,
            index,
            field,
        };
        if word[..24].iter().any(|b| *b != 0) {
            return Err(bad());
        }
        let mut tail = [0u8; 8];
        tail.copy_from_slice(&word[24..]);
        i64::try_from(u64::from_be_bytes(tail)).map_err(|_| bad())
    }

    /// An address word: 12 zero bytes of padding, then 20 address bytes.
    fn address(&self, index: usize) -> Result<alloy_primitives::Address, DecodeError> {
        let word = self.word(index);
        if word[..12].iter().any(|b| *b != 0) {
            return Err(DecodeError::BadWord {
                kind: self.kind,
                index,
                field: "address",
            });
        }
        Ok(alloy_primitives::Address::from_slice(&word[12..]))
    }

    /// A bool word: all zero, or zero with a trailing one.
    fn boolean(&self, index: usize) -> Result<bool, DecodeError> {
        let word = self.word(index);
        if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
            return Err(DecodeError::BadWord {
                kind: self.kind,
                index,
                field: "bool",
            });
        }
        Ok(word[31] == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::raw_log;
    use alloy_primitives::{Address, Bytes, address};

    #[test]
    fn decodes_order_placed() {
        let store = address!("00000000000000000000000000000000000000aa");
        let log = raw_log(
            EventKind::OrderPlaced,
            10,
            &[word_u64(7), word_u64(1), word_u64(5), word_address(store)],
        );
        let event = decode(&log, EventKind::OrderPlaced).unwrap();
        assert_eq!(
            event,
            DecodedEvent::OrderPlaced {
                order_id: 7,
                product_id: 1,
                quantity: 5,
                retail_store: store,
            }
        );
    }

    #[test]
    fn decodes_order_processed_flags() {
        for (flag, expected) in [(0u64, false), (1u64, true)] {
            let log = raw_log(
                EventKind::OrderProcessed,
                10,
                &[word_u64(7), word_u64(1), word_u64(5), word_u64(flag)],
            );
            let event = decode(&log, EventKind::OrderProcessed).unwrap();
            assert_eq!(
                event,
                DecodedEvent::OrderProcessed {
                    order_id: 7,
                    product_id: 1,
                    quantity: 5,
                    is_available: expected,
                }
            );
        }
    }

    #[test]
    fn rejects_mismatched_topic() {
        let log = raw_log(
            EventKind::ProductCreated,
            10,
            &[word_u64(1), word_u64(2), word_u64(3)],
        );
        let err = decode(&log, EventKind::ManufacturerContacted).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TopicMismatch {
                expected: EventKind::ManufacturerContacted
            }
        );
    }

    #[test]
    fn rejects_truncated_data() {
        let mut log = raw_log(
            EventKind::DeliveryConfirmed,
            10,
            &[word_u64(7), word_address(Address::ZERO)],
        );
        log.data = Bytes::from(log.data[..33].to_vec());
        let err = decode(&log, EventKind::DeliveryConfirmed).unwrap_err();
        assert!(matches!(err, DecodeError::DataLength { len: 33, .. }));
    }

    #[test]
    fn rejects_missing_topic() {
        let mut log = raw_log(EventKind::DeliveryConfirmed, 10, &[]);
        log.topics.clear();
        log.data = Bytes::from(vec![0u8; 64]);
        assert_eq!(
            decode(&log, EventKind::DeliveryConfirmed).unwrap_err(),
            DecodeError::MissingTopic
        );
    }

    #[test]
    fn rejects_oversized_uint() {
        let mut word = [0u8; 32];
        word[0] = 1; // high byte set, cannot be an i64 id
        let log = raw_log(
            EventKind::ProductCreated,
            10,
            &[word, word_u64(2), word_u64(3)],
        );
        let err = decode(&log, EventKind::ProductCreated).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::BadWord {
                index: 0,
                field: "order id",
                ..
            }
        ));
    }

    #[test]
    fn rejects_dirty_bool() {
        let mut flag = [0u8; 32];
        flag[31] = 2;
        let log = raw_log(
            EventKind::OrderProcessed,
            10,
            &[word_u64(7), word_u64(1), word_u64(5), flag],
        );
        let err = decode(&log, EventKind::OrderProcessed).unwrap_err();
        assert!(matches!(err, DecodeError::BadWord { field: "bool", .. }));
    }

    fn word_u64(value: u64) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        word
    }

    fn word_address(address: Address) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_slice());
        word
    }
}
