//! Wire-level types exchanged with the ledger node.

use alloy_primitives::{Address, B256, Bytes};

/// Log filter for a single event topic on a single contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    /// First block to query, inclusive.
    pub from_block: u64,
    /// Last block to query, inclusive. `None` means the node's latest block.
    pub to_block: Option<u64>,
    /// Emitting contract address.
    pub address: Address,
    /// Topic hash of the event signature.
    pub topic0: B256,
}

/// An undecoded log entry as returned by the ledger node.
///
/// Ephemeral: consumed immediately by the event decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogEntry {
    pub block_number: u64,
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// A single ABI-encodable call argument.
///
/// The contracts in this system only take unsigned integers and addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallArg {
    Uint(u64),
    Address(Address),
}

impl CallArg {
    /// Canonical Solidity type name, used to build the function signature.
    pub fn type_name(&self) -> &'static str {
        match self {
            CallArg::Uint(_) => "uint256",
            CallArg::Address(_) => "address",
        }
    }

    /// Encode the argument as a 32-byte ABI word.
    pub fn encode(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        match self {
            CallArg::Uint(v) => word[24..].copy_from_slice(&v.to_be_bytes()),
            CallArg::Address(a) => word[12..].copy_from_slice(a.as_slice()),
        }
        word
    }
}

/// A contract function call, keyed by target address and function name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    pub function: &'static str,
    pub args: Vec<CallArg>,
}

impl ContractCall {
    pub fn new(to: Address, function: &'static str, args: Vec<CallArg>) -> Self {
        Self { to, function, args }
    }

    /// Canonical function signature, e.g. `confirmDelivery(uint256)`.
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self.args.iter().map(CallArg::type_name).collect();
        format!("{}({})", self.function, types.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn uint_word_is_big_endian_padded() {
        let word = CallArg::Uint(0x1234).encode();
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(word[30], 0x12);
        assert_eq!(word[31], 0x34);
    }

    #[test]
    fn address_word_is_left_padded() {
        let addr = address!("00000000000000000000000000000000000000aa");
        let word = CallArg::Address(addr).encode();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], addr.as_slice());
    }

    #[test]
    fn signature_joins_arg_types() {
        let call = ContractCall::new(
            Address::ZERO,
            "initiateDelivery",
            vec![
                CallArg::Uint(1),
                CallArg::Uint(2),
                CallArg::Uint(3),
                CallArg::Address(Address::ZERO),
            ],
        );
        assert_eq!(
            call.signature(),
            "initiateDelivery(uint256,uint256,uint256,address)"
        );
    }
}
