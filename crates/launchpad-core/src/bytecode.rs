//! Creation bytecode handling
//!
//! Parsing and validation of compiler output, and init code assembly.

use crate::error::{Error, Result};
use alloy::primitives::Bytes;

/// EIP-3860 limit on init code size
pub const MAX_INIT_CODE_SIZE: usize = 2 * 24_576;

/// Represents compiled contract creation bytecode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytecode {
    bytes: Vec<u8>,
}

impl Bytecode {
    /// Create bytecode from a hex string (with or without 0x prefix)
    ///
    /// Fails with a validation error when the object still contains
    /// `__$...$__` library placeholders.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let clean = hex.trim().trim_start_matches("0x");
        if clean.is_empty() {
            return Ok(Self { bytes: Vec::new() });
        }
        if has_link_placeholders(clean) {
            return Err(Error::validation(
                "Bytecode contains unlinked library references",
            ));
        }
        let bytes = hex::decode(clean)?;
        Ok(Self { bytes })
    }

    /// Check if the bytecode is empty (interfaces, abstract contracts)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Get the bytecode length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Concatenate the creation code with ABI-encoded constructor arguments
    pub fn init_code(&self, encoded_args: &[u8]) -> Bytes {
        let mut data = Vec::with_capacity(self.bytes.len() + encoded_args.len());
        data.extend_from_slice(&self.bytes);
        data.extend_from_slice(encoded_args);
        Bytes::from(data)
    }
}

fn has_link_placeholders(hex: &str) -> bool {
    hex.contains("__")
}
