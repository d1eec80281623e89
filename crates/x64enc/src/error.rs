//! Error types for instruction encoding and opcode-table loading.

use alloc::string::String;
use core::fmt;

/// Failure to encode a single instruction.
///
/// Every error is an explicit value returned through the pipeline;
/// the encoder never panics on caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncodeError {
    /// No opcode template matches the mnemonic/operand shape, or every
    /// matching template declined to encode. Recoverable: the caller
    /// decides whether an unsupported form is fatal.
    Unsupported {
        /// The mnemonic that could not be encoded.
        mnemonic: String,
    },

    /// An immediate value does not fit the width the selected template
    /// encodes. Never silently truncated.
    ImmediateOverflow {
        /// The immediate value that overflowed.
        value: i64,
        /// The immediate field width in bits.
        width: u16,
    },

    /// A displacement value does not fit a signed 32-bit field
    /// (the widest displacement x86-64 addressing supports).
    DisplacementOverflow {
        /// The displacement value that overflowed.
        value: i64,
    },

    /// A malformed operand, rejected at construction time — before it
    /// can reach the matcher or encoder.
    InvalidOperand {
        /// Description of what is wrong with the operand.
        detail: String,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Unsupported { mnemonic } => {
                write!(f, "unsupported instruction form for '{}'", mnemonic)
            }
            EncodeError::ImmediateOverflow { value, width } => {
                write!(
                    f,
                    "immediate value {} does not fit in {} bits",
                    value, width
                )
            }
            EncodeError::DisplacementOverflow { value } => {
                write!(f, "displacement {} does not fit in 32 bits", value)
            }
            EncodeError::InvalidOperand { detail } => {
                write!(f, "invalid operand: {}", detail)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

/// Failure to parse the textual opcode-table format.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableError {
    /// 1-based line number of the offending row.
    pub line: usize,
    /// What is wrong with the row.
    pub msg: String,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opcode table line {}: {}", self.line, self.msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TableError {}
