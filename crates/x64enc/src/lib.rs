//! # x64enc — Table-Driven x86-64 Instruction Encoder
//!
//! `x64enc` turns abstract instructions (mnemonic plus operands) into
//! the exact machine-code bytes an x86-64 processor decodes: legacy
//! prefixes, REX, opcode, ModRM, SIB, displacement, and immediate.
//!
//! ## Quick Start
//!
//! ```rust
//! use x64enc::{assemble, Instruction, OpcodeTable, Operand, Register};
//!
//! let table = OpcodeTable::builtin();
//! let instr = Instruction::new(
//!     "ADD",
//!     vec![Operand::reg(Register::Eax), Operand::reg(Register::Ebx)],
//! );
//! assert_eq!(assemble(&table, &instr).unwrap(), vec![0x01, 0xD8]);
//! ```
//!
//! ## Features
//!
//! - **Declarative opcode table** — encodings live in a textual table,
//!   not in per-instruction code; custom tables load with
//!   [`OpcodeTable::parse`].
//! - **Shortest encoding** — every matching template is tried and the
//!   minimal-length byte sequence wins, with table order as the
//!   deterministic tie-break.
//! - **Pure and thread-safe** — encoding is a stateless computation
//!   over an immutable table; call it from any number of threads.
//! - **`no_std` + `alloc`** — embeddable in JIT runtimes, kernels, WASM.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// ── Pedantic lint policy ─────────────────────────────────────────────────
// An instruction encoder intentionally performs many narrowing /
// sign-changing casts between integer widths and uses dense hex
// literals without separators (0xFFC0, 0x0F84).  The lints below are
// expected and acceptable in this context.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::unreadable_literal,
    clippy::match_same_arms,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::doc_markdown,
    clippy::similar_names,
    clippy::many_single_char_names,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

extern crate alloc;

/// Stack-allocated byte buffer for a single encoded instruction.
pub mod buf;
/// Byte encoder: template plus operands to final bytes.
pub mod encode;
/// Error types for encoding and table loading.
pub mod error;
/// Template matching against the opcode table.
pub mod matcher;
/// Operand and instruction model.
pub mod operand;
/// Register model: indices, widths, classes.
pub mod reg;
/// Opcode template table and its textual format.
pub mod table;

pub use buf::InstrBytes;
pub use encode::encode;
pub use error::{EncodeError, TableError};
pub use matcher::match_candidates;
pub use operand::{Immediate, Instruction, Mem, MemoryOperand, Mnemonic, Operand};
pub use reg::{Register, RegisterClass};
pub use table::{EncodingFlags, OpcodeTable, OpcodeTemplate, SizeRule, TypeCode, TypeKind};

use alloc::string::ToString;
use alloc::vec::Vec;

/// Encode one instruction, choosing the shortest valid byte sequence.
///
/// Every matching template is tried in table order; of the encodings
/// that succeed, the shortest wins, and a tie on length goes to the
/// template declared first. If no template matches (or every candidate
/// declines), the error is [`EncodeError::Unsupported`]; if the only
/// obstacle was a value too wide for every allowed field, the overflow
/// error is reported instead.
pub fn assemble(table: &OpcodeTable, instr: &Instruction) -> Result<Vec<u8>, EncodeError> {
    let mut best: Option<InstrBytes> = None;
    let mut overflow: Option<EncodeError> = None;
    for template in match_candidates(table, instr) {
        match encode(template, instr) {
            Ok(Some(bytes)) => {
                // Strictly-less keeps the first-declared winner on ties.
                if best.as_ref().map_or(true, |b| bytes.len() < b.len()) {
                    best = Some(bytes);
                }
            }
            Ok(None) => {}
            Err(
                err @ (EncodeError::ImmediateOverflow { .. }
                | EncodeError::DisplacementOverflow { .. }),
            ) => {
                // Another template may still fit the value; remember the
                // failure in case none does.
                overflow.get_or_insert(err);
            }
            Err(err) => return Err(err),
        }
    }
    match (best, overflow) {
        (Some(bytes), _) => Ok(bytes.to_vec()),
        (None, Some(err)) => Err(err),
        (None, None) => Err(EncodeError::Unsupported {
            mnemonic: instr.mnemonic.as_str().to_string(),
        }),
    }
}
