//! Concrete operands and abstract instructions.
//!
//! Operands are validated at construction: the matcher and encoder
//! assume well-formed input and never re-check scale factors or
//! address-register widths.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::EncodeError;
use crate::reg::Register;

/// Whether `value` is representable in `bits` bits, as either a signed
/// or an unsigned quantity. Both views are accepted: `-1` and `0xFF`
/// are each valid byte immediates.
pub(crate) fn imm_fits(value: i64, bits: u16) -> bool {
    if bits >= 64 {
        return true;
    }
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << bits) - 1;
    (min..=max).contains(&value)
}

/// Whether `value` is representable as a sign-extended `bits`-bit field.
/// Used where the CPU widens the field (imm32 in 64-bit operations,
/// disp8 in addressing).
pub(crate) fn imm_fits_signed(value: i64, bits: u16) -> bool {
    if bits >= 64 {
        return true;
    }
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;
    (min..=max).contains(&value)
}

/// An immediate operand value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Immediate {
    value: i64,
}

impl Immediate {
    /// Wrap a resolved immediate value. All displacement/relative values
    /// are assumed already resolved to final numbers.
    pub fn new(value: i64) -> Self {
        Self { value }
    }

    /// The raw value.
    pub fn value(self) -> i64 {
        self.value
    }

    /// Smallest power-of-two width (8/16/32/64 bits) that represents the
    /// value, signed or unsigned. Decides which fixed-width immediate
    /// forms this operand can match.
    pub fn width(self) -> u16 {
        for bits in [8u16, 16, 32] {
            if imm_fits(self.value, bits) {
                return bits;
            }
        }
        64
    }
}

/// A memory (indirect) operand: `[base + index*scale + disp]`.
///
/// Only constructible through [`Mem`], which rejects malformed shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryOperand {
    base: Option<Register>,
    index: Option<Register>,
    scale: u8,
    disp: Option<i32>,
    size: Option<u16>,
}

impl MemoryOperand {
    /// Base register, if any.
    pub fn base(&self) -> Option<Register> {
        self.base
    }

    /// Index register, if any.
    pub fn index(&self) -> Option<Register> {
        self.index
    }

    /// SIB scale factor (1, 2, 4, or 8; meaningful only with an index).
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Displacement, if one was supplied.
    pub fn disp(&self) -> Option<i32> {
        self.disp
    }

    /// Explicit operand-size qualifier in bits, if any.
    pub fn size(&self) -> Option<u16> {
        self.size
    }

    /// Whether encoding this operand needs a SIB byte: an index register
    /// is present, or the base's low 3 encoding bits are 4 (RSP/R12) —
    /// that r/m value is reserved to announce a SIB byte.
    pub fn uses_sib(&self) -> bool {
        if self.base == Some(Register::Rip) {
            return false;
        }
        self.index.is_some()
            || self.base.is_none()
            || self.base.is_some_and(|b| b.index() & 7 == 4)
    }

    /// Width of the address registers (32 or 64), or `None` for a pure
    /// displacement/absolute operand.
    pub fn addr_width(&self) -> Option<u16> {
        self.base.or(self.index).map(|r| r.width())
    }
}

impl fmt::Display for MemoryOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        let mut parts = false;
        if let Some(base) = self.base {
            write!(f, "{}", base)?;
            parts = true;
        }
        if let Some(idx) = self.index {
            if parts {
                write!(f, "+")?;
            }
            write!(f, "{}*{}", idx, self.scale)?;
            parts = true;
        }
        match self.disp {
            Some(d) if d < 0 => write!(f, "-0x{:x}", d.unsigned_abs())?,
            Some(d) if d > 0 || !parts => {
                if parts {
                    write!(f, "+")?;
                }
                write!(f, "0x{:x}", d)?;
            }
            _ => {}
        }
        write!(f, "]")
    }
}

/// Builder for [`MemoryOperand`]. Validation happens in [`Mem::build`],
/// so malformed operands never reach the matcher or encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mem {
    base: Option<Register>,
    index: Option<(Register, u8)>,
    disp: Option<i64>,
    size: Option<u16>,
}

impl Mem {
    /// Start an empty memory operand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base register (a 32/64-bit GP register, or RIP for
    /// RIP-relative addressing).
    #[must_use]
    pub fn base(mut self, base: Register) -> Self {
        self.base = Some(base);
        self
    }

    /// Set the index register and scale factor.
    #[must_use]
    pub fn index(mut self, index: Register, scale: u8) -> Self {
        self.index = Some((index, scale));
        self
    }

    /// Set the displacement.
    #[must_use]
    pub fn disp(mut self, disp: i64) -> Self {
        self.disp = Some(disp);
        self
    }

    /// Set the explicit operand-size qualifier in bits
    /// (the `byte ptr`/`qword ptr` of textual assembly).
    #[must_use]
    pub fn size(mut self, bits: u16) -> Self {
        self.size = Some(bits);
        self
    }

    /// Validate and produce the operand.
    pub fn build(self) -> Result<MemoryOperand, EncodeError> {
        let invalid = |detail: String| Err(EncodeError::InvalidOperand { detail });

        if let Some((index, scale)) = self.index {
            if !matches!(scale, 1 | 2 | 4 | 8) {
                return invalid(format!("scale {} not in {{1, 2, 4, 8}}", scale));
            }
            if index == Register::Rsp || index == Register::Esp {
                return invalid(format!("{} cannot be an index register", index));
            }
            if !index.is_gp() || !matches!(index.width(), 32 | 64) {
                return invalid(format!("index register {} is not 32/64-bit GP", index));
            }
        }
        if let Some(base) = self.base {
            let rip = base == Register::Rip;
            if !rip && (!base.is_gp() || !matches!(base.width(), 32 | 64)) {
                return invalid(format!("base register {} is not 32/64-bit GP", base));
            }
            if rip && self.index.is_some() {
                return invalid(String::from("rip-relative addressing takes no index"));
            }
            if let Some((index, _)) = self.index {
                if base.width() != index.width() {
                    return invalid(format!(
                        "base {} and index {} have different widths",
                        base, index
                    ));
                }
            }
        }
        if let Some(size) = self.size {
            if !matches!(size, 8 | 16 | 32 | 64) {
                return invalid(format!("operand size {} not in {{8, 16, 32, 64}}", size));
            }
        }
        let disp = match self.disp {
            None => None,
            Some(d) => {
                if !imm_fits_signed(d, 32) {
                    return Err(EncodeError::DisplacementOverflow { value: d });
                }
                Some(d as i32)
            }
        };
        if self.base.is_none() && self.index.is_none() && disp.is_none() {
            return invalid(String::from("memory operand is empty"));
        }

        Ok(MemoryOperand {
            base: self.base,
            index: self.index.map(|(r, _)| r),
            scale: self.index.map_or(1, |(_, s)| s),
            disp,
            size: self.size,
        })
    }
}

/// A concrete operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// A register operand.
    Register(Register),
    /// An immediate (or pre-resolved relative) value.
    Immediate(Immediate),
    /// A memory (indirect) operand.
    Memory(MemoryOperand),
}

impl Operand {
    /// Shorthand for a register operand.
    pub fn reg(reg: Register) -> Self {
        Operand::Register(reg)
    }

    /// Shorthand for an immediate operand.
    pub fn imm(value: i64) -> Self {
        Operand::Immediate(Immediate::new(value))
    }

    /// Structural predicate.
    pub fn is_register(&self) -> bool {
        matches!(self, Operand::Register(_))
    }

    /// Structural predicate.
    pub fn is_memory(&self) -> bool {
        matches!(self, Operand::Memory(_))
    }

    /// Structural predicate.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Operand::Immediate(_))
    }

    /// Effective size in bits: a register's width, an immediate's
    /// minimal width, or a memory operand's explicit size — falling
    /// back to the width of its widest address register, or 0 for a
    /// bare absolute address (unsized until a template fixes it).
    pub fn effective_size(&self) -> u16 {
        match self {
            Operand::Register(r) => r.width(),
            Operand::Immediate(imm) => imm.width(),
            Operand::Memory(mem) => mem
                .size()
                .or_else(|| mem.addr_width())
                .unwrap_or(0),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{}", r),
            Operand::Immediate(imm) => {
                let v = imm.value();
                if v < 0 {
                    write!(f, "-0x{:x}", v.unsigned_abs())
                } else {
                    write!(f, "0x{:x}", v)
                }
            }
            Operand::Memory(mem) => write!(f, "{}", mem),
        }
    }
}

// ─── Mnemonic: stack-allocated instruction name ──────────────────────

/// Stack-allocated, case-normalized instruction mnemonic (max 15 ASCII
/// bytes — longest general-purpose x86 mnemonic is `cmpxchg16b`).
///
/// Normalized to upper case on construction so that `"mov"`, `"MOV"`,
/// and table rows all compare equal.
#[derive(Clone, Copy)]
pub struct Mnemonic {
    buf: [u8; 15],
    len: u8,
}

impl Mnemonic {
    /// Maximum mnemonic length in bytes.
    pub const MAX_LEN: usize = 15;

    /// The mnemonic as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        // buf always holds ASCII written by From<&str>
        core::str::from_utf8(&self.buf[..self.len as usize]).unwrap_or("")
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the mnemonic is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl From<&str> for Mnemonic {
    #[inline]
    fn from(s: &str) -> Self {
        let len = s.len().min(Self::MAX_LEN);
        let mut buf = [0u8; 15];
        for (dst, src) in buf.iter_mut().zip(s.as_bytes()[..len].iter()) {
            *dst = src.to_ascii_uppercase();
        }
        Self {
            buf,
            len: len as u8,
        }
    }
}

impl PartialEq for Mnemonic {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Mnemonic {}

impl PartialOrd for Mnemonic {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Mnemonic {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl core::hash::Hash for Mnemonic {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl PartialEq<str> for Mnemonic {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Mnemonic {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.as_str())
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Mnemonic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Mnemonic {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct V;
        impl serde::de::Visitor<'_> for V {
            type Value = Mnemonic;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a mnemonic string (max 15 bytes)")
            }
            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Mnemonic, E> {
                if v.len() > Mnemonic::MAX_LEN {
                    return Err(E::custom("mnemonic exceeds 15 bytes"));
                }
                Ok(Mnemonic::from(v))
            }
        }
        deserializer.deserialize_str(V)
    }
}

/// An abstract instruction: mnemonic plus 0–2 ordered operands.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    /// The symbolic instruction name.
    pub mnemonic: Mnemonic,
    /// Operands in architectural order (destination first).
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Build an instruction from a mnemonic and operand list.
    pub fn new(mnemonic: impl Into<Mnemonic>, operands: Vec<Operand>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            operands,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        for (i, op) in self.operands.iter().enumerate() {
            if i == 0 {
                write!(f, " {}", op)?;
            } else {
                write!(f, ", {}", op)?;
            }
        }
        Ok(())
    }
}
