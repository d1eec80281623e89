//! Opcode template table: the declarative description of every
//! encoding this crate can produce.
//!
//! The table is loaded once (from the built-in text or a caller-supplied
//! string in the same format) and never mutated, so a shared reference
//! can be handed to any number of threads.
//!
//! One row per line:
//!
//! ```text
//! MNEMONIC [ <hex-byte> ... ] FLAG|FLAG <type-code>,<type-code>
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Type codes are a
//! kind letter with an optional fixed-size suffix:
//!
//! * `E` / `E8` / `E16` / `E32` / `E64` — register or memory (ModRM r/m)
//! * `K` / `K8` ...                     — register (ModRM reg field)
//! * `R` / `R8` ...                     — register folded into the opcode byte
//! * `M` / `M8` ...                     — memory only (ModRM r/m)
//! * `I` / `I8` / `I16` / `I32` / `I64` — immediate
//! * `S8` / `S16` / `S32`               — immediate the processor sign-extends
//! * `J8` / `J32`                       — relative branch offset
//! * `C`                                — the CL register, implied by the opcode
//!
//! A bare letter means the size varies with the operand-size attribute
//! (REX.W / `0x66`). Flags are `NONE`, `USES_MODRM`, `DEFAULT_64BIT`,
//! and `EXT(n)` for opcode-extension constants carried in the ModRM
//! `reg` field (the `/n` notation of architecture manuals).

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use crate::error::TableError;
use crate::operand::Mnemonic;

/// What kind of concrete operand a template position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    /// Register or memory, encoded in the ModRM `rm` field (`E`).
    RegMem,
    /// Register, encoded in the ModRM `reg` field (`K`).
    Reg,
    /// Register folded into the low 3 bits of the last opcode byte (`R`).
    PlusReg,
    /// Memory only, encoded in the ModRM `rm` field (`M`).
    Mem,
    /// Immediate value appended after ModRM/displacement (`I`).
    Imm,
    /// Immediate the processor sign-extends to the operand size (`S`).
    /// The field width binds the value to the signed range.
    ImmSigned,
    /// Relative branch offset (`J`). Values are pre-resolved numbers.
    Rel,
    /// The CL register as an implicit shift count (`C`). Contributes no
    /// bytes.
    ImplicitCl,
}

/// Size rule for a template position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeRule {
    /// Width follows the instruction's operand-size attribute.
    Varies,
    /// Width is pinned to exactly this many bits.
    Fixed(u16),
}

/// One operand-type code: kind plus size rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeCode {
    pub kind: TypeKind,
    pub size: SizeRule,
}

impl TypeCode {
    fn parse(text: &str) -> Result<Self, String> {
        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(|| "empty type code".to_string())?;
        let kind = match letter {
            'E' => TypeKind::RegMem,
            'K' => TypeKind::Reg,
            'R' => TypeKind::PlusReg,
            'M' => TypeKind::Mem,
            'I' => TypeKind::Imm,
            'S' => TypeKind::ImmSigned,
            'J' => TypeKind::Rel,
            'C' => TypeKind::ImplicitCl,
            other => return Err(format!("unknown type-code letter '{}'", other)),
        };
        let suffix = chars.as_str();
        if kind == TypeKind::ImplicitCl {
            if !suffix.is_empty() {
                return Err("'C' takes no size suffix".to_string());
            }
            return Ok(Self {
                kind,
                size: SizeRule::Fixed(8),
            });
        }
        let size = if suffix.is_empty() {
            SizeRule::Varies
        } else {
            match suffix {
                "8" => SizeRule::Fixed(8),
                "16" => SizeRule::Fixed(16),
                "32" => SizeRule::Fixed(32),
                "64" => SizeRule::Fixed(64),
                other => return Err(format!("bad type-code size suffix '{}'", other)),
            }
        };
        if kind == TypeKind::Rel && size == SizeRule::Varies {
            return Err("relative type code needs an explicit size (J8/J32)".to_string());
        }
        if kind == TypeKind::ImmSigned && size == SizeRule::Varies {
            return Err("sign-extended immediate needs an explicit size (S8/S16/S32)".to_string());
        }
        Ok(Self { kind, size })
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.kind {
            TypeKind::RegMem => 'E',
            TypeKind::Reg => 'K',
            TypeKind::PlusReg => 'R',
            TypeKind::Mem => 'M',
            TypeKind::Imm => 'I',
            TypeKind::ImmSigned => 'S',
            TypeKind::Rel => 'J',
            TypeKind::ImplicitCl => return f.write_str("C"),
        };
        match self.size {
            SizeRule::Varies => write!(f, "{}", letter),
            SizeRule::Fixed(bits) => write!(f, "{}{}", letter, bits),
        }
    }
}

/// Encoding flags bitset.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodingFlags(u8);

impl EncodingFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// The template emits a ModRM byte.
    pub const USES_MODRM: Self = Self(1 << 0);
    /// Operand size defaults to 64 bits without REX.W (push/pop/branches).
    pub const DEFAULT_64BIT: Self = Self(1 << 1);

    /// Whether all of `other`'s bits are set in `self`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for EncodingFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for EncodingFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for EncodingFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("NONE");
        }
        let mut first = true;
        let mut emit = |f: &mut fmt::Formatter<'_>, name: &str| -> fmt::Result {
            if !first {
                f.write_str("|")?;
            }
            first = false;
            f.write_str(name)
        };
        if self.contains(Self::USES_MODRM) {
            emit(f, "USES_MODRM")?;
        }
        if self.contains(Self::DEFAULT_64BIT) {
            emit(f, "DEFAULT_64BIT")?;
        }
        Ok(())
    }
}

/// Inline opcode byte sequence (1 to 3 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpcodeBytes {
    bytes: [u8; 3],
    len: u8,
}

impl OpcodeBytes {
    /// The opcode bytes as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Number of opcode bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false for a parsed template.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Inline operand-type list (0 to 2 entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeList {
    items: [TypeCode; 2],
    len: u8,
}

impl TypeList {
    const EMPTY_SLOT: TypeCode = TypeCode {
        kind: TypeKind::Imm,
        size: SizeRule::Fixed(8),
    };

    /// Number of operand positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the template takes no operands.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The type codes as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[TypeCode] {
        &self.items[..self.len as usize]
    }

    /// Iterate over the type codes.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, TypeCode> {
        self.as_slice().iter()
    }
}

/// One row of the opcode table: a single way to encode a mnemonic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpcodeTemplate {
    /// The mnemonic this row encodes.
    pub mnemonic: Mnemonic,
    /// Operand-type codes, in operand order.
    pub types: TypeList,
    /// Base opcode bytes, emitted verbatim (modulo `R` folding).
    pub opcode: OpcodeBytes,
    /// Encoding flags.
    pub flags: EncodingFlags,
    /// Opcode-extension constant for the ModRM `reg` field (`/n`).
    pub reg_ext: Option<u8>,
}

/// The immutable opcode table: rows in declaration order, indexed by
/// mnemonic for slice lookup.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    rows: Vec<OpcodeTemplate>,
    index: BTreeMap<Mnemonic, Range<usize>>,
}

impl OpcodeTable {
    /// Parse a table from its textual format.
    ///
    /// Rows sharing a mnemonic keep their relative declaration order;
    /// that order is the documented tie-break for equal-length
    /// encodings.
    pub fn parse(text: &str) -> Result<Self, TableError> {
        let mut parsed: Vec<OpcodeTemplate> = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            parsed.push(parse_row(line).map_err(|msg| TableError { line: line_no, msg })?);
        }

        // Group rows contiguously by mnemonic, first appearance first,
        // preserving per-mnemonic declaration order.
        let mut order: Vec<Mnemonic> = Vec::new();
        for row in &parsed {
            if !order.contains(&row.mnemonic) {
                order.push(row.mnemonic);
            }
        }
        let mut rows = Vec::with_capacity(parsed.len());
        let mut index = BTreeMap::new();
        for mnemonic in order {
            let start = rows.len();
            rows.extend(parsed.iter().filter(|r| r.mnemonic == mnemonic).cloned());
            index.insert(mnemonic, start..rows.len());
        }
        Ok(Self { rows, index })
    }

    /// The built-in table covering the common general-purpose subset.
    ///
    /// # Panics
    ///
    /// Never in practice: the built-in text is static and covered by
    /// tests.
    pub fn builtin() -> Self {
        match Self::parse(BUILTIN_TABLE) {
            Ok(table) => table,
            Err(err) => panic!("built-in opcode table is malformed: {}", err),
        }
    }

    /// All templates for a mnemonic, in declaration order. Empty slice
    /// for an unknown mnemonic.
    pub fn lookup(&self, mnemonic: Mnemonic) -> &[OpcodeTemplate] {
        match self.index.get(&mnemonic) {
            Some(range) => &self.rows[range.clone()],
            None => &[],
        }
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in grouped declaration order.
    pub fn rows(&self) -> &[OpcodeTemplate] {
        &self.rows
    }
}

fn parse_row(line: &str) -> Result<OpcodeTemplate, String> {
    let open = line
        .find('[')
        .ok_or_else(|| "missing '[' before opcode bytes".to_string())?;
    let close = line
        .find(']')
        .ok_or_else(|| "missing ']' after opcode bytes".to_string())?;
    if close < open {
        return Err("']' appears before '['".to_string());
    }

    let mnemonic_text = line[..open].trim();
    if mnemonic_text.is_empty() || mnemonic_text.split_whitespace().count() != 1 {
        return Err("expected exactly one mnemonic before '['".to_string());
    }
    if mnemonic_text.len() > Mnemonic::MAX_LEN {
        return Err(format!("mnemonic '{}' exceeds 15 bytes", mnemonic_text));
    }
    let mnemonic = Mnemonic::from(mnemonic_text);

    let mut opcode = OpcodeBytes {
        bytes: [0; 3],
        len: 0,
    };
    for token in line[open + 1..close].split_whitespace() {
        let byte = u8::from_str_radix(token, 16)
            .map_err(|_| format!("bad opcode byte '{}'", token))?;
        if opcode.len as usize >= 3 {
            return Err("more than 3 opcode bytes".to_string());
        }
        opcode.bytes[opcode.len as usize] = byte;
        opcode.len += 1;
    }
    if opcode.len == 0 {
        return Err("empty opcode byte list".to_string());
    }

    let mut rest = line[close + 1..].split_whitespace();
    let flags_text = rest
        .next()
        .ok_or_else(|| "missing flags field".to_string())?;
    let types_text = rest.next();
    if rest.next().is_some() {
        return Err("trailing tokens after type codes".to_string());
    }

    let mut flags = EncodingFlags::NONE;
    let mut reg_ext = None;
    for token in flags_text.split('|') {
        match token {
            "NONE" => {}
            "USES_MODRM" => flags |= EncodingFlags::USES_MODRM,
            "DEFAULT_64BIT" => flags |= EncodingFlags::DEFAULT_64BIT,
            other => {
                if let Some(arg) = other.strip_prefix("EXT(").and_then(|t| t.strip_suffix(')')) {
                    let n: u8 = arg
                        .parse()
                        .map_err(|_| format!("bad extension value in '{}'", other))?;
                    if n > 7 {
                        return Err(format!("extension value {} exceeds 7", n));
                    }
                    reg_ext = Some(n);
                } else {
                    return Err(format!("unknown flag '{}'", other));
                }
            }
        }
    }

    let mut types = TypeList {
        items: [TypeList::EMPTY_SLOT; 2],
        len: 0,
    };
    if let Some(text) = types_text {
        for token in text.split(',') {
            let code = TypeCode::parse(token.trim())?;
            if types.len as usize >= 2 {
                return Err("more than 2 operand type codes".to_string());
            }
            types.items[types.len as usize] = code;
            types.len += 1;
        }
    }

    // An opcode-extension constant occupies the ModRM reg field, so the
    // row cannot also carry a K operand.
    if reg_ext.is_some() && types.iter().any(|t| t.kind == TypeKind::Reg) {
        return Err("EXT(n) conflicts with a 'K' operand".to_string());
    }

    Ok(OpcodeTemplate {
        mnemonic,
        types,
        opcode,
        flags,
        reg_ext,
    })
}

/// Built-in encodings for the common 64-bit general-purpose subset.
///
/// Row order within a mnemonic is meaningful: equal-length candidates
/// resolve to the earlier row.
const BUILTIN_TABLE: &str = r#"
# Data movement
MOV     [ 88 ]    USES_MODRM         E8,K8
MOV     [ 89 ]    USES_MODRM         E,K
MOV     [ 8A ]    USES_MODRM         K8,E8
MOV     [ 8B ]    USES_MODRM         K,E
MOV     [ B0 ]    NONE               R8,I8
MOV     [ B8 ]    NONE               R16,I16
MOV     [ B8 ]    NONE               R32,I32
MOV     [ B8 ]    NONE               R64,I64
MOV     [ C6 ]    USES_MODRM|EXT(0)  E8,I8
MOV     [ C7 ]    USES_MODRM|EXT(0)  E,I
MOVSXD  [ 63 ]    USES_MODRM         K64,E32
MOVZX   [ 0F B6 ] USES_MODRM         K,E8
MOVZX   [ 0F B7 ] USES_MODRM         K,E16
MOVSX   [ 0F BE ] USES_MODRM         K,E8
MOVSX   [ 0F BF ] USES_MODRM         K,E16
LEA     [ 8D ]    USES_MODRM         K,M
XCHG    [ 86 ]    USES_MODRM         E8,K8
XCHG    [ 87 ]    USES_MODRM         E,K

# Arithmetic and logic
ADD     [ 00 ]    USES_MODRM         E8,K8
ADD     [ 01 ]    USES_MODRM         E,K
ADD     [ 02 ]    USES_MODRM         K8,E8
ADD     [ 03 ]    USES_MODRM         K,E
ADD     [ 80 ]    USES_MODRM|EXT(0)  E8,I8
ADD     [ 83 ]    USES_MODRM|EXT(0)  E,S8
ADD     [ 81 ]    USES_MODRM|EXT(0)  E,I
OR      [ 08 ]    USES_MODRM         E8,K8
OR      [ 09 ]    USES_MODRM         E,K
OR      [ 0A ]    USES_MODRM         K8,E8
OR      [ 0B ]    USES_MODRM         K,E
OR      [ 80 ]    USES_MODRM|EXT(1)  E8,I8
OR      [ 83 ]    USES_MODRM|EXT(1)  E,S8
OR      [ 81 ]    USES_MODRM|EXT(1)  E,I
ADC     [ 10 ]    USES_MODRM         E8,K8
ADC     [ 11 ]    USES_MODRM         E,K
ADC     [ 12 ]    USES_MODRM         K8,E8
ADC     [ 13 ]    USES_MODRM         K,E
ADC     [ 80 ]    USES_MODRM|EXT(2)  E8,I8
ADC     [ 83 ]    USES_MODRM|EXT(2)  E,S8
ADC     [ 81 ]    USES_MODRM|EXT(2)  E,I
SBB     [ 18 ]    USES_MODRM         E8,K8
SBB     [ 19 ]    USES_MODRM         E,K
SBB     [ 1A ]    USES_MODRM         K8,E8
SBB     [ 1B ]    USES_MODRM         K,E
SBB     [ 80 ]    USES_MODRM|EXT(3)  E8,I8
SBB     [ 83 ]    USES_MODRM|EXT(3)  E,S8
SBB     [ 81 ]    USES_MODRM|EXT(3)  E,I
AND     [ 20 ]    USES_MODRM         E8,K8
AND     [ 21 ]    USES_MODRM         E,K
AND     [ 22 ]    USES_MODRM         K8,E8
AND     [ 23 ]    USES_MODRM         K,E
AND     [ 80 ]    USES_MODRM|EXT(4)  E8,I8
AND     [ 83 ]    USES_MODRM|EXT(4)  E,S8
AND     [ 81 ]    USES_MODRM|EXT(4)  E,I
SUB     [ 28 ]    USES_MODRM         E8,K8
SUB     [ 29 ]    USES_MODRM         E,K
SUB     [ 2A ]    USES_MODRM         K8,E8
SUB     [ 2B ]    USES_MODRM         K,E
SUB     [ 80 ]    USES_MODRM|EXT(5)  E8,I8
SUB     [ 83 ]    USES_MODRM|EXT(5)  E,S8
SUB     [ 81 ]    USES_MODRM|EXT(5)  E,I
XOR     [ 30 ]    USES_MODRM         E8,K8
XOR     [ 31 ]    USES_MODRM         E,K
XOR     [ 32 ]    USES_MODRM         K8,E8
XOR     [ 33 ]    USES_MODRM         K,E
XOR     [ 80 ]    USES_MODRM|EXT(6)  E8,I8
XOR     [ 83 ]    USES_MODRM|EXT(6)  E,S8
XOR     [ 81 ]    USES_MODRM|EXT(6)  E,I
CMP     [ 38 ]    USES_MODRM         E8,K8
CMP     [ 39 ]    USES_MODRM         E,K
CMP     [ 3A ]    USES_MODRM         K8,E8
CMP     [ 3B ]    USES_MODRM         K,E
CMP     [ 80 ]    USES_MODRM|EXT(7)  E8,I8
CMP     [ 83 ]    USES_MODRM|EXT(7)  E,S8
CMP     [ 81 ]    USES_MODRM|EXT(7)  E,I
TEST    [ 84 ]    USES_MODRM         E8,K8
TEST    [ 85 ]    USES_MODRM         E,K
TEST    [ F6 ]    USES_MODRM|EXT(0)  E8,I8
TEST    [ F7 ]    USES_MODRM|EXT(0)  E,I
INC     [ FE ]    USES_MODRM|EXT(0)  E8
INC     [ FF ]    USES_MODRM|EXT(0)  E
DEC     [ FE ]    USES_MODRM|EXT(1)  E8
DEC     [ FF ]    USES_MODRM|EXT(1)  E
NOT     [ F6 ]    USES_MODRM|EXT(2)  E8
NOT     [ F7 ]    USES_MODRM|EXT(2)  E
NEG     [ F6 ]    USES_MODRM|EXT(3)  E8
NEG     [ F7 ]    USES_MODRM|EXT(3)  E
MUL     [ F6 ]    USES_MODRM|EXT(4)  E8
MUL     [ F7 ]    USES_MODRM|EXT(4)  E
IMUL    [ F6 ]    USES_MODRM|EXT(5)  E8
IMUL    [ F7 ]    USES_MODRM|EXT(5)  E
IMUL    [ 0F AF ] USES_MODRM         K,E
DIV     [ F6 ]    USES_MODRM|EXT(6)  E8
DIV     [ F7 ]    USES_MODRM|EXT(6)  E
IDIV    [ F6 ]    USES_MODRM|EXT(7)  E8
IDIV    [ F7 ]    USES_MODRM|EXT(7)  E

# Shifts and rotates (immediate and CL count forms)
ROL     [ C0 ]    USES_MODRM|EXT(0)  E8,I8
ROL     [ C1 ]    USES_MODRM|EXT(0)  E,I8
ROL     [ D2 ]    USES_MODRM|EXT(0)  E8,C
ROL     [ D3 ]    USES_MODRM|EXT(0)  E,C
ROR     [ C0 ]    USES_MODRM|EXT(1)  E8,I8
ROR     [ C1 ]    USES_MODRM|EXT(1)  E,I8
ROR     [ D2 ]    USES_MODRM|EXT(1)  E8,C
ROR     [ D3 ]    USES_MODRM|EXT(1)  E,C
SHL     [ C0 ]    USES_MODRM|EXT(4)  E8,I8
SHL     [ C1 ]    USES_MODRM|EXT(4)  E,I8
SHL     [ D2 ]    USES_MODRM|EXT(4)  E8,C
SHL     [ D3 ]    USES_MODRM|EXT(4)  E,C
SHR     [ C0 ]    USES_MODRM|EXT(5)  E8,I8
SHR     [ C1 ]    USES_MODRM|EXT(5)  E,I8
SHR     [ D2 ]    USES_MODRM|EXT(5)  E8,C
SHR     [ D3 ]    USES_MODRM|EXT(5)  E,C
SAR     [ C0 ]    USES_MODRM|EXT(7)  E8,I8
SAR     [ C1 ]    USES_MODRM|EXT(7)  E,I8
SAR     [ D2 ]    USES_MODRM|EXT(7)  E8,C
SAR     [ D3 ]    USES_MODRM|EXT(7)  E,C

# Stack
PUSH    [ 50 ]    DEFAULT_64BIT              R64
PUSH    [ FF ]    USES_MODRM|DEFAULT_64BIT|EXT(6)  E64
PUSH    [ 6A ]    NONE               S8
PUSH    [ 68 ]    NONE               I32
POP     [ 58 ]    DEFAULT_64BIT              R64
POP     [ 8F ]    USES_MODRM|DEFAULT_64BIT|EXT(0)  E64

# Control flow (relative targets are pre-resolved byte offsets)
CALL    [ E8 ]    NONE               J32
CALL    [ FF ]    USES_MODRM|DEFAULT_64BIT|EXT(2)  E64
JMP     [ EB ]    NONE               J8
JMP     [ E9 ]    NONE               J32
JMP     [ FF ]    USES_MODRM|DEFAULT_64BIT|EXT(4)  E64
JO      [ 70 ]    NONE               J8
JO      [ 0F 80 ] NONE               J32
JNO     [ 71 ]    NONE               J8
JNO     [ 0F 81 ] NONE               J32
JB      [ 72 ]    NONE               J8
JB      [ 0F 82 ] NONE               J32
JAE     [ 73 ]    NONE               J8
JAE     [ 0F 83 ] NONE               J32
JE      [ 74 ]    NONE               J8
JE      [ 0F 84 ] NONE               J32
JNE     [ 75 ]    NONE               J8
JNE     [ 0F 85 ] NONE               J32
JBE     [ 76 ]    NONE               J8
JBE     [ 0F 86 ] NONE               J32
JA      [ 77 ]    NONE               J8
JA      [ 0F 87 ] NONE               J32
JS      [ 78 ]    NONE               J8
JS      [ 0F 88 ] NONE               J32
JNS     [ 79 ]    NONE               J8
JNS     [ 0F 89 ] NONE               J32
JP      [ 7A ]    NONE               J8
JP      [ 0F 8A ] NONE               J32
JNP     [ 7B ]    NONE               J8
JNP     [ 0F 8B ] NONE               J32
JL      [ 7C ]    NONE               J8
JL      [ 0F 8C ] NONE               J32
JGE     [ 7D ]    NONE               J8
JGE     [ 0F 8D ] NONE               J32
JLE     [ 7E ]    NONE               J8
JLE     [ 0F 8E ] NONE               J32
JG      [ 7F ]    NONE               J8
JG      [ 0F 8F ] NONE               J32
RET     [ C3 ]    NONE
RET     [ C2 ]    NONE               I16
INT     [ CD ]    NONE               I8
INT3    [ CC ]    NONE
SYSCALL [ 0F 05 ] NONE

# No-operand utility instructions
NOP     [ 90 ]    NONE
PAUSE   [ F3 90 ] NONE
LEAVE   [ C9 ]    NONE
HLT     [ F4 ]    NONE
CWDE    [ 98 ]    NONE
CDQE    [ 48 98 ] NONE
CDQ     [ 99 ]    NONE
CQO     [ 48 99 ] NONE
UD2     [ 0F 0B ] NONE
CPUID   [ 0F A2 ] NONE
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_parses() {
        let table = OpcodeTable::builtin();
        assert!(table.len() > 100);
        assert!(!table.lookup(Mnemonic::from("MOV")).is_empty());
        assert!(table.lookup(Mnemonic::from("frobnicate")).is_empty());
    }

    #[test]
    fn row_fields() {
        let table = OpcodeTable::parse("ADD [ 01 ] USES_MODRM E,K").unwrap();
        let rows = table.lookup(Mnemonic::from("add"));
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.opcode.as_slice(), &[0x01]);
        assert!(row.flags.contains(EncodingFlags::USES_MODRM));
        assert_eq!(row.reg_ext, None);
        assert_eq!(row.types.len(), 2);
        assert_eq!(
            row.types.as_slice()[0],
            TypeCode {
                kind: TypeKind::RegMem,
                size: SizeRule::Varies
            }
        );
        assert_eq!(
            row.types.as_slice()[1],
            TypeCode {
                kind: TypeKind::Reg,
                size: SizeRule::Varies
            }
        );
    }

    #[test]
    fn extension_flag_parses() {
        let table = OpcodeTable::parse("NEG [ F7 ] USES_MODRM|EXT(3) E").unwrap();
        let row = &table.lookup(Mnemonic::from("NEG"))[0];
        assert_eq!(row.reg_ext, Some(3));
        assert!(row.flags.contains(EncodingFlags::USES_MODRM));
    }

    #[test]
    fn comments_and_blanks_ignored() {
        let text = "# header\n\nNOP [ 90 ] NONE\n   # trailing comment line\n";
        let table = OpcodeTable::parse(text).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn declaration_order_preserved_per_mnemonic() {
        let text = "JMP [ EB ] NONE J8\nNOP [ 90 ] NONE\nJMP [ E9 ] NONE J32\n";
        let table = OpcodeTable::parse(text).unwrap();
        let rows = table.lookup(Mnemonic::from("JMP"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].opcode.as_slice(), &[0xEB]);
        assert_eq!(rows[1].opcode.as_slice(), &[0xE9]);
    }

    #[test]
    fn bad_rows_report_line_numbers() {
        let err = OpcodeTable::parse("NOP [ 90 ] NONE\nBAD ROW WITHOUT BRACKETS\n").unwrap_err();
        assert_eq!(err.line, 2);

        let err = OpcodeTable::parse("MOV [ ZZ ] NONE R8,I8").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.msg.contains("opcode byte"));
    }

    #[test]
    fn ext_and_k_operand_conflict_rejected() {
        let err = OpcodeTable::parse("MOV [ C7 ] USES_MODRM|EXT(0) E,K").unwrap_err();
        assert!(err.msg.contains("conflicts"));
    }

    #[test]
    fn rel_code_requires_size() {
        let err = OpcodeTable::parse("JMP [ E9 ] NONE J").unwrap_err();
        assert!(err.msg.contains("J8/J32"));
    }

    #[test]
    fn signed_imm_code_requires_size() {
        let err = OpcodeTable::parse("ADD [ 83 ] USES_MODRM|EXT(0) E,S").unwrap_err();
        assert!(err.msg.contains("S8"));
    }

    #[test]
    fn count_register_code_takes_no_suffix() {
        let code = TypeCode::parse("C").unwrap();
        assert_eq!(code.kind, TypeKind::ImplicitCl);
        assert!(TypeCode::parse("C8").is_err());
    }

    #[test]
    fn type_code_display_round_trips() {
        for text in ["E", "E8", "K", "R64", "M", "I32", "S8", "J8", "C"] {
            let code = TypeCode::parse(text).unwrap();
            assert_eq!(alloc::format!("{}", code), text);
        }
    }
}
