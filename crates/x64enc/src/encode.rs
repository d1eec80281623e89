//! Byte encoder: one matched template plus concrete operands to final
//! machine-code bytes.
//!
//! Byte order follows the physical instruction layout: legacy prefixes,
//! REX, opcode, ModRM, SIB, displacement, immediate.

use crate::buf::InstrBytes;
use crate::error::EncodeError;
use crate::operand::{imm_fits, imm_fits_signed, Immediate, Instruction, MemoryOperand, Operand};
use crate::reg::Register;
use crate::table::{EncodingFlags, OpcodeTemplate, SizeRule, TypeKind};

const PREFIX_OPERAND_SIZE: u8 = 0x66;
const PREFIX_ADDRESS_SIZE: u8 = 0x67;

#[inline]
fn rex(w: bool, r: bool, x: bool, b: bool) -> u8 {
    0x40 | (u8::from(w) << 3) | (u8::from(r) << 2) | (u8::from(x) << 1) | u8::from(b)
}

#[inline]
fn modrm(md: u8, reg: u8, rm: u8) -> u8 {
    (md << 6) | ((reg & 7) << 3) | (rm & 7)
}

#[inline]
fn sib(scale_log2: u8, index: u8, base: u8) -> u8 {
    (scale_log2 << 6) | ((index & 7) << 3) | (base & 7)
}

/// Displacement bytes accompanying a ModRM/SIB pair.
enum Disp {
    None,
    B1(i8),
    B4(i32),
}

/// ModRM byte, optional SIB byte, and displacement for one memory
/// operand.
struct ModRmParts {
    modrm: u8,
    sib: Option<u8>,
    disp: Disp,
}

/// The template's operands sorted into their encoding roles.
#[derive(Default)]
struct Roles {
    rm: Option<Operand>,
    reg: Option<Register>,
    plus: Option<Register>,
    imm: Option<(Immediate, TypeKind, SizeRule)>,
}

fn split_roles(template: &OpcodeTemplate, instr: &Instruction) -> Option<Roles> {
    let mut roles = Roles::default();
    for (code, operand) in template.types.iter().zip(instr.operands.iter()) {
        match (code.kind, operand) {
            (TypeKind::RegMem, op @ (Operand::Register(_) | Operand::Memory(_)))
            | (TypeKind::Mem, op @ Operand::Memory(_)) => {
                roles.rm = Some(*op);
            }
            (TypeKind::Reg, Operand::Register(reg)) => roles.reg = Some(*reg),
            (TypeKind::PlusReg, Operand::Register(reg)) => roles.plus = Some(*reg),
            (TypeKind::Imm | TypeKind::ImmSigned | TypeKind::Rel, Operand::Immediate(imm)) => {
                roles.imm = Some((*imm, code.kind, code.size));
            }
            // Implicit CL carries no bits of its own.
            (TypeKind::ImplicitCl, Operand::Register(Register::Cl)) => {}
            // Matcher guarantees kind agreement; anything else means
            // the template cannot express this instruction.
            _ => return None,
        }
    }
    Some(roles)
}

/// Encode `instr` using `template`.
///
/// `Ok(None)` means this template cannot express the instruction (the
/// caller tries the next candidate); overflow of a value past every
/// width the template allows is an error, never a silent truncation.
pub fn encode(
    template: &OpcodeTemplate,
    instr: &Instruction,
) -> Result<Option<InstrBytes>, EncodeError> {
    let roles = match split_roles(template, instr) {
        Some(roles) => roles,
        None => return Ok(None),
    };

    // Operand-size attribute: taken from the register the templates
    // size against, or from an explicit memory size annotation.
    let op_size = roles
        .reg
        .map(Register::width)
        .or_else(|| roles.plus.map(Register::width))
        .or_else(|| match roles.rm {
            Some(Operand::Register(reg)) => Some(reg.width()),
            Some(Operand::Memory(mem)) => mem.size(),
            _ => None,
        });
    let has_variant = template.types.iter().any(|t| t.size == SizeRule::Varies);
    if has_variant && op_size.is_none() {
        // Nothing pins the width down (e.g. unsized memory with an
        // immediate source).
        return Ok(None);
    }

    // REX bit computation.
    let rex_w = op_size == Some(64) && !template.flags.contains(EncodingFlags::DEFAULT_64BIT);
    let rex_r = roles.reg.is_some_and(Register::is_extended);
    let mut rex_x = false;
    let mut rex_b = roles.plus.is_some_and(Register::is_extended);
    let mut mem_operand: Option<MemoryOperand> = None;
    match roles.rm {
        Some(Operand::Register(reg)) => rex_b |= reg.is_extended(),
        Some(Operand::Memory(mem)) => {
            rex_b |= mem.base().is_some_and(Register::is_extended);
            rex_x = mem.index().is_some_and(Register::is_extended);
            mem_operand = Some(mem);
        }
        _ => {}
    }
    let referenced = [
        roles.reg,
        roles.plus,
        match roles.rm {
            Some(Operand::Register(reg)) => Some(reg),
            _ => None,
        },
    ];
    let rex_forced = referenced
        .iter()
        .flatten()
        .any(|r| r.requires_rex_to_disambiguate());
    let rex_present = rex_w || rex_r || rex_x || rex_b || rex_forced;

    // AH/CH/DH/BH share encodings 4..7 with SPL/BPL/SIL/DIL; once a REX
    // prefix is present they become unreachable.
    if rex_present && referenced.iter().flatten().any(|r| r.is_high_byte()) {
        return Ok(None);
    }

    let mut out = InstrBytes::new();

    if mem_operand.is_some_and(|m| m.addr_width() == Some(32)) {
        out.push(PREFIX_ADDRESS_SIZE);
    }
    if op_size == Some(16) {
        out.push(PREFIX_OPERAND_SIZE);
    }
    if rex_present {
        out.push(rex(rex_w, rex_r, rex_x, rex_b));
    }

    out.extend_from_slice(template.opcode.as_slice());
    if let Some(plus) = roles.plus {
        if let Some(last) = out.last_mut() {
            *last |= plus.index() & 7;
        }
    } else if template.reg_ext.is_some() && !template.flags.contains(EncodingFlags::USES_MODRM) {
        // Extension constant folded into the opcode byte when the
        // template has no ModRM to carry it.
        if let (Some(last), Some(ext)) = (out.last_mut(), template.reg_ext) {
            *last = (*last & !7) | ext;
        }
    }

    if template.flags.contains(EncodingFlags::USES_MODRM) {
        let reg_field = roles
            .reg
            .map(|r| r.index() & 7)
            .or(template.reg_ext)
            .unwrap_or(0);
        match roles.rm {
            Some(Operand::Register(reg)) => {
                out.push(modrm(0b11, reg_field, reg.index()));
            }
            Some(Operand::Memory(mem)) => {
                let parts = mem_parts(&mem, reg_field);
                out.push(parts.modrm);
                if let Some(sib) = parts.sib {
                    out.push(sib);
                }
                match parts.disp {
                    Disp::None => {}
                    Disp::B1(d) => out.push(d as u8),
                    Disp::B4(d) => out.extend_from_slice(&d.to_le_bytes()),
                }
            }
            _ => return Ok(None),
        }
    }

    if let Some((imm, kind, size)) = roles.imm {
        let width = match size {
            SizeRule::Fixed(bits) => bits,
            SizeRule::Varies => match op_size {
                Some(16) => 16,
                Some(8) => 8,
                // 64-bit operations still take a 32-bit immediate,
                // sign-extended by the processor.
                _ => 32,
            },
        };
        let value = imm.value();
        let fits = match kind {
            TypeKind::Rel | TypeKind::ImmSigned => imm_fits_signed(value, width),
            _ if op_size == Some(64) && width == 32 => imm_fits_signed(value, width),
            _ => imm_fits(value, width),
        };
        if !fits {
            return Err(EncodeError::ImmediateOverflow { value, width });
        }
        out.extend_from_slice(&value.to_le_bytes()[..usize::from(width / 8)]);
    }

    Ok(Some(out))
}

fn scale_log2(scale: u8) -> u8 {
    match scale {
        2 => 1,
        4 => 2,
        8 => 3,
        _ => 0,
    }
}

fn mem_parts(mem: &MemoryOperand, reg_field: u8) -> ModRmParts {
    if mem.base() == Some(Register::Rip) {
        // mod=00 rm=101 is the RIP-relative form; disp32 is mandatory.
        return ModRmParts {
            modrm: modrm(0b00, reg_field, 0b101),
            sib: None,
            disp: Disp::B4(mem.disp().unwrap_or(0)),
        };
    }

    let base = match mem.base() {
        Some(base) => base,
        None => {
            // No base register: SIB with base=101 and mod=00, disp32
            // mandatory. Covers both absolute and index-only forms.
            let index = mem.index().map_or(0b100, |r| r.index());
            return ModRmParts {
                modrm: modrm(0b00, reg_field, 0b100),
                sib: Some(sib(scale_log2(mem.scale()), index, 0b101)),
                disp: Disp::B4(mem.disp().unwrap_or(0)),
            };
        }
    };

    // rm=100 is reserved to announce a SIB byte, so RSP/R12 bases need
    // one even without an index.
    let need_sib = mem.index().is_some() || base.index() & 7 == 4;

    let disp = mem.disp().filter(|&d| d != 0);
    let (md, disp) = match disp {
        None if base.index() & 7 == 5 => {
            // mod=00 with rm/base=101 means RIP-relative or no-base
            // instead; RBP/R13 need an explicit zero disp8.
            (0b01, Disp::B1(0))
        }
        None => (0b00, Disp::None),
        Some(d) => match i8::try_from(d) {
            Ok(d8) => (0b01, Disp::B1(d8)),
            Err(_) => (0b10, Disp::B4(d)),
        },
    };

    if need_sib {
        let index = mem.index().map_or(0b100, |r| r.index());
        ModRmParts {
            modrm: modrm(md, reg_field, 0b100),
            sib: Some(sib(scale_log2(mem.scale()), index, base.index())),
            disp,
        }
    } else {
        ModRmParts {
            modrm: modrm(md, reg_field, base.index()),
            sib: None,
            disp,
        }
    }
}
