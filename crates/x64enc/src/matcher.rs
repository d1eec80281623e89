//! Template matching: which table rows can express a given instruction.

use alloc::vec::Vec;

use crate::operand::{imm_fits, imm_fits_signed, Instruction, Operand};
use crate::reg::Register;
use crate::table::{OpcodeTable, OpcodeTemplate, SizeRule, TypeCode, TypeKind};

/// All templates compatible with `instr`, in table declaration order.
///
/// Compatibility is structural: operand count, operand kind per
/// position, and size agreement. Exact byte layout (including whether
/// an immediate fits the field the operand-size attribute selects) is
/// the encoder's concern; a returned candidate may still decline to
/// encode.
///
/// An unknown mnemonic or an arity matched by no row yields an empty
/// vector, the normal "unsupported form" outcome.
pub fn match_candidates<'t>(table: &'t OpcodeTable, instr: &Instruction) -> Vec<&'t OpcodeTemplate> {
    table
        .lookup(instr.mnemonic)
        .iter()
        .filter(|template| template_matches(template, instr))
        .collect()
}

fn template_matches(template: &OpcodeTemplate, instr: &Instruction) -> bool {
    if template.types.len() != instr.operands.len() {
        return false;
    }
    for (code, operand) in template.types.iter().zip(instr.operands.iter()) {
        if !position_matches(*code, operand) {
            return false;
        }
    }
    // A memory operand with no explicit size is only unambiguous when a
    // register operand pins the operation width.
    let unsized_mem = instr
        .operands
        .iter()
        .any(|op| matches!(op, Operand::Memory(mem) if mem.size().is_none()));
    if unsized_mem && !instr.operands.iter().any(Operand::is_register) {
        return false;
    }
    sizes_consistent(template, instr)
}

fn position_matches(code: TypeCode, operand: &Operand) -> bool {
    match (code.kind, operand) {
        (TypeKind::RegMem, Operand::Register(reg))
        | (TypeKind::Reg, Operand::Register(reg))
        | (TypeKind::PlusReg, Operand::Register(reg)) => {
            reg.is_gp() && reg_size_matches(code.size, reg.width())
        }
        (TypeKind::RegMem | TypeKind::Mem, Operand::Memory(mem)) => match (code.size, mem.size()) {
            (_, None) => true,
            (SizeRule::Fixed(bits), Some(size)) => size == bits,
            (SizeRule::Varies, Some(size)) => matches!(size, 16 | 32 | 64),
        },
        (TypeKind::Imm, Operand::Immediate(imm)) => match code.size {
            SizeRule::Fixed(bits) => imm.width() <= bits,
            // A varying immediate field is at most 32 bits wide; only
            // explicit I64 templates carry 64-bit immediates.
            SizeRule::Varies => imm.width() <= 32,
        },
        // The processor sign-extends this field, so 0x80..=0xFF would
        // silently flip sign; only the signed window qualifies.
        (TypeKind::ImmSigned, Operand::Immediate(imm)) => match code.size {
            SizeRule::Fixed(bits) => imm_fits_signed(imm.value(), bits),
            SizeRule::Varies => imm_fits_signed(imm.value(), 32),
        },
        (TypeKind::ImplicitCl, Operand::Register(reg)) => *reg == Register::Cl,
        (TypeKind::Rel, Operand::Immediate(imm)) => match code.size {
            // Relative offsets are signed displacements from the next
            // instruction, so the unsigned reading does not apply.
            SizeRule::Fixed(bits) => imm_fits_signed(imm.value(), bits),
            SizeRule::Varies => imm_fits(imm.value(), 32),
        },
        _ => false,
    }
}

fn reg_size_matches(rule: SizeRule, width: u16) -> bool {
    match rule {
        SizeRule::Fixed(bits) => width == bits,
        // 8-bit operations have dedicated opcodes; a varying position
        // only spans the 16/32/64 family selected by prefixes.
        SizeRule::Varies => matches!(width, 16 | 32 | 64),
    }
}

/// Every size pinned down by a variant-coded position must agree:
/// `ADD eax, bx` has no encoding. Unsized memory operands and
/// immediates impose nothing here.
fn sizes_consistent(template: &OpcodeTemplate, instr: &Instruction) -> bool {
    let mut settled: Option<u16> = None;
    for (code, operand) in template.types.iter().zip(instr.operands.iter()) {
        if code.size != SizeRule::Varies {
            continue;
        }
        let size = match (code.kind, operand) {
            (TypeKind::RegMem | TypeKind::Reg | TypeKind::PlusReg, Operand::Register(reg)) => {
                Some(reg.width())
            }
            (TypeKind::RegMem | TypeKind::Mem, Operand::Memory(mem)) => mem.size(),
            _ => None,
        };
        if let Some(size) = size {
            match settled {
                None => settled = Some(size),
                Some(prev) if prev == size => {}
                Some(_) => return false,
            }
        }
    }
    true
}
