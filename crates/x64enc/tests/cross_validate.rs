#![cfg(not(target_arch = "wasm32"))]
//! Cross-validation tests: encode with x64enc, decode with iced-x86.
//!
//! Every encoding is fed to iced-x86 and the decoded instruction is
//! compared field by field (mnemonic, registers, memory operand,
//! immediate). This validates the emitted bytes against an independent,
//! battle-tested x86-64 decoder rather than against hand-derived byte
//! strings.

use iced_x86::{
    Decoder, DecoderOptions, Instruction as IcedInstruction, Mnemonic as IcedMnemonic,
    OpKind, Register as IcedReg,
};
use x64enc::{assemble, Instruction, Mem, OpcodeTable, Operand, Register};

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Encode one instruction and decode the bytes with iced-x86.
fn encode_and_decode(instr: &Instruction) -> IcedInstruction {
    let table = OpcodeTable::builtin();
    let bytes =
        assemble(&table, instr).unwrap_or_else(|e| panic!("failed to encode `{instr}`: {e}"));
    assert!(!bytes.is_empty(), "empty output for `{instr}`");

    let mut decoder = Decoder::with_ip(64, &bytes, 0, DecoderOptions::NONE);
    let decoded = decoder.decode();
    assert_ne!(
        decoded.mnemonic(),
        IcedMnemonic::INVALID,
        "iced-x86 decoded INVALID for `{instr}` → {:02X?}",
        bytes
    );
    // The decoder must consume every emitted byte.
    assert_eq!(
        decoded.len(),
        bytes.len(),
        "iced-x86 decoded {} bytes but x64enc emitted {} for `{instr}` → {:02X?}",
        decoded.len(),
        bytes.len(),
        bytes
    );
    decoded
}

/// Encode + decode, assert only the iced mnemonic.
fn verify(instr: Instruction, expected: IcedMnemonic) -> IcedInstruction {
    let decoded = encode_and_decode(&instr);
    assert_eq!(decoded.mnemonic(), expected, "mnemonic mismatch for `{instr}`");
    decoded
}

/// Register-register form: mnemonic plus both decoded register operands.
fn verify_rr(instr: Instruction, expected: IcedMnemonic, op0: IcedReg, op1: IcedReg) {
    let decoded = verify(instr, expected);
    assert_eq!(decoded.op0_kind(), OpKind::Register);
    assert_eq!(decoded.op0_register(), op0);
    assert_eq!(decoded.op1_kind(), OpKind::Register);
    assert_eq!(decoded.op1_register(), op1);
}

/// Register-immediate form: the decoded immediate must equal `value`
/// after the processor's sign extension.
fn verify_ri(instr: Instruction, expected: IcedMnemonic, op0: IcedReg, value: i64) {
    let decoded = verify(instr, expected);
    assert_eq!(decoded.op0_register(), op0);
    assert_eq!(decoded.immediate(1) as i64, value);
}

fn rr(mnemonic: &str, dst: Register, src: Register) -> Instruction {
    Instruction::new(mnemonic, vec![Operand::reg(dst), Operand::reg(src)])
}

fn ri(mnemonic: &str, dst: Register, imm: i64) -> Instruction {
    Instruction::new(mnemonic, vec![Operand::reg(dst), Operand::imm(imm)])
}

// ─── Register-register forms across widths ───────────────────────────────────

#[test]
fn alu_register_forms() {
    verify_rr(rr("ADD", Register::Eax, Register::Ebx), IcedMnemonic::Add, IcedReg::EAX, IcedReg::EBX);
    verify_rr(rr("SUB", Register::Rcx, Register::Rdx), IcedMnemonic::Sub, IcedReg::RCX, IcedReg::RDX);
    verify_rr(rr("XOR", Register::Ax, Register::Bx), IcedMnemonic::Xor, IcedReg::AX, IcedReg::BX);
    verify_rr(rr("AND", Register::Al, Register::Dl), IcedMnemonic::And, IcedReg::AL, IcedReg::DL);
    verify_rr(rr("CMP", Register::R10, Register::R11), IcedMnemonic::Cmp, IcedReg::R10, IcedReg::R11);
    verify_rr(rr("OR", Register::R8d, Register::Esi), IcedMnemonic::Or, IcedReg::R8D, IcedReg::ESI);
    verify_rr(rr("TEST", Register::Rdi, Register::Rsi), IcedMnemonic::Test, IcedReg::RDI, IcedReg::RSI);
    verify_rr(rr("ADC", Register::Ebp, Register::Edi), IcedMnemonic::Adc, IcedReg::EBP, IcedReg::EDI);
    verify_rr(rr("SBB", Register::R14, Register::R15), IcedMnemonic::Sbb, IcedReg::R14, IcedReg::R15);
    verify_rr(rr("XCHG", Register::Ecx, Register::Edx), IcedMnemonic::Xchg, IcedReg::ECX, IcedReg::EDX);
}

#[test]
fn uniform_and_high_byte_registers() {
    verify_rr(rr("MOV", Register::Sil, Register::Dil), IcedMnemonic::Mov, IcedReg::SIL, IcedReg::DIL);
    verify_rr(rr("MOV", Register::Spl, Register::Al), IcedMnemonic::Mov, IcedReg::SPL, IcedReg::AL);
    verify_rr(rr("MOV", Register::Ah, Register::Bh), IcedMnemonic::Mov, IcedReg::AH, IcedReg::BH);
    verify_rr(rr("MOV", Register::R15b, Register::Al), IcedMnemonic::Mov, IcedReg::R15L, IcedReg::AL);
}

// ─── Immediate forms ─────────────────────────────────────────────────────────

#[test]
fn immediate_forms() {
    verify_ri(ri("ADD", Register::Ecx, 5), IcedMnemonic::Add, IcedReg::ECX, 5);
    verify_ri(ri("ADD", Register::Ecx, 0x12345), IcedMnemonic::Add, IcedReg::ECX, 0x12345);
    verify_ri(ri("MOV", Register::Eax, 42), IcedMnemonic::Mov, IcedReg::EAX, 42);
    verify_ri(
        ri("MOV", Register::Rax, 0x11223344556677),
        IcedMnemonic::Mov,
        IcedReg::RAX,
        0x11223344556677,
    );
    verify_ri(ri("CMP", Register::Rsp, 8), IcedMnemonic::Cmp, IcedReg::RSP, 8);
    verify_ri(ri("SUB", Register::Rax, -16), IcedMnemonic::Sub, IcedReg::RAX, -16);
    verify_ri(ri("SHL", Register::Edx, 3), IcedMnemonic::Shl, IcedReg::EDX, 3);
    verify_ri(ri("SAR", Register::Rax, 63), IcedMnemonic::Sar, IcedReg::RAX, 63);
    verify_ri(ri("ROL", Register::Bl, 1), IcedMnemonic::Rol, IcedReg::BL, 1);
}

#[test]
fn byte_range_immediates_keep_their_value() {
    // 0x80..=0xFF must not slip into a sign-extended imm8 field.
    verify_ri(ri("ADD", Register::Ecx, 255), IcedMnemonic::Add, IcedReg::ECX, 255);
    verify_ri(ri("SUB", Register::Rdx, 0x80), IcedMnemonic::Sub, IcedReg::RDX, 0x80);
    verify_ri(ri("CMP", Register::Ecx, -1), IcedMnemonic::Cmp, IcedReg::ECX, -1);

    let decoded = verify(Instruction::new("PUSH", vec![Operand::imm(255)]), IcedMnemonic::Push);
    assert_eq!(decoded.immediate(0) as i64, 255);
    let decoded = verify(Instruction::new("PUSH", vec![Operand::imm(-1)]), IcedMnemonic::Push);
    assert_eq!(decoded.immediate(0) as i64, -1);
}

#[test]
fn shift_by_cl_forms() {
    verify_rr(rr("SHL", Register::Edx, Register::Cl), IcedMnemonic::Shl, IcedReg::EDX, IcedReg::CL);
    verify_rr(rr("SHR", Register::Bl, Register::Cl), IcedMnemonic::Shr, IcedReg::BL, IcedReg::CL);
    verify_rr(rr("SAR", Register::Rax, Register::Cl), IcedMnemonic::Sar, IcedReg::RAX, IcedReg::CL);
    verify_rr(rr("ROR", Register::R9d, Register::Cl), IcedMnemonic::Ror, IcedReg::R9D, IcedReg::CL);
}

// ─── Memory addressing forms ─────────────────────────────────────────────────

struct MemShape {
    base: IcedReg,
    index: IcedReg,
    scale: u32,
    disp: i64,
}

fn verify_store(mem: Mem, src: Register, expected: MemShape, src_reg: IcedReg) {
    let instr = Instruction::new(
        "MOV",
        vec![Operand::Memory(mem.build().unwrap()), Operand::reg(src)],
    );
    let decoded = verify(instr, IcedMnemonic::Mov);
    assert_eq!(decoded.op0_kind(), OpKind::Memory);
    assert_eq!(decoded.memory_base(), expected.base);
    assert_eq!(decoded.memory_index(), expected.index);
    if expected.index != IcedReg::None {
        assert_eq!(decoded.memory_index_scale(), expected.scale);
    }
    assert_eq!(decoded.memory_displacement64() as i64, expected.disp);
    assert_eq!(decoded.op1_register(), src_reg);
}

#[test]
fn memory_forms() {
    verify_store(
        Mem::new().base(Register::Rbp).disp(-4),
        Register::Eax,
        MemShape { base: IcedReg::RBP, index: IcedReg::None, scale: 1, disp: -4 },
        IcedReg::EAX,
    );
    verify_store(
        Mem::new().base(Register::Rsp),
        Register::Eax,
        MemShape { base: IcedReg::RSP, index: IcedReg::None, scale: 1, disp: 0 },
        IcedReg::EAX,
    );
    verify_store(
        Mem::new().base(Register::R12),
        Register::Ecx,
        MemShape { base: IcedReg::R12, index: IcedReg::None, scale: 1, disp: 0 },
        IcedReg::ECX,
    );
    verify_store(
        Mem::new().base(Register::R13),
        Register::Ecx,
        MemShape { base: IcedReg::R13, index: IcedReg::None, scale: 1, disp: 0 },
        IcedReg::ECX,
    );
    verify_store(
        Mem::new().base(Register::Rbx).index(Register::Rcx, 4).disp(0x10),
        Register::Edx,
        MemShape { base: IcedReg::RBX, index: IcedReg::RCX, scale: 4, disp: 0x10 },
        IcedReg::EDX,
    );
    verify_store(
        Mem::new().index(Register::Rcx, 8),
        Register::Eax,
        MemShape { base: IcedReg::None, index: IcedReg::RCX, scale: 8, disp: 0 },
        IcedReg::EAX,
    );
    verify_store(
        Mem::new().base(Register::R8).index(Register::R9, 2).disp(-0x200),
        Register::Rax,
        MemShape { base: IcedReg::R8, index: IcedReg::R9, scale: 2, disp: -0x200 },
        IcedReg::RAX,
    );
    verify_store(
        Mem::new().disp(0x1000),
        Register::Eax,
        MemShape { base: IcedReg::None, index: IcedReg::None, scale: 1, disp: 0x1000 },
        IcedReg::EAX,
    );
}

#[test]
fn rip_relative_load() {
    let mem = Mem::new().base(Register::Rip).disp(0x100).build().unwrap();
    let instr = Instruction::new(
        "MOV",
        vec![Operand::reg(Register::Eax), Operand::Memory(mem)],
    );
    let decoded = verify(instr, IcedMnemonic::Mov);
    assert_eq!(decoded.op1_kind(), OpKind::Memory);
    assert_eq!(decoded.memory_base(), IcedReg::RIP);
    // Decoded at IP 0: target = next-instruction address + disp.
    assert_eq!(
        decoded.memory_displacement64(),
        decoded.len() as u64 + 0x100
    );
}

#[test]
fn sized_memory_immediate_store() {
    let mem = Mem::new().base(Register::Rdi).size(8).build().unwrap();
    let instr = Instruction::new("MOV", vec![Operand::Memory(mem), Operand::imm(0x7F)]);
    let decoded = verify(instr, IcedMnemonic::Mov);
    assert_eq!(decoded.memory_size(), iced_x86::MemorySize::UInt8);
    assert_eq!(decoded.immediate(1), 0x7F);
}

#[test]
fn address_size_override() {
    let mem = Mem::new().base(Register::Ebx).build().unwrap();
    let instr = Instruction::new(
        "MOV",
        vec![Operand::Memory(mem), Operand::reg(Register::Eax)],
    );
    let decoded = verify(instr, IcedMnemonic::Mov);
    assert_eq!(decoded.memory_base(), IcedReg::EBX);
}

// ─── Single-operand and zero-operand forms ───────────────────────────────────

#[test]
fn unary_forms() {
    for (mnemonic, reg, expected, iced_reg) in [
        ("NEG", Register::Rcx, IcedMnemonic::Neg, IcedReg::RCX),
        ("NOT", Register::Ebx, IcedMnemonic::Not, IcedReg::EBX),
        ("INC", Register::R9, IcedMnemonic::Inc, IcedReg::R9),
        ("DEC", Register::Dl, IcedMnemonic::Dec, IcedReg::DL),
        ("IDIV", Register::Rsi, IcedMnemonic::Idiv, IcedReg::RSI),
        ("DIV", Register::R10d, IcedMnemonic::Div, IcedReg::R10D),
        ("MUL", Register::Ecx, IcedMnemonic::Mul, IcedReg::ECX),
        ("IMUL", Register::Bpl, IcedMnemonic::Imul, IcedReg::BPL),
    ] {
        let decoded = verify(Instruction::new(mnemonic, vec![Operand::reg(reg)]), expected);
        assert_eq!(decoded.op0_register(), iced_reg);
    }
}

#[test]
fn imul_two_operand_form() {
    verify_rr(
        rr("IMUL", Register::Rax, Register::Rbx),
        IcedMnemonic::Imul,
        IcedReg::RAX,
        IcedReg::RBX,
    );
}

#[test]
fn stack_forms() {
    let decoded = verify(
        Instruction::new("PUSH", vec![Operand::reg(Register::Rbp)]),
        IcedMnemonic::Push,
    );
    assert_eq!(decoded.op0_register(), IcedReg::RBP);
    let decoded = verify(
        Instruction::new("PUSH", vec![Operand::reg(Register::R15)]),
        IcedMnemonic::Push,
    );
    assert_eq!(decoded.op0_register(), IcedReg::R15);
    let decoded = verify(
        Instruction::new("POP", vec![Operand::reg(Register::Rbx)]),
        IcedMnemonic::Pop,
    );
    assert_eq!(decoded.op0_register(), IcedReg::RBX);
    verify(Instruction::new("PUSH", vec![Operand::imm(0x40)]), IcedMnemonic::Push);

    let mem = Mem::new().base(Register::Rax).size(64).build().unwrap();
    verify(
        Instruction::new("PUSH", vec![Operand::Memory(mem)]),
        IcedMnemonic::Push,
    );
}

#[test]
fn widening_moves() {
    verify_rr(rr("MOVZX", Register::Eax, Register::Cl), IcedMnemonic::Movzx, IcedReg::EAX, IcedReg::CL);
    verify_rr(rr("MOVZX", Register::Rdx, Register::Ax), IcedMnemonic::Movzx, IcedReg::RDX, IcedReg::AX);
    verify_rr(rr("MOVSX", Register::Ebx, Register::Dl), IcedMnemonic::Movsx, IcedReg::EBX, IcedReg::DL);
    verify_rr(rr("MOVSXD", Register::Rax, Register::Ecx), IcedMnemonic::Movsxd, IcedReg::RAX, IcedReg::ECX);
}

#[test]
fn lea_form() {
    let mem = Mem::new()
        .base(Register::Rdi)
        .index(Register::Rsi, 2)
        .disp(1)
        .build()
        .unwrap();
    let instr = Instruction::new(
        "LEA",
        vec![Operand::reg(Register::Rax), Operand::Memory(mem)],
    );
    let decoded = verify(instr, IcedMnemonic::Lea);
    assert_eq!(decoded.op0_register(), IcedReg::RAX);
    assert_eq!(decoded.memory_base(), IcedReg::RDI);
    assert_eq!(decoded.memory_index(), IcedReg::RSI);
    assert_eq!(decoded.memory_index_scale(), 2);
}

#[test]
fn branch_forms() {
    verify(Instruction::new("JMP", vec![Operand::imm(-2)]), IcedMnemonic::Jmp);
    verify(Instruction::new("JE", vec![Operand::imm(0x200)]), IcedMnemonic::Je);
    verify(Instruction::new("JNE", vec![Operand::imm(5)]), IcedMnemonic::Jne);
    verify(Instruction::new("JG", vec![Operand::imm(-100)]), IcedMnemonic::Jg);
    verify(Instruction::new("JAE", vec![Operand::imm(0x7F)]), IcedMnemonic::Jae);
    verify(Instruction::new("CALL", vec![Operand::imm(0x1000)]), IcedMnemonic::Call);
    verify(
        Instruction::new("CALL", vec![Operand::reg(Register::Rax)]),
        IcedMnemonic::Call,
    );
    verify(
        Instruction::new("JMP", vec![Operand::reg(Register::R11)]),
        IcedMnemonic::Jmp,
    );
}

#[test]
fn zero_operand_forms() {
    for (mnemonic, expected) in [
        ("RET", IcedMnemonic::Ret),
        ("NOP", IcedMnemonic::Nop),
        ("LEAVE", IcedMnemonic::Leave),
        ("HLT", IcedMnemonic::Hlt),
        ("INT3", IcedMnemonic::Int3),
        ("CDQ", IcedMnemonic::Cdq),
        ("CQO", IcedMnemonic::Cqo),
        ("CWDE", IcedMnemonic::Cwde),
        ("CDQE", IcedMnemonic::Cdqe),
        ("SYSCALL", IcedMnemonic::Syscall),
        ("CPUID", IcedMnemonic::Cpuid),
        ("UD2", IcedMnemonic::Ud2),
        ("PAUSE", IcedMnemonic::Pause),
    ] {
        verify(Instruction::new(mnemonic, vec![]), expected);
    }
}
