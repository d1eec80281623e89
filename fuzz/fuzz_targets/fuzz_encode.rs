#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use x64enc::{assemble, Instruction, Mem, OpcodeTable, Operand, Register};

const REGS: &[Register] = &[
    Register::Al,
    Register::Cl,
    Register::Ah,
    Register::Spl,
    Register::Dil,
    Register::R9b,
    Register::Ax,
    Register::Bx,
    Register::R10w,
    Register::Eax,
    Register::Ebx,
    Register::Esp,
    Register::Ebp,
    Register::R11d,
    Register::Rax,
    Register::Rcx,
    Register::Rsp,
    Register::Rbp,
    Register::Rsi,
    Register::R8,
    Register::R12,
    Register::R13,
    Register::R15,
    Register::Rip,
];

const MNEMONICS: &[&str] = &[
    "ADD", "SUB", "XOR", "CMP", "MOV", "TEST", "LEA", "PUSH", "POP", "NEG", "INC", "SHL",
    "MOVZX", "JMP", "JE", "CALL", "RET", "NOP", "IMUL",
];

#[derive(Arbitrary, Debug)]
enum FuzzOperand {
    Reg(u8),
    Imm(i64),
    Mem {
        base: Option<u8>,
        index: Option<(u8, u8)>,
        disp: Option<i64>,
        size: Option<u8>,
    },
}

#[derive(Arbitrary, Debug)]
struct FuzzInstr {
    mnemonic: u8,
    operands: Vec<FuzzOperand>,
}

fn reg(selector: u8) -> Register {
    REGS[selector as usize % REGS.len()]
}

fuzz_target!(|input: FuzzInstr| {
    let mut operands = Vec::new();
    for op in input.operands.iter().take(3) {
        match op {
            FuzzOperand::Reg(r) => operands.push(Operand::reg(reg(*r))),
            FuzzOperand::Imm(v) => operands.push(Operand::imm(*v)),
            FuzzOperand::Mem {
                base,
                index,
                disp,
                size,
            } => {
                let mut mem = Mem::new();
                if let Some(b) = base {
                    mem = mem.base(reg(*b));
                }
                if let Some((i, scale)) = index {
                    mem = mem.index(reg(*i), *scale);
                }
                if let Some(d) = disp {
                    mem = mem.disp(*d);
                }
                if let Some(s) = size {
                    mem = mem.size(u16::from(*s));
                }
                // Malformed shapes are rejected here, never deeper in
                // the pipeline.
                match mem.build() {
                    Ok(mem) => operands.push(Operand::Memory(mem)),
                    Err(_) => return,
                }
            }
        }
    }

    let table = OpcodeTable::builtin();
    let mnemonic = MNEMONICS[input.mnemonic as usize % MNEMONICS.len()];
    let instr = Instruction::new(mnemonic, operands);

    // Encoding must never panic; any outcome is Ok bytes or an error
    // value, and successful encodings respect the 15-byte limit.
    if let Ok(bytes) = assemble(&table, &instr) {
        assert!(!bytes.is_empty());
        assert!(bytes.len() <= 15);
    }
});
