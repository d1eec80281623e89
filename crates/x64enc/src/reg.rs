//! Architectural register catalogue.
//!
//! Pure data: every register knows its 4-bit encoding index, its width,
//! and its register class. Nothing here can fail.

use core::fmt;

/// Register class.
///
/// The two 8-bit banks matter for encoding: AH/CH/DH/BH
/// ([`GeneralLow8`](RegisterClass::GeneralLow8) at indices 4–7) are only
/// reachable *without* a REX prefix, while SPL/BPL/SIL/DIL
/// ([`GeneralUniform8`](RegisterClass::GeneralUniform8), same indices)
/// are only reachable *with* one — even an all-zero `0x40` REX. The
/// class tag keeps the two sets apart where a bare index could not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegisterClass {
    /// Legacy 8-bit registers: AL–BL plus the high-byte AH/CH/DH/BH.
    GeneralLow8,
    /// Uniform 8-bit registers: SPL/BPL/SIL/DIL and R8B–R15B (need REX).
    GeneralUniform8,
    /// 16-bit general-purpose registers.
    General16,
    /// 32-bit general-purpose registers.
    General32,
    /// 64-bit general-purpose registers.
    General64,
    /// Segment registers (ES, CS, SS, DS, FS, GS).
    Segment,
    /// Control registers (CR0, CR2–CR4, CR8).
    Control,
    /// Debug registers (DR0–DR7).
    Debug,
    /// Vector registers (XMM, YMM).
    Vector,
    /// Everything else: RIP and the x87 stack registers.
    Special,
}

/// An x86-64 architectural register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Register {
    // -- 64-bit general-purpose --
    /// RAX — 64-bit accumulator.
    Rax,
    /// RCX — 64-bit counter.
    Rcx,
    /// RDX — 64-bit data.
    Rdx,
    /// RBX — 64-bit base.
    Rbx,
    /// RSP — 64-bit stack pointer.
    Rsp,
    /// RBP — 64-bit frame pointer.
    Rbp,
    /// RSI — 64-bit source index.
    Rsi,
    /// RDI — 64-bit destination index.
    Rdi,
    /// R8–R15 — extended 64-bit registers (REX.B/R).
    R8,
    /// Extended 64-bit register.
    R9,
    /// Extended 64-bit register.
    R10,
    /// Extended 64-bit register.
    R11,
    /// Extended 64-bit register.
    R12,
    /// Extended 64-bit register.
    R13,
    /// Extended 64-bit register.
    R14,
    /// Extended 64-bit register.
    R15,
    // -- 32-bit general-purpose --
    /// EAX — 32-bit accumulator.
    Eax,
    /// ECX — 32-bit counter.
    Ecx,
    /// EDX — 32-bit data.
    Edx,
    /// EBX — 32-bit base.
    Ebx,
    /// ESP — 32-bit stack pointer.
    Esp,
    /// EBP — 32-bit frame pointer.
    Ebp,
    /// ESI — 32-bit source index.
    Esi,
    /// EDI — 32-bit destination index.
    Edi,
    /// Low 32 bits of R8.
    R8d,
    /// Low 32 bits of R9.
    R9d,
    /// Low 32 bits of R10.
    R10d,
    /// Low 32 bits of R11.
    R11d,
    /// Low 32 bits of R12.
    R12d,
    /// Low 32 bits of R13.
    R13d,
    /// Low 32 bits of R14.
    R14d,
    /// Low 32 bits of R15.
    R15d,
    // -- 16-bit general-purpose --
    /// AX — 16-bit accumulator.
    Ax,
    /// CX — 16-bit counter.
    Cx,
    /// DX — 16-bit data.
    Dx,
    /// BX — 16-bit base.
    Bx,
    /// SP — 16-bit stack pointer.
    Sp,
    /// BP — 16-bit frame pointer.
    Bp,
    /// SI — 16-bit source index.
    Si,
    /// DI — 16-bit destination index.
    Di,
    /// Low 16 bits of R8.
    R8w,
    /// Low 16 bits of R9.
    R9w,
    /// Low 16 bits of R10.
    R10w,
    /// Low 16 bits of R11.
    R11w,
    /// Low 16 bits of R12.
    R12w,
    /// Low 16 bits of R13.
    R13w,
    /// Low 16 bits of R14.
    R14w,
    /// Low 16 bits of R15.
    R15w,
    // -- 8-bit general-purpose, legacy low bank --
    /// AL — low byte of RAX.
    Al,
    /// CL — low byte of RCX.
    Cl,
    /// DL — low byte of RDX.
    Dl,
    /// BL — low byte of RBX.
    Bl,
    /// AH — high byte of AX (REX-incompatible).
    Ah,
    /// CH — high byte of CX (REX-incompatible).
    Ch,
    /// DH — high byte of DX (REX-incompatible).
    Dh,
    /// BH — high byte of BX (REX-incompatible).
    Bh,
    // -- 8-bit general-purpose, uniform bank --
    /// SPL — low byte of RSP (requires REX).
    Spl,
    /// BPL — low byte of RBP (requires REX).
    Bpl,
    /// SIL — low byte of RSI (requires REX).
    Sil,
    /// DIL — low byte of RDI (requires REX).
    Dil,
    /// Low byte of R8.
    R8b,
    /// Low byte of R9.
    R9b,
    /// Low byte of R10.
    R10b,
    /// Low byte of R11.
    R11b,
    /// Low byte of R12.
    R12b,
    /// Low byte of R13.
    R13b,
    /// Low byte of R14.
    R14b,
    /// Low byte of R15.
    R15b,
    // -- Instruction pointer --
    /// RIP — pseudo-register for RIP-relative addressing.
    Rip,
    // -- Segment registers --
    /// ES — extra segment.
    Es,
    /// CS — code segment.
    Cs,
    /// SS — stack segment.
    Ss,
    /// DS — data segment.
    Ds,
    /// FS — additional segment.
    Fs,
    /// GS — additional segment.
    Gs,
    // -- Control registers --
    /// CR0 — machine control flags.
    Cr0,
    /// CR2 — page-fault linear address.
    Cr2,
    /// CR3 — page-table base.
    Cr3,
    /// CR4 — feature control flags.
    Cr4,
    /// CR8 — task-priority register.
    Cr8,
    // -- Debug registers --
    /// DR0 — breakpoint address 0.
    Dr0,
    /// DR1 — breakpoint address 1.
    Dr1,
    /// DR2 — breakpoint address 2.
    Dr2,
    /// DR3 — breakpoint address 3.
    Dr3,
    /// DR4 — reserved alias of DR6.
    Dr4,
    /// DR5 — reserved alias of DR7.
    Dr5,
    /// DR6 — debug status.
    Dr6,
    /// DR7 — debug control.
    Dr7,
    // -- 128-bit SSE registers --
    /// SSE register 0.
    Xmm0,
    /// SSE register 1.
    Xmm1,
    /// SSE register 2.
    Xmm2,
    /// SSE register 3.
    Xmm3,
    /// SSE register 4.
    Xmm4,
    /// SSE register 5.
    Xmm5,
    /// SSE register 6.
    Xmm6,
    /// SSE register 7.
    Xmm7,
    /// Extended SSE register 8.
    Xmm8,
    /// Extended SSE register 9.
    Xmm9,
    /// Extended SSE register 10.
    Xmm10,
    /// Extended SSE register 11.
    Xmm11,
    /// Extended SSE register 12.
    Xmm12,
    /// Extended SSE register 13.
    Xmm13,
    /// Extended SSE register 14.
    Xmm14,
    /// Extended SSE register 15.
    Xmm15,
    // -- 256-bit AVX registers --
    /// AVX register 0.
    Ymm0,
    /// AVX register 1.
    Ymm1,
    /// AVX register 2.
    Ymm2,
    /// AVX register 3.
    Ymm3,
    /// AVX register 4.
    Ymm4,
    /// AVX register 5.
    Ymm5,
    /// AVX register 6.
    Ymm6,
    /// AVX register 7.
    Ymm7,
    /// Extended AVX register 8.
    Ymm8,
    /// Extended AVX register 9.
    Ymm9,
    /// Extended AVX register 10.
    Ymm10,
    /// Extended AVX register 11.
    Ymm11,
    /// Extended AVX register 12.
    Ymm12,
    /// Extended AVX register 13.
    Ymm13,
    /// Extended AVX register 14.
    Ymm14,
    /// Extended AVX register 15.
    Ymm15,
    // -- x87 stack registers --
    /// x87 stack register 0.
    St0,
    /// x87 stack register 1.
    St1,
    /// x87 stack register 2.
    St2,
    /// x87 stack register 3.
    St3,
    /// x87 stack register 4.
    St4,
    /// x87 stack register 5.
    St5,
    /// x87 stack register 6.
    St6,
    /// x87 stack register 7.
    St7,
}

impl Register {
    /// The 4-bit register encoding index (0–15). The low 3 bits go into
    /// ModRM/SIB fields; bit 3 goes into REX.R/X/B.
    pub fn index(self) -> u8 {
        use Register::*;
        match self {
            Rax | Eax | Ax | Al | Xmm0 | Ymm0 | St0 | Es | Cr0 | Dr0 => 0,
            Rcx | Ecx | Cx | Cl | Xmm1 | Ymm1 | St1 | Cs | Dr1 => 1,
            Rdx | Edx | Dx | Dl | Xmm2 | Ymm2 | St2 | Ss | Cr2 | Dr2 => 2,
            Rbx | Ebx | Bx | Bl | Xmm3 | Ymm3 | St3 | Ds | Cr3 | Dr3 => 3,
            Rsp | Esp | Sp | Spl | Ah | Xmm4 | Ymm4 | St4 | Fs | Cr4 | Dr4 => 4,
            Rbp | Ebp | Bp | Bpl | Ch | Xmm5 | Ymm5 | St5 | Gs | Dr5 => 5,
            Rsi | Esi | Si | Sil | Dh | Xmm6 | Ymm6 | St6 | Dr6 => 6,
            Rdi | Edi | Di | Dil | Bh | Xmm7 | Ymm7 | St7 | Dr7 => 7,
            R8 | R8d | R8w | R8b | Xmm8 | Ymm8 | Cr8 => 8,
            R9 | R9d | R9w | R9b | Xmm9 | Ymm9 => 9,
            R10 | R10d | R10w | R10b | Xmm10 | Ymm10 => 10,
            R11 | R11d | R11w | R11b | Xmm11 | Ymm11 => 11,
            R12 | R12d | R12w | R12b | Xmm12 | Ymm12 => 12,
            R13 | R13d | R13w | R13b | Xmm13 | Ymm13 => 13,
            R14 | R14d | R14w | R14b | Xmm14 | Ymm14 => 14,
            R15 | R15d | R15w | R15b | Xmm15 | Ymm15 => 15,
            // RIP-relative addressing uses encoding 5 (mod=00, rm=101)
            Rip => 5,
        }
    }

    /// Register width in bits.
    pub fn width(self) -> u16 {
        use Register::*;
        match self {
            Rax | Rcx | Rdx | Rbx | Rsp | Rbp | Rsi | Rdi | R8 | R9 | R10 | R11 | R12 | R13
            | R14 | R15 | Rip => 64,
            Eax | Ecx | Edx | Ebx | Esp | Ebp | Esi | Edi | R8d | R9d | R10d | R11d | R12d
            | R13d | R14d | R15d => 32,
            Ax | Cx | Dx | Bx | Sp | Bp | Si | Di | R8w | R9w | R10w | R11w | R12w | R13w
            | R14w | R15w | Es | Cs | Ss | Ds | Fs | Gs => 16,
            Al | Cl | Dl | Bl | Ah | Ch | Dh | Bh | Spl | Bpl | Sil | Dil | R8b | R9b | R10b
            | R11b | R12b | R13b | R14b | R15b => 8,
            Cr0 | Cr2 | Cr3 | Cr4 | Cr8 | Dr0 | Dr1 | Dr2 | Dr3 | Dr4 | Dr5 | Dr6 | Dr7 => 64,
            Xmm0 | Xmm1 | Xmm2 | Xmm3 | Xmm4 | Xmm5 | Xmm6 | Xmm7 | Xmm8 | Xmm9 | Xmm10
            | Xmm11 | Xmm12 | Xmm13 | Xmm14 | Xmm15 => 128,
            Ymm0 | Ymm1 | Ymm2 | Ymm3 | Ymm4 | Ymm5 | Ymm6 | Ymm7 | Ymm8 | Ymm9 | Ymm10
            | Ymm11 | Ymm12 | Ymm13 | Ymm14 | Ymm15 => 256,
            St0 | St1 | St2 | St3 | St4 | St5 | St6 | St7 => 80,
        }
    }

    /// Register class.
    pub fn class(self) -> RegisterClass {
        use Register::*;
        match self {
            Rax | Rcx | Rdx | Rbx | Rsp | Rbp | Rsi | Rdi | R8 | R9 | R10 | R11 | R12 | R13
            | R14 | R15 => RegisterClass::General64,
            Eax | Ecx | Edx | Ebx | Esp | Ebp | Esi | Edi | R8d | R9d | R10d | R11d | R12d
            | R13d | R14d | R15d => RegisterClass::General32,
            Ax | Cx | Dx | Bx | Sp | Bp | Si | Di | R8w | R9w | R10w | R11w | R12w | R13w
            | R14w | R15w => RegisterClass::General16,
            Al | Cl | Dl | Bl | Ah | Ch | Dh | Bh => RegisterClass::GeneralLow8,
            Spl | Bpl | Sil | Dil | R8b | R9b | R10b | R11b | R12b | R13b | R14b | R15b => {
                RegisterClass::GeneralUniform8
            }
            Es | Cs | Ss | Ds | Fs | Gs => RegisterClass::Segment,
            Cr0 | Cr2 | Cr3 | Cr4 | Cr8 => RegisterClass::Control,
            Dr0 | Dr1 | Dr2 | Dr3 | Dr4 | Dr5 | Dr6 | Dr7 => RegisterClass::Debug,
            Xmm0 | Xmm1 | Xmm2 | Xmm3 | Xmm4 | Xmm5 | Xmm6 | Xmm7 | Xmm8 | Xmm9 | Xmm10
            | Xmm11 | Xmm12 | Xmm13 | Xmm14 | Xmm15 | Ymm0 | Ymm1 | Ymm2 | Ymm3 | Ymm4 | Ymm5
            | Ymm6 | Ymm7 | Ymm8 | Ymm9 | Ymm10 | Ymm11 | Ymm12 | Ymm13 | Ymm14 | Ymm15 => {
                RegisterClass::Vector
            }
            Rip | St0 | St1 | St2 | St3 | St4 | St5 | St6 | St7 => RegisterClass::Special,
        }
    }

    /// Whether selecting this register requires a REX prefix even when
    /// all of REX.{W,R,X,B} are zero. True exactly for SPL/BPL/SIL/DIL:
    /// without REX, register codes 4–7 in a byte operand mean AH/CH/DH/BH.
    pub fn requires_rex_to_disambiguate(self) -> bool {
        use Register::*;
        matches!(self, Spl | Bpl | Sil | Dil)
    }

    /// Whether this is a high-byte register (AH/CH/DH/BH). These cannot
    /// appear in an instruction that carries any REX prefix.
    pub fn is_high_byte(self) -> bool {
        use Register::*;
        matches!(self, Ah | Ch | Dh | Bh)
    }

    /// Whether this register's index is above 7 (bit 3 set), requiring
    /// REX.R, REX.X, or REX.B depending on position.
    pub fn is_extended(self) -> bool {
        self.index() > 7 && !matches!(self, Register::Rip)
    }

    /// Whether this is a general-purpose register of any width.
    pub fn is_gp(self) -> bool {
        matches!(
            self.class(),
            RegisterClass::GeneralLow8
                | RegisterClass::GeneralUniform8
                | RegisterClass::General16
                | RegisterClass::General32
                | RegisterClass::General64
        )
    }

    fn name(self) -> &'static str {
        use Register::*;
        match self {
            Rax => "rax",
            Rcx => "rcx",
            Rdx => "rdx",
            Rbx => "rbx",
            Rsp => "rsp",
            Rbp => "rbp",
            Rsi => "rsi",
            Rdi => "rdi",
            R8 => "r8",
            R9 => "r9",
            R10 => "r10",
            R11 => "r11",
            R12 => "r12",
            R13 => "r13",
            R14 => "r14",
            R15 => "r15",
            Eax => "eax",
            Ecx => "ecx",
            Edx => "edx",
            Ebx => "ebx",
            Esp => "esp",
            Ebp => "ebp",
            Esi => "esi",
            Edi => "edi",
            R8d => "r8d",
            R9d => "r9d",
            R10d => "r10d",
            R11d => "r11d",
            R12d => "r12d",
            R13d => "r13d",
            R14d => "r14d",
            R15d => "r15d",
            Ax => "ax",
            Cx => "cx",
            Dx => "dx",
            Bx => "bx",
            Sp => "sp",
            Bp => "bp",
            Si => "si",
            Di => "di",
            R8w => "r8w",
            R9w => "r9w",
            R10w => "r10w",
            R11w => "r11w",
            R12w => "r12w",
            R13w => "r13w",
            R14w => "r14w",
            R15w => "r15w",
            Al => "al",
            Cl => "cl",
            Dl => "dl",
            Bl => "bl",
            Ah => "ah",
            Ch => "ch",
            Dh => "dh",
            Bh => "bh",
            Spl => "spl",
            Bpl => "bpl",
            Sil => "sil",
            Dil => "dil",
            R8b => "r8b",
            R9b => "r9b",
            R10b => "r10b",
            R11b => "r11b",
            R12b => "r12b",
            R13b => "r13b",
            R14b => "r14b",
            R15b => "r15b",
            Rip => "rip",
            Es => "es",
            Cs => "cs",
            Ss => "ss",
            Ds => "ds",
            Fs => "fs",
            Gs => "gs",
            Cr0 => "cr0",
            Cr2 => "cr2",
            Cr3 => "cr3",
            Cr4 => "cr4",
            Cr8 => "cr8",
            Dr0 => "dr0",
            Dr1 => "dr1",
            Dr2 => "dr2",
            Dr3 => "dr3",
            Dr4 => "dr4",
            Dr5 => "dr5",
            Dr6 => "dr6",
            Dr7 => "dr7",
            Xmm0 => "xmm0",
            Xmm1 => "xmm1",
            Xmm2 => "xmm2",
            Xmm3 => "xmm3",
            Xmm4 => "xmm4",
            Xmm5 => "xmm5",
            Xmm6 => "xmm6",
            Xmm7 => "xmm7",
            Xmm8 => "xmm8",
            Xmm9 => "xmm9",
            Xmm10 => "xmm10",
            Xmm11 => "xmm11",
            Xmm12 => "xmm12",
            Xmm13 => "xmm13",
            Xmm14 => "xmm14",
            Xmm15 => "xmm15",
            Ymm0 => "ymm0",
            Ymm1 => "ymm1",
            Ymm2 => "ymm2",
            Ymm3 => "ymm3",
            Ymm4 => "ymm4",
            Ymm5 => "ymm5",
            Ymm6 => "ymm6",
            Ymm7 => "ymm7",
            Ymm8 => "ymm8",
            Ymm9 => "ymm9",
            Ymm10 => "ymm10",
            Ymm11 => "ymm11",
            Ymm12 => "ymm12",
            Ymm13 => "ymm13",
            Ymm14 => "ymm14",
            Ymm15 => "ymm15",
            St0 => "st0",
            St1 => "st1",
            St2 => "st2",
            St3 => "st3",
            St4 => "st4",
            St5 => "st5",
            St6 => "st6",
            St7 => "st7",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
