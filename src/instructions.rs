// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Motorola 6809 instruction catalog.
//!
//! Three static tables cover the full mnemonic space: the general
//! instruction set (one optional opcode per addressing mode), the branch
//! set (short/long opcode pairs), and the assembler pseudo-ops. Opcode
//! values at or above 0x100 are page-2/3 instructions carried behind a
//! 0x10 or 0x11 prefix byte.

/// Addressing modes of the general instruction set, in table column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressMode {
    Immediate = 0,
    Direct = 1,
    Indexed = 2,
    Extended = 3,
    Inherent = 4,
}

impl AddressMode {
    pub const ALL: [AddressMode; 5] = [
        AddressMode::Immediate,
        AddressMode::Direct,
        AddressMode::Indexed,
        AddressMode::Extended,
        AddressMode::Inherent,
    ];
}

/// Branch form selected by the mnemonic (plain or `L`-prefixed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchMode {
    Short,
    Long,
}

/// A general instruction: mnemonic plus one optional opcode per mode.
pub struct InstructionEntry {
    pub mnemonic: &'static str,
    pub opcodes: [Option<u16>; 5],
}

impl InstructionEntry {
    pub fn opcode(&self, mode: AddressMode) -> Option<u16> {
        self.opcodes[mode as usize]
    }
}

/// A branch instruction: mnemonic plus short and long opcodes.
pub struct BranchEntry {
    pub mnemonic: &'static str,
    pub short: u8,
    pub long: u16,
}

/// Assembler directives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PseudoOp {
    Equ,
    Rmb,
    Fcb,
    Fdb,
    End,
    Org,
    SetDp,
    Fcc,
    Zmb,
}

/// Result of a mnemonic lookup.
#[derive(Clone, Copy)]
pub enum OpLookup {
    Instruction(&'static InstructionEntry),
    Branch(&'static BranchEntry, BranchMode),
    Pseudo(PseudoOp),
}

const fn op(raw: i32) -> Option<u16> {
    if raw < 0 {
        None
    } else {
        Some(raw as u16)
    }
}

const fn row(mnemonic: &'static str, imm: i32, dir: i32, idx: i32, ext: i32, inh: i32) -> InstructionEntry {
    InstructionEntry {
        mnemonic,
        opcodes: [op(imm), op(dir), op(idx), op(ext), op(inh)],
    }
}

const fn branch(mnemonic: &'static str, short: u8, long: u16) -> BranchEntry {
    BranchEntry {
        mnemonic,
        short,
        long,
    }
}

/// The general 6809 instruction set. Column order: immediate, direct,
/// indexed, extended, inherent; -1 marks an unsupported mode.
pub static INSTRUCTION_TABLE: &[InstructionEntry] = &[
    row("ABX", -1, -1, -1, -1, 0x3A),
    row("ADCA", 0x89, 0x99, 0xA9, 0xB9, -1),
    row("ADCB", 0xC9, 0xD9, 0xE9, 0xF9, -1),
    row("ADDA", 0x8B, 0x9B, 0xAB, 0xBB, -1),
    row("ADDB", 0xCB, 0xDB, 0xEB, 0xFB, -1),
    row("ADDD", 0xC3, 0xD3, 0xE3, 0xF3, -1),
    row("ANDA", 0x84, 0x94, 0xA4, 0xB4, -1),
    row("ANDB", 0xC4, 0xD4, 0xE4, 0xF4, -1),
    row("ANDCC", 0x1C, -1, -1, -1, -1),
    row("ASL", -1, 0x08, 0x68, 0x78, -1),
    row("ASLA", -1, -1, -1, -1, 0x48),
    row("ASLB", -1, -1, -1, -1, 0x58),
    row("ASR", -1, 0x07, 0x67, 0x77, -1),
    row("ASRA", -1, -1, -1, -1, 0x47),
    row("ASRB", -1, -1, -1, -1, 0x57),
    row("BITA", 0x85, 0x95, 0xA5, 0xB5, -1),
    row("BITB", 0xC5, 0xD5, 0xE5, 0xF5, -1),
    row("CLR", -1, 0x0F, 0x6F, 0x7F, -1),
    row("CLRA", -1, -1, -1, -1, 0x4F),
    row("CLRB", -1, -1, -1, -1, 0x5F),
    row("CMPA", 0x81, 0x91, 0xA1, 0xB1, -1),
    row("CMPB", 0xC1, 0xD1, 0xE1, 0xF1, -1),
    row("CMPD", 0x1083, 0x1093, 0x10A3, 0x10B3, -1),
    row("CMPS", 0x118C, 0x119C, 0x11AC, 0x11BC, -1),
    row("CMPU", 0x1183, 0x1193, 0x11A3, 0x11B3, -1),
    row("CMPX", 0x8C, 0x9C, 0xAC, 0xBC, -1),
    row("CMPY", 0x108C, 0x109C, 0x10AC, 0x10BC, -1),
    row("COM", -1, 0x03, 0x63, 0x73, -1),
    row("COMA", -1, -1, -1, -1, 0x43),
    row("COMB", -1, -1, -1, -1, 0x53),
    row("CWAIT", 0x3C, -1, -1, -1, -1),
    row("DAA", -1, -1, -1, -1, 0x19),
    row("DEC", -1, 0x0A, 0x6A, 0x7A, -1),
    row("DECA", -1, -1, -1, -1, 0x4A),
    row("DECB", -1, -1, -1, -1, 0x5A),
    row("EORA", 0x88, 0x98, 0xA8, 0xB8, -1),
    row("EORB", 0xC8, 0xD8, 0xE8, 0xF8, -1),
    row("EXG", 0x1E, -1, -1, -1, -1),
    row("INC", -1, 0x0C, 0x6C, 0x7C, -1),
    row("INCA", -1, -1, -1, -1, 0x4C),
    row("INCB", -1, -1, -1, -1, 0x5C),
    row("JMP", -1, 0x0E, 0x6E, 0x7E, -1),
    row("JSR", -1, 0x9D, 0xAD, 0xBD, -1),
    row("LDA", 0x86, 0x96, 0xA6, 0xB6, -1),
    row("LDB", 0xC6, 0xD6, 0xE6, 0xF6, -1),
    row("LDD", 0xCC, 0xDC, 0xEC, 0xFC, -1),
    row("LDS", 0x10CE, 0x10DE, 0x10EE, 0x10FE, -1),
    row("LDU", 0xCE, 0xDE, 0xEE, 0xFE, -1),
    row("LDX", 0x8E, 0x9E, 0xAE, 0xBE, -1),
    row("LDY", 0x108E, 0x109E, 0x10AE, 0x10BE, -1),
    row("LEAS", -1, -1, 0x32, -1, -1),
    row("LEAU", -1, -1, 0x33, -1, -1),
    row("LEAX", -1, -1, 0x30, -1, -1),
    row("LEAY", -1, -1, 0x31, -1, -1),
    row("LSL", -1, 0x08, 0x68, 0x78, -1),
    row("LSLA", -1, -1, -1, -1, 0x48),
    row("LSLB", -1, -1, -1, -1, 0x58),
    row("LSR", -1, 0x04, 0x64, 0x74, -1),
    row("LSRA", -1, -1, -1, -1, 0x44),
    row("LSRB", -1, -1, -1, -1, 0x54),
    row("MUL", -1, -1, -1, -1, 0x3D),
    row("NEG", -1, 0x00, 0x60, 0x70, -1),
    row("NEGA", -1, -1, -1, -1, 0x40),
    row("NEGB", -1, -1, -1, -1, 0x50),
    row("NOP", -1, -1, -1, -1, 0x12),
    row("ORA", 0x8A, 0x9A, 0xAA, 0xBA, -1),
    row("ORB", 0xCA, 0xDA, 0xEA, 0xFA, -1),
    row("ORCC", 0x1A, -1, -1, -1, -1),
    row("PSHS", 0x34, -1, -1, -1, -1),
    row("PSHU", 0x36, -1, -1, -1, -1),
    row("PULS", 0x35, -1, -1, -1, -1),
    row("PULU", 0x37, -1, -1, -1, -1),
    row("ROL", -1, 0x09, 0x69, 0x79, -1),
    row("ROLA", -1, -1, -1, -1, 0x49),
    row("ROLB", -1, -1, -1, -1, 0x59),
    row("ROR", -1, 0x06, 0x66, 0x76, -1),
    row("RORA", -1, -1, -1, -1, 0x46),
    row("RORB", -1, -1, -1, -1, 0x56),
    row("RTI", -1, -1, -1, -1, 0x3B),
    row("RTS", -1, -1, -1, -1, 0x39),
    row("SBCA", 0x82, 0x92, 0xA2, 0xB2, -1),
    row("SBCB", 0xC2, 0xD2, 0xE2, 0xF2, -1),
    row("SEX", -1, -1, -1, -1, 0x1D),
    row("STA", -1, 0x97, 0xA7, 0xB7, -1),
    row("STB", -1, 0xD7, 0xE7, 0xF7, -1),
    row("STD", -1, 0xDD, 0xED, 0xFD, -1),
    row("STS", -1, 0x10DF, 0x10EF, 0x10FF, -1),
    row("STU", -1, 0xDF, 0xEF, 0xFF, -1),
    row("STX", -1, 0x9F, 0xAF, 0xBF, -1),
    row("STY", -1, 0x109F, 0x10AF, 0x10BF, -1),
    row("SUBA", 0x80, 0x90, 0xA0, 0xB0, -1),
    row("SUBB", 0xC0, 0xD0, 0xE0, 0xF0, -1),
    row("SUBD", 0x83, 0x93, 0xA3, 0xB3, -1),
    row("SYNC", -1, -1, -1, -1, 0x13),
    row("SWI", -1, -1, -1, -1, 0x3F),
    row("SWI2", -1, -1, -1, -1, 0x103F),
    row("SWI3", -1, -1, -1, -1, 0x113F),
    row("TFR", 0x1F, -1, -1, -1, -1),
    row("TST", -1, 0x0D, 0x6D, 0x7D, -1),
    row("TSTA", -1, -1, -1, -1, 0x4D),
    row("TSTB", -1, -1, -1, -1, 0x5D),
];

/// The 6809 branch instruction set. Where two mnemonics share an opcode
/// (BCC/BHS, BCS/BLO) the earlier entry wins on reverse lookup.
pub static BRANCH_TABLE: &[BranchEntry] = &[
    branch("BRA", 0x20, 0x16),
    branch("BHI", 0x22, 0x1022),
    branch("BLS", 0x23, 0x1023),
    branch("BCC", 0x24, 0x1024),
    branch("BHS", 0x24, 0x1024),
    branch("BLO", 0x25, 0x1025),
    branch("BCS", 0x25, 0x1025),
    branch("BNE", 0x26, 0x1026),
    branch("BEQ", 0x27, 0x1027),
    branch("BVC", 0x28, 0x1028),
    branch("BVS", 0x29, 0x1029),
    branch("BPL", 0x2A, 0x102A),
    branch("BMI", 0x2B, 0x102B),
    branch("BGE", 0x2C, 0x102C),
    branch("BLT", 0x2D, 0x102D),
    branch("BGT", 0x2E, 0x102E),
    branch("BLE", 0x2F, 0x102F),
    branch("BSR", 0x8D, 0x17),
];

fn pseudo_op(upper: &str) -> Option<PseudoOp> {
    match upper {
        "EQU" => Some(PseudoOp::Equ),
        "RMB" => Some(PseudoOp::Rmb),
        "FCB" => Some(PseudoOp::Fcb),
        "FDB" => Some(PseudoOp::Fdb),
        "END" => Some(PseudoOp::End),
        "ORG" => Some(PseudoOp::Org),
        "SETDP" => Some(PseudoOp::SetDp),
        "FCC" => Some(PseudoOp::Fcc),
        "ZMB" => Some(PseudoOp::Zmb),
        _ => None,
    }
}

/// Look up a raw mnemonic token. Matching is case-insensitive. A token
/// prefixed with `L` retries the branch table with the prefix stripped and
/// selects the long form; when the stripped token is not a branch mnemonic
/// the whole token is rejected.
pub fn lookup(raw: &str) -> Option<OpLookup> {
    let upper = raw.to_ascii_uppercase();

    if let Some(p) = pseudo_op(&upper) {
        return Some(OpLookup::Pseudo(p));
    }

    if let Some(entry) = INSTRUCTION_TABLE.iter().find(|e| e.mnemonic == upper) {
        return Some(OpLookup::Instruction(entry));
    }

    let (name, mode) = match upper.strip_prefix('L') {
        Some(rest) => (rest, BranchMode::Long),
        None => (upper.as_str(), BranchMode::Short),
    };
    BRANCH_TABLE
        .iter()
        .find(|e| e.mnemonic == name)
        .map(|entry| OpLookup::Branch(entry, mode))
}

/// Reverse lookup in the general table for the disassembler. Entries are
/// scanned in declared order so shared opcodes resolve deterministically.
pub fn find_opcode(value: u16) -> Option<(&'static InstructionEntry, AddressMode)> {
    for entry in INSTRUCTION_TABLE {
        for mode in AddressMode::ALL {
            if entry.opcode(mode) == Some(value) {
                return Some((entry, mode));
            }
        }
    }
    None
}

/// Reverse lookup in the branch table for the disassembler.
pub fn find_branch_opcode(value: u16) -> Option<(&'static BranchEntry, BranchMode)> {
    for entry in BRANCH_TABLE {
        if u16::from(entry.short) == value {
            return Some((entry, BranchMode::Short));
        }
        if entry.long == value {
            return Some((entry, BranchMode::Long));
        }
    }
    None
}

/// True when the mnemonic's immediate operand is 16 bits wide, keyed off
/// the trailing register letter (D, X, Y, S, U).
pub fn has_wide_immediate(mnemonic: &str) -> bool {
    matches!(
        mnemonic.as_bytes().last(),
        Some(b'D' | b'X' | b'Y' | b'S' | b'U')
    )
}
