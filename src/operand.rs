// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Operand classification and encoding for the 6809 addressing modes.
//!
//! `resolve_operand` is the single entry point for general instructions:
//! it decides the addressing mode from the operand text and produces the
//! encoded operand bytes, including the indexed-addressing post-byte and
//! the special immediate forms used by EXG/TFR and PSH/PUL. Branches go
//! through `resolve_branch`, which owns the displacement arithmetic.

use crate::assembler::error::{AsmError, AsmErrorKind};
use crate::instructions::{has_wide_immediate, AddressMode, BranchMode};
use crate::symbol_table::SymbolTable;

/// Mutable assembly state an operand resolution may consult: the symbol
/// table, the pass number, and the program counter at the instruction's
/// opcode byte.
pub struct ResolveContext<'a> {
    pub symbols: &'a mut SymbolTable,
    pub pass: u8,
    pub pc: u16,
}

/// A fully resolved operand: addressing mode plus encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedOperand {
    Inherent,
    Immediate8(u8),
    Immediate16(u16),
    Direct(u8),
    Extended(u16),
    Indexed { postbyte: u8, extra: Vec<u8> },
    Relative8(i8),
    Relative16(i16),
    RegisterPair(u8),
    RegisterList(u8),
}

impl ResolvedOperand {
    /// The instruction-table column this operand selects. Branch operands
    /// have no column; their opcodes come from the branch table.
    pub fn mode(&self) -> Option<AddressMode> {
        match self {
            Self::Inherent => Some(AddressMode::Inherent),
            Self::Immediate8(_)
            | Self::Immediate16(_)
            | Self::RegisterPair(_)
            | Self::RegisterList(_) => Some(AddressMode::Immediate),
            Self::Direct(_) => Some(AddressMode::Direct),
            Self::Extended(_) => Some(AddressMode::Extended),
            Self::Indexed { .. } => Some(AddressMode::Indexed),
            Self::Relative8(_) | Self::Relative16(_) => None,
        }
    }

    /// Append the operand's encoded bytes.
    pub fn push_bytes(&self, out: &mut Vec<u8>) {
        match self {
            Self::Inherent => {}
            Self::Immediate8(v) | Self::Direct(v) => out.push(*v),
            Self::Immediate16(v) | Self::Extended(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Indexed { postbyte, extra } => {
                out.push(*postbyte);
                out.extend_from_slice(extra);
            }
            Self::Relative8(v) => out.push(*v as u8),
            Self::Relative16(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::RegisterPair(v) | Self::RegisterList(v) => out.push(*v),
        }
    }
}

/// Parse a numeric literal: `$`/`0x` hex, `%` binary, `'c` character,
/// decimal otherwise, with an optional leading minus.
pub fn parse_number(text: &str) -> Result<i32, AsmError> {
    let (negate, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let bad = || AsmError::new(AsmErrorKind::BadOperand, "Bad numeric value", Some(text));

    let value = if let Some(hex) = body.strip_prefix('$') {
        i32::from_str_radix(hex, 16).map_err(|_| bad())?
    } else if let Some(hex) = body.strip_prefix("0x") {
        i32::from_str_radix(hex, 16).map_err(|_| bad())?
    } else if let Some(bin) = body.strip_prefix('%') {
        i32::from_str_radix(bin, 2).map_err(|_| bad())?
    } else if let Some(chr) = body.strip_prefix('\'') {
        let c = chr.chars().next().ok_or_else(bad)?;
        c as i32
    } else {
        body.parse::<i32>().map_err(|_| bad())?
    };
    Ok(if negate { -value } else { value })
}

fn is_label(text: &str) -> bool {
    match text.chars().next() {
        Some('@') => true,
        Some(c) => c.is_ascii_alphabetic(),
        None => false,
    }
}

/// Evaluate an operand term: a numeric literal or a label reference.
/// Returns `None` for a label not yet resolved on pass 1 (the reference is
/// recorded in the symbol table); the same label on pass 2 is an error.
pub fn eval(text: &str, ctx: &mut ResolveContext) -> Result<Option<i32>, AsmError> {
    if is_label(text) {
        return match ctx.symbols.lookup(text) {
            Some(Some(addr)) => Ok(Some(i32::from(addr))),
            _ if ctx.pass > 1 => Err(AsmError::new(
                AsmErrorKind::UndefinedLabel,
                "Undefined label",
                Some(text),
            )),
            _ => {
                ctx.symbols.declare_undefined(text);
                Ok(None)
            }
        };
    }
    parse_number(text).map(Some)
}

/// 4-bit register codes for EXG/TFR. Codes below 8 are 16-bit registers.
fn transfer_register_code(name: &str) -> Option<u8> {
    match name.to_ascii_uppercase().as_str() {
        "D" => Some(0x0),
        "X" => Some(0x1),
        "Y" => Some(0x2),
        "U" => Some(0x3),
        "S" => Some(0x4),
        "PC" => Some(0x5),
        "A" => Some(0x8),
        "B" => Some(0x9),
        "CC" => Some(0xA),
        "DP" => Some(0xB),
        _ => None,
    }
}

/// Encode an EXG/TFR operand as the source/destination nibble pair.
pub fn resolve_register_pair(operand: &str) -> Result<u8, AsmError> {
    let err = || {
        AsmError::new(
            AsmErrorKind::BadTransferOperand,
            "Bad TFR/EXG operand",
            Some(operand),
        )
    };

    let mut parts = operand.split(',');
    let (Some(src), Some(dst), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(err());
    };
    if src.eq_ignore_ascii_case(dst) {
        return Err(err());
    }
    let src_code = transfer_register_code(src).ok_or_else(err)?;
    let dst_code = transfer_register_code(dst).ok_or_else(err)?;
    // A 16-bit register cannot be exchanged with an 8-bit one.
    if (src_code < 8) != (dst_code < 8) {
        return Err(err());
    }
    Ok((src_code << 4) | dst_code)
}

/// Bit values for PSH/PUL register lists. S and U share bit 0x40: PSHS/PULS
/// operate on the S stack and may only name U, and PSHU/PULU the reverse;
/// the caller-facing check below rejects the op's own stack pointer rather
/// than letting the two registers alias silently.
fn stack_register_bit(name: &str) -> Option<u8> {
    match name {
        "CC" => Some(0x01),
        "A" => Some(0x02),
        "B" => Some(0x04),
        "D" => Some(0x06),
        "DP" => Some(0x08),
        "X" => Some(0x10),
        "Y" => Some(0x20),
        "S" | "U" => Some(0x40),
        "PC" => Some(0x80),
        _ => None,
    }
}

/// Encode a PSH/PUL register list as the post-byte mask.
pub fn resolve_register_list(mnemonic: &str, operand: &str) -> Result<u8, AsmError> {
    let err = |what: &str| {
        AsmError::new(
            AsmErrorKind::BadStackOperand,
            "Bad PUL/PSH operand",
            Some(what),
        )
    };
    let upper_mnemonic = mnemonic.to_ascii_uppercase();
    let own_stack = match upper_mnemonic.as_str() {
        "PSHS" | "PULS" => "S",
        "PSHU" | "PULU" => "U",
        _ => return Err(err(mnemonic)),
    };

    if operand.trim().is_empty() {
        return Err(err(operand));
    }

    let mut mask = 0u8;
    for part in operand.split(',') {
        let reg = part.trim().to_ascii_uppercase();
        if reg == own_stack {
            // PULU U or PSHS S makes no sense.
            return Err(err(&reg));
        }
        let Some(bit) = stack_register_bit(&reg) else {
            return Err(err(part));
        };
        if mask & bit != 0 {
            return Err(err(&reg));
        }
        mask |= bit;
    }
    Ok(mask)
}

fn index_register_bits(name: &str) -> Option<u8> {
    match name.to_ascii_uppercase().as_str() {
        "X" => Some(0x00),
        "Y" => Some(0x20),
        "U" => Some(0x40),
        "S" => Some(0x60),
        _ => None,
    }
}

fn bad_operand(operand: &str) -> AsmError {
    AsmError::new(AsmErrorKind::BadOperand, "Bad operand", Some(operand))
}

/// Decode an indexed-addressing operand of the form `left,right`, with an
/// optional `[`..`]` wrapper for indirection. A bracketed operand with no
/// register side is extended indirect (post-byte 0x9F plus the address).
pub fn resolve_indexed(operand: &str, ctx: &mut ResolveContext) -> Result<ResolvedOperand, AsmError> {
    let mut text = operand.trim();
    let indirect = text.starts_with('[');
    if indirect {
        text = text
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(|| bad_operand(operand))?;
    }
    let indirect_bit = if indirect { 0x10u8 } else { 0x00 };

    let Some((left, right)) = text.split_once(',') else {
        if !indirect {
            return Err(bad_operand(operand));
        }
        // Extended indirect: [addr].
        let value = eval(text.trim(), ctx)?.unwrap_or(0);
        if !(0..=0xFFFF).contains(&value) {
            return Err(AsmError::new(
                AsmErrorKind::BadAddress,
                "Indirect address out of 16-bit range",
                Some(text),
            ));
        }
        return Ok(ResolvedOperand::Indexed {
            postbyte: 0x9F,
            extra: (value as u16).to_be_bytes().to_vec(),
        });
    };
    let left = left.trim();
    let right = right.trim();
    if right.is_empty() {
        return Err(bad_operand(operand));
    }

    // Auto increment/decrement claims the whole operand; an offset on the
    // left has nowhere to go in the encoding.
    let incdec = if let Some(reg) = right.strip_suffix("++") {
        Some((0x81u8, reg))
    } else if let Some(reg) = right.strip_suffix('+') {
        if indirect {
            return Err(bad_operand(operand));
        }
        Some((0x80, reg))
    } else if let Some(reg) = right.strip_prefix("--") {
        Some((0x83, reg))
    } else if let Some(reg) = right.strip_prefix('-') {
        if indirect {
            return Err(bad_operand(operand));
        }
        Some((0x82, reg))
    } else {
        None
    };
    if let Some((base, reg)) = incdec {
        if !left.is_empty() {
            return Err(bad_operand(operand));
        }
        let reg_bits = index_register_bits(reg).ok_or_else(|| bad_operand(operand))?;
        return Ok(ResolvedOperand::Indexed {
            postbyte: base | indirect_bit | reg_bits,
            extra: Vec::new(),
        });
    }

    // PC-relative: n,PC or n,PCR. The hardware has no 5-bit PC form, so the
    // offset picks the 8- or 16-bit encoding only.
    let upper_right = right.to_ascii_uppercase();
    if upper_right == "PC" || upper_right == "PCR" {
        let value = match eval(left, ctx)? {
            Some(v) => v,
            None => {
                return Ok(ResolvedOperand::Indexed {
                    postbyte: 0x8D | indirect_bit,
                    extra: vec![0, 0],
                })
            }
        };
        if (-128..=127).contains(&value) {
            return Ok(ResolvedOperand::Indexed {
                postbyte: 0x8C | indirect_bit,
                extra: vec![value as i8 as u8],
            });
        }
        if !(-32768..=32767).contains(&value) {
            return Err(bad_operand(operand));
        }
        return Ok(ResolvedOperand::Indexed {
            postbyte: 0x8D | indirect_bit,
            extra: (value as i16).to_be_bytes().to_vec(),
        });
    }

    let reg_bits = index_register_bits(right).ok_or_else(|| bad_operand(operand))?;

    // Accumulator offsets.
    let acc = match left.to_ascii_uppercase().as_str() {
        "A" => Some(0x86u8),
        "B" => Some(0x85),
        "D" => Some(0x8B),
        _ => None,
    };
    if let Some(base) = acc {
        return Ok(ResolvedOperand::Indexed {
            postbyte: base | indirect_bit | reg_bits,
            extra: Vec::new(),
        });
    }

    if left.is_empty() {
        return Ok(ResolvedOperand::Indexed {
            postbyte: 0x84 | indirect_bit | reg_bits,
            extra: Vec::new(),
        });
    }

    // Numeric or label offset. An unresolved pass-1 reference takes the
    // largest encoding so the instruction size never changes on pass 2.
    let value = match eval(left, ctx)? {
        Some(v) => v,
        None => {
            return Ok(ResolvedOperand::Indexed {
                postbyte: 0x89 | indirect_bit | reg_bits,
                extra: vec![0, 0],
            })
        }
    };
    if value > 127 || value < -128 {
        if !(-32768..=65535).contains(&value) {
            return Err(bad_operand(operand));
        }
        return Ok(ResolvedOperand::Indexed {
            postbyte: 0x89 | indirect_bit | reg_bits,
            extra: ((value & 0xFFFF) as u16).to_be_bytes().to_vec(),
        });
    }
    if indirect || value > 15 || value < -16 {
        return Ok(ResolvedOperand::Indexed {
            postbyte: 0x88 | indirect_bit | reg_bits,
            extra: vec![value as i8 as u8],
        });
    }
    if value == 0 {
        return Ok(ResolvedOperand::Indexed {
            postbyte: 0x84 | reg_bits,
            extra: Vec::new(),
        });
    }
    // Non-zero, in [-16,15], not indirect: embed the offset in the post-byte.
    Ok(ResolvedOperand::Indexed {
        postbyte: ((value as i8 as u8) & 0x1F) | reg_bits,
        extra: Vec::new(),
    })
}

/// Resolve a branch operand into the relative displacement. The
/// displacement is always 0 on pass 1; on pass 2 a short branch outside
/// [-128,127] is an error while a long branch wraps to 16 bits.
pub fn resolve_branch(
    mode: BranchMode,
    operand: &str,
    ctx: &mut ResolveContext,
) -> Result<ResolvedOperand, AsmError> {
    let target = eval(operand.trim(), ctx)?;
    if ctx.pass == 1 {
        return Ok(match mode {
            BranchMode::Short => ResolvedOperand::Relative8(0),
            BranchMode::Long => ResolvedOperand::Relative16(0),
        });
    }
    let target = target.unwrap_or(0);
    match mode {
        BranchMode::Short => {
            let disp = target - (i32::from(ctx.pc) + 2);
            if !(-128..=127).contains(&disp) {
                return Err(AsmError::new(
                    AsmErrorKind::BadBranch,
                    "Branch target out of range",
                    Some(operand),
                ));
            }
            Ok(ResolvedOperand::Relative8(disp as i8))
        }
        BranchMode::Long => {
            let disp = target - (i32::from(ctx.pc) + 3);
            Ok(ResolvedOperand::Relative16(disp as i16))
        }
    }
}

/// Classify and resolve the operand of a general instruction.
pub fn resolve_operand(
    mnemonic: &str,
    operand: &str,
    ctx: &mut ResolveContext,
) -> Result<ResolvedOperand, AsmError> {
    let upper = mnemonic.to_ascii_uppercase();
    if upper == "EXG" || upper == "TFR" {
        return resolve_register_pair(operand).map(ResolvedOperand::RegisterPair);
    }
    if upper.starts_with("PSH") || upper.starts_with("PUL") {
        return resolve_register_list(&upper, operand).map(ResolvedOperand::RegisterList);
    }

    let text = operand.trim();
    if text.is_empty() {
        return Ok(ResolvedOperand::Inherent);
    }
    if text.starts_with('[') || text.contains(',') {
        return resolve_indexed(text, ctx);
    }
    if let Some(rest) = text.strip_prefix('<') {
        let value = eval(rest, ctx)?.unwrap_or(0);
        if !(-128..=255).contains(&value) {
            return Err(AsmError::new(
                AsmErrorKind::OperandRange,
                "8-bit operand expected",
                Some(rest),
            ));
        }
        return Ok(ResolvedOperand::Direct(value as u8));
    }
    if let Some(rest) = text.strip_prefix('#') {
        let value = eval(rest, ctx)?.unwrap_or(0);
        if has_wide_immediate(&upper) {
            if !(-32768..=65535).contains(&value) {
                return Err(bad_operand(text));
            }
            return Ok(ResolvedOperand::Immediate16((value & 0xFFFF) as u16));
        }
        if !(-128..=255).contains(&value) {
            return Err(AsmError::new(
                AsmErrorKind::OperandRange,
                "8-bit operand expected",
                Some(rest),
            ));
        }
        return Ok(ResolvedOperand::Immediate8(value as u8));
    }

    // No marker at all: extended addressing.
    let value = eval(text, ctx)?.unwrap_or(0);
    if !(-32768..=65535).contains(&value) {
        return Err(AsmError::new(
            AsmErrorKind::BadAddress,
            "Address out of 16-bit range",
            Some(text),
        ));
    }
    Ok(ResolvedOperand::Extended((value & 0xFFFF) as u16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol_table::SymbolTable;

    fn ctx(symbols: &mut SymbolTable, pass: u8, pc: u16) -> ResolveContext<'_> {
        ResolveContext { symbols, pass, pc }
    }

    fn indexed(operand: &str) -> ResolvedOperand {
        let mut symbols = SymbolTable::new();
        let mut c = ctx(&mut symbols, 2, 0);
        resolve_indexed(operand, &mut c).expect(operand)
    }

    #[test]
    fn number_literals_cover_all_prefixes() {
        assert_eq!(parse_number("$FF").unwrap(), 255);
        assert_eq!(parse_number("0x10").unwrap(), 16);
        assert_eq!(parse_number("%1010").unwrap(), 10);
        assert_eq!(parse_number("'A").unwrap(), 65);
        assert_eq!(parse_number("42").unwrap(), 42);
        assert_eq!(parse_number("-5").unwrap(), -5);
        assert_eq!(parse_number("-$0C").unwrap(), -12);
        assert!(parse_number("$XYZ").is_err());
    }

    #[test]
    fn register_pair_encodes_source_high_nibble() {
        assert_eq!(resolve_register_pair("A,B").unwrap(), 0x89);
        assert_eq!(resolve_register_pair("X,Y").unwrap(), 0x12);
        assert_eq!(resolve_register_pair("D,PC").unwrap(), 0x05);
    }

    #[test]
    fn register_pair_rejects_width_mismatch_and_duplicates() {
        let err = resolve_register_pair("A,X").unwrap_err();
        assert_eq!(err.kind(), AsmErrorKind::BadTransferOperand);
        assert!(resolve_register_pair("A,A").is_err());
        assert!(resolve_register_pair("A").is_err());
        assert!(resolve_register_pair("A,B,X").is_err());
        assert!(resolve_register_pair("A,Q").is_err());
    }

    #[test]
    fn register_list_sums_bits_commutatively() {
        let ab = resolve_register_list("PSHS", "A,B").unwrap();
        let ba = resolve_register_list("PSHS", "B,A").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab, 0x06);
        assert_eq!(resolve_register_list("PSHS", "CC,A,B,DP,X,Y,U,PC").unwrap(), 0xFF);
        assert_eq!(resolve_register_list("PSHU", "S").unwrap(), 0x40);
    }

    #[test]
    fn register_list_rejects_duplicates_and_own_stack() {
        assert_eq!(
            resolve_register_list("PSHS", "A,A").unwrap_err().kind(),
            AsmErrorKind::BadStackOperand
        );
        assert!(resolve_register_list("PSHS", "S").is_err());
        assert!(resolve_register_list("PULU", "U").is_err());
        assert!(resolve_register_list("PSHS", "").is_err());
        assert!(resolve_register_list("PSHS", "A,Q").is_err());
    }

    #[test]
    fn indexed_offset_boundaries_select_encoding_widths() {
        // offset -> (postbyte, extra length)
        let cases: [(i32, u8, usize); 8] = [
            (-16, 0x10, 0),  // 5-bit: -16 & 0x1F
            (-17, 0x88, 1),  // 8-bit
            (15, 0x0F, 0),   // 5-bit
            (16, 0x88, 1),   // 8-bit
            (127, 0x88, 1),  // 8-bit
            (128, 0x89, 2),  // 16-bit
            (-128, 0x88, 1), // 8-bit
            (-129, 0x89, 2), // 16-bit
        ];
        for (offset, postbyte, extra_len) in cases {
            let text = if offset < 0 {
                format!("-{},X", -offset)
            } else {
                format!("{},X", offset)
            };
            let ResolvedOperand::Indexed { postbyte: got, extra } = indexed(&text) else {
                panic!("{text} should be indexed");
            };
            assert_eq!(got, postbyte, "postbyte for {text}");
            assert_eq!(extra.len(), extra_len, "extra bytes for {text}");
        }
    }

    #[test]
    fn indirect_offsets_never_use_the_5_bit_form() {
        let ResolvedOperand::Indexed { postbyte, extra } = indexed("[5,X]") else {
            panic!();
        };
        assert_eq!(postbyte, 0x98);
        assert_eq!(extra, vec![0x05]);
    }

    #[test]
    fn zero_offset_collapses_to_no_offset() {
        let ResolvedOperand::Indexed { postbyte, extra } = indexed("0,Y") else {
            panic!();
        };
        assert_eq!(postbyte, 0xA4);
        assert!(extra.is_empty());
    }

    #[test]
    fn accumulator_offsets_and_registers() {
        let ResolvedOperand::Indexed { postbyte, .. } = indexed("A,X") else {
            panic!();
        };
        assert_eq!(postbyte, 0x86);
        let ResolvedOperand::Indexed { postbyte, .. } = indexed("B,S") else {
            panic!();
        };
        assert_eq!(postbyte, 0xE5);
        let ResolvedOperand::Indexed { postbyte, .. } = indexed("D,U") else {
            panic!();
        };
        assert_eq!(postbyte, 0xCB);
        let ResolvedOperand::Indexed { postbyte, .. } = indexed(",Y") else {
            panic!();
        };
        assert_eq!(postbyte, 0xA4);
    }

    #[test]
    fn auto_increment_and_decrement_forms() {
        let ResolvedOperand::Indexed { postbyte, .. } = indexed(",X+") else {
            panic!();
        };
        assert_eq!(postbyte, 0x80);
        let ResolvedOperand::Indexed { postbyte, .. } = indexed(",X++") else {
            panic!();
        };
        assert_eq!(postbyte, 0x81);
        let ResolvedOperand::Indexed { postbyte, .. } = indexed(",-Y") else {
            panic!();
        };
        assert_eq!(postbyte, 0xA2);
        let ResolvedOperand::Indexed { postbyte, .. } = indexed(",--S") else {
            panic!();
        };
        assert_eq!(postbyte, 0xE3);
        let ResolvedOperand::Indexed { postbyte, .. } = indexed("[,X++]") else {
            panic!();
        };
        assert_eq!(postbyte, 0x91);
    }

    #[test]
    fn single_step_forms_reject_indirection() {
        let mut symbols = SymbolTable::new();
        let mut c = ctx(&mut symbols, 2, 0);
        assert!(resolve_indexed("[,X+]", &mut c).is_err());
        assert!(resolve_indexed("[,-X]", &mut c).is_err());
    }

    #[test]
    fn extended_indirect_uses_9f_postbyte() {
        let ResolvedOperand::Indexed { postbyte, extra } = indexed("[$1234]") else {
            panic!();
        };
        assert_eq!(postbyte, 0x9F);
        assert_eq!(extra, vec![0x12, 0x34]);
    }

    #[test]
    fn pc_relative_picks_8_or_16_bit() {
        let ResolvedOperand::Indexed { postbyte, extra } = indexed("5,PCR") else {
            panic!();
        };
        assert_eq!(postbyte, 0x8C);
        assert_eq!(extra, vec![0x05]);
        let ResolvedOperand::Indexed { postbyte, extra } = indexed("$200,PC") else {
            panic!();
        };
        assert_eq!(postbyte, 0x8D);
        assert_eq!(extra, vec![0x02, 0x00]);
    }

    #[test]
    fn forward_reference_takes_the_widest_encoding() {
        let mut symbols = SymbolTable::new();
        let mut c = ctx(&mut symbols, 1, 0);
        let ResolvedOperand::Indexed { postbyte, extra } =
            resolve_indexed("@LATER,X", &mut c).unwrap()
        else {
            panic!();
        };
        assert_eq!(postbyte, 0x89);
        assert_eq!(extra.len(), 2);
        assert_eq!(symbols.lookup("@LATER"), Some(None));
    }

    #[test]
    fn undefined_label_errors_on_pass_2() {
        let mut symbols = SymbolTable::new();
        let mut c = ctx(&mut symbols, 2, 0);
        let err = resolve_indexed("@NOPE,X", &mut c).unwrap_err();
        assert_eq!(err.kind(), AsmErrorKind::UndefinedLabel);
    }

    #[test]
    fn branch_displacements_and_range_check() {
        let mut symbols = SymbolTable::new();
        symbols.resolve("@T", 0x1081);
        let mut c = ctx(&mut symbols, 2, 0x1000);
        assert_eq!(
            resolve_branch(BranchMode::Short, "@T", &mut c).unwrap(),
            ResolvedOperand::Relative8(0x7F)
        );

        let mut symbols = SymbolTable::new();
        symbols.resolve("@T", 0x1082);
        let mut c = ctx(&mut symbols, 2, 0x1000);
        let err = resolve_branch(BranchMode::Short, "@T", &mut c).unwrap_err();
        assert_eq!(err.kind(), AsmErrorKind::BadBranch);

        // Long branches wrap without a range error.
        let mut symbols = SymbolTable::new();
        symbols.resolve("@T", 0x0000);
        let mut c = ctx(&mut symbols, 2, 0xFFF0);
        assert!(matches!(
            resolve_branch(BranchMode::Long, "@T", &mut c),
            Ok(ResolvedOperand::Relative16(_))
        ));
    }

    #[test]
    fn branch_displacement_is_zero_on_pass_1() {
        let mut symbols = SymbolTable::new();
        let mut c = ctx(&mut symbols, 1, 0x1000);
        assert_eq!(
            resolve_branch(BranchMode::Short, "@FWD", &mut c).unwrap(),
            ResolvedOperand::Relative8(0)
        );
    }

    #[test]
    fn immediate_width_follows_the_mnemonic() {
        let mut symbols = SymbolTable::new();
        let mut c = ctx(&mut symbols, 2, 0);
        assert_eq!(
            resolve_operand("LDA", "#$05", &mut c).unwrap(),
            ResolvedOperand::Immediate8(0x05)
        );
        let mut c = ctx(&mut symbols, 2, 0);
        assert_eq!(
            resolve_operand("LDX", "#$1234", &mut c).unwrap(),
            ResolvedOperand::Immediate16(0x1234)
        );
    }

    #[test]
    fn eight_bit_immediate_accepts_signed_and_unsigned_range() {
        let mut symbols = SymbolTable::new();
        let mut c = ctx(&mut symbols, 2, 0);
        assert_eq!(
            resolve_operand("LDA", "#-1", &mut c).unwrap(),
            ResolvedOperand::Immediate8(0xFF)
        );
        let mut c = ctx(&mut symbols, 2, 0);
        assert_eq!(
            resolve_operand("LDA", "#255", &mut c).unwrap(),
            ResolvedOperand::Immediate8(0xFF)
        );
        let mut c = ctx(&mut symbols, 2, 0);
        let err = resolve_operand("LDA", "#256", &mut c).unwrap_err();
        assert_eq!(err.kind(), AsmErrorKind::OperandRange);
    }

    #[test]
    fn direct_and_extended_classification() {
        let mut symbols = SymbolTable::new();
        let mut c = ctx(&mut symbols, 2, 0);
        assert_eq!(
            resolve_operand("LDA", "<$20", &mut c).unwrap(),
            ResolvedOperand::Direct(0x20)
        );
        let mut c = ctx(&mut symbols, 2, 0);
        assert_eq!(
            resolve_operand("STA", "$2000", &mut c).unwrap(),
            ResolvedOperand::Extended(0x2000)
        );
        let mut c = ctx(&mut symbols, 2, 0);
        assert_eq!(
            resolve_operand("RTS", "", &mut c).unwrap(),
            ResolvedOperand::Inherent
        );
    }
}
