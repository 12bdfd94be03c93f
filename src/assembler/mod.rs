// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Two-pass assembler driver.
//!
//! Pass 1 walks the source declaring labels and sizing instructions; pass 2
//! re-walks it with every label resolved and emits the final bytes. The
//! first error on either pass aborts the whole file. All assembly state
//! (pass number, program counter, symbol table, image) lives in the
//! `Assembler` value; nothing is process-global.

pub mod cli;
pub mod error;
pub mod listing;


use std::io::{self, Write};

use crate::imagestore::{ImageStore, FILL_BYTE};
use crate::instructions::{lookup, BranchMode, OpLookup, PseudoOp};
use crate::operand::{resolve_branch, resolve_operand, ResolveContext};
use crate::symbol_table::{SymbolTable, SymbolTableResult};

use error::{AsmError, AsmErrorKind, AsmRunError, PassCounts};
use listing::{ListingLine, ListingWriter, MnemonicCase};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result of a successful run: the finished image plus the pass-1 notes
/// (label definitions, reservations) for verbose output.
pub struct AsmOutput {
    pub image: ImageStore,
    pub notes: Vec<String>,
}

/// Per-file assembly state.
pub struct Assembler {
    pass: u8,
    pc: u16,
    start: u16,
    direct_page: u8,
    symbols: SymbolTable,
    image: ImageStore,
    notes: Vec<String>,
}

/// Assemble source lines into a machine-code image.
pub fn assemble(lines: &[String], start_address: u16) -> Result<ImageStore, AsmRunError> {
    let mut listing = ListingWriter::new(io::sink(), MnemonicCase::AsWritten);
    Assembler::new(start_address)
        .run(lines, &mut listing)
        .map(|output| output.image)
}

impl Assembler {
    pub fn new(start_address: u16) -> Self {
        Self {
            pass: 0,
            pc: start_address,
            start: start_address,
            direct_page: 0,
            symbols: SymbolTable::new(),
            image: ImageStore::new(start_address),
            notes: Vec::new(),
        }
    }

    /// Run both passes over the source. The listing receives pass-2 rows;
    /// listing write failures do not abort assembly.
    pub fn run<W: Write>(
        mut self,
        lines: &[String],
        listing: &mut ListingWriter<W>,
    ) -> Result<AsmOutput, AsmRunError> {
        for pass in 1..=2u8 {
            self.pass = pass;
            self.pc = self.start;
            self.image.rewind();
            if pass == 2 {
                let _ = listing.header(&format!("dasm09 v{VERSION}"));
            }
            for (ix, line) in lines.iter().enumerate() {
                let line_num = ix as u32 + 1;
                self.process_line(line, line_num, listing)
                    .map_err(|err| AsmRunError::new(err, line_num, line.clone()))?;
            }
        }

        let counts = PassCounts {
            lines: lines.len() as u32,
            bytes: self.image.num_bytes() as u32,
        };
        let _ = listing.footer(&counts, &self.symbols, &self.image);

        Ok(AsmOutput {
            image: self.image,
            notes: self.notes,
        })
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn direct_page(&self) -> u8 {
        self.direct_page
    }

    fn process_line<W: Write>(
        &mut self,
        raw: &str,
        line_num: u32,
        listing: &mut ListingWriter<W>,
    ) -> Result<(), AsmError> {
        let (fields, comment) = split_line(raw);
        let comment = comment.unwrap_or_default();

        if fields.is_empty() {
            if self.pass == 2 && !comment.is_empty() {
                let _ = listing.write_line(ListingLine {
                    addr: None,
                    bytes: &[],
                    line_num,
                    label: "",
                    op: "",
                    operand: "",
                    comment: &comment,
                });
            }
            return Ok(());
        }

        // A leading token that is not a reserved mnemonic is the line's label.
        let first = fields[0].as_str();
        let first_is_reserved = lookup(first).is_some();
        let (label, op_ix) = if !first_is_reserved && is_label_token(first) {
            (Some(first), 1)
        } else {
            (None, 0)
        };
        let op_token = fields.get(op_ix).map(String::as_str);
        let operand = fields.get(op_ix + 1).map(String::as_str).unwrap_or("");

        let line_addr = self.pc;
        let mut emitted: Vec<u8> = Vec::new();
        let mut show_addr = false;

        let Some(op_token) = op_token else {
            // Label-only line.
            if let Some(label) = label {
                self.declare_label(label, line_num)?;
            }
            self.write_listing_line(listing, line_num, Some(line_addr), &[], label, "", "", &comment);
            return Ok(());
        };

        let Some(looked) = lookup(op_token) else {
            return Err(AsmError::new(
                AsmErrorKind::BadMnemonic,
                "Bad mnemonic/opcode",
                Some(op_token),
            ));
        };

        // EQU and ORG resolve their label from the operand value; everything
        // else declares it at the current program counter.
        let assigns_label = matches!(
            looked,
            OpLookup::Pseudo(PseudoOp::Equ) | OpLookup::Pseudo(PseudoOp::Org)
        );
        if let Some(label) = label {
            if !assigns_label {
                self.declare_label(label, line_num)?;
            }
        }

        match looked {
            OpLookup::Pseudo(op) => {
                show_addr = self.process_pseudo(op, label, operand, line_num, &mut emitted)?;
            }
            OpLookup::Instruction(entry) => {
                let resolved = {
                    let mut ctx = ResolveContext {
                        symbols: &mut self.symbols,
                        pass: self.pass,
                        pc: self.pc,
                    };
                    resolve_operand(entry.mnemonic, operand, &mut ctx)?
                };
                let mode = resolved
                    .mode()
                    .ok_or_else(|| AsmError::from_kind(AsmErrorKind::DecodeError))?;
                let Some(opcode) = entry.opcode(mode) else {
                    return Err(AsmError::new(
                        AsmErrorKind::DecodeError,
                        "Decode error",
                        Some(entry.mnemonic),
                    ));
                };
                push_opcode(&mut emitted, opcode);
                resolved.push_bytes(&mut emitted);
                show_addr = true;
            }
            OpLookup::Branch(entry, mode) => {
                let resolved = {
                    let mut ctx = ResolveContext {
                        symbols: &mut self.symbols,
                        pass: self.pass,
                        pc: self.pc,
                    };
                    resolve_branch(mode, operand, &mut ctx)?
                };
                match mode {
                    BranchMode::Short => emitted.push(entry.short),
                    BranchMode::Long => push_opcode(&mut emitted, entry.long),
                }
                resolved.push_bytes(&mut emitted);
                show_addr = true;
            }
        }

        for byte in &emitted {
            self.emit(*byte);
        }

        let addr = if show_addr { Some(line_addr) } else { None };
        self.write_listing_line(
            listing,
            line_num,
            addr,
            &emitted,
            label,
            op_token,
            operand,
            &comment,
        );
        Ok(())
    }

    /// Handle a pseudo-op. Returns whether the listing should show the
    /// line's address.
    fn process_pseudo(
        &mut self,
        op: PseudoOp,
        label: Option<&str>,
        operand: &str,
        line_num: u32,
        emitted: &mut Vec<u8>,
    ) -> Result<bool, AsmError> {
        match op {
            PseudoOp::Equ => {
                let Some(label) = label else {
                    return Err(AsmError::new(
                        AsmErrorKind::BadOperand,
                        "EQU requires a label",
                        None,
                    ));
                };
                let value = self.eval_word(operand)?;
                self.symbols.resolve(label, value);
                if self.pass == 1 {
                    self.notes
                        .push(format!("Label {label} set to {value:04X} (line {line_num})"));
                }
                Ok(false)
            }
            PseudoOp::Org => {
                let value = self.eval_word(operand)?;
                self.pc = value;
                self.image.org(value);
                if let Some(label) = label {
                    self.symbols.resolve(label, value);
                }
                if self.pass == 1 {
                    self.notes
                        .push(format!("Origin set to {value:04X} (line {line_num})"));
                }
                Ok(false)
            }
            PseudoOp::Rmb => {
                let count = self.eval_word(operand)?;
                self.reserve(count, FILL_BYTE);
                if self.pass == 1 {
                    self.notes.push(format!(
                        "{count} bytes reserved at {:04X} (line {line_num})",
                        self.pc.wrapping_sub(count)
                    ));
                }
                Ok(true)
            }
            PseudoOp::Zmb => {
                let count = self.eval_word(operand)?;
                self.reserve(count, 0x00);
                Ok(true)
            }
            PseudoOp::Fcb => {
                if operand.is_empty() {
                    return Err(AsmError::new(
                        AsmErrorKind::BadOperand,
                        "FCB requires a value",
                        None,
                    ));
                }
                for part in operand.split(',') {
                    let value = self.eval_value(part.trim())?;
                    emitted.push((value & 0xFF) as u8);
                }
                Ok(true)
            }
            PseudoOp::Fdb => {
                if operand.is_empty() {
                    return Err(AsmError::new(
                        AsmErrorKind::BadOperand,
                        "FDB requires a value",
                        None,
                    ));
                }
                for part in operand.split(',') {
                    let value = self.eval_value(part.trim())?;
                    emitted.extend_from_slice(&(((value & 0xFFFF) as u16).to_be_bytes()));
                }
                Ok(true)
            }
            PseudoOp::Fcc => {
                let text = operand
                    .strip_prefix('"')
                    .and_then(|t| t.strip_suffix('"'))
                    .ok_or_else(|| {
                        AsmError::new(
                            AsmErrorKind::BadOperand,
                            "FCC requires a double-quoted string",
                            Some(operand),
                        )
                    })?;
                emitted.extend_from_slice(text.as_bytes());
                Ok(true)
            }
            PseudoOp::SetDp => {
                let value = self.eval_word(operand)?;
                self.direct_page = (value & 0xFF) as u8;
                Ok(false)
            }
            PseudoOp::End => Ok(false),
        }
    }

    fn declare_label(&mut self, name: &str, line_num: u32) -> Result<(), AsmError> {
        if self.pass > 1 {
            return Ok(());
        }
        match self.symbols.declare(name, self.pc) {
            SymbolTableResult::Ok => {
                self.notes.push(format!(
                    "Label {name} set to {:04X} (line {line_num})",
                    self.pc
                ));
                Ok(())
            }
            SymbolTableResult::Duplicate => Err(AsmError::new(
                AsmErrorKind::DuplicateLabel,
                "Duplicate label",
                Some(name),
            )),
        }
    }

    fn eval_value(&mut self, text: &str) -> Result<i32, AsmError> {
        let mut ctx = ResolveContext {
            symbols: &mut self.symbols,
            pass: self.pass,
            pc: self.pc,
        };
        Ok(crate::operand::eval(text, &mut ctx)?.unwrap_or(0))
    }

    fn eval_word(&mut self, operand: &str) -> Result<u16, AsmError> {
        let value = self.eval_value(operand.trim())?;
        if !(-32768..=65535).contains(&value) {
            return Err(AsmError::new(
                AsmErrorKind::BadAddress,
                "Value out of 16-bit range",
                Some(operand),
            ));
        }
        Ok((value & 0xFFFF) as u16)
    }

    fn emit(&mut self, byte: u8) {
        self.image.poke(self.pc, byte);
        self.pc = self.pc.wrapping_add(1);
    }

    fn reserve(&mut self, count: u16, fill: u8) {
        for _ in 0..count {
            self.emit(fill);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn write_listing_line<W: Write>(
        &self,
        listing: &mut ListingWriter<W>,
        line_num: u32,
        addr: Option<u16>,
        bytes: &[u8],
        label: Option<&str>,
        op: &str,
        operand: &str,
        comment: &str,
    ) {
        if self.pass != 2 {
            return;
        }
        let _ = listing.write_line(ListingLine {
            addr,
            bytes,
            line_num,
            label: label.unwrap_or(""),
            op,
            operand,
            comment,
        });
    }
}

fn push_opcode(out: &mut Vec<u8>, opcode: u16) {
    if opcode > 0xFF {
        out.push((opcode >> 8) as u8);
    }
    out.push((opcode & 0xFF) as u8);
}

fn is_label_token(token: &str) -> bool {
    match token.chars().next() {
        Some('@') => true,
        Some(c) => c.is_ascii_alphabetic(),
        None => false,
    }
}

/// Split a source line into whitespace-separated fields and an optional
/// trailing comment. A `;` or `*` outside double quotes starts the comment;
/// a double-quoted string (FCC) is kept as a single field, spaces included.
fn split_line(line: &str) -> (Vec<String>, Option<String>) {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut comment = None;

    for (ix, c) in line.char_indices() {
        if in_quotes {
            current.push(c);
            if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                current.push(c);
            }
            ';' | '*' => {
                comment = Some(line[ix..].trim_end().to_string());
                break;
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    fields.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        fields.push(current);
    }
    (fields, comment)
}
