// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Listing output for pass 2.

use std::io::Write;

use crate::assembler::error::PassCounts;
use crate::imagestore::ImageStore;
use crate::symbol_table::SymbolTable;

/// Mnemonic case forced in listing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MnemonicCase {
    #[default]
    AsWritten,
    Upper,
    Lower,
}

/// Data for a single listing line.
pub struct ListingLine<'a> {
    pub addr: Option<u16>,
    pub bytes: &'a [u8],
    pub line_num: u32,
    pub label: &'a str,
    pub op: &'a str,
    pub operand: &'a str,
    pub comment: &'a str,
}

/// Writer for listing output.
pub struct ListingWriter<W: Write> {
    out: W,
    case: MnemonicCase,
}

impl<W: Write> ListingWriter<W> {
    pub fn new(out: W, case: MnemonicCase) -> Self {
        Self { out, case }
    }

    pub fn header(&mut self, title: &str) -> std::io::Result<()> {
        writeln!(self.out, "{title}")?;
        writeln!(
            self.out,
            "ADDR    BYTES            LINE  LABEL            OP     OPERAND"
        )?;
        writeln!(
            self.out,
            "------  ---------------  ----  ---------------  -----  -------"
        )
    }

    pub fn write_line(&mut self, line: ListingLine<'_>) -> std::io::Result<()> {
        let addr = match line.addr {
            Some(addr) => format!("{addr:04X}"),
            None => "----".to_string(),
        };
        let op = match self.case {
            MnemonicCase::AsWritten => line.op.to_string(),
            MnemonicCase::Upper => line.op.to_ascii_uppercase(),
            MnemonicCase::Lower => line.op.to_ascii_lowercase(),
        };
        let mut row = format!(
            "{:<6}  {:<15}  {:>4}  {:<15}  {:<5}  {}",
            addr,
            format_bytes(line.bytes),
            line.line_num,
            line.label,
            op,
            line.operand
        );
        if !line.comment.is_empty() {
            row = format!("{:<60}{}", row.trim_end(), line.comment);
        }
        writeln!(self.out, "{}", row.trim_end())
    }

    pub fn footer(
        &mut self,
        counts: &PassCounts,
        symbols: &SymbolTable,
        image: &ImageStore,
    ) -> std::io::Result<()> {
        writeln!(
            self.out,
            "\nLines: {}  Bytes: {}",
            counts.lines, counts.bytes
        )?;

        if !symbols.entries().is_empty() {
            writeln!(self.out, "\nSYMBOL TABLE\n")?;
            symbols.dump(&mut self.out)?;
        }

        writeln!(self.out, "\nMACHINE CODE\n")?;
        for chunk in image.chunks() {
            for (ix, row) in chunk.bytes().chunks(8).enumerate() {
                let addr = chunk.base().wrapping_add((ix * 8) as u16);
                writeln!(self.out, "{addr:04X}    {}", format_bytes(row))?;
            }
        }
        Ok(())
    }
}

/// Format bytes as a spaced hex string.
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{ListingLine, ListingWriter, MnemonicCase};

    #[test]
    fn listing_row_shows_address_bytes_and_fields() {
        let mut out = Vec::new();
        let mut writer = ListingWriter::new(&mut out, MnemonicCase::AsWritten);
        writer
            .write_line(ListingLine {
                addr: Some(0x1000),
                bytes: &[0x86, 0x05],
                line_num: 3,
                label: "",
                op: "LDA",
                operand: "#$05",
                comment: "",
            })
            .expect("write listing line");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("1000"));
        assert!(text.contains("86 05"));
        assert!(text.contains("LDA"));
    }

    #[test]
    fn upper_case_mode_rewrites_the_mnemonic() {
        let mut out = Vec::new();
        let mut writer = ListingWriter::new(&mut out, MnemonicCase::Upper);
        writer
            .write_line(ListingLine {
                addr: Some(0),
                bytes: &[0x39],
                line_num: 1,
                label: "",
                op: "rts",
                operand: "",
                comment: "",
            })
            .expect("write listing line");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("RTS"));
    }
}
