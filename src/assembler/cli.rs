// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::assembler::error::{AsmError, AsmErrorKind};
use crate::assembler::listing::MnemonicCase;
use crate::assembler::VERSION;

const LONG_ABOUT: &str = "Assembler and disassembler for the 8-bit Motorola 6809.

.asm files are assembled; .6809 image files are disassembled. With no files
given, the current directory is scanned for both kinds. The .6809 container
is a JSON array of { address, code } records, one per non-contiguous code
chunk; -b/--bin writes a raw byte dump instead.";

#[derive(Parser, Debug)]
#[command(
    name = "dasm09",
    version = VERSION,
    about = "Motorola 6809 assembler/disassembler",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        short = 's',
        long = "start",
        value_name = "ADDR",
        long_help = "Start address for assembly, and base address when disassembling raw binary input. Accepts $-prefixed or 0x-prefixed hex, or decimal."
    )]
    pub start: Option<String>,
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        long_help = "Write the assembled image to FILE. A .6809 extension is added when missing. Without this flag no image file is written."
    )]
    pub outfile: Option<String>,
    #[arg(
        short = 'b',
        long = "bin",
        action = ArgAction::SetTrue,
        long_help = "Write the output file as a raw byte dump instead of the .6809 JSON container."
    )]
    pub bin: bool,
    #[arg(
        short = 'n',
        long = "numbytes",
        value_name = "N",
        default_value_t = 256,
        long_help = "Maximum number of bytes to disassemble. 0 removes the limit."
    )]
    pub num_bytes: usize,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress the listing and verbose notes. Always overrides -v/--verbose."
    )]
    pub quiet: bool,
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::SetTrue,
        long_help = "Print pass-1 notes (label definitions, reservations) in addition to the listing."
    )]
    pub verbose: bool,
    #[arg(
        short = 'u',
        long = "upper",
        action = ArgAction::SetTrue,
        overrides_with = "lower",
        long_help = "Show mnemonics in uppercase in listing output."
    )]
    pub upper: bool,
    #[arg(
        short = 'l',
        long = "lower",
        action = ArgAction::SetTrue,
        overrides_with = "upper",
        long_help = "Show mnemonics in lowercase in listing output. The last of -u/-l wins."
    )]
    pub lower: bool,
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

/// Validated CLI configuration.
pub struct CliConfig {
    pub start: u16,
    pub outfile: Option<PathBuf>,
    pub emit_bin: bool,
    pub num_bytes: usize,
    pub quiet: bool,
    pub verbose: bool,
    pub case: MnemonicCase,
    pub files: Vec<PathBuf>,
}

/// Cross-check flags and resolve raw argument strings.
pub fn validate_cli(cli: &Cli) -> Result<CliConfig, AsmError> {
    let start = match cli.start.as_deref() {
        Some(text) => parse_address(text)?,
        None => 0x0000,
    };

    let outfile = cli.outfile.as_deref().map(|name| {
        let mut path = PathBuf::from(name);
        let wanted = if cli.bin { "bin" } else { "6809" };
        if path.extension().and_then(|e| e.to_str()) != Some(wanted) {
            path.set_extension(wanted);
        }
        path
    });

    let case = if cli.upper {
        MnemonicCase::Upper
    } else if cli.lower {
        MnemonicCase::Lower
    } else {
        MnemonicCase::AsWritten
    };

    Ok(CliConfig {
        start,
        outfile,
        emit_bin: cli.bin,
        num_bytes: if cli.num_bytes == 0 {
            usize::MAX
        } else {
            cli.num_bytes
        },
        quiet: cli.quiet,
        verbose: cli.verbose && !cli.quiet,
        case,
        files: cli.files.clone(),
    })
}

/// Parse an address argument: `$xxxx`, `0xxxxx`, or decimal.
pub fn parse_address(text: &str) -> Result<u16, AsmError> {
    let bad = || {
        AsmError::new(
            AsmErrorKind::BadAddress,
            "Invalid start address",
            Some(text),
        )
    };
    let value = if let Some(hex) = text.strip_prefix('$') {
        u32::from_str_radix(hex, 16).map_err(|_| bad())?
    } else if let Some(hex) = text.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).map_err(|_| bad())?
    } else {
        text.parse::<u32>().map_err(|_| bad())?
    };
    u16::try_from(value).map_err(|_| bad())
}
