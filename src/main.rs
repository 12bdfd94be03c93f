// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for dasm09.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use dasm09::assembler::cli::{validate_cli, Cli, CliConfig};
use dasm09::assembler::listing::{ListingWriter, MnemonicCase};
use dasm09::assembler::Assembler;
use dasm09::disassembler::{disassemble, disassemble_slice, DisassembledLine};
use dasm09::imagestore::ImageStore;

fn main() {
    let cli = Cli::parse();
    let config = match validate_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            process::exit(1);
        }
    };

    if let Err(err) = run(&config) {
        eprintln!("[ERROR] {err}");
        process::exit(1);
    }
}

fn run(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let files = if config.files.is_empty() {
        scan_current_dir()?
    } else {
        config.files.clone()
    };
    if files.is_empty() {
        eprintln!("No .asm or .6809 files to process");
        return Ok(());
    }

    for path in &files {
        match path.extension().and_then(|e| e.to_str()) {
            Some("asm") => assemble_file(path, config)?,
            Some("6809") => disassemble_container(path, config)?,
            Some("bin") => disassemble_raw(path, config)?,
            _ => eprintln!(
                "[ERROR] File {} is not a .asm, .6809 or .bin file, skipping",
                path.display()
            ),
        }
    }
    Ok(())
}

/// Collect the .asm and .6809 files in the working directory, sorted.
fn scan_current_dir() -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(".")? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("asm") | Some("6809")
        ) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn assemble_file(path: &Path, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(path)
        .map_err(|err| io::Error::new(err.kind(), format!("{}: {err}", path.display())))?;
    let lines: Vec<String> = BufReader::new(file).lines().collect::<io::Result<_>>()?;

    if !config.quiet {
        println!("****** PROCESSING {} ******", path.display());
    }

    let assembler = Assembler::new(config.start);
    let result = if config.quiet {
        let mut listing = ListingWriter::new(io::sink(), MnemonicCase::AsWritten);
        assembler.run(&lines, &mut listing)
    } else {
        let stdout = io::stdout();
        let mut listing = ListingWriter::new(stdout.lock(), config.case);
        assembler.run(&lines, &mut listing)
    };

    let output = match result {
        Ok(output) => output,
        Err(err) => {
            eprintln!("{err} -- halting assembly");
            eprintln!(">>> {}", err.source());
            return Err(Box::new(err));
        }
    };

    if config.verbose {
        for note in &output.notes {
            println!("{note}");
        }
    }

    if let Some(outfile) = &config.outfile {
        let mut file = File::create(outfile)?;
        if config.emit_bin {
            output.image.write_bin(&mut file)?;
        } else {
            output.image.write_image(&mut file)?;
        }
        file.flush()?;
        if !config.quiet {
            println!("File {} written", outfile.display());
        }
    }
    Ok(())
}

fn disassemble_container(path: &Path, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(path)
        .map_err(|err| io::Error::new(err.kind(), format!("{}: {err}", path.display())))?;
    let image = ImageStore::read_image(BufReader::new(file))?;
    print_disassembly(path, &disassemble(&image, config.num_bytes), config);
    Ok(())
}

fn disassemble_raw(path: &Path, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut bytes = Vec::new();
    File::open(path)
        .map_err(|err| io::Error::new(err.kind(), format!("{}: {err}", path.display())))?
        .read_to_end(&mut bytes)?;
    let take = bytes.len().min(config.num_bytes);
    print_disassembly(path, &disassemble_slice(&bytes[..take], config.start), config);
    Ok(())
}

fn print_disassembly(path: &Path, lines: &[DisassembledLine], config: &CliConfig) {
    if !config.quiet {
        println!("****** DISASSEMBLING {} ******", path.display());
    }
    println!("Address   Operation       Bytes");
    println!("-------------------------------");
    for line in lines {
        let bytes: String = line.bytes.iter().map(|b| format!("{b:02X}")).collect();
        let op = match config.case {
            MnemonicCase::Lower => line.mnemonic.to_ascii_lowercase(),
            _ => line.mnemonic.clone(),
        };
        let text = format!("{op} {}", line.operand);
        println!("{:04X}      {:<15} {bytes}", line.addr, text.trim_end());
    }
}
