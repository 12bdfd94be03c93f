// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types and pass statistics for the assembler.

use std::fmt;

/// Categories of assembler errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmErrorKind {
    BadMnemonic,
    DuplicateLabel,
    UndefinedLabel,
    BadBranch,
    BadOperand,
    DecodeError,
    BadTransferOperand,
    BadStackOperand,
    BadAddress,
    OperandRange,
}

impl AsmErrorKind {
    /// Short human-readable description of the error category.
    pub fn describe(self) -> &'static str {
        match self {
            Self::BadMnemonic => "Bad mnemonic/opcode",
            Self::DuplicateLabel => "Duplicate label",
            Self::UndefinedLabel => "Undefined label",
            Self::BadBranch => "Bad branch op",
            Self::BadOperand => "Bad operand",
            Self::DecodeError => "Decode error",
            Self::BadTransferOperand => "Bad TFR/EXG operand",
            Self::BadStackOperand => "Bad PUL/PSH operand",
            Self::BadAddress => "Bad address",
            Self::OperandRange => "8-bit operand expected",
        }
    }
}

/// An assembler error with a kind and message.
#[derive(Debug, Clone)]
pub struct AsmError {
    kind: AsmErrorKind,
    message: String,
}

impl AsmError {
    pub fn new(kind: AsmErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
        }
    }

    /// Build an error carrying only the category description.
    pub fn from_kind(kind: AsmErrorKind) -> Self {
        Self {
            kind,
            message: kind.describe().to_string(),
        }
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AsmError {}

/// Error from a failed assembly run: the first per-line error, with the
/// 1-based line number and the raw source line it occurred on.
#[derive(Debug)]
pub struct AsmRunError {
    error: AsmError,
    line: u32,
    source: String,
}

impl AsmRunError {
    pub fn new(error: AsmError, line: u32, source: impl Into<String>) -> Self {
        Self {
            error,
            line,
            source: source.into(),
        }
    }

    pub fn error(&self) -> &AsmError {
        &self.error
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.error.kind()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for AsmRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error on line {}: {}", self.line, self.error)
    }
}

impl std::error::Error for AsmRunError {}

/// Pass statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassCounts {
    pub lines: u32,
    pub bytes: u32,
}

impl PassCounts {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Format an error message with an optional parameter.
pub fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(p) => format!("{msg}: {p}"),
        None => msg.to_string(),
    }
}
