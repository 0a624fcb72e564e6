//! Structured error types: the 24-bit {severity, module, kind} error code
//! from the runtime error taxonomy, plus parser/lexer failure types.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    fn as_u8(self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
            Severity::Fatal => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrModule {
    Runtime,
    Math,
    Type,
    Syntax,
    Io,
}

impl ErrModule {
    fn as_u8(self) -> u8 {
        match self {
            ErrModule::Runtime => 0,
            ErrModule::Math => 1,
            ErrModule::Type => 2,
            ErrModule::Syntax => 3,
            ErrModule::Io => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrKind {
    DivisionByZero,
    ModuloByZero,
    UndefinedVariable,
    TypeMismatch,
    InvalidOp,
    Recursion,
    FunctionCall,
    BadMemory,
    InputFailed,
    InvalidInput,
}

impl ErrKind {
    fn as_u8(self) -> u8 {
        match self {
            ErrKind::DivisionByZero => 0,
            ErrKind::ModuloByZero => 1,
            ErrKind::UndefinedVariable => 2,
            ErrKind::TypeMismatch => 3,
            ErrKind::InvalidOp => 4,
            ErrKind::Recursion => 5,
            ErrKind::FunctionCall => 6,
            ErrKind::BadMemory => 7,
            ErrKind::InputFailed => 8,
            ErrKind::InvalidInput => 9,
        }
    }

    fn description(self) -> &'static str {
        match self {
            ErrKind::DivisionByZero => "division by zero",
            ErrKind::ModuloByZero => "modulo by zero",
            ErrKind::UndefinedVariable => "undefined variable",
            ErrKind::TypeMismatch => "type mismatch",
            ErrKind::InvalidOp => "invalid operator",
            ErrKind::Recursion => "recursion limit",
            ErrKind::FunctionCall => "function call error",
            ErrKind::BadMemory => "internal invariant violation",
            ErrKind::InputFailed => "input read failed",
            ErrKind::InvalidInput => "invalid input",
        }
    }
}

/// A 24-bit error code: top 8 bits severity, next 8 bits module, low 8 bits kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    pub severity: Severity,
    pub module: ErrModule,
    pub kind: ErrKind,
}

impl ErrorCode {
    pub fn new(severity: Severity, module: ErrModule, kind: ErrKind) -> Self {
        Self {
            severity,
            module,
            kind,
        }
    }

    pub fn as_u32(&self) -> u32 {
        ((self.severity.as_u8() as u32) << 16)
            | ((self.module.as_u8() as u32) << 8)
            | (self.kind.as_u8() as u32)
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    fn capitalized_description(&self) -> String {
        let desc = self.description();
        let mut chars = desc.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

macro_rules! code_ctor {
    ($name:ident, $severity:ident, $module:ident, $kind:ident) => {
        pub fn $name() -> ErrorCode {
            ErrorCode::new(Severity::$severity, ErrModule::$module, ErrKind::$kind)
        }
    };
}

code_ctor!(division_by_zero, Error, Math, DivisionByZero);
code_ctor!(modulo_by_zero, Error, Math, ModuloByZero);
code_ctor!(undefined_variable, Error, Runtime, UndefinedVariable);
code_ctor!(type_mismatch, Error, Type, TypeMismatch);
code_ctor!(invalid_op, Error, Runtime, InvalidOp);
code_ctor!(recursion_limit, Error, Runtime, Recursion);
code_ctor!(function_call, Error, Runtime, FunctionCall);
code_ctor!(bad_memory, Fatal, Runtime, BadMemory);
code_ctor!(input_failed, Error, Io, InputFailed);
code_ctor!(invalid_input, Error, Io, InvalidInput);

/// A runtime error: carries the structured code plus the source line it was
/// raised on so the top-level reporter can print `Line N: <description>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MycoError {
    pub code: ErrorCode,
    pub line: usize,
}

impl fmt::Display for MycoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.code.capitalized_description())
    }
}

impl std::error::Error for MycoError {}

impl MycoError {
    pub fn new(code: ErrorCode, line: usize) -> Self {
        Self { code, line }
    }

    /// ANSI red `Line N: <Capitalized description>`, per the CLI's stderr contract.
    pub fn ansi_report(&self) -> String {
        format!(
            "\x1b[31mLine {}: {}\x1b[0m",
            self.line,
            self.code.capitalized_description()
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LexError {
    #[error("Line {line}: {message}")]
    Invalid { message: String, line: usize },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("Line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },
    #[error("Line {line}: {message}")]
    Message { message: String, line: usize },
}

/// Top-level pipeline error, covering every stage from file read to runtime.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("runtime error: {0}")]
    Runtime(#[from] MycoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_packs_triple() {
        let code = division_by_zero();
        assert_eq!(code.as_u32() >> 16, Severity::Error.as_u8() as u32);
        assert_eq!((code.as_u32() >> 8) & 0xff, ErrModule::Math.as_u8() as u32);
        assert_eq!(code.as_u32() & 0xff, ErrKind::DivisionByZero.as_u8() as u32);
    }

    #[test]
    fn description_matches_taxonomy() {
        assert_eq!(division_by_zero().description(), "division by zero");
        assert_eq!(undefined_variable().description(), "undefined variable");
    }

    #[test]
    fn ansi_report_wraps_in_red() {
        let err = MycoError::new(division_by_zero(), 5);
        let report = err.ansi_report();
        assert!(report.starts_with("\x1b[31m"));
        assert!(report.ends_with("\x1b[0m"));
        assert!(report.contains("Line 5: Division by zero"));
    }
}
