//! Unified error type shared by every stage of the pipeline.
//!
//! `SourceError` carries a `{kind, message, line, column}` shape with a
//! `[ERROR] (file:line:col) message` rendering. `ErrorKind` is split
//! into five categories — lex, syntax, semantic, runtime, library —
//! each with its own nested enum, so a match on `ErrorKind` can't
//! silently miss a whole category the way one flat enum would invite.

use std::rc::Rc;

use serde::Serialize;

use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
    #[serde(skip)]
    pub file: Rc<str>,
    pub token: Option<Token>,
}

impl SourceError {
    pub fn new(kind: impl Into<ErrorKind>, message: impl Into<String>, line: u32, column: u32, file: &Rc<str>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            line,
            column,
            file: file.clone(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.line = token.line;
        self.column = token.column;
        self.token = Some(token);
        self
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ERROR] ({}:{}:{}) {}", self.file, self.line, self.column, self.message)
    }
}

impl std::error::Error for SourceError {}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum ErrorKind {
    #[error("lex error: {0:?}")]
    Lex(LexErrorKind),
    #[error("syntax error: {0:?}")]
    Syntax(SyntaxErrorKind),
    #[error("semantic error: {0:?}")]
    Semantic(SemanticErrorKind),
    #[error("runtime error: {0:?}")]
    Runtime(RuntimeErrorKind),
    #[error("library error: {0:?}")]
    Library(LibraryErrorKind),
}

impl From<LexErrorKind> for ErrorKind {
    fn from(k: LexErrorKind) -> Self {
        ErrorKind::Lex(k)
    }
}
impl From<SyntaxErrorKind> for ErrorKind {
    fn from(k: SyntaxErrorKind) -> Self {
        ErrorKind::Syntax(k)
    }
}
impl From<SemanticErrorKind> for ErrorKind {
    fn from(k: SemanticErrorKind) -> Self {
        ErrorKind::Semantic(k)
    }
}
impl From<RuntimeErrorKind> for ErrorKind {
    fn from(k: RuntimeErrorKind) -> Self {
        ErrorKind::Runtime(k)
    }
}
impl From<LibraryErrorKind> for ErrorKind {
    fn from(k: LibraryErrorKind) -> Self {
        ErrorKind::Library(k)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedComment,
    InvalidEscapeSequence,
    InvalidIntSuffix,
    InvalidFloatSuffix,
    InvalidNumericLiteral,
    UnexpectedCharacter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyntaxErrorKind {
    UnexpectedToken,
    ExpectedToken,
    ExpectedDeclarator,
    ExpectedExpression,
    ExpectedIdentifier,
    UnterminatedConstruct,
    InvalidInitializer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SemanticErrorKind {
    UnknownIdentifier,
    UnknownType,
    CallTargetMissing,
    TypeMismatchInCast,
    CaseOutsideSwitch,
    RedefinedSymbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuntimeErrorKind {
    DivByZero,
    ModByZero,
    NullPointerDereference,
    InvalidPointerDereference,
    OutOfBoundsAccess,
    UseAfterFree,
    DoubleFree,
    StackUnderflow,
    StepLimit,
    UnresolvedGoto,
    AssertionFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LibraryErrorKind {
    MissingArguments,
    BadFormatSpecifier,
    UnknownFunction,
}
