//! Token types.
//!
//! A plain `Token { kind, lexeme, span }` struct and a closed
//! `TokenKind` enum with per-kind payload (`Keyword(Keyword)`,
//! `IntLiteral(IntLiteral)`, …). Suffix parsing for integer/string
//! literals follows the same shape throughout: match a suffix
//! alphabet, fold it into a small bitset.

use std::rc::Rc;

use serde::Serialize;

use crate::options::CVersion;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
    pub column: u32,
    #[serde(skip)]
    pub file: Rc<str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    IntLiteral(IntLiteral),
    FloatLiteral(FloatLiteral),
    CharLiteral(u32),
    StringLiteral(String),
    Utf8CharLiteral(u32),
    Utf8StringLiteral(String),
    Punctuator(Punct),
    Preprocessor,
    Comment,
    Whitespace,
    Eof,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntLiteral {
    pub value: i64,
    pub is_unsigned: bool,
    /// 0 = int, 1 = long, 2 = long long.
    pub long_count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloatLiteral {
    pub value: f64,
    pub is_float: bool,
    pub is_long_double: bool,
}

/// Punctuators, including the C23 `<=>` three-way comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Punct {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    ShlAssign,
    ShrAssign,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Spaceship,
    AmpAmp,
    PipePipe,
    Bang,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Arrow,
    Question,
    Colon,
    Ellipsis,
}

macro_rules! keywords {
    ($($variant:ident => $text:expr, $since:ident);* $(;)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        pub enum Keyword {
            $($variant),*
        }

        impl Keyword {
            pub fn lookup(word: &str, version: CVersion) -> Option<Keyword> {
                let kw = match word {
                    $($text => Keyword::$variant,)*
                    _ => return None,
                };
                if kw.min_version() <= version { Some(kw) } else { None }
            }

            pub fn min_version(&self) -> CVersion {
                match self {
                    $(Keyword::$variant => CVersion::$since,)*
                }
            }

            pub fn text(&self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Auto => "auto", C90;
    Break => "break", C90;
    Case => "case", C90;
    Char => "char", C90;
    Const => "const", C90;
    Continue => "continue", C90;
    Default => "default", C90;
    Do => "do", C90;
    Double => "double", C90;
    Else => "else", C90;
    Enum => "enum", C90;
    Extern => "extern", C90;
    Float => "float", C90;
    For => "for", C90;
    Goto => "goto", C90;
    If => "if", C90;
    Int => "int", C90;
    Long => "long", C90;
    Register => "register", C90;
    Return => "return", C90;
    Short => "short", C90;
    Signed => "signed", C90;
    Sizeof => "sizeof", C90;
    Static => "static", C90;
    Struct => "struct", C90;
    Switch => "switch", C90;
    Typedef => "typedef", C90;
    Union => "union", C90;
    Unsigned => "unsigned", C90;
    Void => "void", C90;
    Volatile => "volatile", C90;
    While => "while", C90;

    Inline => "inline", C99;
    Restrict => "restrict", C99;
    Bool => "_Bool", C99;
    Complex => "_Complex", C99;
    Imaginary => "_Imaginary", C99;

    Alignas => "_Alignas", C11;
    Alignof => "_Alignof", C11;
    Atomic => "_Atomic", C11;
    Generic => "_Generic", C11;
    Noreturn => "_Noreturn", C11;
    StaticAssert => "_Static_assert", C11;
    ThreadLocal => "_Thread_local", C11;

    Constexpr => "constexpr", C23;
    Typeof => "typeof", C23;
    TypeofUnqual => "typeof_unqual", C23;
    Nullptr => "nullptr", C23;
    True => "true", C23;
    False => "false", C23;
    BitInt => "_BitInt", C23;
    StaticAssertNoUnderscore => "static_assert", C23;
    AlignasNoUnderscore => "alignas", C23;
    AlignofNoUnderscore => "alignof", C23;
    ThreadLocalNoUnderscore => "thread_local", C23;
}

impl TokenKind {
    pub fn is_eof(&self) -> bool {
        matches!(self, TokenKind::Eof)
    }
}
