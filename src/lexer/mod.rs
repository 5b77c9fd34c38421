//! C lexer.
//!
//! A `lex(source) -> LexResult { tokens, errors }` entry point built
//! around a `Cursor`: skip whitespace inline, dispatch on the first
//! character, push an `Eof` sentinel at the end. Never fails on
//! ill-formed input — lexical errors are collected as `Error` tokens
//! rather than aborting the scan.
//!
//! Covers the full C token set: keywords gated by [`CVersion`],
//! multi-character punctuators, numeric literal suffixes, and
//! string/char escapes including `\xHH`/`\ooo`.

pub mod cursor;

#[cfg(test)]
mod tests;

use std::rc::Rc;

use cursor::Cursor;

use crate::error::{LexErrorKind, SourceError};
use crate::options::Options;
use crate::token::{FloatLiteral, IntLiteral, Keyword, Punct, Token, TokenKind};

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<SourceError>,
}

#[must_use]
pub fn lex(source: &str, file: &str, options: &Options) -> LexResult {
    let file: Rc<str> = Rc::from(file);
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        skip_trivia(&mut cursor);
        if cursor.is_at_end() {
            break;
        }
        let (line, column) = cursor.current_pos();
        match lex_one(&mut cursor, options, &file, line, column) {
            Ok(token) => tokens.push(token),
            Err(err) => {
                tokens.push(Token {
                    kind: TokenKind::Error(err.message.clone()),
                    lexeme: String::new(),
                    line: err.line,
                    column: err.column,
                    file: file.clone(),
                });
                errors.push(err);
            }
        }
    }

    let (line, column) = cursor.current_pos();
    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        line,
        column,
        file,
    });

    LexResult { tokens, errors }
}

/// Skip spaces/tabs and line continuations outside of any token.
/// Comments and preprocessor lines are tokens in their own right
/// (spec §4.1: "whitespace is emitted only when requested"; here
/// the caller-facing result simply never includes raw whitespace).
fn skip_trivia(cursor: &mut Cursor) {
    loop {
        if cursor.skip_continuation() {
            continue;
        }
        match cursor.peek() {
            Some(' ') | Some('\t') | Some('\n') | Some('\r') => {
                cursor.advance();
            }
            _ => break,
        }
    }
}

fn lex_one(cursor: &mut Cursor, options: &Options, file: &Rc<str>, line: u32, column: u32) -> Result<Token, SourceError> {
    let ch = cursor.peek().unwrap();

    if ch == '#' {
        return Ok(lex_preprocessor(cursor, file, line, column));
    }
    if ch == '/' && cursor.peek2() == Some('/') {
        return Ok(lex_line_comment(cursor, file, line, column));
    }
    if ch == '/' && cursor.peek2() == Some('*') {
        return lex_block_comment(cursor, file, line, column);
    }
    if ch.is_ascii_digit() || (ch == '.' && cursor.peek2().is_some_and(|c| c.is_ascii_digit())) {
        return lex_number(cursor, file, line, column);
    }
    if is_ident_start(ch) {
        return lex_word_or_prefixed_literal(cursor, options, file, line, column);
    }
    if ch == '"' {
        return lex_string(cursor, file, line, column, None);
    }
    if ch == '\'' {
        return lex_char(cursor, file, line, column, None);
    }
    lex_punct(cursor, file, line, column)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn lex_preprocessor(cursor: &mut Cursor, file: &Rc<str>, line: u32, column: u32) -> Token {
    let mut text = String::new();
    while let Some(c) = cursor.peek() {
        if c == '\n' {
            break;
        }
        if cursor.skip_continuation() {
            text.push('\n');
            continue;
        }
        text.push(c);
        cursor.advance();
    }
    Token { kind: TokenKind::Preprocessor, lexeme: text, line, column, file: file.clone() }
}

fn lex_line_comment(cursor: &mut Cursor, file: &Rc<str>, line: u32, column: u32) -> Token {
    let mut text = String::new();
    cursor.advance();
    cursor.advance();
    while let Some(c) = cursor.peek() {
        if c == '\n' {
            break;
        }
        text.push(c);
        cursor.advance();
    }
    Token { kind: TokenKind::Comment, lexeme: format!("//{}", text), line, column, file: file.clone() }
}

fn lex_block_comment(cursor: &mut Cursor, file: &Rc<str>, line: u32, column: u32) -> Result<Token, SourceError> {
    cursor.advance();
    cursor.advance();
    let mut text = String::from("/*");
    loop {
        if cursor.is_at_end() {
            return Err(SourceError::new(LexErrorKind::UnterminatedComment, "unterminated block comment", line, column, file));
        }
        if cursor.peek() == Some('*') && cursor.peek2() == Some('/') {
            cursor.advance();
            cursor.advance();
            text.push_str("*/");
            break;
        }
        text.push(cursor.advance().unwrap());
    }
    Ok(Token { kind: TokenKind::Comment, lexeme: text, line, column, file: file.clone() })
}

/// Words are idents, keywords, or the prefix of a string/char literal
/// (`u8"..."`, `U'...'`, `L"..."`, …).
fn lex_word_or_prefixed_literal(cursor: &mut Cursor, options: &Options, file: &Rc<str>, line: u32, column: u32) -> Result<Token, SourceError> {
    let mut word = String::new();
    while let Some(c) = cursor.peek() {
        if is_ident_continue(c) {
            word.push(cursor.advance().unwrap());
        } else {
            break;
        }
    }

    if let Some(prefix) = string_prefix(&word) {
        if cursor.peek() == Some('"') {
            return lex_string(cursor, file, line, column, Some(prefix));
        }
        if cursor.peek() == Some('\'') {
            return lex_char(cursor, file, line, column, Some(prefix));
        }
    }

    if let Some(kw) = Keyword::lookup(&word, options.c_version) {
        return Ok(Token { kind: TokenKind::Keyword(kw), lexeme: word, line, column, file: file.clone() });
    }

    Ok(Token { kind: TokenKind::Identifier, lexeme: word, line, column, file: file.clone() })
}

#[derive(Clone, Copy, PartialEq)]
enum StrPrefix {
    U8,
    U16,
    U32,
    Wide,
}

fn string_prefix(word: &str) -> Option<StrPrefix> {
    match word {
        "u8" => Some(StrPrefix::U8),
        "u" => Some(StrPrefix::U16),
        "U" => Some(StrPrefix::U32),
        "L" => Some(StrPrefix::Wide),
        _ => None,
    }
}

fn lex_string(cursor: &mut Cursor, file: &Rc<str>, line: u32, column: u32, prefix: Option<StrPrefix>) -> Result<Token, SourceError> {
    cursor.advance();
    let mut value = String::new();
    loop {
        match cursor.peek() {
            None | Some('\n') => {
                return Err(SourceError::new(LexErrorKind::UnterminatedString, "unterminated string literal", line, column, file));
            }
            Some('"') => {
                cursor.advance();
                break;
            }
            Some('\\') => {
                cursor.advance();
                value.push(read_escape(cursor, file, line, column)?);
            }
            Some(c) => {
                value.push(c);
                cursor.advance();
            }
        }
    }
    let kind = match prefix {
        None | Some(StrPrefix::U8) => TokenKind::StringLiteral(value.clone()),
        Some(_) => TokenKind::Utf8StringLiteral(value.clone()),
    };
    Ok(Token { kind, lexeme: value, line, column, file: file.clone() })
}

fn lex_char(cursor: &mut Cursor, file: &Rc<str>, line: u32, column: u32, prefix: Option<StrPrefix>) -> Result<Token, SourceError> {
    cursor.advance();
    if cursor.is_at_end() || cursor.peek() == Some('\n') {
        return Err(SourceError::new(LexErrorKind::UnterminatedString, "unterminated character literal", line, column, file));
    }
    let code = if cursor.peek() == Some('\\') {
        cursor.advance();
        read_escape(cursor, file, line, column)? as u32
    } else {
        cursor.advance().unwrap() as u32
    };
    if cursor.peek() != Some('\'') {
        return Err(SourceError::new(LexErrorKind::UnterminatedString, "unterminated character literal", line, column, file));
    }
    cursor.advance();
    let kind = match prefix {
        None => TokenKind::CharLiteral(code),
        Some(_) => TokenKind::Utf8CharLiteral(code),
    };
    Ok(Token { kind, lexeme: String::new(), line, column, file: file.clone() })
}

fn read_escape(cursor: &mut Cursor, file: &Rc<str>, line: u32, column: u32) -> Result<char, SourceError> {
    let Some(esc) = cursor.peek() else {
        return Err(SourceError::new(LexErrorKind::InvalidEscapeSequence, "unterminated escape sequence", line, column, file));
    };
    match esc {
        'n' => { cursor.advance(); Ok('\n') }
        'r' => { cursor.advance(); Ok('\r') }
        't' => { cursor.advance(); Ok('\t') }
        'v' => { cursor.advance(); Ok('\u{0B}') }
        'f' => { cursor.advance(); Ok('\u{0C}') }
        'a' => { cursor.advance(); Ok('\u{07}') }
        'b' => { cursor.advance(); Ok('\u{08}') }
        '\\' => { cursor.advance(); Ok('\\') }
        '\'' => { cursor.advance(); Ok('\'') }
        '"' => { cursor.advance(); Ok('"') }
        '?' => { cursor.advance(); Ok('?') }
        'x' => {
            cursor.advance();
            let mut digits = String::new();
            while cursor.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                digits.push(cursor.advance().unwrap());
            }
            if digits.is_empty() {
                return Err(SourceError::new(LexErrorKind::InvalidEscapeSequence, "\\x used with no following hex digits", line, column, file));
            }
            let v = u32::from_str_radix(&digits, 16).unwrap_or(0);
            Ok(char::from_u32(v & 0xFF).unwrap_or('\0'))
        }
        '0'..='7' => {
            let mut digits = String::new();
            for _ in 0..3 {
                if cursor.peek().is_some_and(|c| ('0'..='7').contains(&c)) {
                    digits.push(cursor.advance().unwrap());
                } else {
                    break;
                }
            }
            let v = u32::from_str_radix(&digits, 8).unwrap_or(0);
            Ok(char::from_u32(v & 0xFF).unwrap_or('\0'))
        }
        other => Err(SourceError::new(LexErrorKind::InvalidEscapeSequence, format!("invalid escape sequence '\\{other}'"), line, column, file)),
    }
}

fn lex_number(cursor: &mut Cursor, file: &Rc<str>, line: u32, column: u32) -> Result<Token, SourceError> {
    let mut raw = String::new();
    let mut is_float = false;
    let mut radix = 10;

    if cursor.peek() == Some('0') && matches!(cursor.peek2(), Some('x') | Some('X')) {
        raw.push(cursor.advance().unwrap());
        raw.push(cursor.advance().unwrap());
        radix = 16;
        while cursor.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '\'') {
            let c = cursor.advance().unwrap();
            if c != '\'' {
                raw.push(c);
            }
        }
    } else if cursor.peek() == Some('0') && matches!(cursor.peek2(), Some('b') | Some('B')) {
        raw.push(cursor.advance().unwrap());
        raw.push(cursor.advance().unwrap());
        radix = 2;
        while cursor.peek().is_some_and(|c| c == '0' || c == '1' || c == '\'') {
            let c = cursor.advance().unwrap();
            if c != '\'' {
                raw.push(c);
            }
        }
    } else {
        while cursor.peek().is_some_and(|c| c.is_ascii_digit() || c == '\'') {
            let c = cursor.advance().unwrap();
            if c != '\'' {
                raw.push(c);
            }
        }
        if raw.starts_with('0') && raw.len() > 1 && radix == 10 {
            radix = 8;
        }
        if cursor.peek() == Some('.') {
            is_float = true;
            raw.push(cursor.advance().unwrap());
            while cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                raw.push(cursor.advance().unwrap());
            }
        }
        if matches!(cursor.peek(), Some('e') | Some('E')) {
            is_float = true;
            raw.push(cursor.advance().unwrap());
            if matches!(cursor.peek(), Some('+') | Some('-')) {
                raw.push(cursor.advance().unwrap());
            }
            while cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                raw.push(cursor.advance().unwrap());
            }
        }
    }

    if is_float {
        let mut is_f32 = false;
        let mut is_long_double = false;
        loop {
            match cursor.peek() {
                Some('f') | Some('F') => { is_f32 = true; cursor.advance(); }
                Some('l') | Some('L') => { is_long_double = true; cursor.advance(); }
                _ => break,
            }
        }
        let value: f64 = raw.parse().map_err(|_| SourceError::new(LexErrorKind::InvalidNumericLiteral, format!("invalid floating literal '{raw}'"), line, column, file))?;
        return Ok(Token {
            kind: TokenKind::FloatLiteral(FloatLiteral { value, is_float: is_f32, is_long_double }),
            lexeme: raw,
            line,
            column,
            file: file.clone(),
        });
    }

    let digits = match radix {
        16 => &raw[2..],
        2 => &raw[2..],
        _ => raw.as_str(),
    };
    let digits = if digits.is_empty() { "0" } else { digits };
    let unsigned_value = u64::from_str_radix(digits, radix)
        .map_err(|_| SourceError::new(LexErrorKind::InvalidNumericLiteral, format!("invalid integer literal '{raw}'"), line, column, file))?;

    let mut is_unsigned = false;
    let mut long_count = 0u8;
    loop {
        match cursor.peek() {
            Some('u') | Some('U') => { is_unsigned = true; cursor.advance(); }
            Some('l') | Some('L') => {
                long_count += 1;
                cursor.advance();
                if long_count == 1 && matches!(cursor.peek(), Some('l') | Some('L')) {
                    long_count += 1;
                    cursor.advance();
                }
            }
            _ => break,
        }
    }

    Ok(Token {
        kind: TokenKind::IntLiteral(IntLiteral { value: unsigned_value as i64, is_unsigned, long_count }),
        lexeme: raw,
        line,
        column,
        file: file.clone(),
    })
}

fn lex_punct(cursor: &mut Cursor, file: &Rc<str>, line: u32, column: u32) -> Result<Token, SourceError> {
    macro_rules! tok {
        ($kind:expr, $text:expr) => {
            Ok(Token { kind: TokenKind::Punctuator($kind), lexeme: $text.to_string(), line, column, file: file.clone() })
        };
    }

    let c0 = cursor.peek().unwrap();
    let c1 = cursor.peek2();

    // Three-character punctuators.
    if c0 == '.' && c1 == Some('.') && cursor.peek_at(2) == Some('.') {
        cursor.advance(); cursor.advance(); cursor.advance();
        return tok!(Punct::Ellipsis, "...");
    }
    if c0 == '<' && c1 == Some('<') && cursor.peek_at(2) == Some('=') {
        cursor.advance(); cursor.advance(); cursor.advance();
        return tok!(Punct::ShlAssign, "<<=");
    }
    if c0 == '>' && c1 == Some('>') && cursor.peek_at(2) == Some('=') {
        cursor.advance(); cursor.advance(); cursor.advance();
        return tok!(Punct::ShrAssign, ">>=");
    }
    if c0 == '<' && c1 == Some('=') && cursor.peek_at(2) == Some('>') {
        cursor.advance(); cursor.advance(); cursor.advance();
        return tok!(Punct::Spaceship, "<=>");
    }

    // Two-character punctuators.
    let two = match (c0, c1) {
        ('+', Some('+')) => Some((Punct::PlusPlus, "++")),
        ('-', Some('-')) => Some((Punct::MinusMinus, "--")),
        ('-', Some('>')) => Some((Punct::Arrow, "->")),
        ('+', Some('=')) => Some((Punct::PlusAssign, "+=")),
        ('-', Some('=')) => Some((Punct::MinusAssign, "-=")),
        ('*', Some('=')) => Some((Punct::StarAssign, "*=")),
        ('/', Some('=')) => Some((Punct::SlashAssign, "/=")),
        ('%', Some('=')) => Some((Punct::PercentAssign, "%=")),
        ('&', Some('=')) => Some((Punct::AmpAssign, "&=")),
        ('|', Some('=')) => Some((Punct::PipeAssign, "|=")),
        ('^', Some('=')) => Some((Punct::CaretAssign, "^=")),
        ('=', Some('=')) => Some((Punct::Eq, "==")),
        ('!', Some('=')) => Some((Punct::Ne, "!=")),
        ('<', Some('=')) => Some((Punct::Le, "<=")),
        ('>', Some('=')) => Some((Punct::Ge, ">=")),
        ('&', Some('&')) => Some((Punct::AmpAmp, "&&")),
        ('|', Some('|')) => Some((Punct::PipePipe, "||")),
        ('<', Some('<')) => Some((Punct::Shl, "<<")),
        ('>', Some('>')) => Some((Punct::Shr, ">>")),
        _ => None,
    };
    if let Some((kind, text)) = two {
        cursor.advance();
        cursor.advance();
        return tok!(kind, text);
    }
    let single = match c0 {
        '+' => Some((Punct::Plus, "+")),
        '-' => Some((Punct::Minus, "-")),
        '*' => Some((Punct::Star, "*")),
        '/' => Some((Punct::Slash, "/")),
        '%' => Some((Punct::Percent, "%")),
        '=' => Some((Punct::Assign, "=")),
        '<' => Some((Punct::Lt, "<")),
        '>' => Some((Punct::Gt, ">")),
        '!' => Some((Punct::Bang, "!")),
        '&' => Some((Punct::Amp, "&")),
        '|' => Some((Punct::Pipe, "|")),
        '^' => Some((Punct::Caret, "^")),
        '~' => Some((Punct::Tilde, "~")),
        '(' => Some((Punct::LParen, "(")),
        ')' => Some((Punct::RParen, ")")),
        '{' => Some((Punct::LBrace, "{")),
        '}' => Some((Punct::RBrace, "}")),
        '[' => Some((Punct::LBracket, "[")),
        ']' => Some((Punct::RBracket, "]")),
        ';' => Some((Punct::Semicolon, ";")),
        ',' => Some((Punct::Comma, ",")),
        '.' => Some((Punct::Dot, ".")),
        '?' => Some((Punct::Question, "?")),
        ':' => Some((Punct::Colon, ":")),
        _ => None,
    };
    if let Some((kind, text)) = single {
        cursor.advance();
        return tok!(kind, text);
    }

    cursor.advance();
    Err(SourceError::new(LexErrorKind::UnexpectedCharacter, format!("unexpected character '{c0}'"), line, column, file))
}
