//! `printf`/`scanf` conversion-specifier mini-parser.
//!
//! A small dispatch parser: match on a character, fill in a struct,
//! advance the cursor. One `FormatSpec` describes a single `%...conv`
//! run and is shared by both `printf` and `scanf`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Fixed(usize),
    FromArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub left_align: bool,
    pub plus_sign: bool,
    pub space_sign: bool,
    pub alternate: bool,
    pub zero_pad: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    None,
    H,
    Hh,
    L,
    Ll,
    LongDouble,
    Z,
    J,
    T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatSpec {
    pub flags: Flags,
    pub width: Option<Width>,
    pub precision: Option<Width>,
    pub length: Length,
    pub conv: char,
}

/// A piece of a parsed format string: either passthrough literal text or a
/// conversion specifier (`%%` is folded into a literal `%` at this stage).
#[derive(Debug, Clone, PartialEq)]
pub enum FormatPiece {
    Literal(String),
    Spec(FormatSpec),
}

/// Splits `fmt` into literal runs and conversion specifiers. Malformed
/// specifiers (an unrecognised conversion character, or `%` at end of
/// string) are reported via `Err` rather than silently swallowed, so the
/// caller can surface a `LibraryErrorKind::BadFormatSpecifier`.
pub fn parse_format(fmt: &str) -> Result<Vec<FormatPiece>, String> {
    let chars: Vec<char> = fmt.chars().collect();
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '%' {
            literal.push(chars[i]);
            i += 1;
            continue;
        }
        if i + 1 < chars.len() && chars[i + 1] == '%' {
            literal.push('%');
            i += 2;
            continue;
        }
        if !literal.is_empty() {
            pieces.push(FormatPiece::Literal(std::mem::take(&mut literal)));
        }
        let (spec, next) = parse_spec(&chars, i + 1)?;
        pieces.push(FormatPiece::Spec(spec));
        i = next;
    }
    if !literal.is_empty() {
        pieces.push(FormatPiece::Literal(literal));
    }
    Ok(pieces)
}

fn parse_spec(chars: &[char], mut i: usize) -> Result<(FormatSpec, usize), String> {
    let mut flags = Flags::default();
    loop {
        match chars.get(i) {
            Some('-') => flags.left_align = true,
            Some('+') => flags.plus_sign = true,
            Some(' ') => flags.space_sign = true,
            Some('#') => flags.alternate = true,
            Some('0') => flags.zero_pad = true,
            _ => break,
        }
        i += 1;
    }

    let width = parse_width(chars, &mut i);

    let precision = if chars.get(i) == Some(&'.') {
        i += 1;
        Some(parse_width(chars, &mut i).unwrap_or(Width::Fixed(0)))
    } else {
        None
    };

    let length = match (chars.get(i), chars.get(i + 1)) {
        (Some('h'), Some('h')) => {
            i += 2;
            Length::Hh
        }
        (Some('l'), Some('l')) => {
            i += 2;
            Length::Ll
        }
        (Some('h'), _) => {
            i += 1;
            Length::H
        }
        (Some('l'), _) => {
            i += 1;
            Length::L
        }
        (Some('L'), _) => {
            i += 1;
            Length::LongDouble
        }
        (Some('z'), _) => {
            i += 1;
            Length::Z
        }
        (Some('j'), _) => {
            i += 1;
            Length::J
        }
        (Some('t'), _) => {
            i += 1;
            Length::T
        }
        _ => Length::None,
    };

    let conv = *chars.get(i).ok_or("format string ends with an incomplete conversion")?;
    if !"diuoxXcsfFeEgGpn".contains(conv) {
        return Err(format!("unknown conversion specifier '%{conv}'"));
    }
    i += 1;

    Ok((FormatSpec { flags, width, precision, length, conv }, i))
}

fn parse_width(chars: &[char], i: &mut usize) -> Option<Width> {
    if chars.get(*i) == Some(&'*') {
        *i += 1;
        return Some(Width::FromArg);
    }
    let start = *i;
    while matches!(chars.get(*i), Some(c) if c.is_ascii_digit()) {
        *i += 1;
    }
    if *i == start {
        None
    } else {
        let n: String = chars[start..*i].iter().collect();
        Some(Width::Fixed(n.parse().unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_literal_and_specs() {
        let pieces = parse_format("x=%d, y=%-5.2f!").unwrap();
        assert_eq!(
            pieces,
            vec![
                FormatPiece::Literal("x=".into()),
                FormatPiece::Spec(FormatSpec {
                    flags: Flags::default(),
                    width: None,
                    precision: None,
                    length: Length::None,
                    conv: 'd'
                }),
                FormatPiece::Literal(", y=".into()),
                FormatPiece::Spec(FormatSpec {
                    flags: Flags { left_align: true, ..Default::default() },
                    width: Some(Width::Fixed(5)),
                    precision: Some(Width::Fixed(2)),
                    length: Length::None,
                    conv: 'f'
                }),
                FormatPiece::Literal("!".into()),
            ]
        );
    }

    #[test]
    fn percent_percent_is_a_literal_percent() {
        let pieces = parse_format("100%%").unwrap();
        assert_eq!(pieces, vec![FormatPiece::Literal("100%".into())]);
    }

    #[test]
    fn star_width_is_recognised() {
        let pieces = parse_format("%*d").unwrap();
        assert_eq!(
            pieces,
            vec![FormatPiece::Spec(FormatSpec {
                flags: Flags::default(),
                width: Some(Width::FromArg),
                precision: None,
                length: Length::None,
                conv: 'd'
            })]
        );
    }

    #[test]
    fn unknown_conversion_is_an_error() {
        assert!(parse_format("%q").is_err());
    }
}
