//! Character-by-character cursor over source text with line/column
//! tracking: `peek`/`advance`/`is_at_end`/`current_pos`. Operates on
//! UTF-8 `char`s rather than raw bytes, since C source and string/char
//! literal payloads need full Unicode support (C23 `u8`/wide literals,
//! source comments).

pub struct Cursor<'a> {
    chars: Vec<char>,
    source: &'a str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            source,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    pub fn peek2(&self) -> Option<char> {
        self.peek_at(1)
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = *self.chars.get(self.pos)?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Skip a backslash immediately followed by a newline (a line
    /// continuation): the logical line carries on as if it weren't
    /// there. Returns whether one was consumed.
    pub fn skip_continuation(&mut self) -> bool {
        if self.peek() == Some('\\') && matches!(self.peek2(), Some('\n') | Some('\r')) {
            self.advance();
            if self.peek() == Some('\r') {
                self.advance();
                if self.peek() == Some('\n') {
                    self.advance();
                }
            } else {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn current_pos(&self) -> (u32, u32) {
        (self.line, self.col)
    }

    pub fn source(&self) -> &'a str {
        self.source
    }
}
