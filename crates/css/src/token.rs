//! CSS tokenizer (a pragmatic subset of CSS Syntax Level 3).
//!
//! Escapes and `url()` tokens are not recognized; everything the trigger
//! rules, selectors and keyframe blocks need is.

/// CSS token types.
#[derive(Debug, Clone, PartialEq)]
pub enum CssToken {
    Ident(String),
    /// `name(`; the opening parenthesis is part of the token.
    Function(String),
    AtKeyword(String),
    Hash(String),
    String(String),
    Number(f64),
    Percentage(f64),
    Dimension { value: f64, unit: String },
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Delim(char),
}

impl CssToken {
    /// Serialize the token back to CSS text.
    pub fn to_css(&self) -> String {
        match self {
            CssToken::Ident(s) => s.clone(),
            CssToken::Function(s) => format!("{s}("),
            CssToken::AtKeyword(s) => format!("@{s}"),
            CssToken::Hash(s) => format!("#{s}"),
            CssToken::String(s) => format!("\"{s}\""),
            CssToken::Number(v) => format_number(*v),
            CssToken::Percentage(v) => format!("{}%", format_number(*v)),
            CssToken::Dimension { value, unit } => format!("{}{unit}", format_number(*value)),
            CssToken::Whitespace => " ".to_string(),
            CssToken::Colon => ":".to_string(),
            CssToken::Semicolon => ";".to_string(),
            CssToken::Comma => ",".to_string(),
            CssToken::LBracket => "[".to_string(),
            CssToken::RBracket => "]".to_string(),
            CssToken::LParen => "(".to_string(),
            CssToken::RParen => ")".to_string(),
            CssToken::LBrace => "{".to_string(),
            CssToken::RBrace => "}".to_string(),
            CssToken::Delim(c) => c.to_string(),
        }
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Serialize a token run back to text.
pub fn tokens_to_css(tokens: &[CssToken]) -> String {
    tokens.iter().map(CssToken::to_css).collect()
}

/// Turns an input string into a stream of [`CssToken`]s.
pub struct CssTokenizer {
    input: Vec<char>,
    pos: usize,
}

impl CssTokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize_all(&mut self) -> Vec<CssToken> {
        std::iter::from_fn(|| self.next_token()).collect()
    }

    /// Consume and return the next token, `None` at end of input.
    pub fn next_token(&mut self) -> Option<CssToken> {
        self.consume_comments();
        let ch = self.peek()?;

        if ch.is_whitespace() {
            while self.peek().is_some_and(char::is_whitespace) {
                self.pos += 1;
            }
            return Some(CssToken::Whitespace);
        }

        if ch == '"' || ch == '\'' {
            return Some(self.consume_string(ch));
        }

        if ch == '#' {
            self.pos += 1;
            if self.peek().is_some_and(is_name_char) {
                return Some(CssToken::Hash(self.consume_name()));
            }
            return Some(CssToken::Delim('#'));
        }

        if ch == '@' {
            self.pos += 1;
            if self.starts_ident_at(self.pos) {
                return Some(CssToken::AtKeyword(self.consume_name()));
            }
            return Some(CssToken::Delim('@'));
        }

        if self.starts_number_at(self.pos) {
            return Some(self.consume_numeric());
        }

        if self.starts_ident_at(self.pos) {
            let name = self.consume_name();
            if self.peek() == Some('(') {
                self.pos += 1;
                return Some(CssToken::Function(name));
            }
            return Some(CssToken::Ident(name));
        }

        self.pos += 1;
        Some(match ch {
            ':' => CssToken::Colon,
            ';' => CssToken::Semicolon,
            ',' => CssToken::Comma,
            '[' => CssToken::LBracket,
            ']' => CssToken::RBracket,
            '(' => CssToken::LParen,
            ')' => CssToken::RParen,
            '{' => CssToken::LBrace,
            '}' => CssToken::RBrace,
            other => CssToken::Delim(other),
        })
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, pos: usize) -> Option<char> {
        self.input.get(pos).copied()
    }

    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(self.pos + 1) == Some('*') {
            self.pos += 2;
            while self.pos < self.input.len()
                && !(self.peek() == Some('*') && self.peek_at(self.pos + 1) == Some('/'))
            {
                self.pos += 1;
            }
            self.pos = (self.pos + 2).min(self.input.len());
        }
    }

    fn consume_string(&mut self, quote: char) -> CssToken {
        self.pos += 1;
        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == quote {
                break;
            }
            value.push(c);
        }
        CssToken::String(value)
    }

    fn consume_name(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        self.input[start..self.pos].iter().collect()
    }

    fn starts_ident_at(&self, pos: usize) -> bool {
        match self.peek_at(pos) {
            Some('-') => match self.peek_at(pos + 1) {
                Some('-') => true,
                Some(c) => is_name_start(c),
                None => false,
            },
            Some(c) => is_name_start(c),
            None => false,
        }
    }

    fn starts_number_at(&self, pos: usize) -> bool {
        match self.peek_at(pos) {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek_at(pos + 1).is_some_and(|c| c.is_ascii_digit()),
            Some('+') | Some('-') => match self.peek_at(pos + 1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('.') => self.peek_at(pos + 2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            },
            _ => false,
        }
    }

    fn consume_numeric(&mut self) -> CssToken {
        let start = self.pos;
        if matches!(self.peek(), Some('+') | Some('-')) {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') && self.peek_at(self.pos + 1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text: String = self.input[start..self.pos].iter().collect();
        let value = text.parse::<f64>().unwrap_or(0.0);

        if self.peek() == Some('%') {
            self.pos += 1;
            return CssToken::Percentage(value);
        }
        if self.starts_ident_at(self.pos) {
            let unit = self.consume_name().to_ascii_lowercase();
            return CssToken::Dimension { value, unit };
        }
        CssToken::Number(value)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}
