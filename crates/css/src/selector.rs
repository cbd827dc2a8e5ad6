//! Selector parsing.
//!
//! Unlike style sheet parsing, selector parsing is strict: anything the
//! engine does not understand is a [`CssError`], which callers turn into a
//! rejected rule (`insertRule`) or an empty result (`querySelectorAll`).

use crate::error::CssError;
use crate::token::{CssToken, CssTokenizer, tokens_to_css};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// How `[name op value]` compares the attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// Present at all.
    Exists,
    /// `=`
    Eq,
    /// `~=`, one of the whitespace-separated words.
    Includes,
    /// `|=`, equal or followed by `-`.
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

/// Structural pseudo-classes. Dynamic ones (`:hover`, …) never apply to a
/// headless document and are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    Not(Box<CompoundSelector>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Type selector, e.g. `div` (stored lower-cased).
    Type(String),
    Universal,
    Id(String),
    Class(String),
    Attribute {
        name: String,
        op: AttrOp,
        value: Option<String>,
    },
    PseudoClass(PseudoClass),
}

/// A sequence of simple selectors without combinators (e.g. `div.foo#bar`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// A chain of compound selectors separated by combinators, stored
/// right-to-left: `parts[0]` is the subject. Each entry carries the
/// combinator leading to the next entry; the last entry's is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<(CompoundSelector, Option<Combinator>)>,
}

/// Parse a comma-separated selector list.
pub fn parse_selector_list(input: &str) -> Result<Vec<ComplexSelector>, CssError> {
    let tokens = CssTokenizer::new(input).tokenize_all();
    parse_selector_list_from_tokens(&tokens)
}

/// Parse a selector list from tokens; the whole slice must be consumed.
pub fn parse_selector_list_from_tokens(tokens: &[CssToken]) -> Result<Vec<ComplexSelector>, CssError> {
    let mut parser = SelectorParser { tokens, pos: 0 };
    let mut selectors = Vec::new();

    parser.skip_whitespace();
    if parser.at_end() {
        return Err(CssError::EmptySelector);
    }
    loop {
        selectors.push(parser.complex()?);
        parser.skip_whitespace();
        match parser.next() {
            None => break,
            Some(CssToken::Comma) => {
                parser.skip_whitespace();
            }
            Some(other) => return Err(parser.invalid(other)),
        }
    }
    Ok(selectors)
}

struct SelectorParser<'a> {
    tokens: &'a [CssToken],
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a CssToken> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a CssToken> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek() == Some(&CssToken::Whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn invalid(&self, token: &CssToken) -> CssError {
        CssError::InvalidSelector(format!(
            "unexpected `{}` in `{}`",
            token.to_css(),
            tokens_to_css(self.tokens)
        ))
    }

    fn complex(&mut self) -> Result<ComplexSelector, CssError> {
        let mut parts_ltr: Vec<(CompoundSelector, Option<Combinator>)> = vec![(self.compound()?, None)];

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(CssToken::Comma) => break,
                Some(CssToken::Delim('>')) => Combinator::Child,
                Some(CssToken::Delim('+')) => Combinator::NextSibling,
                Some(CssToken::Delim('~')) => Combinator::SubsequentSibling,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(other) => return Err(self.invalid(other)),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            parts_ltr.push((self.compound()?, Some(combinator)));
        }

        // Each LTR entry carries the combinator linking it to its left
        // neighbour, so reversing yields the right-to-left form directly.
        parts_ltr.reverse();
        Ok(ComplexSelector { parts: parts_ltr })
    }

    fn compound(&mut self) -> Result<CompoundSelector, CssError> {
        let mut simples = Vec::new();

        match self.peek() {
            Some(CssToken::Ident(name)) => {
                simples.push(SimpleSelector::Type(name.to_ascii_lowercase()));
                self.pos += 1;
            }
            Some(CssToken::Delim('*')) => {
                simples.push(SimpleSelector::Universal);
                self.pos += 1;
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some(CssToken::Hash(value)) => {
                    simples.push(SimpleSelector::Id(value.clone()));
                    self.pos += 1;
                }
                Some(CssToken::Delim('.')) => {
                    self.pos += 1;
                    match self.next() {
                        Some(CssToken::Ident(name)) => simples.push(SimpleSelector::Class(name.clone())),
                        Some(other) => return Err(self.invalid(other)),
                        None => return Err(CssError::InvalidSelector("dangling `.`".into())),
                    }
                }
                Some(CssToken::LBracket) => {
                    self.pos += 1;
                    simples.push(self.attribute()?);
                }
                Some(CssToken::Colon) => {
                    self.pos += 1;
                    simples.push(SimpleSelector::PseudoClass(self.pseudo_class()?));
                }
                _ => break,
            }
        }

        if simples.is_empty() {
            return Err(match self.peek() {
                Some(tok) => self.invalid(tok),
                None => CssError::InvalidSelector("missing compound selector".into()),
            });
        }
        Ok(CompoundSelector { simples })
    }

    fn attribute(&mut self) -> Result<SimpleSelector, CssError> {
        self.skip_whitespace();
        let name = match self.next() {
            Some(CssToken::Ident(n)) => n.to_ascii_lowercase(),
            Some(other) => return Err(self.invalid(other)),
            None => return Err(CssError::InvalidSelector("unterminated `[`".into())),
        };
        self.skip_whitespace();

        let op = match self.next() {
            Some(CssToken::RBracket) => {
                return Ok(SimpleSelector::Attribute {
                    name,
                    op: AttrOp::Exists,
                    value: None,
                });
            }
            Some(CssToken::Delim('=')) => AttrOp::Eq,
            Some(CssToken::Delim(c)) if self.peek() == Some(&CssToken::Delim('=')) => {
                let op = match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    _ => return Err(CssError::InvalidSelector(format!("unknown attribute operator `{c}=`"))),
                };
                self.pos += 1;
                op
            }
            Some(other) => return Err(self.invalid(other)),
            None => return Err(CssError::InvalidSelector("unterminated `[`".into())),
        };
        self.skip_whitespace();

        let value = match self.next() {
            Some(CssToken::Ident(v)) | Some(CssToken::String(v)) => v.clone(),
            Some(tok @ (CssToken::Number(_) | CssToken::Dimension { .. })) => tok.to_css(),
            Some(other) => return Err(self.invalid(other)),
            None => return Err(CssError::InvalidSelector("unterminated `[`".into())),
        };
        self.skip_whitespace();
        match self.next() {
            Some(CssToken::RBracket) => Ok(SimpleSelector::Attribute {
                name,
                op,
                value: Some(value),
            }),
            Some(other) => Err(self.invalid(other)),
            None => Err(CssError::InvalidSelector("unterminated `[`".into())),
        }
    }

    fn pseudo_class(&mut self) -> Result<PseudoClass, CssError> {
        match self.next() {
            Some(CssToken::Ident(name)) => match name.to_ascii_lowercase().as_str() {
                "root" => Ok(PseudoClass::Root),
                "empty" => Ok(PseudoClass::Empty),
                "first-child" => Ok(PseudoClass::FirstChild),
                "last-child" => Ok(PseudoClass::LastChild),
                "only-child" => Ok(PseudoClass::OnlyChild),
                "first-of-type" => Ok(PseudoClass::FirstOfType),
                "last-of-type" => Ok(PseudoClass::LastOfType),
                other => Err(CssError::UnsupportedSelector(format!(":{other}"))),
            },
            Some(CssToken::Function(name)) if name.eq_ignore_ascii_case("not") => {
                self.skip_whitespace();
                let inner = self.compound()?;
                self.skip_whitespace();
                match self.next() {
                    Some(CssToken::RParen) => Ok(PseudoClass::Not(Box::new(inner))),
                    Some(other) => Err(self.invalid(other)),
                    None => Err(CssError::InvalidSelector("unterminated `:not(`".into())),
                }
            }
            Some(CssToken::Function(name)) => Err(CssError::UnsupportedSelector(format!(":{name}()"))),
            Some(CssToken::Colon) => Err(CssError::UnsupportedSelector("pseudo-elements".into())),
            Some(other) => Err(self.invalid(other)),
            None => Err(CssError::InvalidSelector("dangling `:`".into())),
        }
    }
}
