//! Style sheet and rule parsing.
//!
//! Two kinds of rule are understood: qualified style rules
//! (`selectors { declarations }`) and `@keyframes` rules, including the
//! vendor-prefixed spellings (`@-webkit-keyframes`, …). Every other at-rule
//! is skipped by [`parse_stylesheet`] and rejected by [`parse_rule`].

use crate::error::CssError;
use crate::selector::{ComplexSelector, parse_selector_list_from_tokens};
use crate::token::{CssToken, CssTokenizer, tokens_to_css};

/// A CSS declaration (`property: value`).
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property name, lower-cased (e.g. `-webkit-animation`).
    pub name: String,
    /// Value tokens with surrounding whitespace trimmed.
    pub value: Vec<CssToken>,
    pub important: bool,
}

impl Declaration {
    pub fn value_text(&self) -> String {
        tokens_to_css(&self.value)
    }
}

/// A qualified style rule.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selector_text: String,
    pub selectors: Vec<ComplexSelector>,
    pub declarations: Vec<Declaration>,
}

/// One `from { … }` / `50% { … }` block of a keyframes rule.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeBlock {
    /// Offsets in `0.0..=1.0`.
    pub offsets: Vec<f32>,
    pub declarations: Vec<Declaration>,
}

/// A `@keyframes` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframesRule {
    /// The at-keyword without `@`, lower-cased: `keyframes`,
    /// `-webkit-keyframes`, …
    pub at_keyword: String,
    pub name: String,
    pub blocks: Vec<KeyframeBlock>,
}

impl KeyframesRule {
    /// The vendor prefix of the at-keyword (`""` or e.g. `"-webkit-"`).
    pub fn vendor_prefix(&self) -> &str {
        self.at_keyword
            .strip_suffix("keyframes")
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub enum CssRule {
    Style(StyleRule),
    Keyframes(KeyframesRule),
}

/// A parsed CSS style sheet.
#[derive(Debug, Default)]
pub struct Stylesheet {
    /// All rules, in source order.
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// CSSOM `insertRule`: parse exactly one rule and insert it at `index`
    /// (clamped to the end). Returns the index actually used.
    pub fn insert_rule(&mut self, text: &str, index: usize) -> Result<usize, CssError> {
        let rule = parse_rule(text)?;
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
        Ok(index)
    }

    pub fn style_rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter().filter_map(|r| match r {
            CssRule::Style(s) => Some(s),
            CssRule::Keyframes(_) => None,
        })
    }

    /// The last keyframes rule named `name` declared with `at_keyword`.
    pub fn keyframes(&self, at_keyword: &str, name: &str) -> Option<&KeyframesRule> {
        self.rules.iter().rev().find_map(|r| match r {
            CssRule::Keyframes(k) if k.at_keyword == at_keyword && k.name == name => Some(k),
            _ => None,
        })
    }
}

/// Parse a complete style sheet. Invalid rules are dropped, as browsers do.
pub fn parse_stylesheet(input: &str) -> Stylesheet {
    let tokens = CssTokenizer::new(input).tokenize_all();
    let mut rules = Vec::new();
    let mut pos = skip_whitespace(&tokens, 0);
    while pos < tokens.len() {
        match parse_one_rule(&tokens, pos) {
            Ok((rule, next)) => {
                rules.push(rule);
                pos = next;
            }
            Err((_, resume)) => pos = resume,
        }
        pos = skip_whitespace(&tokens, pos);
    }
    Stylesheet { rules }
}

/// Parse text holding exactly one rule.
pub fn parse_rule(input: &str) -> Result<CssRule, CssError> {
    let tokens = CssTokenizer::new(input).tokenize_all();
    let start = skip_whitespace(&tokens, 0);
    if start >= tokens.len() {
        return Err(CssError::InvalidRule("empty rule text".into()));
    }
    let (rule, end) = parse_one_rule(&tokens, start).map_err(|(err, _)| err)?;
    if skip_whitespace(&tokens, end) < tokens.len() {
        return Err(CssError::InvalidRule("trailing content after rule".into()));
    }
    Ok(rule)
}

/// On failure, returns the error and the position to resume parsing from.
fn parse_one_rule(tokens: &[CssToken], start: usize) -> Result<(CssRule, usize), (CssError, usize)> {
    if let CssToken::AtKeyword(name) = &tokens[start] {
        let lower = name.to_ascii_lowercase();
        let resume = skip_at_rule(tokens, start);
        if is_keyframes_keyword(&lower) {
            return parse_keyframes(tokens, start + 1, lower)
                .map(|rule| (CssRule::Keyframes(rule), resume))
                .map_err(|err| (err, resume));
        }
        return Err((CssError::InvalidRule(format!("unsupported at-rule @{lower}")), resume));
    }

    let Some(open) = tokens[start..].iter().position(|t| *t == CssToken::LBrace).map(|i| start + i) else {
        return Err((CssError::InvalidRule("missing `{`".into()), tokens.len()));
    };
    let close = find_block_end(tokens, open).unwrap_or(tokens.len());
    let resume = (close + 1).min(tokens.len());

    let selector_tokens = trim_whitespace(&tokens[start..open]);
    let selectors = parse_selector_list_from_tokens(selector_tokens).map_err(|err| (err, resume))?;
    let rule = StyleRule {
        selector_text: tokens_to_css(selector_tokens),
        selectors,
        declarations: parse_declarations(&tokens[open + 1..close]),
    };
    Ok((CssRule::Style(rule), resume))
}

fn is_keyframes_keyword(lower: &str) -> bool {
    lower == "keyframes" || (lower.starts_with('-') && lower.ends_with("-keyframes"))
}

/// `start` points just past the at-keyword.
fn parse_keyframes(tokens: &[CssToken], start: usize, at_keyword: String) -> Result<KeyframesRule, CssError> {
    let mut pos = skip_whitespace(tokens, start);
    let name = match tokens.get(pos) {
        Some(CssToken::Ident(n)) | Some(CssToken::String(n)) => n.clone(),
        _ => return Err(CssError::InvalidRule(format!("@{at_keyword} without a name"))),
    };
    pos = skip_whitespace(tokens, pos + 1);
    if tokens.get(pos) != Some(&CssToken::LBrace) {
        return Err(CssError::InvalidRule(format!("@{at_keyword} {name} without a block")));
    }
    let close = find_block_end(tokens, pos)
        .ok_or_else(|| CssError::InvalidRule(format!("unterminated @{at_keyword} {name}")))?;

    let mut blocks = Vec::new();
    pos = skip_whitespace(tokens, pos + 1);
    while pos < close {
        let open = tokens[pos..close]
            .iter()
            .position(|t| *t == CssToken::LBrace)
            .map(|i| pos + i)
            .ok_or_else(|| CssError::InvalidRule("keyframe selector without a block".into()))?;
        let block_close = find_block_end(tokens, open)
            .ok_or_else(|| CssError::InvalidRule("unterminated keyframe block".into()))?;
        blocks.push(KeyframeBlock {
            offsets: parse_keyframe_selector(&tokens[pos..open])?,
            declarations: parse_declarations(&tokens[open + 1..block_close]),
        });
        pos = skip_whitespace(tokens, block_close + 1);
    }

    Ok(KeyframesRule {
        at_keyword,
        name,
        blocks,
    })
}

fn parse_keyframe_selector(tokens: &[CssToken]) -> Result<Vec<f32>, CssError> {
    let mut offsets = Vec::new();
    for part in tokens.split(|t| *t == CssToken::Comma) {
        let offset = match trim_whitespace(part) {
            [CssToken::Ident(s)] if s.eq_ignore_ascii_case("from") => 0.0,
            [CssToken::Ident(s)] if s.eq_ignore_ascii_case("to") => 1.0,
            [CssToken::Percentage(p)] if (0.0..=100.0).contains(p) => (*p / 100.0) as f32,
            other => return Err(CssError::InvalidKeyframeSelector(tokens_to_css(other))),
        };
        offsets.push(offset);
    }
    Ok(offsets)
}

/// Parse a declaration block body. Malformed declarations are skipped.
pub fn parse_declarations(tokens: &[CssToken]) -> Vec<Declaration> {
    tokens
        .split(|t| *t == CssToken::Semicolon)
        .filter_map(parse_declaration)
        .collect()
}

fn parse_declaration(tokens: &[CssToken]) -> Option<Declaration> {
    let tokens = trim_whitespace(tokens);
    let (CssToken::Ident(name), rest) = tokens.split_first()? else {
        return None;
    };
    let rest = trim_whitespace(rest);
    let (CssToken::Colon, value) = rest.split_first()? else {
        return None;
    };
    let mut value = trim_whitespace(value);
    let mut important = false;
    if let [head @ .., CssToken::Delim('!'), CssToken::Ident(flag)] = value {
        if flag.eq_ignore_ascii_case("important") {
            important = true;
            value = trim_whitespace(head);
        }
    }
    if value.is_empty() {
        return None;
    }
    Some(Declaration {
        name: name.to_ascii_lowercase(),
        value: value.to_vec(),
        important,
    })
}

fn skip_whitespace(tokens: &[CssToken], mut pos: usize) -> usize {
    while pos < tokens.len() && tokens[pos] == CssToken::Whitespace {
        pos += 1;
    }
    pos
}

fn trim_whitespace(tokens: &[CssToken]) -> &[CssToken] {
    let start = tokens.iter().position(|t| *t != CssToken::Whitespace).unwrap_or(tokens.len());
    let end = tokens.iter().rposition(|t| *t != CssToken::Whitespace).map_or(start, |i| i + 1);
    &tokens[start..end]
}

/// Index of the `}` matching the `{` at `open`.
fn find_block_end(tokens: &[CssToken], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().skip(open) {
        match tok {
            CssToken::LBrace => depth += 1,
            CssToken::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Skip an at-rule (consume until `;` or a whole `{ … }` block).
fn skip_at_rule(tokens: &[CssToken], start: usize) -> usize {
    let mut pos = start + 1;
    while pos < tokens.len() {
        match tokens[pos] {
            CssToken::Semicolon => return pos + 1,
            CssToken::LBrace => return find_block_end(tokens, pos).map_or(tokens.len(), |i| i + 1),
            _ => pos += 1,
        }
    }
    pos
}
