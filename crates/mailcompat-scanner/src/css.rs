//! CSS reading for style attributes and `<style>` blocks.
//!
//! [`parse_stylesheet`] builds a small rule/at-rule/declaration tree on top of
//! the `cssparser` tokenizer and rejects input it cannot structure (stray
//! closing brackets, bad strings or URLs, words that are neither a rule nor a
//! declaration). [`scan_lenient`] is the pattern-based fallback for that
//! case and never fails.

use crate::error::{CssParseError, Result};
use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, SourcePosition, Token};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static IMPORTANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*!\s*important\s*$").expect("valid !important regex"));

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid comment regex"));

static LENIENT_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s;{])([a-z][a-z0-9-]+)\s*:([^;{}]*)")
        .expect("valid lenient declaration regex")
});

/// Deepest block nesting the structural parser follows before giving up.
pub const MAX_NESTING_DEPTH: usize = 64;

static LENIENT_AT_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([a-z][a-z0-9-]*)").expect("valid lenient at-rule regex"));

/// A node of a parsed style sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssNode {
    /// `property: value`, with any `!important` flag removed from the value
    Declaration {
        /// Property name as written
        property: String,
        /// Trimmed value text
        value: String,
    },
    /// `@name params;` or `@name params { children }`
    AtRule {
        /// Lowercased name without the `@`
        name: String,
        /// Prelude text between the name and the block or `;`
        params: String,
        /// Block contents, empty for statement at-rules
        children: Vec<CssNode>,
    },
    /// `selector { children }`
    Rule {
        /// Prelude text
        selector: String,
        /// Block contents
        children: Vec<CssNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SyntaxIssue {
    UnknownWord(String),
    TooDeep,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxIssue::UnknownWord(word) => write!(f, "unknown word '{word}'"),
            SyntaxIssue::TooDeep => {
                write!(f, "blocks nested deeper than {MAX_NESTING_DEPTH} levels")
            }
        }
    }
}

type ParseResult<'i, T> = std::result::Result<T, ParseError<'i, SyntaxIssue>>;

/// Parse a style sheet into a node tree.
///
/// Declarations are accepted inside any block, including nested rules and
/// at-rules such as `@font-face`. Blocks nested deeper than
/// [`MAX_NESTING_DEPTH`] are rejected.
pub fn parse_stylesheet(css: &str) -> Result<Vec<CssNode>> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parse_items(&mut parser, 0).map_err(into_parse_error)
}

fn into_parse_error(error: ParseError<'_, SyntaxIssue>) -> CssParseError {
    let reason = match error.kind {
        ParseErrorKind::Custom(issue) => issue.to_string(),
        ParseErrorKind::Basic(kind) => format!("{kind:?}"),
    };
    CssParseError::Syntax {
        line: error.location.line + 1,
        column: error.location.column,
        reason,
    }
}

fn is_unexpected(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::CloseCurlyBracket
            | Token::CloseParenthesis
            | Token::CloseSquareBracket
            | Token::BadString(_)
            | Token::BadUrl(_)
    )
}

/// `(`, `[` and `name(` open a block whose contents `next()` only skips on
/// the following call.
fn opens_block(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock
    )
}

/// Consume the block just opened so `position()` lands past its closing
/// bracket. Nested blocks inside are skipped without recursion.
fn skip_block<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, ()> {
    parser.parse_nested_block(|nested| {
        while nested.next().is_ok() {}
        Ok(())
    })
}

fn parse_block<'i>(parser: &mut Parser<'i, '_>, depth: usize) -> ParseResult<'i, Vec<CssNode>> {
    parser.parse_nested_block(|nested| parse_items(nested, depth + 1))
}

fn parse_items<'i>(parser: &mut Parser<'i, '_>, depth: usize) -> ParseResult<'i, Vec<CssNode>> {
    if depth > MAX_NESTING_DEPTH {
        return Err(parser.new_custom_error(SyntaxIssue::TooDeep));
    }

    let nested = depth > 0;
    let mut nodes = Vec::new();

    loop {
        let start = parser.position();
        let state = parser.state();
        let Some(token) = parser.next().ok().cloned() else {
            break;
        };

        match token {
            Token::Semicolon | Token::CDO | Token::CDC => {}
            Token::AtKeyword(name) => {
                nodes.push(parse_at_rule(parser, name.to_ascii_lowercase(), depth)?);
            }
            Token::Ident(name) if nested => {
                if parser.try_parse(|p| p.expect_colon()).is_ok() {
                    nodes.push(parse_declaration_or_rule(parser, start, &name, depth)?);
                } else {
                    parser.reset(&state);
                    nodes.push(parse_qualified_rule(parser, start, depth)?);
                }
            }
            token if is_unexpected(&token) => {
                return Err(parser.new_unexpected_token_error(token));
            }
            _ => {
                parser.reset(&state);
                nodes.push(parse_qualified_rule(parser, start, depth)?);
            }
        }
    }

    Ok(nodes)
}

/// After `name:` inside a block: a declaration ending at `;` or the end of
/// the block, or a nested rule such as `a:hover { ... }` if a block follows.
fn parse_declaration_or_rule<'i>(
    parser: &mut Parser<'i, '_>,
    start: SourcePosition,
    name: &str,
    depth: usize,
) -> ParseResult<'i, CssNode> {
    let value_start = parser.position();

    loop {
        let value_end = parser.position();
        match parser.next().ok().cloned() {
            None | Some(Token::Semicolon) => {
                let value = parser.slice(value_start..value_end);
                return Ok(CssNode::Declaration {
                    property: name.to_string(),
                    value: IMPORTANT.replace(value.trim(), "").into_owned(),
                });
            }
            Some(Token::CurlyBracketBlock) => {
                let selector = parser.slice(start..value_end).trim().to_string();
                let children = parse_block(parser, depth)?;
                return Ok(CssNode::Rule { selector, children });
            }
            Some(token) if is_unexpected(&token) => {
                return Err(parser.new_unexpected_token_error(token));
            }
            Some(token) if opens_block(&token) => skip_block(parser)?,
            Some(_) => {}
        }
    }
}

fn parse_qualified_rule<'i>(
    parser: &mut Parser<'i, '_>,
    start: SourcePosition,
    depth: usize,
) -> ParseResult<'i, CssNode> {
    loop {
        let prelude_end = parser.position();
        match parser.next().ok().cloned() {
            Some(Token::CurlyBracketBlock) => {
                let selector = parser.slice(start..prelude_end).trim().to_string();
                let children = parse_block(parser, depth)?;
                return Ok(CssNode::Rule { selector, children });
            }
            None | Some(Token::Semicolon) => {
                let word = parser.slice(start..prelude_end).trim().to_string();
                return Err(parser.new_custom_error(SyntaxIssue::UnknownWord(word)));
            }
            Some(token) if is_unexpected(&token) => {
                return Err(parser.new_unexpected_token_error(token));
            }
            Some(token) if opens_block(&token) => skip_block(parser)?,
            Some(_) => {}
        }
    }
}

fn parse_at_rule<'i>(
    parser: &mut Parser<'i, '_>,
    name: String,
    depth: usize,
) -> ParseResult<'i, CssNode> {
    let params_start = parser.position();

    loop {
        let params_end = parser.position();
        match parser.next().ok().cloned() {
            None | Some(Token::Semicolon) => {
                return Ok(CssNode::AtRule {
                    name,
                    params: parser.slice(params_start..params_end).trim().to_string(),
                    children: Vec::new(),
                });
            }
            Some(Token::CurlyBracketBlock) => {
                let params = parser.slice(params_start..params_end).trim().to_string();
                let children = parse_block(parser, depth)?;
                return Ok(CssNode::AtRule {
                    name,
                    params,
                    children,
                });
            }
            Some(token) if is_unexpected(&token) => {
                return Err(parser.new_unexpected_token_error(token));
            }
            Some(token) if opens_block(&token) => skip_block(parser)?,
            Some(_) => {}
        }
    }
}

/// What the lenient scan could recover from unparseable CSS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LenientScan {
    /// Lowercased (property, value) pairs
    pub declarations: Vec<(String, String)>,
    /// Lowercased at-rule names without the `@`
    pub at_rules: Vec<String>,
}

/// Recover properties and at-rules by pattern matching.
///
/// Comments are stripped first. Any `name:` token (two or more characters,
/// not starting with `-`) counts as a property.
#[must_use]
pub fn scan_lenient(css: &str) -> LenientScan {
    let lowered = css.to_lowercase();
    let text = COMMENT.replace_all(&lowered, " ");

    let declarations = LENIENT_DECLARATION
        .captures_iter(&text)
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
        .collect();

    let at_rules = LENIENT_AT_RULE
        .captures_iter(&text)
        .map(|caps| caps[1].to_string())
        .collect();

    LenientScan {
        declarations,
        at_rules,
    }
}
