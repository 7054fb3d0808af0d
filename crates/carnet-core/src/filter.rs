//! Memo filter expression parser.
//!
//! The filter language is a fixed set of predicates joined by `&&`:
//!
//! ```text
//! tag in ["work", "errand"] && creator == "users/octocat" &&
//! content.contains("milk") && pinned == true
//! ```
//!
//! Predicates are extracted independently and order-insensitively; absence
//! of a predicate means "no constraint". The default [`MemoFilter::parse`]
//! skips conjuncts it does not recognize, recording them in
//! [`MemoFilter::ignored`] and logging a warning, so the condition is
//! observable. [`MemoFilter::parse_strict`] turns the first unrecognized
//! conjunct into an error instead.

use tracing::warn;

use crate::error::{Error, Result};

// =============================================================================
// TOKENIZER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    EqEq,
    AndAnd,
    Unknown(char),
}

/// A token plus its byte offset in the source, kept so unrecognized
/// conjuncts can be reported verbatim.
#[derive(Debug, Clone, PartialEq)]
struct Spanned {
    token: Token,
    start: usize,
}

fn tokenize(input: &str) -> Vec<Spanned> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '[' | ']' | '(' | ')' | ',' | '.' => {
                chars.next();
                let token = match c {
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    _ => Token::Dot,
                };
                tokens.push(Spanned { token, start });
            }
            '=' => {
                chars.next();
                if chars.peek().map(|&(_, c)| c) == Some('=') {
                    chars.next();
                    tokens.push(Spanned {
                        token: Token::EqEq,
                        start,
                    });
                } else {
                    tokens.push(Spanned {
                        token: Token::Unknown('='),
                        start,
                    });
                }
            }
            '&' => {
                chars.next();
                if chars.peek().map(|&(_, c)| c) == Some('&') {
                    chars.next();
                    tokens.push(Spanned {
                        token: Token::AndAnd,
                        start,
                    });
                } else {
                    tokens.push(Spanned {
                        token: Token::Unknown('&'),
                        start,
                    });
                }
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        c => value.push(c),
                    }
                }
                // An unterminated string still yields a token so the
                // surrounding conjunct fails as one unit.
                let token = if closed {
                    Token::Str(value)
                } else {
                    Token::Unknown('"')
                };
                tokens.push(Spanned { token, start });
            }
            c if c.is_alphanumeric() || c == '_' || c == '-' || c == '/' => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '-' || c == '/' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Spanned {
                    token: Token::Ident(ident),
                    start,
                });
            }
            c => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Unknown(c),
                    start,
                });
            }
        }
    }

    tokens
}

// =============================================================================
// PREDICATES
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    TagIn(Vec<String>),
    CreatorEq(String),
    ContentContains(String),
    PinnedEq(bool),
}

struct ConjunctParser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> ConjunctParser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos).map(|t| &t.token);
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> std::result::Result<(), ()> {
        if self.next() == Some(expected) {
            Ok(())
        } else {
            Err(())
        }
    }

    fn expect_ident(&mut self, name: &str) -> std::result::Result<(), ()> {
        match self.next() {
            Some(Token::Ident(ident)) if ident == name => Ok(()),
            _ => Err(()),
        }
    }

    fn string(&mut self) -> std::result::Result<String, ()> {
        match self.next() {
            Some(Token::Str(value)) => Ok(value.clone()),
            _ => Err(()),
        }
    }

    /// Tag list elements may be quoted strings or bare words.
    fn tag(&mut self) -> std::result::Result<String, ()> {
        match self.next() {
            Some(Token::Str(value)) => Ok(value.clone()),
            Some(Token::Ident(value)) => Ok(value.clone()),
            _ => Err(()),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Parse exactly one predicate consuming the whole conjunct.
    fn parse(mut self) -> std::result::Result<Predicate, ()> {
        let head = match self.next() {
            Some(Token::Ident(ident)) => ident.clone(),
            _ => return Err(()),
        };

        let predicate = match head.as_str() {
            "tag" => {
                self.expect_ident("in")?;
                self.expect(&Token::LBracket)?;
                let mut tags = vec![self.tag()?];
                while self.peek() == Some(&Token::Comma) {
                    self.next();
                    tags.push(self.tag()?);
                }
                self.expect(&Token::RBracket)?;
                Predicate::TagIn(tags)
            }
            "creator" => {
                self.expect(&Token::EqEq)?;
                Predicate::CreatorEq(self.string()?)
            }
            "content" => {
                self.expect(&Token::Dot)?;
                self.expect_ident("contains")?;
                self.expect(&Token::LParen)?;
                let needle = self.string()?;
                self.expect(&Token::RParen)?;
                Predicate::ContentContains(needle)
            }
            "pinned" => {
                self.expect(&Token::EqEq)?;
                match self.next() {
                    Some(Token::Ident(value)) if value == "true" => Predicate::PinnedEq(true),
                    Some(Token::Ident(value)) if value == "false" => Predicate::PinnedEq(false),
                    _ => return Err(()),
                }
            }
            _ => return Err(()),
        };

        if self.at_end() {
            Ok(predicate)
        } else {
            Err(())
        }
    }
}

// =============================================================================
// FILTER
// =============================================================================

/// Predicates extracted from a filter expression.
///
/// All set predicates combine with implicit AND. The tag predicate is
/// intended for push-down into the backing list query; creator, content
/// and pinned predicates are applied as a post-filter over fetched pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoFilter {
    pub tags: Option<Vec<String>>,
    pub creator: Option<String>,
    pub content_search: Option<String>,
    pub pinned: Option<bool>,
    /// Conjuncts the parser did not recognize, verbatim.
    pub ignored: Vec<String>,
}

impl MemoFilter {
    /// Parse an expression, skipping unrecognized conjuncts.
    pub fn parse(input: &str) -> MemoFilter {
        let filter = Self::parse_inner(input);
        for fragment in &filter.ignored {
            warn!(fragment = %fragment, "ignoring unrecognized filter conjunct");
        }
        filter
    }

    /// Parse an expression, failing on the first unrecognized conjunct.
    pub fn parse_strict(input: &str) -> Result<MemoFilter> {
        let filter = Self::parse_inner(input);
        match filter.ignored.first() {
            Some(fragment) => Err(Error::InvalidInput(format!(
                "unrecognized filter conjunct: {fragment}"
            ))),
            None => Ok(filter),
        }
    }

    fn parse_inner(input: &str) -> MemoFilter {
        let mut filter = MemoFilter::default();
        if input.trim().is_empty() {
            return filter;
        }

        let tokens = tokenize(input);

        // Conjunct boundaries are top-level `&&` tokens; the tokenizer has
        // already consumed string literals, so a `&&` inside one cannot
        // split a conjunct.
        let mut groups: Vec<(&[Spanned], usize, usize)> = Vec::new();
        let mut group_start = 0;
        for (i, spanned) in tokens.iter().enumerate() {
            if spanned.token == Token::AndAnd {
                let span_end = spanned.start;
                let span_start = tokens[group_start].start;
                groups.push((&tokens[group_start..i], span_start, span_end));
                group_start = i + 1;
            }
        }
        if group_start < tokens.len() {
            let span_start = tokens[group_start].start;
            groups.push((&tokens[group_start..], span_start, input.len()));
        }

        for (group, span_start, span_end) in groups {
            match ConjunctParser::new(group).parse() {
                Ok(predicate) => filter.apply(predicate),
                Err(()) => {
                    let fragment = input[span_start..span_end].trim();
                    if !fragment.is_empty() {
                        filter.ignored.push(fragment.to_string());
                    }
                }
            }
        }

        filter
    }

    /// First predicate of each kind wins; later duplicates are dropped.
    fn apply(&mut self, predicate: Predicate) {
        match predicate {
            Predicate::TagIn(tags) => {
                if self.tags.is_none() {
                    self.tags = Some(tags);
                }
            }
            Predicate::CreatorEq(creator) => {
                if self.creator.is_none() {
                    self.creator = Some(creator);
                }
            }
            Predicate::ContentContains(needle) => {
                if self.content_search.is_none() {
                    self.content_search = Some(needle);
                }
            }
            Predicate::PinnedEq(pinned) => {
                if self.pinned.is_none() {
                    self.pinned = Some(pinned);
                }
            }
        }
    }

    /// True when no predicate is set (ignored fragments do not count).
    pub fn is_empty(&self) -> bool {
        self.tags.is_none()
            && self.creator.is_none()
            && self.content_search.is_none()
            && self.pinned.is_none()
    }
}
