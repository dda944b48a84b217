//! Movetext tokenizer.
//!
//! Splits raw movetext into whitespace runs, parentheses, brace comments and
//! bare tokens. It knows nothing about chess: deciding whether `Nf3` is a
//! move or `$1` is a NAG happens later, in `classify`.
//!
//! ```
//! use pgnview::pgn::tokenizer::{tokenize, TokenKind};
//!
//! let kinds: Vec<_> = tokenize("1. e4 {best}").map(|t| t.kind).collect();
//! assert_eq!(kinds, vec![
//!     TokenKind::Bare("1."),
//!     TokenKind::Whitespace,
//!     TokenKind::Bare("e4"),
//!     TokenKind::Whitespace,
//!     TokenKind::Comment { text: "best", terminated: true },
//! ]);
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Whitespace,
    OpenVariation,
    CloseVariation,
    /// Brace comment; `text` is the verbatim content between the braces.
    Comment { text: &'a str, terminated: bool },
    Bare(&'a str),
}

/// A lexical unit together with the exact source text it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub raw: &'a str,
}

/// Lazy token stream over one movetext string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    source: &'a str,
    pos: usize,
}

pub fn tokenize(source: &str) -> Tokens<'_> {
    Tokens { source, pos: 0 }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '{' | '}')
}

impl<'a> Tokens<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn take(&mut self, len: usize, kind: TokenKind<'a>) -> Token<'a> {
        let raw = &self.source[self.pos..self.pos + len];
        self.pos += len;
        Token { kind, raw }
    }

    fn comment(&mut self) -> Token<'a> {
        let rest = self.rest();
        let body = &rest[1..];
        let mut escaped = false;
        for (idx, c) in body.char_indices() {
            match c {
                '\\' if !escaped => escaped = true,
                '}' if !escaped => {
                    let text = &body[..idx];
                    return self.take(idx + 2, TokenKind::Comment { text, terminated: true });
                }
                _ => escaped = false,
            }
        }
        self.take(rest.len(), TokenKind::Comment { text: body, terminated: false })
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        let first = rest.chars().next()?;

        let token = match first {
            '(' => self.take(1, TokenKind::OpenVariation),
            ')' => self.take(1, TokenKind::CloseVariation),
            '{' => self.comment(),
            '}' => self.take(1, TokenKind::Bare("}")),
            c if c.is_whitespace() => {
                let len = rest
                    .char_indices()
                    .find(|&(_, c)| !c.is_whitespace())
                    .map(|(idx, _)| idx)
                    .unwrap_or(rest.len());
                self.take(len, TokenKind::Whitespace)
            }
            _ => {
                let len = rest
                    .char_indices()
                    .find(|&(_, c)| is_delimiter(c))
                    .map(|(idx, _)| idx)
                    .unwrap_or(rest.len());
                let text = &rest[..len];
                self.take(len, TokenKind::Bare(text))
            }
        };
        Some(token)
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind<'_>> {
        tokenize(source).map(|t| t.kind).collect()
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(
            kinds("e4 \n\t e5"),
            vec![TokenKind::Bare("e4"), TokenKind::Whitespace, TokenKind::Bare("e5")]
        );
    }

    #[test]
    fn test_parentheses_split_bare_tokens() {
        assert_eq!(
            kinds("Bb5(Bc4)a6"),
            vec![
                TokenKind::Bare("Bb5"),
                TokenKind::OpenVariation,
                TokenKind::Bare("Bc4"),
                TokenKind::CloseVariation,
                TokenKind::Bare("a6"),
            ]
        );
    }

    #[test]
    fn test_comment_does_not_nest() {
        assert_eq!(
            kinds("{a {b} c}"),
            vec![
                TokenKind::Comment { text: "a {b", terminated: true },
                TokenKind::Whitespace,
                TokenKind::Bare("c"),
                TokenKind::Bare("}"),
            ]
        );
    }

    #[test]
    fn test_escaped_brace_stays_in_comment() {
        assert_eq!(
            kinds(r"{x \} y}"),
            vec![TokenKind::Comment { text: r"x \} y", terminated: true }]
        );
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        let tokens: Vec<_> = tokenize("e4 {abc").collect();
        assert_eq!(
            tokens.last().unwrap().kind,
            TokenKind::Comment { text: "abc", terminated: false }
        );
        assert_eq!(tokens.last().unwrap().raw, "{abc");
    }

    #[test]
    fn test_tokenize_is_restartable() {
        let source = "1. e4 (1. d4) e5";
        let first: Vec<_> = tokenize(source).collect();
        let second: Vec<_> = tokenize(source).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_multibyte_bare_token() {
        assert_eq!(kinds("½-½"), vec![TokenKind::Bare("½-½")]);
    }
}
