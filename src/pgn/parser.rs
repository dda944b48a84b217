use serde::Serialize;
use tracing::{debug, trace};

use super::classify::{classify, Classified, GameResult};
use super::context::ContextStack;
use super::header::{split_headers, Headers};
use super::resolver::{mentions_moves, replay_line_comment, resolve_move};
use super::tokenizer::{tokenize, TokenKind};
use super::tree::{CommentKind, CommentNode, DiagramMarker, GameTree, Inline, LineItem, Run};
use crate::chess::{BoardPosition, MoveOracle, ShakmatyOracle};
use crate::error::{PgnError, Result};

/// Parser configuration
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    max_tokens: Option<usize>,
}

impl ParseOptions {
    pub fn new() -> Self {
        ParseOptions { max_tokens: None }
    }

    /// Fail the parse once the movetext yields more than `max` tokens.
    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn max_tokens(&self) -> Option<usize> {
        self.max_tokens
    }
}

/// A fully parsed game: tags, title line and the resolved movetext.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedGame {
    pub headers: Headers,
    pub title: String,
    pub tree: GameTree,
}

/// Parses PGN games against an injected move oracle.
///
/// The parser itself holds no per-game state, so one instance can parse any
/// number of games, from several threads if the oracle allows it.
#[derive(Debug, Clone, Default)]
pub struct GameParser<O> {
    oracle: O,
    options: ParseOptions,
}

impl GameParser<ShakmatyOracle> {
    /// Parser with standard chess rules.
    pub fn standard() -> Self {
        GameParser::new(ShakmatyOracle::new())
    }
}

impl<O: MoveOracle> GameParser<O> {
    pub fn new(oracle: O) -> Self {
        GameParser {
            oracle,
            options: ParseOptions::new(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse one game: optional tag pairs followed by movetext.
    pub fn parse(&self, text: &str) -> Result<ParsedGame> {
        let (headers, movetext) = split_headers(text)?;

        let start = match headers.fen() {
            Some(fen) => self
                .oracle
                .setup_position(fen)
                .map_err(|reason| PgnError::HeaderInvalid {
                    line: header_line_of(text, "FEN"),
                    reason: format!("invalid FEN tag: {}", reason),
                })?,
            None => self.oracle.initial_position(),
        };

        let mut tree = self.parse_movetext(movetext, start)?;

        // The movetext result wins; the tag only fills in a missing one.
        if tree.result.is_none() {
            if let Some(result) = headers.result() {
                let mut run = Run::default();
                run.inlines.push(Inline::Space);
                run.inlines.push(Inline::Result(result));
                tree.mainline.items.push(LineItem::Run(run));
                tree.result = Some(result);
            }
        }

        let title = headers.title_line();
        debug!(
            moves = tree.mainline_moves().count(),
            diagrams = tree.diagrams.len(),
            "parsed game"
        );
        Ok(ParsedGame { headers, title, tree })
    }

    /// Parse bare movetext starting from `start`.
    pub fn parse_movetext(&self, movetext: &str, start: O::Position) -> Result<GameTree> {
        let mut state = ParseState::new(&self.oracle, start);
        for (count, token) in tokenize(movetext).enumerate() {
            if let Some(limit) = self.options.max_tokens() {
                if count >= limit {
                    return Err(PgnError::TokenLimitExceeded { limit });
                }
            }
            match token.kind {
                TokenKind::Whitespace => state.whitespace(),
                TokenKind::OpenVariation => state.open_variation(),
                TokenKind::CloseVariation => state.close_variation(),
                TokenKind::Comment { text, terminated } => {
                    if !terminated {
                        debug!("unterminated comment runs to end of input");
                    }
                    state.comment(text)
                }
                TokenKind::Bare(text) => state.bare(text),
            }
        }
        Ok(state.finish())
    }
}

/// Parse one game with standard chess rules.
pub fn parse_game(text: &str) -> Result<ParsedGame> {
    GameParser::standard().parse(text)
}

/// 1-based line number of the first header line carrying `tag`.
fn header_line_of(text: &str, tag: &str) -> usize {
    let needle = format!("[{}", tag);
    text.lines()
        .position(|line| line.trim_start().starts_with(&needle))
        .map(|idx| idx + 1)
        .unwrap_or(1)
}

/// Mutable state of one parse call.
struct ParseState<'o, O: MoveOracle> {
    oracle: &'o O,
    contexts: ContextStack<O::Position>,
    diagrams: Vec<DiagramMarker>,
    result: Option<GameResult>,
}

impl<'o, O: MoveOracle> ParseState<'o, O> {
    fn new(oracle: &'o O, start: O::Position) -> Self {
        ParseState {
            oracle,
            contexts: ContextStack::new(start),
            diagrams: Vec::new(),
            result: None,
        }
    }

    fn whitespace(&mut self) {
        self.contexts.current_mut().push_space();
    }

    fn open_variation(&mut self) {
        self.contexts.open_variation();
    }

    fn close_variation(&mut self) {
        if !self.contexts.close_variation() {
            debug!("ignoring `)` with no open variation");
        }
    }

    fn diagram(&mut self) {
        let ctx = self.contexts.current_mut();
        let marker = DiagramMarker {
            id: self.diagrams.len(),
            ply: ctx.ply(),
            position: ctx.position.snapshot(),
        };
        self.diagrams.push(marker.clone());
        ctx.push_item(LineItem::Diagram(marker));
    }

    fn comment(&mut self, raw: &str) {
        let text = raw.replace("\\}", "}");
        let mut spans = text.split("[D]").peekable();

        while let Some(span) = spans.next() {
            self.comment_span(span.trim());
            if spans.peek().is_some() {
                self.diagram();
            }
        }
        self.contexts.current_mut().interrupt();
    }

    fn comment_span(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let ctx = self.contexts.current_mut();
        let ply = ctx.ply();

        let node = if mentions_moves(text) {
            CommentNode {
                kind: CommentKind::LineComment,
                ply,
                text: text.to_string(),
                inlines: replay_line_comment(self.oracle, &ctx.position, ply, text),
            }
        } else {
            CommentNode {
                kind: CommentKind::Annotation,
                ply,
                text: text.to_string(),
                inlines: vec![Inline::Text(text.to_string())],
            }
        };
        ctx.push_item(LineItem::Comment(node));
    }

    fn bare(&mut self, text: &str) {
        match classify(text) {
            Classified::Result(result) => {
                // Only the mainline decides the game result.
                if self.contexts.depth() > 0 {
                    trace!(%result, "result marker inside a variation");
                    self.contexts.current_mut().push_inline(Inline::Result(result));
                    return;
                }
                if self.result.is_some() {
                    debug!(%result, "suppressing repeated result marker");
                    return;
                }
                self.result = Some(result);
                self.contexts.current_mut().push_inline(Inline::Result(result));
            }
            Classified::MoveNumber { rest, .. } => {
                if let Some(rest) = rest {
                    self.bare(rest);
                }
            }
            Classified::Diagram => self.diagram(),
            Classified::Nag(Some(nag)) => {
                self.contexts.current_mut().push_inline(Inline::Nag(nag));
            }
            Classified::Nag(None) => trace!(token = text, "dropping unknown NAG"),
            Classified::Move(candidate) => {
                let ctx = self.contexts.current_mut();
                match resolve_move(
                    self.oracle,
                    &ctx.position,
                    &candidate,
                    ctx.ply(),
                    ctx.last_was_interrupt,
                ) {
                    Some((next, node)) => ctx.push_move(next, node),
                    None => {
                        debug!(token = text, ply = ctx.ply(), "illegal move kept as text");
                        ctx.push_inline(Inline::Text(text.to_string()));
                    }
                }
            }
            Classified::Literal => {
                self.contexts
                    .current_mut()
                    .push_inline(Inline::Text(text.to_string()));
            }
        }
    }

    fn finish(self) -> GameTree {
        GameTree {
            mainline: self.contexts.finish(),
            diagrams: self.diagrams,
            result: self.result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_limit() {
        let parser = GameParser::standard().with_options(ParseOptions::new().with_max_tokens(3));
        let err = parser.parse("1. e4 e5 2. Nf3").unwrap_err();
        assert_eq!(err, PgnError::TokenLimitExceeded { limit: 3 });

        assert!(parser.parse("1. e4").is_ok());
    }

    #[test]
    fn test_header_result_fills_missing_marker() {
        let game = parse_game("[Result \"1-0\"]\n\n1. e4 e5").unwrap();
        assert_eq!(game.tree.result, Some(GameResult::WhiteWins));

        let game = parse_game("[Result \"1-0\"]\n\n1. e4 e5 1-0").unwrap();
        let markers = game
            .tree
            .mainline
            .items
            .iter()
            .filter_map(|item| match item {
                LineItem::Run(run) => Some(run),
                _ => None,
            })
            .flat_map(|run| run.inlines.iter())
            .filter(|inline| matches!(inline, Inline::Result(_)))
            .count();
        assert_eq!(markers, 1);
    }

    #[test]
    fn test_bad_fen_tag_is_header_error() {
        let err = parse_game("[Event \"x\"]\n[FEN \"nonsense\"]\n\n1. e4").unwrap_err();
        assert!(matches!(err, PgnError::HeaderInvalid { line: 2, .. }));
    }

    #[test]
    fn test_out_of_range_fullmove_is_header_error() {
        for fullmove in ["4294967295", "2147483648"] {
            let text = format!(
                "[Event \"x\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 {}\"]\n\n1. Kd2 (1. Kf2) Kd7",
                fullmove
            );
            let err = parse_game(&text).unwrap_err();
            assert!(
                matches!(err, PgnError::HeaderInvalid { line: 2, .. }),
                "fullmove {} should be rejected, got {:?}",
                fullmove,
                err
            );
        }
    }

    #[test]
    fn test_result_inside_variation_does_not_end_game() {
        let game = parse_game("1. e4 (1. d4 1-0) e5 0-1").unwrap();
        assert_eq!(game.tree.result, Some(GameResult::BlackWins));

        let e4 = game.tree.mainline_moves().next().unwrap();
        let variation_results = e4.variations[0]
            .items
            .iter()
            .filter_map(|item| match item {
                LineItem::Run(run) => Some(run.inlines.iter()),
                _ => None,
            })
            .flatten()
            .filter(|inline| matches!(inline, Inline::Result(GameResult::WhiteWins)))
            .count();
        assert_eq!(variation_results, 1);
    }
}
