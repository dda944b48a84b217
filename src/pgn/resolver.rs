//! Position resolver: turns move candidates into position-carrying nodes.

use tracing::trace;

use super::classify::{classify, Classified, MoveCandidate};
use super::tokenizer::{tokenize, TokenKind};
use super::tree::{Inline, MoveNode};
use crate::chess::{BoardPosition, Color, MoveOracle};

/// Number prefix for the move at `ply`. White moves are always numbered;
/// Black moves only after an interruption of the line.
pub fn number_label(ply: u32, interrupted: bool) -> Option<String> {
    let move_number = ply / 2 + 1;
    match Color::from_ply(ply) {
        Color::White => Some(format!("{}.", move_number)),
        Color::Black if interrupted => Some(format!("{}...", move_number)),
        Color::Black => None,
    }
}

/// Ask the oracle to play `candidate` from `before`. On success returns the
/// new position and the node describing the move.
pub fn resolve_move<O: MoveOracle>(
    oracle: &O,
    before: &O::Position,
    candidate: &MoveCandidate,
    ply: u32,
    interrupted: bool,
) -> Option<(O::Position, MoveNode)> {
    let after = match oracle.try_move(before, &candidate.san) {
        Ok(after) => after,
        Err(illegal) => {
            trace!(ply, "{}", illegal);
            return None;
        }
    };

    let node = MoveNode {
        display_text: candidate.display.clone(),
        san: candidate.san.clone(),
        ply,
        color: Color::from_ply(ply),
        move_number: ply / 2 + 1,
        number_label: number_label(ply, interrupted),
        annotation: candidate.annotation,
        position_after: after.snapshot(),
        variations: Vec::new(),
    };
    Some((after, node))
}

/// Strip prose punctuation stuck to the end of a word in a comment, as in
/// `"Nf3,"`. Returns the word and the punctuation.
fn split_trailing_punctuation(word: &str) -> (&str, &str) {
    let core = word.trim_end_matches(&[',', ';', ':', '.'][..]);
    (core, &word[core.len()..])
}

/// Classify a comment word the way the parser would, allowing trailing
/// prose punctuation after a move.
fn comment_move(word: &str) -> Option<(MoveCandidate, &str)> {
    if let Classified::Move(candidate) = classify(word) {
        return Some((candidate, ""));
    }
    let (core, trailing) = split_trailing_punctuation(word);
    if trailing.is_empty() {
        return None;
    }
    match classify(core) {
        Classified::Move(candidate) => Some((candidate, trailing)),
        _ => None,
    }
}

/// Whether a comment contains at least one word that reads as a move.
pub fn mentions_moves(text: &str) -> bool {
    tokenize(text).any(|token| match token.kind {
        TokenKind::Bare(word) => {
            let word = match classify(word) {
                Classified::MoveNumber { rest: Some(rest), .. } => rest,
                _ => word,
            };
            comment_move(word).is_some()
        }
        _ => false,
    })
}

fn push_text(inlines: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(last)) = inlines.last_mut() {
        last.push_str(text);
    } else {
        inlines.push(Inline::Text(text.to_string()));
    }
}

fn push_space(inlines: &mut Vec<Inline>) {
    match inlines.last() {
        Some(Inline::Text(last)) if last.ends_with(' ') => {}
        _ => push_text(inlines, " "),
    }
}

/// Replay the moves of a line comment against a private copy of the
/// position the comment is attached to.
///
/// The copy belongs to this call alone; nothing it plays leaks back into
/// the line that owns the comment. Words that are not legal moves stay
/// text, and move-number labels are dropped because the replayed moves are
/// renumbered.
pub fn replay_line_comment<O: MoveOracle>(
    oracle: &O,
    position: &O::Position,
    start_ply: u32,
    text: &str,
) -> Vec<Inline> {
    let mut scratch = position.clone();
    let mut ply = start_ply;
    let mut interrupted = true;
    let mut inlines = Vec::new();

    for token in tokenize(text) {
        let word = match token.kind {
            TokenKind::Bare(word) => word,
            TokenKind::Whitespace => {
                push_space(&mut inlines);
                continue;
            }
            _ => {
                push_text(&mut inlines, token.raw);
                continue;
            }
        };

        let word = match classify(word) {
            Classified::MoveNumber { rest: None, .. } => continue,
            Classified::MoveNumber { rest: Some(rest), .. } => rest,
            _ => word,
        };

        let Some((candidate, trailing)) = comment_move(word) else {
            push_text(&mut inlines, word);
            continue;
        };
        match resolve_move(oracle, &scratch, &candidate, ply, interrupted) {
            Some((next, node)) => {
                scratch = next;
                ply += 1;
                interrupted = false;
                inlines.push(Inline::Move(node));
                if !trailing.is_empty() {
                    push_text(&mut inlines, trailing);
                }
            }
            None => push_text(&mut inlines, word),
        }
    }

    inlines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::ShakmatyOracle;

    #[test]
    fn test_number_label() {
        assert_eq!(number_label(0, false).as_deref(), Some("1."));
        assert_eq!(number_label(1, false), None);
        assert_eq!(number_label(1, true).as_deref(), Some("1..."));
        assert_eq!(number_label(4, true).as_deref(), Some("3."));
        assert_eq!(number_label(5, true).as_deref(), Some("3..."));
    }

    #[test]
    fn test_mentions_moves() {
        assert!(mentions_moves("better was Nf3, keeping control"));
        assert!(mentions_moves("5. Nf3 Nc6"));
        assert!(!mentions_moves("a good developing move"));
        assert!(!mentions_moves(""));
    }

    #[test]
    fn test_replay_uses_private_position() {
        let oracle = ShakmatyOracle::new();
        let start = oracle.initial_position();
        let inlines = replay_line_comment(&oracle, &start, 0, "or 1. d4 d5, solid");

        let moves: Vec<_> = inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Move(node) => Some(node.label()),
                _ => None,
            })
            .collect();
        assert_eq!(moves, vec!["1. d4", "d5"]);

        // The original position is untouched.
        assert_eq!(start.ply(), 0);
        assert!(matches!(inlines.last(), Some(Inline::Text(text)) if text == ", solid"));
    }

    #[test]
    fn test_replay_keeps_illegal_words_as_text() {
        let oracle = ShakmatyOracle::new();
        let start = oracle.initial_position();
        let inlines = replay_line_comment(&oracle, &start, 0, "Nf6 is not possible");
        assert_eq!(inlines, vec![Inline::Text("Nf6 is not possible".to_string())]);
    }
}
