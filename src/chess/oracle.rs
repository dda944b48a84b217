use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position};

use super::board::{Color, PositionSnapshot};
use crate::error::IllegalMove;

/// A position the parser can carry around without knowing the rules.
pub trait BoardPosition: Clone {
    /// Canonical FEN of this position.
    fn fen(&self) -> String;

    fn side_to_move(&self) -> Color;

    /// Half-moves played since the start of the game, derived from the
    /// fullmove number and the side to move.
    fn ply(&self) -> u32;

    fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            fen: self.fen(),
            side_to_move: self.side_to_move(),
        }
    }
}

/// Move-rules capability injected into the parser.
///
/// The parser never decides legality itself. It hands every move candidate
/// to the oracle together with the position of the line it belongs to, and
/// only builds a move node when the oracle returns the follow-up position.
pub trait MoveOracle {
    type Position: BoardPosition;

    fn initial_position(&self) -> Self::Position;

    /// Play `token` (SAN, optionally with check and annotation suffixes) in
    /// `position`, returning the resulting position.
    fn try_move(&self, position: &Self::Position, token: &str)
        -> Result<Self::Position, IllegalMove>;

    /// Build a starting position from a FEN string, for games that carry a
    /// `FEN` tag.
    fn setup_position(&self, fen: &str) -> Result<Self::Position, String>;
}

/// Largest fullmove number accepted from a FEN. Keeps every ply the parser
/// derives from it, plus any movetext after it, well inside `u32`.
pub const MAX_FULLMOVES: u32 = 1_000_000;

/// Standard chess rules backed by `shakmaty`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyOracle;

impl ShakmatyOracle {
    pub fn new() -> Self {
        ShakmatyOracle
    }
}

impl BoardPosition for Chess {
    fn fen(&self) -> String {
        Fen::from_position(self.clone(), EnPassantMode::Legal).to_string()
    }

    fn side_to_move(&self) -> Color {
        match self.turn() {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }

    fn ply(&self) -> u32 {
        let full_moves = self.fullmoves().get();
        let offset = match self.turn() {
            shakmaty::Color::White => 0,
            shakmaty::Color::Black => 1,
        };
        (full_moves - 1).saturating_mul(2).saturating_add(offset)
    }
}

impl MoveOracle for ShakmatyOracle {
    type Position = Chess;

    fn initial_position(&self) -> Chess {
        Chess::default()
    }

    fn try_move(&self, position: &Chess, token: &str) -> Result<Chess, IllegalMove> {
        // Annotation glyphs are not part of SAN.
        let san_text = token.trim_end_matches(&['!', '?'][..]);
        let san_plus: SanPlus = san_text
            .parse()
            .map_err(|e| IllegalMove::new(token, format!("{}", e)))?;
        let chess_move = san_plus
            .san
            .to_move(position)
            .map_err(|e| IllegalMove::new(token, format!("{}", e)))?;

        let mut next = position.clone();
        next.play_unchecked(&chess_move);
        Ok(next)
    }

    fn setup_position(&self, fen: &str) -> Result<Chess, String> {
        let parsed: Fen = fen.trim().parse().map_err(|e| format!("{}", e))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| format!("{}", e))?;

        let full_moves = position.fullmoves().get();
        if full_moves > MAX_FULLMOVES {
            return Err(format!(
                "fullmove number {} exceeds {}",
                full_moves, MAX_FULLMOVES
            ));
        }
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_initial_position() {
        let oracle = ShakmatyOracle::new();
        let start = oracle.initial_position();
        assert_eq!(start.fen(), START_FEN);
        assert_eq!(start.side_to_move(), Color::White);
        assert_eq!(start.ply(), 0);
    }

    #[test]
    fn test_legal_and_illegal_moves() {
        let oracle = ShakmatyOracle::new();
        let start = oracle.initial_position();

        let after = oracle.try_move(&start, "e4").expect("e4 is legal");
        assert_eq!(after.side_to_move(), Color::Black);
        assert_eq!(after.ply(), 1);

        assert!(oracle.try_move(&start, "e5").is_err());
        assert!(oracle.try_move(&start, "Qz9").is_err());
        assert!(oracle.try_move(&start, "O-O").is_err());
    }

    #[test]
    fn test_annotation_suffix_is_ignored() {
        let oracle = ShakmatyOracle::new();
        let start = oracle.initial_position();
        let plain = oracle.try_move(&start, "Nf3").unwrap();
        let annotated = oracle.try_move(&start, "Nf3!?").unwrap();
        assert_eq!(plain.fen(), annotated.fen());
    }

    #[test]
    fn test_setup_position_from_fen() {
        let oracle = ShakmatyOracle::new();
        let pos = oracle
            .setup_position("4k3/8/8/8/8/8/4P3/4K3 b - - 0 12")
            .expect("valid FEN");
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.ply(), 23);

        assert!(oracle.setup_position("not a fen").is_err());
    }

    #[test]
    fn test_setup_position_rejects_huge_fullmove() {
        let oracle = ShakmatyOracle::new();
        assert!(oracle
            .setup_position("4k3/8/8/8/8/8/4P3/4K3 w - - 0 4294967295")
            .is_err());
        assert!(oracle
            .setup_position("4k3/8/8/8/8/8/4P3/4K3 b - - 0 2147483648")
            .is_err());

        let pos = oracle
            .setup_position("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1000000")
            .expect("largest accepted fullmove");
        assert_eq!(pos.ply(), 1_999_999);
    }
}
