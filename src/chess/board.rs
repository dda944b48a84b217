//! Board-level vocabulary shared by the oracle, the parser and the renderer.
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Side that plays the given half-move: even plies are White's.
    pub fn from_ply(ply: u32) -> Color {
        if ply % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// SAN piece letter. Pawn moves carry no letter, so `P` is not accepted.
    pub fn from_san_char(c: char) -> Option<Piece> {
        match c {
            'N' => Some(Piece::Knight),
            'B' => Some(Piece::Bishop),
            'R' => Some(Piece::Rook),
            'Q' => Some(Piece::Queen),
            'K' => Some(Piece::King),
            _ => None,
        }
    }

    /// White figurine glyph used when rendering move text.
    pub fn figurine(&self) -> char {
        match self {
            Piece::Knight => '♘',
            Piece::Bishop => '♗',
            Piece::Rook => '♖',
            Piece::Queen => '♕',
            Piece::King => '♔',
        }
    }
}

/// Owned copy of a board position, detached from whichever oracle produced
/// it. This is what move nodes and diagram markers carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionSnapshot {
    /// Canonical FEN of the position.
    pub fen: String,
    /// Side to move in this position.
    pub side_to_move: Color,
}

impl PositionSnapshot {
    /// FEN without the halfmove clock and fullmove number, handy when two
    /// positions are compared regardless of how they were reached.
    pub fn placement_key(&self) -> &str {
        let mut end = self.fen.len();
        for _ in 0..2 {
            match self.fen[..end].rfind(' ') {
                Some(idx) => end = idx,
                None => break,
            }
        }
        &self.fen[..end]
    }
}

impl fmt::Display for PositionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.fen)
    }
}
