//! PGN movetext parser and position resolver
//!
//! Reads a PGN game (tag pairs plus movetext) into a tree of moves, comments,
//! diagrams and nested variations, with the board position after every move
//! resolved through a pluggable move oracle.

pub mod chess;
pub mod error;
pub mod pgn;

pub use chess::{BoardPosition, Color, MoveOracle, PositionSnapshot, ShakmatyOracle};
pub use error::{IllegalMove, PgnError};
pub use pgn::{parse_game, GameParser, GameTree, ParseOptions, ParsedGame, TextRenderer};
