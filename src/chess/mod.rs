pub mod board;
pub mod oracle;

pub use board::{Color, Piece, PositionSnapshot};
pub use oracle::{BoardPosition, MoveOracle, ShakmatyOracle};
