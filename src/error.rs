use thiserror::Error;

/// Errors that abort the parse of a whole game.
///
/// Problems inside the movetext never show up here: an illegal move, an
/// unterminated comment or an unbalanced parenthesis is recovered in place
/// and the game still parses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PgnError {
    /// The tag-pair section could not be read; no tree is produced.
    #[error("invalid PGN header at line {line}: {reason}")]
    HeaderInvalid { line: usize, reason: String },

    /// The movetext has more tokens than the configured ceiling.
    #[error("movetext exceeds the limit of {limit} tokens")]
    TokenLimitExceeded { limit: usize },
}

/// Returned by a move oracle when a token is not a legal move in the given
/// position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("illegal move `{token}`: {reason}")]
pub struct IllegalMove {
    pub token: String,
    pub reason: String,
}

impl IllegalMove {
    pub fn new(token: impl Into<String>, reason: impl Into<String>) -> Self {
        IllegalMove {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PgnError>;
