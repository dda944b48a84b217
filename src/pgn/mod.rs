pub mod classify;
pub mod context;
pub mod header;
pub mod parser;
pub mod render;
pub mod resolver;
pub mod tokenizer;
pub mod tree;

pub use classify::{substitute_nags, GameResult, MoveAnnotation, Nag};
pub use header::Headers;
pub use parser::{parse_game, GameParser, ParseOptions, ParsedGame};
pub use render::TextRenderer;
pub use tokenizer::{tokenize, Token, TokenKind};
pub use tree::{
    CommentKind, CommentNode, DiagramMarker, GameTree, Inline, Line, LineItem, LineKind, MoveNode,
    Run,
};
