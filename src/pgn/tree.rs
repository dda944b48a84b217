//! Game tree produced by the parser.
//!
//! A game is a mainline `Line`. Lines hold items in source order: runs of
//! inline content (moves, spaces, NAG glyphs, literal text, the result),
//! comments and diagram markers. Every run is one output container: the
//! parser starts a new run after anything that interrupts the flow of moves.
//! Variations hang off the move they are an alternative to.

use serde::Serialize;

use super::classify::{GameResult, MoveAnnotation, Nag};
use crate::chess::{Color, PositionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Main,
    Variation { depth: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub kind: LineKind,
    /// Ply of the first move this line would play.
    pub start_ply: u32,
    pub items: Vec<LineItem>,
    /// Variations opened before this line had played any move.
    pub alternatives: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LineItem {
    Run(Run),
    Comment(CommentNode),
    Diagram(DiagramMarker),
}

/// One output container.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Run {
    pub inlines: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Inline {
    Space,
    Move(MoveNode),
    Nag(Nag),
    /// Token kept verbatim: prose, or a move the oracle rejected.
    Text(String),
    Result(GameResult),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveNode {
    /// Source token, castling normalized, annotation glyph kept.
    pub display_text: String,
    /// `display_text` without the annotation glyph.
    pub san: String,
    pub ply: u32,
    pub color: Color,
    pub move_number: u32,
    /// `"N."` or `"N..."`, or `None` when a Black move follows White's
    /// without interruption.
    pub number_label: Option<String>,
    pub annotation: Option<MoveAnnotation>,
    pub position_after: PositionSnapshot,
    /// Alternatives to this move, in source order.
    pub variations: Vec<Line>,
}

impl MoveNode {
    /// Move text with its number prefix, e.g. `"2... Nc6"` or `"e5"`.
    pub fn label(&self) -> String {
        match &self.number_label {
            Some(number) => format!("{} {}", number, self.display_text),
            None => self.display_text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    /// Prose only.
    Annotation,
    /// Prose with moves that were replayed from the comment's position.
    LineComment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    pub kind: CommentKind,
    /// Number of plies played on the owning line when the comment appeared.
    pub ply: u32,
    pub text: String,
    /// Text and replayed moves for line comments; a single text inline for
    /// annotations.
    pub inlines: Vec<Inline>,
}

impl CommentNode {
    /// Moves replayed inside a line comment.
    pub fn moves(&self) -> impl Iterator<Item = &MoveNode> {
        self.inlines.iter().filter_map(|inline| match inline {
            Inline::Move(node) => Some(node),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramMarker {
    /// Sequence number of this diagram within the game, from zero.
    pub id: usize,
    pub ply: u32,
    pub position: PositionSnapshot,
}

impl Line {
    pub fn new(kind: LineKind, start_ply: u32) -> Self {
        Line {
            kind,
            start_ply,
            items: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Moves played on this line, in order. Moves inside comments and
    /// variations are not included.
    pub fn moves(&self) -> impl Iterator<Item = &MoveNode> {
        self.items
            .iter()
            .filter_map(|item| match item {
                LineItem::Run(run) => Some(run.inlines.iter()),
                _ => None,
            })
            .flatten()
            .filter_map(|inline| match inline {
                Inline::Move(node) => Some(node),
                _ => None,
            })
    }

    pub fn comments(&self) -> impl Iterator<Item = &CommentNode> {
        self.items.iter().filter_map(|item| match item {
            LineItem::Comment(comment) => Some(comment),
            _ => None,
        })
    }

    pub fn diagrams(&self) -> impl Iterator<Item = &DiagramMarker> {
        self.items.iter().filter_map(|item| match item {
            LineItem::Diagram(marker) => Some(marker),
            _ => None,
        })
    }

    /// Variations attached to this line, either to one of its moves or
    /// directly to the line.
    pub fn variations(&self) -> impl Iterator<Item = &Line> {
        self.alternatives
            .iter()
            .chain(self.moves().flat_map(|node| node.variations.iter()))
    }

    /// This line followed by every nested variation, depth first.
    pub fn walk(&self) -> Vec<&Line> {
        let mut lines = vec![self];
        for variation in self.variations() {
            lines.extend(variation.walk());
        }
        lines
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.alternatives.is_empty()
    }
}

/// Parsed movetext of one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameTree {
    pub mainline: Line,
    /// Every diagram of the game in source order, variations included.
    pub diagrams: Vec<DiagramMarker>,
    pub result: Option<GameResult>,
}

impl GameTree {
    pub fn mainline_moves(&self) -> impl Iterator<Item = &MoveNode> {
        self.mainline.moves()
    }

    pub fn lines(&self) -> Vec<&Line> {
        self.mainline.walk()
    }

    /// Position after the last mainline move.
    pub fn final_position(&self) -> Option<&PositionSnapshot> {
        self.mainline_moves().last().map(|node| &node.position_after)
    }
}
