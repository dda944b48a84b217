use std::io::{self, Write};

use super::classify::substitute_nags;
use super::parser::ParsedGame;
use super::tree::{CommentKind, CommentNode, Inline, Line, LineItem, MoveNode};
use crate::chess::Piece;

/// Plain-text renderer for parsed games
pub struct TextRenderer {
    include_variations: bool,
    include_comments: bool,
    include_title: bool,
    figurines: bool,
}

impl TextRenderer {
    pub fn new() -> Self {
        TextRenderer {
            include_variations: true,
            include_comments: true,
            include_title: true,
            figurines: false,
        }
    }

    pub fn with_variations(mut self, include: bool) -> Self {
        self.include_variations = include;
        self
    }

    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    pub fn with_title(mut self, include: bool) -> Self {
        self.include_title = include;
        self
    }

    pub fn with_figurines(mut self, enabled: bool) -> Self {
        self.figurines = enabled;
        self
    }

    /// Write the title line, a blank line and the movetext.
    pub fn render<W: Write>(&self, writer: &mut W, game: &ParsedGame) -> io::Result<()> {
        if self.include_title && !game.title.is_empty() {
            writeln!(writer, "{}", game.title)?;
            writeln!(writer)?;
        }
        writeln!(writer, "{}", self.movetext(&game.tree.mainline))?;
        Ok(())
    }

    pub fn render_to_string(&self, game: &ParsedGame) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.render(&mut buffer, game);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Movetext of one line on a single row, with whitespace collapsed.
    pub fn movetext(&self, line: &Line) -> String {
        let mut out = String::new();
        self.write_line(&mut out, line);
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn write_line(&self, out: &mut String, line: &Line) {
        if self.include_variations {
            for variation in &line.alternatives {
                self.write_variation(out, variation);
            }
        }

        for item in &line.items {
            match item {
                LineItem::Run(run) => {
                    for inline in &run.inlines {
                        self.write_inline(out, inline);
                    }
                }
                LineItem::Comment(comment) => {
                    if self.include_comments {
                        self.write_comment(out, comment);
                    }
                }
                LineItem::Diagram(_) => out.push_str(" [D] "),
            }
        }
    }

    fn write_variation(&self, out: &mut String, variation: &Line) {
        out.push_str(" (");
        out.push_str(&self.movetext(variation));
        out.push_str(") ");
    }

    fn write_inline(&self, out: &mut String, inline: &Inline) {
        match inline {
            Inline::Space => out.push(' '),
            Inline::Move(node) => {
                self.write_move(out, node);
                if self.include_variations {
                    for variation in &node.variations {
                        self.write_variation(out, variation);
                    }
                }
            }
            Inline::Nag(nag) => {
                // Glyphs stick to the move they follow.
                out.truncate(out.trim_end().len());
                out.push_str(nag.glyph);
            }
            Inline::Text(text) => out.push_str(text),
            Inline::Result(result) => out.push_str(result.as_str()),
        }
    }

    fn write_move(&self, out: &mut String, node: &MoveNode) {
        if let Some(number) = &node.number_label {
            out.push_str(number);
            out.push(' ');
        }
        out.push_str(&self.move_text(&node.display_text));
    }

    fn write_comment(&self, out: &mut String, comment: &CommentNode) {
        let mut body = String::new();
        match comment.kind {
            CommentKind::Annotation => body.push_str(&substitute_nags(&comment.text)),
            CommentKind::LineComment => {
                for inline in &comment.inlines {
                    match inline {
                        Inline::Move(node) => self.write_move(&mut body, node),
                        Inline::Text(text) => body.push_str(&substitute_nags(text)),
                        other => self.write_inline(&mut body, other),
                    }
                }
            }
        }
        out.push_str(" {");
        out.push_str(body.trim());
        out.push_str("} ");
    }

    /// Swap the leading piece letter for its figurine when enabled.
    fn move_text(&self, display: &str) -> String {
        if !self.figurines {
            return display.to_string();
        }
        let mut chars = display.chars();
        match chars.next().and_then(Piece::from_san_char) {
            Some(piece) => format!("{}{}", piece.figurine(), chars.as_str()),
            None => display.to_string(),
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}
