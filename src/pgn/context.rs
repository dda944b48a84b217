//! Parse contexts: one per line of play being read.
//!
//! Contexts live in an arena and refer to their parent by index. The stack
//! holds the indices of the contexts still open; the top is the line the
//! next token belongs to. A popped context stays in the arena but is marked
//! closed and never receives another token.

use tracing::debug;

use super::tree::{Inline, Line, LineItem, LineKind, MoveNode, Run};
use crate::chess::BoardPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Main,
    Variation { depth: usize },
}

#[derive(Debug)]
pub struct ParseContext<P> {
    pub kind: ContextKind,
    /// Current position of this line. Owned; children receive a clone.
    pub position: P,
    /// Position before the most recently accepted move, used as the fork
    /// point for variations.
    before_last_move: Option<P>,
    pub parent: Option<ContextId>,
    pub base_ply: u32,
    accepted: u32,
    pub last_was_interrupt: bool,
    /// Index into `line.items` of the run that is open for inline content.
    open_container: Option<usize>,
    /// Location of the most recent move: (item index, inline index).
    last_move: Option<(usize, usize)>,
    line: Line,
    closed: bool,
}

impl<P: BoardPosition> ParseContext<P> {
    fn new(kind: ContextKind, position: P, base_ply: u32, parent: Option<ContextId>) -> Self {
        let line = Line::new(line_kind(kind), base_ply);
        ParseContext {
            kind,
            position,
            before_last_move: None,
            parent,
            base_ply,
            accepted: 0,
            last_was_interrupt: true,
            open_container: None,
            last_move: None,
            line,
            closed: false,
        }
    }

    /// Ply of the next move on this line.
    pub fn ply(&self) -> u32 {
        self.base_ply + self.accepted
    }

    /// Hand over the line read so far, leaving an empty one of the same
    /// kind behind.
    fn take_line(&mut self) -> Line {
        let fresh = Line::new(line_kind(self.kind), self.base_ply);
        std::mem::replace(&mut self.line, fresh)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Mark the flow of moves as interrupted: the next Black move gets its
    /// number again and the next inline content opens a new container.
    pub fn interrupt(&mut self) {
        self.last_was_interrupt = true;
        self.open_container = None;
    }

    fn container(&mut self) -> &mut Run {
        let idx = match self.open_container {
            Some(idx) => idx,
            None => {
                self.line.items.push(LineItem::Run(Run::default()));
                let idx = self.line.items.len() - 1;
                self.open_container = Some(idx);
                idx
            }
        };
        match &mut self.line.items[idx] {
            LineItem::Run(run) => run,
            _ => unreachable!("open container always points at a run"),
        }
    }

    pub fn push_space(&mut self) {
        let run = self.container();
        if !matches!(run.inlines.last(), Some(Inline::Space)) {
            run.inlines.push(Inline::Space);
        }
    }

    pub fn push_inline(&mut self, inline: Inline) {
        self.container().inlines.push(inline);
    }

    /// Record a move the oracle accepted, with `next` the position after it.
    pub fn push_move(&mut self, next: P, node: MoveNode) {
        let previous = std::mem::replace(&mut self.position, next);
        self.before_last_move = Some(previous);
        self.accepted += 1;
        self.last_was_interrupt = false;

        self.container().inlines.push(Inline::Move(node));
        let item = self.open_container.unwrap_or_default();
        let inline = match &self.line.items[item] {
            LineItem::Run(run) => run.inlines.len() - 1,
            _ => 0,
        };
        self.last_move = Some((item, inline));
    }

    /// Push a comment or diagram; these always interrupt the line.
    pub fn push_item(&mut self, item: LineItem) {
        self.line.items.push(item);
        self.interrupt();
    }

    /// Position and ply a variation of this line starts from: the position
    /// just before the latest move, so the variation replaces that move.
    fn fork_point(&self) -> (P, u32) {
        match &self.before_last_move {
            Some(before) => (before.clone(), self.ply() - 1),
            None => (self.position.clone(), self.ply()),
        }
    }

    fn attach_variation(&mut self, variation: Line) {
        if let Some((item, inline)) = self.last_move {
            if let LineItem::Run(run) = &mut self.line.items[item] {
                if let Some(Inline::Move(node)) = run.inlines.get_mut(inline) {
                    node.variations.push(variation);
                    return;
                }
            }
        }
        self.line.alternatives.push(variation);
    }
}

/// Arena of contexts plus the stack of open ones.
#[derive(Debug)]
pub struct ContextStack<P> {
    arena: Vec<ParseContext<P>>,
    stack: Vec<ContextId>,
}

impl<P: BoardPosition> ContextStack<P> {
    /// Start with the mainline context at `start`.
    pub fn new(start: P) -> Self {
        let base_ply = start.ply();
        let main = ParseContext::new(ContextKind::Main, start, base_ply, None);
        ContextStack {
            arena: vec![main],
            stack: vec![ContextId(0)],
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn current_id(&self) -> ContextId {
        self.stack.last().copied().unwrap_or(ContextId(0))
    }

    pub fn current(&self) -> &ParseContext<P> {
        &self.arena[self.current_id().0]
    }

    pub fn current_mut(&mut self) -> &mut ParseContext<P> {
        let id = self.current_id();
        &mut self.arena[id.0]
    }

    pub fn get(&self, id: ContextId) -> &ParseContext<P> {
        &self.arena[id.0]
    }

    /// Open a variation of the current line.
    pub fn open_variation(&mut self) -> ContextId {
        let parent_id = self.current_id();
        let depth = self.stack.len();
        let parent = &mut self.arena[parent_id.0];
        parent.last_was_interrupt = true;
        let (position, base_ply) = parent.fork_point();

        let child = ParseContext::new(
            ContextKind::Variation { depth },
            position,
            base_ply,
            Some(parent_id),
        );
        let id = ContextId(self.arena.len());
        self.arena.push(child);
        self.stack.push(id);
        debug!(depth, base_ply, "opened variation");
        id
    }

    /// Close the current variation and hand its line to the parent.
    /// Returns `false` when only the mainline is open.
    pub fn close_variation(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        let Some(id) = self.stack.pop() else {
            return false;
        };

        let child = &mut self.arena[id.0];
        child.closed = true;
        let line = child.take_line();
        let parent_id = child.parent;

        if let Some(parent_id) = parent_id {
            let parent = &mut self.arena[parent_id.0];
            parent.attach_variation(line);
            parent.interrupt();
        }
        true
    }

    /// Close whatever is still open and return the mainline.
    pub fn finish(mut self) -> Line {
        let unclosed = self.depth();
        if unclosed > 0 {
            debug!(unclosed, "closing variations left open at end of input");
        }
        while self.close_variation() {}
        let main = &mut self.arena[0];
        main.closed = true;
        main.take_line()
    }
}

fn line_kind(kind: ContextKind) -> LineKind {
    match kind {
        ContextKind::Main => LineKind::Main,
        ContextKind::Variation { depth } => LineKind::Variation { depth },
    }
}
