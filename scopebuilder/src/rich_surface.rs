//! Editable rich-text surface with structural commands
//!
//! The surface is a list of [`Block`]s plus a selection. Its text is the
//! block texts joined by `\n`, and the selection is a pair of character
//! offsets into that text. Structural edits (indent, outdent, list toggles)
//! change block margins and list membership only, never text, so the same
//! characters stay selected across every edit.

use std::ops::Range;

use crate::formatter::{self, Block, ListKind, RenderState};

/// Selection expressed as character offsets into the surface text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Empty selection at `offset`
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }
}

/// Editable block document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichSurface {
    blocks: Vec<Block>,
    selection: Selection,
}

impl RichSurface {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            selection: Selection::default(),
        }
    }

    /// Classify canonical text into a fresh surface
    pub fn from_text(text: &str, state: &RenderState) -> Self {
        Self::new(formatter::classify(text, state))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Append a block at the end of the surface
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Move the selection, clamping both ends to the text length
    pub fn select(&mut self, selection: Selection) {
        let len = self.text_len();
        self.selection = Selection::new(selection.anchor.min(len), selection.head.min(len));
    }

    /// Select the whole of the given block range
    pub fn select_blocks(&mut self, blocks: Range<usize>) {
        let spans = self.spans();
        let first = spans.get(blocks.start);
        let last = spans.get(blocks.end.saturating_sub(1));
        let (Some(first), Some(last)) = (first, last) else {
            return;
        };
        self.selection = Selection::new(first.start, last.end);
    }

    /// Block texts joined by newlines
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text covered by the selection
    pub fn selected_text(&self) -> String {
        let start = self.selection.start();
        let end = self.selection.end();
        self.text().chars().skip(start).take(end - start).collect()
    }

    fn text_len(&self) -> usize {
        let chars: usize = self.blocks.iter().map(|b| b.text.chars().count()).sum();
        chars + self.blocks.len().saturating_sub(1)
    }

    /// Character span of each block (separators excluded)
    fn spans(&self) -> Vec<Range<usize>> {
        let mut offset = 0;
        self.blocks
            .iter()
            .map(|block| {
                let len = block.text.chars().count();
                let span = offset..offset + len;
                offset += len + 1;
                span
            })
            .collect()
    }

    /// Indices of blocks the selection touches
    ///
    /// A caret touches the block it sits in; a range touches every block
    /// whose span intersects it, endpoints included.
    pub fn touched_blocks(&self) -> Range<usize> {
        let start = self.selection.start();
        let end = self.selection.end();
        let spans = self.spans();
        let first = spans.iter().position(|span| start <= span.end);
        let last = spans.iter().rposition(|span| span.start <= end);
        match (first, last) {
            (Some(first), Some(last)) if first <= last => first..last + 1,
            _ => 0..0,
        }
    }

    /// Increase the left margin of every touched block by `step` px
    pub fn indent(&mut self, step: u32) {
        for block in self.touched_mut() {
            block.margin_px = block.margin_px.saturating_add(step);
        }
    }

    /// Decrease the left margin of every touched block by `step` px, never below 0
    pub fn outdent(&mut self, step: u32) {
        for block in self.touched_mut() {
            block.margin_px = block.margin_px.saturating_sub(step);
        }
    }

    /// Toggle a bulleted list on the touched blocks
    pub fn toggle_bullet_list(&mut self) {
        self.toggle_list(ListKind::Bullet);
    }

    /// Toggle a numbered list on the touched blocks
    pub fn toggle_numbered_list(&mut self) {
        self.toggle_list(ListKind::Numbered);
    }

    /// Put touched blocks in a `kind` list, or take them out when they all
    /// already are. Joining a list drops any margin and any other list kind.
    fn toggle_list(&mut self, kind: ListKind) {
        let all_listed = {
            let mut touched = self.touched_text_blocks().peekable();
            touched.peek().is_some() && touched.all(|block| block.list == Some(kind))
        };
        for block in self.touched_mut() {
            block.margin_px = 0;
            block.list = if all_listed { None } else { Some(kind) };
        }
    }

    fn touched_text_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks[self.touched_blocks()]
            .iter()
            .filter(|block| !block.is_structural())
    }

    fn touched_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        let range = self.touched_blocks();
        self.blocks[range]
            .iter_mut()
            .filter(|block| !block.is_structural())
    }

    /// Serialize the surface with the writer used for fresh renders
    pub fn to_markup(&self, state: &RenderState) -> String {
        formatter::write_fragment(&self.blocks, state)
    }
}
