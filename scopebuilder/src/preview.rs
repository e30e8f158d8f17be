//! Preview panel showing the rendered scope document
//!
//! The panel keeps the last canonical text it was given, the style it was
//! rendered with, the rendered content and the editable surface. Every change
//! to what is displayed is a snapshot swap pushed through the shared
//! [`History`], so re-renders, style changes, surface edits, appends and
//! clears are all undoable.

use std::cell::RefCell;
use std::path::Path;
use std::rc::{Rc, Weak};

use crate::exporter::{self, ExportError};
use crate::formatter::{self, Block, BlockKind, OutputFormat, RenderState};
use crate::history::{Command, History};
use crate::rich_surface::{RichSurface, Selection};

/// Everything a swap replaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Snapshot {
    content: String,
    canonical: String,
    surface: RichSurface,
    render_state: RenderState,
}

/// Shared handle to the preview
///
/// Clones refer to the same view.
#[derive(Debug, Clone)]
pub struct PreviewPanel {
    history: Rc<History>,
    view: Rc<RefCell<Snapshot>>,
}

impl PreviewPanel {
    pub fn new(history: Rc<History>, render_state: RenderState) -> Self {
        Self {
            history,
            view: Rc::new(RefCell::new(Snapshot {
                render_state,
                ..Snapshot::default()
            })),
        }
    }

    /// Render fresh canonical text and show it
    ///
    /// This is the target of the scope model's change notification.
    pub fn update_preview(&self, text: &str) {
        let next = rendered(text, self.render_state());
        self.swap("Update Preview", next);
    }

    /// Adopt new style settings and re-render from the last canonical text
    ///
    /// The style travels with the content, so undo restores both.
    pub fn request_render(&self, state: RenderState) {
        let next = rendered(&self.canonical_text(), state);
        self.swap("Update Preview", next);
    }

    /// Append one line to the displayed content
    pub fn append_line(&self, line: &str) {
        let state = self.render_state();
        let mut next = self.snapshot();
        if state.output_format == OutputFormat::Plain {
            if !next.content.is_empty() {
                next.content.push('\n');
            }
            next.content.push_str(line);
        } else {
            next.surface.push(Block::new(BlockKind::Paragraph, line));
            next.content = present(&next, &state);
        }
        self.swap("Append Line", next);
    }

    /// Blank the displayed content
    ///
    /// The canonical text is kept, so a later re-render restores the document.
    pub fn clear(&self) {
        let current = self.snapshot();
        let next = Snapshot {
            canonical: current.canonical,
            render_state: current.render_state,
            ..Snapshot::default()
        };
        self.swap("Clear Preview", next);
    }

    /// Move the surface selection (not recorded in the history)
    pub fn set_selection(&self, selection: Selection) {
        self.view.borrow_mut().surface.select(selection);
    }

    /// Indent the selected lines by the configured indent step
    pub fn indent_selection(&self) {
        let step = self.render_state().indent_px();
        self.edit_surface("Indent", |surface| surface.indent(step));
    }

    /// Outdent the selected lines by the configured indent step
    pub fn outdent_selection(&self) {
        let step = self.render_state().indent_px();
        self.edit_surface("Outdent", |surface| surface.outdent(step));
    }

    pub fn toggle_bullet_list(&self) {
        self.edit_surface("Bullet List", RichSurface::toggle_bullet_list);
    }

    pub fn toggle_numbered_list(&self) {
        self.edit_surface("Numbered List", RichSurface::toggle_numbered_list);
    }

    /// Displayed content (markup for Rich and HTML, text for Plain)
    pub fn content(&self) -> String {
        self.view.borrow().content.clone()
    }

    /// Canonical text the preview was last rendered from
    pub fn canonical_text(&self) -> String {
        self.view.borrow().canonical.clone()
    }

    pub fn surface(&self) -> RichSurface {
        self.view.borrow().surface.clone()
    }

    pub fn render_state(&self) -> RenderState {
        self.view.borrow().render_state.clone()
    }

    /// Write the previewed document to a file
    pub fn export(&self, format: OutputFormat, output_path: &Path) -> Result<(), ExportError> {
        let view = self.view.borrow();
        exporter::export(
            &view.canonical,
            &view.surface,
            &view.render_state,
            format,
            output_path,
        )
    }

    fn snapshot(&self) -> Snapshot {
        self.view.borrow().clone()
    }

    fn edit_surface(&self, label: &str, edit: impl FnOnce(&mut RichSurface)) {
        let state = self.render_state();
        if state.output_format == OutputFormat::Plain {
            log::debug!("'{}' has no effect on a plain text preview", label);
            return;
        }
        let mut next = self.snapshot();
        edit(&mut next.surface);
        next.content = present(&next, &state);
        self.swap(label, next);
    }

    /// Record a swap from the shown snapshot to `next`; identical snapshots
    /// record nothing
    fn swap(&self, label: &str, next: Snapshot) {
        let previous = self.snapshot();
        if previous == next {
            log::debug!("'{}' leaves the preview unchanged", label);
            return;
        }

        let apply_view = Rc::downgrade(&self.view);
        let revert_view = Rc::downgrade(&self.view);
        self.history.push(Command::new(
            label,
            move || show(&apply_view, next.clone()),
            move || show(&revert_view, previous.clone()),
        ));
    }
}

fn show(view: &Weak<RefCell<Snapshot>>, snapshot: Snapshot) {
    if let Some(view) = view.upgrade() {
        *view.borrow_mut() = snapshot;
    }
}

fn rendered(text: &str, render_state: RenderState) -> Snapshot {
    Snapshot {
        content: formatter::render(text, &render_state),
        canonical: text.to_string(),
        surface: RichSurface::from_text(text, &render_state),
        render_state,
    }
}

fn present(snapshot: &Snapshot, state: &RenderState) -> String {
    exporter::compose(
        &snapshot.canonical,
        &snapshot.surface,
        state,
        state.output_format,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::NumberingStyle;

    const TEXT: &str = "**SCOPE CLARIFICATIONS**\n\nA. Item A\n    1. Note 1\n    2. Note 2";

    fn panel() -> (Rc<History>, PreviewPanel) {
        let history = History::shared();
        let state = RenderState::default().with_header(false);
        let panel = PreviewPanel::new(Rc::clone(&history), state);
        (history, panel)
    }

    #[test]
    fn test_update_preview_is_undoable() {
        let (history, panel) = panel();
        panel.update_preview(TEXT);
        assert!(panel.content().contains(">SCOPE CLARIFICATIONS</h2>"));
        assert_eq!(panel.canonical_text(), TEXT);
        assert_eq!(history.undo_label().as_deref(), Some("Update Preview"));

        assert!(history.undo());
        assert_eq!(panel.content(), "");
        assert_eq!(panel.canonical_text(), "");

        assert!(history.redo());
        assert_eq!(panel.canonical_text(), TEXT);
    }

    #[test]
    fn test_identical_update_records_nothing() {
        let (history, panel) = panel();
        panel.update_preview(TEXT);
        panel.update_preview(TEXT);
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_request_render_uses_last_text() {
        let (history, panel) = panel();
        panel.update_preview(TEXT);
        panel.request_render(RenderState::default().with_format(OutputFormat::Plain));
        assert_eq!(panel.content(), TEXT);

        history.undo();
        assert!(panel.content().contains("<h2"));
        assert_eq!(panel.render_state().output_format, OutputFormat::Rich);

        history.redo();
        assert_eq!(panel.render_state().output_format, OutputFormat::Plain);
    }

    #[test]
    fn test_undone_style_governs_later_edits() {
        let (history, panel) = panel();
        panel.update_preview("one\ntwo");
        panel.request_render(RenderState::default().with_format(OutputFormat::Plain));
        history.undo();

        // Back on the rich style, surface edits apply again
        panel.set_selection(Selection::new(0, 7));
        panel.toggle_bullet_list();
        assert_eq!(history.undo_label().as_deref(), Some("Bullet List"));
        assert!(panel.content().contains("<ul"));
    }

    #[test]
    fn test_indent_selection_two_lines() {
        let (history, panel) = panel();
        panel.request_render(
            RenderState::default()
                .with_header(false)
                .with_indent(20)
                .with_numbering(NumberingStyle::Professional),
        );
        panel.update_preview(TEXT);

        // "Item A\n1. Note 1" spans blocks 2 and 3
        panel.set_selection(Selection::new(25, 41));
        let selected = panel.surface().selected_text();
        assert_eq!(selected, "Item A\n1. Note 1");
        let before: Vec<u32> = panel.surface().blocks().iter().map(|b| b.margin_px).collect();

        panel.indent_selection();
        let surface = panel.surface();
        let after: Vec<u32> = surface.blocks().iter().map(|b| b.margin_px).collect();
        assert_eq!(after[2], before[2] + 20);
        assert_eq!(after[3], before[3] + 20);
        assert_eq!(after[4], before[4]);
        assert_eq!(surface.selected_text(), selected);
        assert!(panel.content().contains("margin-left: 40px;"));

        history.undo();
        let restored: Vec<u32> = panel.surface().blocks().iter().map(|b| b.margin_px).collect();
        assert_eq!(restored, before);
    }

    #[test]
    fn test_list_toggle_recorded() {
        let (history, panel) = panel();
        panel.update_preview("one\ntwo");
        panel.set_selection(Selection::new(0, 7));
        panel.toggle_numbered_list();
        assert!(panel.content().contains("<ol"));
        assert_eq!(history.undo_label().as_deref(), Some("Numbered List"));
        panel.toggle_bullet_list();
        assert!(panel.content().contains("<ul"));
        assert!(!panel.content().contains("<ol"));
    }

    #[test]
    fn test_append_and_clear() {
        let (history, panel) = panel();
        panel.request_render(RenderState::default().with_format(OutputFormat::Plain));
        panel.update_preview("A. First");
        panel.append_line("extra");
        assert_eq!(panel.content(), "A. First\nextra");

        panel.clear();
        assert_eq!(panel.content(), "");
        assert_eq!(panel.canonical_text(), "A. First");

        history.undo();
        assert_eq!(panel.content(), "A. First\nextra");
        history.undo();
        assert_eq!(panel.content(), "A. First");
    }

    #[test]
    fn test_plain_preview_ignores_surface_edits() {
        let (history, panel) = panel();
        panel.request_render(RenderState::default().with_format(OutputFormat::Plain));
        panel.update_preview("A. First");
        let depth = history.undo_depth();
        panel.indent_selection();
        assert_eq!(history.undo_depth(), depth);
    }
}
