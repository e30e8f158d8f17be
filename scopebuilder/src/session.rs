//! Editing session wiring the scope model to the preview
//!
//! A session owns one [`History`], one [`ScopeModel`] and one
//! [`PreviewPanel`]. Model change notifications feed the preview, so every
//! check toggle carries its preview update in the same undo step.

use std::cell::Ref;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::exporter::ExportError;
use crate::formatter::{OutputFormat, RenderState};
use crate::history::History;
use crate::preview::PreviewPanel;
use crate::scope_model::ScopeModel;
use crate::scope_tree::{LabelPath, ScopeTree, TreeError};
use crate::template_document::{DocumentError, ProjectDocument};

/// Errors that can occur during session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("No template is loaded")]
    NoTemplate,
}

/// One user's editing session
pub struct Session {
    history: Rc<History>,
    model: ScopeModel,
    preview: PreviewPanel,
    template_path: Option<PathBuf>,
}

impl Session {
    /// Create a session with an empty tree
    pub fn new(render_state: RenderState) -> Self {
        let history = History::shared();
        let model = ScopeModel::new(Rc::clone(&history));
        let preview = PreviewPanel::new(Rc::clone(&history), render_state);

        let target = preview.clone();
        model.subscribe(move |text| target.update_preview(text));

        Self {
            history,
            model,
            preview,
            template_path: None,
        }
    }

    /// Load a template, replacing the tree and clearing the history
    pub fn open_template(&mut self, path: &Path) -> Result<(), SessionError> {
        self.model.load_template_file(path)?;
        self.template_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Load a project: its template, then its checked items
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of checked items the template no longer contains
    pub fn open_project(&mut self, path: &Path) -> Result<usize, SessionError> {
        let project = ProjectDocument::load(path)?;
        let template = project.resolve_template(path);
        self.open_template(&template)?;

        let missing = self.model.set_checked_paths(&project.checked_items);
        if missing > 0 {
            log::warn!(
                "{} checked item(s) in {} are not in the template",
                missing,
                path.display()
            );
        }
        self.history.clear();
        log::info!("Opened project {}", path.display());
        Ok(missing)
    }

    /// Save the current template reference and checked items
    pub fn save_project(&self, path: &Path) -> Result<(), SessionError> {
        let template_file = self.template_path.clone().ok_or(SessionError::NoTemplate)?;
        let project = ProjectDocument {
            template_file,
            checked_items: self.model.checked_paths(),
        };
        project.save(path)?;
        Ok(())
    }

    /// Start over with an empty tree, preview and history
    pub fn new_project(&mut self) {
        self.model.reset();
        self.preview.clear();
        self.history.clear();
        self.template_path = None;
    }

    pub fn set_checked(&self, path: &LabelPath, value: bool) -> Result<(), SessionError> {
        Ok(self.model.set_checked(path, value)?)
    }

    pub fn set_label(&self, path: &LabelPath, label: &str) -> Result<(), SessionError> {
        Ok(self.model.set_label(path, label)?)
    }

    pub fn undo(&self) -> bool {
        self.history.undo()
    }

    pub fn redo(&self) -> bool {
        self.history.redo()
    }

    /// Change the preview style; the re-render is undoable
    pub fn set_render_state(&self, state: RenderState) {
        self.preview.request_render(state);
    }

    /// Write the preview document in `format`
    pub fn export(&self, path: &Path, format: OutputFormat) -> Result<(), SessionError> {
        self.preview.export(format, path)?;
        Ok(())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn model(&self) -> &ScopeModel {
        &self.model
    }

    pub fn preview(&self) -> &PreviewPanel {
        &self.preview
    }

    pub fn tree(&self) -> Ref<'_, ScopeTree> {
        self.model.tree()
    }

    pub fn template_path(&self) -> Option<&Path> {
        self.template_path.as_deref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RenderState::default())
    }
}
