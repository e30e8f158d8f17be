//! Directory listing and creation of template and project files

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

use crate::scope_tree::{LabelPath, ScopeTree, TreeError};
use crate::template_document::{DocumentError, ProjectDocument, TemplateDocument};

/// Errors that can occur while listing a library directory
#[derive(Debug)]
pub enum LibraryError {
    /// IO error
    Io(std::io::Error),
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::Io(err)
    }
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for LibraryError {}

/// One file found in a library directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub path: PathBuf,
    /// Template name, or file stem for projects
    pub name: String,
    pub modified: Option<SystemTime>,
    /// Template a project refers to (projects only)
    pub template_file: Option<PathBuf>,
}

/// List templates directly inside `dir`
///
/// Files that fail to parse as templates are skipped with a warning.
///
/// # Parameters
/// * `dir` - Directory to scan (not recursed into)
/// * `filter` - Optional case-insensitive substring the name must contain
///
/// # Returns
/// * Entries sorted by name; empty if `dir` does not exist
pub fn list_templates(dir: &Path, filter: Option<&str>) -> Result<Vec<LibraryEntry>, LibraryError> {
    list_json(dir, filter, |path| match TemplateDocument::load(path) {
        Ok(doc) => Some((doc.template_name, None)),
        Err(e) => {
            log::warn!("Skipping {}: {}", path.display(), e);
            None
        }
    })
}

/// List saved projects directly inside `dir`, named by file stem
pub fn list_projects(dir: &Path, filter: Option<&str>) -> Result<Vec<LibraryEntry>, LibraryError> {
    list_json(dir, filter, |path| match ProjectDocument::load(path) {
        Ok(project) => Some((file_stem(path), Some(project.template_file))),
        Err(e) => {
            log::warn!("Skipping {}: {}", path.display(), e);
            None
        }
    })
}

fn list_json<F>(dir: &Path, filter: Option<&str>, describe: F) -> Result<Vec<LibraryEntry>, LibraryError>
where
    F: Fn(&Path) -> Option<(String, Option<PathBuf>)>,
{
    if !dir.is_dir() {
        log::debug!("Library directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let needle = filter.map(str::to_lowercase);
    let mut entries = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        let entry = entry.map_err(std::io::Error::other)?;
        let path = entry.path();

        // Only consider JSON files
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let Some((name, template_file)) = describe(path) else {
            continue;
        };
        if let Some(needle) = &needle {
            if !name.to_lowercase().contains(needle) {
                continue;
            }
        }

        let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
        entries.push(LibraryEntry {
            path: path.to_path_buf(),
            name,
            modified,
            template_file,
        });
    }

    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(entries)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name a template called `name` is stored under
///
/// Lower-cases the name and replaces spaces and `/` with `_`.
pub fn safe_file_name(name: &str) -> String {
    let safe: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '/' { '_' } else { c })
        .collect();
    format!("{}.json", safe)
}

/// Create an empty template file in `dir`
///
/// # Returns
/// * `Ok(PathBuf)` - Path of the new template
/// * `Err(DocumentError::EmptyName)` - `name` is blank
/// * `Err(DocumentError::AlreadyExists)` - A file with the derived name exists
pub fn create_template(dir: &Path, name: &str) -> Result<PathBuf, DocumentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DocumentError::EmptyName);
    }

    let path = dir.join(safe_file_name(name));
    if path.exists() {
        return Err(DocumentError::AlreadyExists {
            name: name.to_string(),
            path,
        });
    }

    TemplateDocument::new(name).save(&path)?;
    log::info!("Created template '{}' at {}", name, path.display());
    Ok(path)
}

/// One authoring change to a template tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateEdit {
    /// Append a new item; the last label is the new item, the rest its parent
    Add(LabelPath),
    /// Delete an item and everything below it
    Remove(LabelPath),
    ToggleLock(LabelPath),
    ToggleHighlight(LabelPath),
}

impl TemplateEdit {
    fn apply(&self, tree: &mut ScopeTree) -> Result<(), TreeError> {
        match self {
            TemplateEdit::Add(path) => {
                let (parent, label) = path.split_last().ok_or(TreeError::RootNotAddressable)?;
                tree.add_child(&parent, label)?;
            }
            TemplateEdit::Remove(path) => tree.remove(path)?,
            TemplateEdit::ToggleLock(path) => {
                let locked = tree.toggle_locked(path)?;
                log::debug!("'{}' locked: {}", path, locked);
            }
            TemplateEdit::ToggleHighlight(path) => {
                let highlighted = tree.toggle_highlighted(path)?;
                log::debug!("'{}' highlighted: {}", path, highlighted);
            }
        }
        Ok(())
    }
}

/// Errors that can occur while editing a template file
#[derive(Error, Debug)]
pub enum EditError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Template edit failed: {source}")]
    Tree {
        /// Position of the failing edit in the list
        index: usize,
        #[source]
        source: TreeError,
    },
}

/// Apply `edits` in order to the template at `path` and save it in place
///
/// Edits run against the loaded tree; the file is only rewritten when every
/// edit succeeds.
///
/// # Returns
/// * `Ok(TemplateDocument)` - The document as saved
pub fn edit_template(path: &Path, edits: &[TemplateEdit]) -> Result<TemplateDocument, EditError> {
    let doc = TemplateDocument::load(path)?;
    let mut tree = ScopeTree::from_template(&doc);

    for (index, edit) in edits.iter().enumerate() {
        edit.apply(&mut tree)
            .map_err(|source| EditError::Tree { index, source })?;
    }

    let edited = tree.serialize();
    edited.save(path)?;
    log::info!(
        "Applied {} edit(s) to template '{}' at {}",
        edits.len(),
        edited.template_name,
        path.display()
    );
    Ok(edited)
}
