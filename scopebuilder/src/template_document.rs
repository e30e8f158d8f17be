//! Template and project documents stored as JSON

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scope_tree::LabelPath;

/// Label given to sections that carry neither `title` nor `text`
pub const UNTITLED: &str = "Untitled";

/// Reusable scope-of-work template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDocument {
    /// Display name of the template (e.g., "03-3000 Cast-in-Place Concrete")
    #[serde(default = "default_template_name")]
    pub template_name: String,

    /// Top-level sections in document order
    #[serde(default)]
    pub sections: Vec<Section>,
}

fn default_template_name() -> String {
    "Template".to_string()
}

/// One entry of a template tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Preferred label source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Fallback label source used by older templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Locked entries reject label edits
    #[serde(default)]
    pub locked: bool,

    /// Presentation-only emphasis
    #[serde(default)]
    pub highlight: bool,

    /// Nested entries; omitted from output when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Section>,
}

impl Section {
    /// Create a titled section with no children
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Builder-style helper appending a child
    pub fn with_child(mut self, child: Section) -> Self {
        self.children.push(child);
        self
    }

    /// Resolve the node label: `title`, then `text`, then "Untitled"
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or(UNTITLED)
    }
}

impl TemplateDocument {
    /// Create an empty template
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            sections: Vec::new(),
        }
    }

    /// Parse a template from JSON text
    ///
    /// # Returns
    /// * `Ok(TemplateDocument)` - Successfully parsed template
    /// * `Err(DocumentError::Parse)` - Source is not a valid template document
    pub fn from_json(source: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(source).map_err(|e| DocumentError::Parse {
            path: None,
            source: e,
        })
    }

    /// Load a template from a .json file
    ///
    /// # Parameters
    /// * `path` - Path to the template file
    ///
    /// # Returns
    /// * `Ok(TemplateDocument)` - Successfully loaded template
    /// * `Err(DocumentError)` - Error reading or parsing the file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| DocumentError::Parse {
            path: Some(path.to_path_buf()),
            source: e,
        })
    }

    /// Save the template to a .json file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        write_json(self, path.as_ref())
    }
}

/// Saved selection of checked items against a template file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Path of the template this project was built from
    pub template_file: PathBuf,

    /// Root-to-node label paths of every checked item
    #[serde(default)]
    pub checked_items: Vec<LabelPath>,
}

impl ProjectDocument {
    /// Load a project from a .json file
    ///
    /// # Parameters
    /// * `path` - Path to the project file
    ///
    /// # Returns
    /// * `Ok(ProjectDocument)` - Successfully loaded project
    /// * `Err(DocumentError)` - Error reading or parsing the file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| DocumentError::Parse {
            path: Some(path.to_path_buf()),
            source: e,
        })
    }

    /// Save the project to a .json file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        write_json(self, path.as_ref())
    }

    /// Resolve `template_file` against the directory holding the project
    ///
    /// Absolute paths and paths that exist as given are returned unchanged.
    pub fn resolve_template(&self, project_path: &Path) -> PathBuf {
        if self.template_file.is_absolute() || self.template_file.exists() {
            return self.template_file.clone();
        }
        project_path
            .parent()
            .map(|dir| dir.join(&self.template_file))
            .unwrap_or_else(|| self.template_file.clone())
    }
}

/// Write a value as 4-space indented JSON through a temporary sibling file
fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), DocumentError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(DocumentError::Serialize)?;
    buffer.push(b'\n');

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| DocumentError::io(dir, e))?;
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| DocumentError::io(path, e))?;
    file.write_all(&buffer)
        .map_err(|e| DocumentError::io(path, e))?;
    file.persist(path)
        .map_err(|e| DocumentError::io(path, e.error))?;

    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Errors that can occur when reading or writing template and project files
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error on {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid document{}: {source}", describe_path(.path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("A template named '{name}' already exists at {path}", path = .path.display())]
    AlreadyExists { name: String, path: PathBuf },

    #[error("Template name must not be empty")]
    EmptyName,
}

fn describe_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

impl DocumentError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        DocumentError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
