//! File export of the preview document
//!
//! Plain export writes the canonical text verbatim. Rich and HTML exports
//! serialize the editable surface, so structural edits made in the preview
//! (indents, list toggles) survive into the file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::formatter::{self, OutputFormat, RenderState};
use crate::rich_surface::RichSurface;

/// Errors that can occur during export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error writing {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Build the exported document for `format`
///
/// # Parameters
/// * `canonical` - Generator output the preview was rendered from
/// * `surface` - Current editable surface
/// * `state` - Styling used for markup output
/// * `format` - Output format of the file
pub fn compose(
    canonical: &str,
    surface: &RichSurface,
    state: &RenderState,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Plain => canonical.to_string(),
        OutputFormat::Rich => surface.to_markup(state),
        OutputFormat::Html => formatter::write_document(surface.blocks(), state),
    }
}

/// Compose and write the preview document
///
/// # Returns
/// * `Ok(())` - Successfully exported
/// * `Err(ExportError)` - Target could not be written; no partial file is left
pub fn export(
    canonical: &str,
    surface: &RichSurface,
    state: &RenderState,
    format: OutputFormat,
    output_path: &Path,
) -> Result<(), ExportError> {
    let content = compose(canonical, surface, state, format);
    write_atomic(&content, output_path)?;
    log::info!(
        "Exported {:?} document to {}",
        format,
        output_path.display()
    );
    Ok(())
}

/// Write `content` to a temporary sibling and move it into place
pub fn write_atomic(content: &str, output_path: &Path) -> Result<(), ExportError> {
    let io_error = |source| ExportError::Io {
        path: output_path.to_path_buf(),
        source,
    };

    // Create parent directories if they don't exist
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_error)?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(content.as_bytes()).map_err(io_error)?;
    file.persist(output_path).map_err(|e| io_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_surface::Selection;

    const TEXT: &str = "**SCOPE**\n\nA. Footings\n    1. Excavation by others";

    #[test]
    fn test_plain_export_is_canonical_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scope.txt");
        let state = RenderState::default();
        let surface = RichSurface::from_text(TEXT, &state);

        export(TEXT, &surface, &state, OutputFormat::Plain, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), TEXT);
    }

    #[test]
    fn test_html_export_keeps_surface_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("scope.html");
        let state = RenderState::default().with_format(OutputFormat::Html);
        let mut surface = RichSurface::from_text(TEXT, &state);
        surface.select(Selection::caret(8));
        surface.indent(35);

        export(TEXT, &surface, &state, OutputFormat::Html, &path).unwrap();
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("margin-left: 35px;"));
    }

    #[test]
    fn test_unwritable_target_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = write_atomic("content", &blocker.join("nested.txt")).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
    }
}
