//! scopebuilder - scope-of-work document builder
//!
//! Builds a scope-of-work document by checking items in a tree loaded from a
//! reusable template, generates numbered canonical text from the checked
//! items and renders it as plain text, rich text or HTML. Every edit goes
//! through an undo/redo history.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]

pub mod app_config;
pub mod history;
pub mod scope_text;
pub mod scope_tree;
pub mod template_document;
pub mod template_library;

// Rendering and the editable preview
pub mod formatter;
pub mod preview;
pub mod rich_surface;

pub mod exporter;

// Observable model and the session tying it to the preview
pub mod scope_model;
pub mod session;

pub use history::{Command, History};
pub use scope_tree::{LabelPath, ScopeTree};
pub use session::{Session, SessionError};
