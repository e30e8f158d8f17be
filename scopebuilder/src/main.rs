//! scopebuilder - scope-of-work document builder
//!
//! A CLI tool for building scope-of-work documents from checked items in a
//! reusable template and exporting them as text or HTML.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Selection, StyleArgs};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use scopebuilder::app_config::{AppConfig, CONFIG_FILE_NAME};
use scopebuilder::formatter::{OutputFormat, RenderState};
use scopebuilder::template_library::{self, LibraryEntry, TemplateEdit};
use scopebuilder::{LabelPath, Session};

/// Main entry point for the scopebuilder CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG is honoured; --verbose raises the level to info
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            selection,
            style,
            output,
        } => {
            handle_render_command(&config, &selection, &style, output)?;
        }

        Commands::Tree { selection } => {
            handle_tree_command(&config, &selection)?;
        }

        Commands::SaveProject { selection, output } => {
            handle_save_project_command(&config, &selection, &output)?;
        }

        Commands::NewTemplate { name, dir } => {
            let dir = dir.unwrap_or_else(|| config.templates_dir.clone());
            handle_new_template_command(&name, &dir)?;
        }

        Commands::EditTemplate {
            template,
            add,
            remove,
            toggle_lock,
            toggle_highlight,
        } => {
            let edits = collect_edits(&add, &remove, &toggle_lock, &toggle_highlight);
            handle_edit_template_command(&template, &edits)?;
        }

        Commands::ListTemplates { dir, filter } => {
            let dir = dir.unwrap_or_else(|| config.templates_dir.clone());
            handle_list_templates_command(&dir, filter.as_deref())?;
        }

        Commands::ListProjects { dir, filter } => {
            let dir = dir.unwrap_or_else(|| config.projects_dir.clone());
            handle_list_projects_command(&dir, filter.as_deref())?;
        }
    }

    Ok(())
}

/// Load the configuration named on the command line, or ./scopebuilder.toml
/// when it exists
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => AppConfig::load_or_default(CONFIG_FILE_NAME)
            .with_context(|| format!("Failed to load configuration {}", CONFIG_FILE_NAME)),
    }
}

/// Open the template or project and apply the --check items
fn open_selection(render: &RenderState, selection: &Selection) -> Result<Session> {
    let mut session = Session::new(render.clone());

    if let Some(project) = &selection.project {
        let missing = session
            .open_project(project)
            .with_context(|| format!("Failed to open project {}", project.display()))?;
        if missing > 0 {
            println!(
                "Warning: {} checked item(s) are no longer in the template",
                missing
            );
        }
    } else if let Some(template) = &selection.template {
        session
            .open_template(template)
            .with_context(|| format!("Failed to open template {}", template.display()))?;
    }

    for check in &selection.checks {
        let path = LabelPath::parse(check);
        session
            .set_checked(&path, true)
            .with_context(|| format!("Cannot check '{}'", check))?;
    }

    Ok(session)
}

/// Apply command-line style overrides to the configured render state
fn apply_style(mut state: RenderState, style: &StyleArgs, output: Option<&Path>) -> RenderState {
    let inferred = output
        .and_then(|path| path.extension())
        .and_then(|ext| ext.to_str())
        .and_then(|ext| match ext.to_lowercase().as_str() {
            "html" | "htm" => Some(OutputFormat::Html),
            "txt" => Some(OutputFormat::Plain),
            _ => None,
        });
    if let Some(format) = style.format.or(inferred) {
        state = state.with_format(format);
    }
    if let Some(numbering) = style.numbering {
        state = state.with_numbering(numbering);
    }
    if let Some(pt) = style.font_size {
        state = state.with_font_size(pt);
    }
    if let Some(px) = style.indent {
        state = state.with_indent(px);
    }
    if let Some(spacing) = style.spacing {
        state = state.with_spacing(spacing);
    }
    if style.no_header {
        state = state.with_header(false);
    }
    if let Some(title) = &style.title {
        state.header_title = title.clone();
    }
    state
}

/// Handle the render command
fn handle_render_command(
    config: &AppConfig,
    selection: &Selection,
    style: &StyleArgs,
    output: Option<PathBuf>,
) -> Result<()> {
    let session = open_selection(&config.render, selection)?;
    let state = apply_style(config.render.clone(), style, output.as_deref());
    let format = state.output_format;
    session.set_render_state(state);

    match output {
        Some(output) => {
            println!("Rendering {} checked items...", session.model().checked_paths().len());
            session
                .export(&output, format)
                .with_context(|| format!("Failed to export to {}", output.display()))?;
            println!("✓ Successfully wrote: {}", output.display());
        }
        None => {
            println!("{}", session.preview().content());
        }
    }

    Ok(())
}

/// Handle the tree command
fn handle_tree_command(config: &AppConfig, selection: &Selection) -> Result<()> {
    let session = open_selection(&config.render, selection)?;
    let tree = session.tree();

    println!("{}\n", tree.name());
    for (depth, id) in tree.walk() {
        let node = tree.node(id);
        let mut line = format!(
            "{} {}{}",
            if node.checked { "[x]" } else { "[ ]" },
            "  ".repeat(depth),
            node.label
        );
        if node.locked {
            line.push_str(" (locked)");
        }
        if node.highlighted {
            line.push_str(" *");
        }
        println!("{}", line);
    }

    println!(
        "\n✓ {} items, {} checked",
        tree.len(),
        tree.checked_paths().len()
    );
    Ok(())
}

/// Handle the save-project command
fn handle_save_project_command(
    config: &AppConfig,
    selection: &Selection,
    output: &Path,
) -> Result<()> {
    let session = open_selection(&config.render, selection)?;
    session
        .save_project(output)
        .with_context(|| format!("Failed to save project to {}", output.display()))?;
    println!(
        "✓ Saved {} checked items to {}",
        session.model().checked_paths().len(),
        output.display()
    );
    Ok(())
}

/// Handle the new-template command
fn handle_new_template_command(name: &str, dir: &Path) -> Result<()> {
    let path = template_library::create_template(dir, name)
        .with_context(|| format!("Failed to create template '{}'", name))?;
    println!("✓ Created template: {}", path.display());
    Ok(())
}

/// Order edit-template flags: additions, toggles, then removals
fn collect_edits(
    add: &[String],
    remove: &[String],
    toggle_lock: &[String],
    toggle_highlight: &[String],
) -> Vec<TemplateEdit> {
    let parsed = |items: &[String], edit: fn(LabelPath) -> TemplateEdit| {
        items
            .iter()
            .map(|item| edit(LabelPath::parse(item)))
            .collect::<Vec<_>>()
    };
    let mut edits = parsed(add, TemplateEdit::Add);
    edits.extend(parsed(toggle_lock, TemplateEdit::ToggleLock));
    edits.extend(parsed(toggle_highlight, TemplateEdit::ToggleHighlight));
    edits.extend(parsed(remove, TemplateEdit::Remove));
    edits
}

/// Handle the edit-template command
fn handle_edit_template_command(template: &Path, edits: &[TemplateEdit]) -> Result<()> {
    if edits.is_empty() {
        println!("Nothing to do: pass --add, --remove, --toggle-lock or --toggle-highlight");
        return Ok(());
    }

    let doc = template_library::edit_template(template, edits)
        .with_context(|| format!("Failed to edit template {}", template.display()))?;
    println!(
        "✓ Applied {} edit(s) to '{}' ({} top-level sections)",
        edits.len(),
        doc.template_name,
        doc.sections.len()
    );
    Ok(())
}

/// Handle the list-templates command
fn handle_list_templates_command(dir: &Path, filter: Option<&str>) -> Result<()> {
    let entries = template_library::list_templates(dir, filter)
        .with_context(|| format!("Failed to list templates in {}", dir.display()))?;

    if entries.is_empty() {
        println!("No templates found in {}", dir.display());
        return Ok(());
    }

    println!("Available templates in {}:\n", dir.display());
    for entry in &entries {
        print_entry(entry);
    }
    println!("\nUsage: scopebuilder render <template> --check \"Section > Item\"");
    Ok(())
}

/// Handle the list-projects command
fn handle_list_projects_command(dir: &Path, filter: Option<&str>) -> Result<()> {
    let entries = template_library::list_projects(dir, filter)
        .with_context(|| format!("Failed to list projects in {}", dir.display()))?;

    if entries.is_empty() {
        println!("No projects found in {}", dir.display());
        return Ok(());
    }

    println!("Saved projects in {}:\n", dir.display());
    for entry in &entries {
        print_entry(entry);
        if let Some(template) = &entry.template_file {
            println!("    Template: {}", template.display());
        }
    }
    Ok(())
}

fn print_entry(entry: &LibraryEntry) {
    println!(
        "  {:<40} {:>14}  {}",
        entry.name,
        describe_age(entry.modified),
        entry.path.display()
    );
}

/// Coarse "how long ago" for a modification time
fn describe_age(modified: Option<SystemTime>) -> String {
    let Some(elapsed) = modified.and_then(|time| time.elapsed().ok()) else {
        return "-".to_string();
    };
    match elapsed.as_secs() {
        0..=59 => "just now".to_string(),
        secs @ 60..=3599 => format!("{} min ago", secs / 60),
        secs @ 3600..=86_399 => format!("{} h ago", secs / 3600),
        secs => format!("{} days ago", secs / 86_400),
    }
}
