//! Canonical scope text generation
//!
//! Walks the checked items of a [`ScopeTree`] and writes the indented,
//! numbered plain-text document that every other output format is rendered
//! from:
//!
//! ```text
//! ----------------------------------------
//! **SCOPE CLARIFICATIONS**
//!
//! A. Footings and Foundations
//!     1. Excavation by others
//!     2. Rebar supplied and installed
//! B. Slab-on-Grade
//! ```
//!
//! Check state is not inherited: a checked item below an unchecked parent is
//! still written, numbered relative to the checked siblings it was visited
//! with.

use crate::scope_tree::{NodeId, ScopeTree};

/// Section names that get a divider rule written above them
///
/// Matched as substrings of the upper-cased section label.
pub const DIVIDER_SECTIONS: [&str; 4] = [
    "MILESTONES",
    "ESTIMATED WORKFORCE",
    "CLARIFICATIONS",
    "SCOPE CLARIFICATIONS",
];

/// Divider line written above the sections in [`DIVIDER_SECTIONS`]
pub const DIVIDER: &str = "----------------------------------------";

const INDENT: &str = "    ";

/// Generate canonical text for the checked items of a tree
pub fn generate(tree: &ScopeTree) -> String {
    let lines = visit(tree, tree.root(), 0);
    collapse_blank_lines(lines).join("\n")
}

/// Emit the lines for the children of `parent`, which sit at `depth`
fn visit(tree: &ScopeTree, parent: NodeId, depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut letter: u8 = 0;
    let mut number: usize = 0;

    for &child in tree.node(parent).children() {
        let node = tree.node(child);
        if node.checked {
            let text = node.label.trim();
            match depth {
                0 => {
                    let upper = text.to_uppercase();
                    if DIVIDER_SECTIONS.iter().any(|name| upper.contains(name)) {
                        lines.push(DIVIDER.to_string());
                    }
                    lines.push(format!("**{}**", upper));
                    lines.push(String::new());
                }
                1 => {
                    lines.push(format!("{}. {}", subsection_letter(letter), text));
                    letter = letter.wrapping_add(1);
                }
                2 => {
                    number += 1;
                    lines.push(format!("{}{}. {}", INDENT, number, text));
                }
                _ => {
                    let indent = INDENT.repeat(depth - 1);
                    let sub_number = lines.iter().filter(|l| l.starts_with(&indent)).count() + 1;
                    lines.push(format!("{}{}. {}", indent, sub_number, text));
                }
            }
        }
        lines.extend(visit(tree, child, depth + 1));
    }

    lines
}

/// Letter for the n-th checked subsection (0 → 'A'); wraps after 'Z'
fn subsection_letter(index: u8) -> char {
    char::from(b'A' + index % 26)
}

/// Blank out whitespace-only lines and collapse runs of blanks to one
fn collapse_blank_lines(lines: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = lines
        .into_iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line
            }
        })
        .collect();
    cleaned.dedup_by(|a, b| a.is_empty() && b.is_empty());
    cleaned
}
