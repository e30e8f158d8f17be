//! Scope model: the tree plus change notification and undoable edits
//!
//! Check and label edits are recorded as [`Command`]s on the shared
//! [`History`]. After every tree mutation, including undo and redo, the model
//! regenerates the canonical text and hands it to each subscriber. The tree
//! is never borrowed while subscribers run, so a subscriber may push commands
//! or read the model.

use std::cell::{Ref, RefCell};
use std::path::Path;
use std::rc::{Rc, Weak};

use crate::history::{Command, History};
use crate::scope_text;
use crate::scope_tree::{LabelPath, NodeId, ScopeTree, TreeError};
use crate::template_document::{DocumentError, TemplateDocument};

type Listener = Rc<dyn Fn(&str)>;

#[derive(Default)]
struct Shared {
    tree: RefCell<ScopeTree>,
    listeners: RefCell<Vec<Listener>>,
}

impl Shared {
    fn notify(&self) {
        let text = scope_text::generate(&self.tree.borrow());
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&text);
        }
    }
}

/// Undoable, observable scope tree
pub struct ScopeModel {
    history: Rc<History>,
    shared: Rc<Shared>,
}

impl ScopeModel {
    /// Create a model holding an empty tree
    pub fn new(history: Rc<History>) -> Self {
        Self {
            history,
            shared: Rc::new(Shared::default()),
        }
    }

    /// Register a change listener receiving the fresh canonical text
    pub fn subscribe(&self, listener: impl Fn(&str) + 'static) {
        self.shared.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Replace the tree with one parsed from template JSON
    ///
    /// On failure the current tree and history are left untouched.
    pub fn load_template(&self, source: &str) -> Result<(), DocumentError> {
        let tree = ScopeTree::from_json(source)?;
        self.replace_tree(tree);
        Ok(())
    }

    /// Replace the tree with one loaded from a template file
    pub fn load_template_file(&self, path: &Path) -> Result<(), DocumentError> {
        let doc = TemplateDocument::load(path)?;
        log::info!(
            "Loaded template '{}' from {}",
            doc.template_name,
            path.display()
        );
        self.replace_tree(ScopeTree::from_template(&doc));
        Ok(())
    }

    /// Discard the tree and start from an empty one
    pub fn reset(&self) {
        self.replace_tree(ScopeTree::default());
    }

    /// Install `tree`, announce it, then forget all history
    ///
    /// Commands capture node ids of the tree they were made for, so none
    /// may outlive it.
    fn replace_tree(&self, tree: ScopeTree) {
        *self.shared.tree.borrow_mut() = tree;
        self.shared.notify();
        self.history.clear();
    }

    /// Check or uncheck the node at `path`
    ///
    /// Setting the current value records nothing.
    pub fn set_checked(&self, path: &LabelPath, value: bool) -> Result<(), TreeError> {
        let (id, current) = {
            let tree = self.tree();
            let id = tree.find(path)?;
            (id, tree.node(id).checked)
        };
        if current == value {
            return Ok(());
        }

        let apply = Rc::downgrade(&self.shared);
        let revert = Rc::downgrade(&self.shared);
        self.history.push(Command::new(
            "Toggle Check",
            move || {
                mutate(&apply, |tree| {
                    tree.set_checked(id, value);
                })
            },
            move || {
                mutate(&revert, |tree| {
                    tree.set_checked(id, !value);
                })
            },
        ));
        Ok(())
    }

    /// Rename the node at `path`
    ///
    /// # Returns
    /// * `Err(TreeError::PathNotFound)` - No node at `path`
    /// * `Err(TreeError::NodeLocked)` - The node rejects label edits
    pub fn set_label(&self, path: &LabelPath, label: &str) -> Result<(), TreeError> {
        let (id, previous) = {
            let tree = self.tree();
            let id = tree.find(path)?;
            let node = tree.node(id);
            if node.locked {
                return Err(TreeError::NodeLocked(path.clone()));
            }
            (id, node.label.clone())
        };
        if previous == label {
            return Ok(());
        }

        let apply = Rc::downgrade(&self.shared);
        let revert = Rc::downgrade(&self.shared);
        let next = label.to_string();
        self.history.push(Command::new(
            "Edit Text",
            move || mutate(&apply, |tree| relabel(tree, id, &next)),
            move || mutate(&revert, |tree| relabel(tree, id, &previous)),
        ));
        Ok(())
    }

    /// Label paths of every checked node in document order
    pub fn checked_paths(&self) -> Vec<LabelPath> {
        self.tree().checked_paths()
    }

    /// Check exactly the listed paths as one undoable step
    ///
    /// # Returns
    /// * Number of listed paths absent from the tree
    pub fn set_checked_paths(&self, paths: &[LabelPath]) -> usize {
        let (before, after, missing) = {
            let mut tree = self.shared.tree.borrow_mut();
            let before = tree.check_states();
            let missing = tree.set_checked_paths(paths);
            let after = tree.check_states();
            tree.restore_check_states(&before);
            (before, after, missing)
        };
        if before == after {
            return missing;
        }

        let apply = Rc::downgrade(&self.shared);
        let revert = Rc::downgrade(&self.shared);
        self.history.push(Command::new(
            "Restore Checked Items",
            move || mutate(&apply, |tree| tree.restore_check_states(&after)),
            move || mutate(&revert, |tree| tree.restore_check_states(&before)),
        ));
        missing
    }

    /// Template document for the current tree
    pub fn serialize(&self) -> TemplateDocument {
        self.tree().serialize()
    }

    /// Canonical text of the current check state
    pub fn canonical_text(&self) -> String {
        scope_text::generate(&self.tree())
    }

    /// Read access to the tree
    ///
    /// The borrow must be released before any model operation is called.
    pub fn tree(&self) -> Ref<'_, ScopeTree> {
        self.shared.tree.borrow()
    }
}

/// Mutate the tree behind `shared`, then notify with the borrow released
fn mutate(shared: &Weak<Shared>, change: impl FnOnce(&mut ScopeTree)) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    change(&mut shared.tree.borrow_mut());
    shared.notify();
}

fn relabel(tree: &mut ScopeTree, id: NodeId, label: &str) {
    if let Err(e) = tree.set_label(id, label) {
        log::warn!("Label edit skipped: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"{
        "template_name": "Concrete",
        "sections": [
            {"title": "SCOPE CLARIFICATIONS", "children": [
                {"title": "Item A", "children": [{"title": "Note 1"}, {"title": "1.1 extra"}]}
            ]},
            {"title": "MILESTONES", "locked": true}
        ]
    }"#;

    fn path(labels: &[&str]) -> LabelPath {
        LabelPath::from(labels)
    }

    fn model() -> (Rc<History>, ScopeModel, Rc<RefCell<Vec<String>>>) {
        let history = History::shared();
        let model = ScopeModel::new(Rc::clone(&history));
        model.load_template(TEMPLATE).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        model.subscribe(move |text| sink.borrow_mut().push(text.to_string()));
        (history, model, seen)
    }

    #[test]
    fn test_set_checked_notifies_and_undoes() {
        let (history, model, seen) = model();
        model
            .set_checked(&path(&["SCOPE CLARIFICATIONS"]), true)
            .unwrap();
        assert_eq!(
            seen.borrow().last().unwrap(),
            "----------------------------------------\n**SCOPE CLARIFICATIONS**\n"
        );
        assert_eq!(history.undo_label().as_deref(), Some("Toggle Check"));

        history.undo();
        assert!(model.checked_paths().is_empty());
        assert_eq!(seen.borrow().last().unwrap(), "");

        history.redo();
        assert_eq!(model.checked_paths(), vec![path(&["SCOPE CLARIFICATIONS"])]);
    }

    #[test]
    fn test_same_value_records_nothing() {
        let (history, model, seen) = model();
        model.set_checked(&path(&["MILESTONES"]), false).unwrap();
        assert!(!history.can_undo());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_unknown_path_and_locked_label() {
        let (history, model, _) = model();
        let missing = path(&["NOPE"]);
        assert_eq!(
            model.set_checked(&missing, true),
            Err(TreeError::PathNotFound(missing.clone()))
        );
        assert_eq!(
            model.set_label(&path(&["MILESTONES"]), "Schedule"),
            Err(TreeError::NodeLocked(path(&["MILESTONES"])))
        );
        assert!(!history.can_undo());
    }

    #[test]
    fn test_set_label_is_undoable() {
        let (history, model, _) = model();
        let item = path(&["SCOPE CLARIFICATIONS", "Item A"]);
        model.set_label(&item, "Item B").unwrap();
        assert!(model
            .tree()
            .find(&path(&["SCOPE CLARIFICATIONS", "Item B"]))
            .is_ok());
        history.undo();
        assert!(model.tree().find(&item).is_ok());
    }

    #[test]
    fn test_set_checked_paths_single_command() {
        let (history, model, _) = model();
        let paths = vec![
            path(&["SCOPE CLARIFICATIONS"]),
            path(&["SCOPE CLARIFICATIONS", "Item A"]),
            path(&["SCOPE CLARIFICATIONS", "Item A", "Note 1"]),
            path(&["Gone"]),
        ];
        assert_eq!(model.set_checked_paths(&paths), 1);
        assert_eq!(model.checked_paths(), paths[..3].to_vec());
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.undo_label().as_deref(), Some("Restore Checked Items"));

        history.undo();
        assert!(model.checked_paths().is_empty());
    }

    #[test]
    fn test_failed_load_keeps_tree_and_history() {
        let (history, model, _) = model();
        model.set_checked(&path(&["MILESTONES"]), true).unwrap();
        assert!(model.load_template("{ broken").is_err());
        assert_eq!(model.checked_paths(), vec![path(&["MILESTONES"])]);
        assert!(history.can_undo());

        model.load_template(TEMPLATE).unwrap();
        assert!(model.checked_paths().is_empty());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_listener_may_push_commands() {
        let history = History::shared();
        let model = ScopeModel::new(Rc::clone(&history));
        model.load_template(TEMPLATE).unwrap();

        let mirror = Rc::new(RefCell::new(String::new()));
        {
            let history = Rc::downgrade(&history);
            let mirror = Rc::clone(&mirror);
            model.subscribe(move |text| {
                let Some(history) = history.upgrade() else {
                    return;
                };
                let old = mirror.borrow().clone();
                let new = text.to_string();
                let (a, b) = (Rc::clone(&mirror), Rc::clone(&mirror));
                history.push(Command::new(
                    "Mirror",
                    move || *a.borrow_mut() = new.clone(),
                    move || *b.borrow_mut() = old.clone(),
                ));
            });
        }

        model.set_checked(&path(&["MILESTONES"]), true).unwrap();
        assert_eq!(
            *mirror.borrow(),
            "----------------------------------------\n**MILESTONES**\n"
        );
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.undo_label().as_deref(), Some("Toggle Check"));

        history.undo();
        assert!(model.checked_paths().is_empty());
        assert_eq!(*mirror.borrow(), "");
        assert_eq!(history.redo_depth(), 1);

        history.redo();
        assert_eq!(model.checked_paths(), vec![path(&["MILESTONES"])]);
        assert_eq!(
            *mirror.borrow(),
            "----------------------------------------\n**MILESTONES**\n"
        );
    }

    #[test]
    fn test_reset_empties_tree() {
        let (history, model, seen) = model();
        model.set_checked(&path(&["MILESTONES"]), true).unwrap();
        model.reset();
        assert!(model.tree().is_empty());
        assert_eq!(seen.borrow().last().unwrap(), "");
        assert!(!history.can_undo());
        assert_eq!(model.serialize(), TemplateDocument::new("Template"));
    }
}
