//! Undo/redo history built from reversible commands
//!
//! A [`History`] is an explicitly constructed value shared (via `Rc`) by every
//! component that mutates session state. It is deliberately `!Send`: all
//! pushes, undos and redos happen on one control flow.
//!
//! Commands may re-enter the history while they run. No stack is borrowed
//! while an action executes, so a change notification fired from inside
//! `apply` or `revert` may push further commands:
//!
//! * During [`History::push`] a nested command is applied at once and folded
//!   into the entry of the outer command. Undo reverts the nested commands in
//!   reverse order and then the outer one; redo re-applies the outer command
//!   and then the nested ones in order. One user action is one undo step.
//! * During [`History::undo`] or [`History::redo`] a nested command is applied
//!   but not recorded, and the redo chain is left intact. Such commands
//!   re-derive state from what the replayed action just changed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Action = Box<dyn Fn()>;

/// An immutable pair of reversible actions plus a human-readable label
pub struct Command {
    label: String,
    apply: Action,
    revert: Action,
}

impl Command {
    /// Create a command from its forward and backward actions
    ///
    /// # Parameters
    /// * `label` - Description shown to the user (e.g., "Toggle Check")
    /// * `apply` - Action performing the change
    /// * `revert` - Action undoing the change
    pub fn new(
        label: impl Into<String>,
        apply: impl Fn() + 'static,
        revert: impl Fn() + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            apply: Box::new(apply),
            revert: Box::new(revert),
        }
    }

    /// Human-readable label of this command
    pub fn label(&self) -> &str {
        &self.label
    }

    fn apply(&self) {
        (self.apply)();
    }

    fn revert(&self) {
        (self.revert)();
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// One undo step: a pushed command plus everything it pushed while applying
#[derive(Debug)]
struct Entry {
    command: Command,
    nested: Vec<Command>,
}

impl Entry {
    fn revert(&self) {
        for command in self.nested.iter().rev() {
            command.revert();
        }
        self.command.revert();
    }

    fn apply(&self) {
        self.command.apply();
        for command in &self.nested {
            command.apply();
        }
    }
}

/// What the history is doing while an action runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Idle,
    /// Applying a freshly pushed command
    Recording,
    /// Running an undo or redo
    Replaying,
}

/// Linear undo/redo history
#[derive(Debug, Default)]
pub struct History {
    done: RefCell<Vec<Entry>>,
    undone: RefCell<Vec<Entry>>,
    nested: RefCell<Vec<Command>>,
    mode: Cell<Mode>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty history behind a shared handle
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Run a command and record it
    ///
    /// A top-level push records one entry and discards the redo chain. A
    /// push made while another action runs is applied immediately and either
    /// folded into the running entry or left unrecorded (see module docs).
    pub fn push(&self, command: Command) {
        match self.mode.get() {
            Mode::Replaying => {
                log::debug!("history: replay-only '{}'", command.label);
                command.apply();
            }
            Mode::Recording => {
                log::debug!("history: nested '{}'", command.label);
                command.apply();
                self.nested.borrow_mut().push(command);
            }
            Mode::Idle => {
                log::debug!("history: push '{}'", command.label);
                self.mode.set(Mode::Recording);
                command.apply();
                self.mode.set(Mode::Idle);
                let nested = self.nested.take();
                self.done.borrow_mut().push(Entry { command, nested });
                self.undone.borrow_mut().clear();
            }
        }
    }

    /// Revert the most recent undo step
    ///
    /// # Returns
    /// * `true` - A step was reverted
    /// * `false` - Nothing to undo
    pub fn undo(&self) -> bool {
        let Some(entry) = self.done.borrow_mut().pop() else {
            return false;
        };
        log::debug!("history: undo '{}'", entry.command.label);
        self.replay(|| entry.revert());
        self.undone.borrow_mut().push(entry);
        true
    }

    /// Re-apply the most recently reverted undo step
    ///
    /// # Returns
    /// * `true` - A step was re-applied
    /// * `false` - Nothing to redo
    pub fn redo(&self) -> bool {
        let Some(entry) = self.undone.borrow_mut().pop() else {
            return false;
        };
        log::debug!("history: redo '{}'", entry.command.label);
        self.replay(|| entry.apply());
        self.done.borrow_mut().push(entry);
        true
    }

    fn replay(&self, action: impl FnOnce()) {
        let outer = self.mode.replace(Mode::Replaying);
        action();
        self.mode.set(outer);
    }

    /// Drop both stacks without running any action
    pub fn clear(&self) {
        log::debug!("history: clear");
        self.done.borrow_mut().clear();
        self.undone.borrow_mut().clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.done.borrow().is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.borrow().is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.done.borrow().len()
    }

    pub fn redo_depth(&self) -> usize {
        self.undone.borrow().len()
    }

    /// Label of the step the next [`History::undo`] would revert
    pub fn undo_label(&self) -> Option<String> {
        self.done.borrow().last().map(|e| e.command.label.clone())
    }

    /// Label of the step the next [`History::redo`] would re-apply
    pub fn redo_label(&self) -> Option<String> {
        self.undone.borrow().last().map(|e| e.command.label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn set_command(cell: &Rc<Cell<i32>>, from: i32, to: i32) -> Command {
        let a = Rc::clone(cell);
        let b = Rc::clone(cell);
        Command::new("Set", move || a.set(to), move || b.set(from))
    }

    #[test]
    fn test_push_applies_immediately() {
        let value = Rc::new(Cell::new(0));
        let history = History::new();
        history.push(set_command(&value, 0, 5));
        assert_eq!(value.get(), 5);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_inverse() {
        let value = Rc::new(Cell::new(0));
        let history = History::new();
        history.push(set_command(&value, 0, 1));
        history.push(set_command(&value, 1, 2));

        assert!(history.undo());
        assert_eq!(value.get(), 1);
        assert!(history.undo());
        assert_eq!(value.get(), 0);
        assert!(!history.undo());
        assert_eq!(value.get(), 0);

        assert!(history.redo());
        assert_eq!(value.get(), 1);
        assert!(history.redo());
        assert_eq!(value.get(), 2);
        assert!(!history.redo());
    }

    #[test]
    fn test_push_after_undo_discards_redo() {
        let value = Rc::new(Cell::new(0));
        let history = History::new();
        history.push(set_command(&value, 0, 1));
        history.push(set_command(&value, 1, 2));
        history.undo();
        history.undo();
        assert_eq!(history.redo_depth(), 2);

        history.push(set_command(&value, 0, 7));
        assert_eq!(history.redo_depth(), 0);
        assert!(!history.redo());
        assert_eq!(value.get(), 7);
    }

    #[test]
    fn test_clear_runs_no_action() {
        let value = Rc::new(Cell::new(0));
        let history = History::new();
        history.push(set_command(&value, 0, 3));
        history.undo();
        history.push(set_command(&value, 0, 4));
        history.clear();
        assert_eq!(value.get(), 4);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_labels() {
        let value = Rc::new(Cell::new(0));
        let history = History::new();
        assert_eq!(history.undo_label(), None);
        let a = Rc::clone(&value);
        let b = Rc::clone(&value);
        history.push(Command::new("Toggle Check", move || a.set(1), move || b.set(0)));
        assert_eq!(history.undo_label().as_deref(), Some("Toggle Check"));
        history.undo();
        assert_eq!(history.redo_label().as_deref(), Some("Toggle Check"));
    }

    /// Outer command whose apply and revert notify an observer that pushes
    /// its own "Echo" command mirroring the outer value
    type Observed = (Rc<History>, Rc<Cell<i32>>, Rc<Cell<i32>>, Rc<dyn Fn(i32)>);

    fn observed_history() -> Observed {
        let history = History::shared();
        let outer = Rc::new(Cell::new(0));
        let echo = Rc::new(Cell::new(0));

        let notify: Rc<dyn Fn(i32)> = {
            let history = Rc::downgrade(&history);
            let echo = Rc::clone(&echo);
            Rc::new(move |value: i32| {
                let Some(history) = history.upgrade() else {
                    return;
                };
                let before = echo.get();
                let after = value * 10;
                let (a, b) = (Rc::clone(&echo), Rc::clone(&echo));
                history.push(Command::new(
                    "Echo",
                    move || a.set(after),
                    move || b.set(before),
                ));
            })
        };
        (history, outer, echo, notify)
    }

    fn outer_command(
        outer: &Rc<Cell<i32>>,
        notify: &Rc<dyn Fn(i32)>,
        from: i32,
        to: i32,
    ) -> Command {
        let (o1, o2) = (Rc::clone(outer), Rc::clone(outer));
        let (n1, n2) = (Rc::clone(notify), Rc::clone(notify));
        Command::new(
            "Outer",
            move || {
                o1.set(to);
                n1(to);
            },
            move || {
                o2.set(from);
                n2(from);
            },
        )
    }

    #[test]
    fn test_nested_push_from_apply() {
        let (history, outer, echo, notify) = observed_history();
        history.push(outer_command(&outer, &notify, 0, 1));

        assert_eq!(outer.get(), 1);
        assert_eq!(echo.get(), 10);
        // Nested command folded into the outer entry
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.undo_label().as_deref(), Some("Outer"));

        assert!(history.undo());
        assert_eq!(outer.get(), 0);
        assert_eq!(echo.get(), 0);
        assert_eq!(history.redo_label().as_deref(), Some("Outer"));

        assert!(history.redo());
        assert_eq!(outer.get(), 1);
        assert_eq!(echo.get(), 10);
    }

    #[test]
    fn test_replay_keeps_observer_in_step() {
        let (history, outer, echo, notify) = observed_history();
        history.push(outer_command(&outer, &notify, 0, 1));
        history.push(outer_command(&outer, &notify, 1, 2));
        assert_eq!(history.undo_depth(), 2);

        assert!(history.undo());
        assert_eq!((outer.get(), echo.get()), (1, 10));
        // Pushes fired during undo leave the redo chain alone
        assert_eq!(history.redo_depth(), 1);
        assert_eq!(history.undo_depth(), 1);

        assert!(history.undo());
        assert_eq!((outer.get(), echo.get()), (0, 0));
        assert!(!history.undo());

        assert!(history.redo());
        assert_eq!((outer.get(), echo.get()), (1, 10));
        assert!(history.redo());
        assert_eq!((outer.get(), echo.get()), (2, 20));
        assert!(!history.redo());
        assert_eq!(history.undo_depth(), 2);
    }
}
