//! Hierarchical scope tree with per-node check, lock and highlight state
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Parent links
//! are plain indices used to rebuild label paths; ownership flows only from
//! the arena. Detached nodes stay in the arena but are unreachable from the
//! root and therefore invisible to every traversal.

mod error;
mod label_path;

pub use error::TreeError;
pub use label_path::LabelPath;

use std::collections::HashSet;

use crate::template_document::{DocumentError, Section, TemplateDocument};

/// Index of a node inside its [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One scope item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeNode {
    /// Displayed text
    pub label: String,
    /// Included in the generated document
    pub checked: bool,
    /// Rejects label edits
    pub locked: bool,
    /// Presentation-only emphasis
    pub highlighted: bool,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl ScopeNode {
    fn new(label: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            label: label.into(),
            checked: false,
            locked: false,
            highlighted: false,
            children: Vec::new(),
            parent,
        }
    }

    /// Child ids in document order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Arena-backed scope tree under a virtual root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTree {
    name: String,
    nodes: Vec<ScopeNode>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new("Template")
    }
}

impl ScopeTree {
    const ROOT: NodeId = NodeId(0);

    /// Create an empty tree containing only the virtual root
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: vec![ScopeNode::new("", None)],
        }
    }

    /// Build a tree from a parsed template document
    pub fn from_template(doc: &TemplateDocument) -> Self {
        let mut tree = Self::new(doc.template_name.clone());
        for section in &doc.sections {
            tree.insert_section(Self::ROOT, section);
        }
        log::debug!(
            "Built scope tree '{}' with {} items",
            tree.name,
            tree.len()
        );
        tree
    }

    /// Parse template JSON into a tree
    pub fn from_json(source: &str) -> Result<Self, DocumentError> {
        TemplateDocument::from_json(source).map(|doc| Self::from_template(&doc))
    }

    fn insert_section(&mut self, parent: NodeId, section: &Section) {
        let id = self.push_node(parent, section.label());
        let node = &mut self.nodes[id.0];
        node.locked = section.locked;
        node.highlighted = section.highlight;
        for child in &section.children {
            self.insert_section(id, child);
        }
    }

    fn push_node(&mut self, parent: NodeId, label: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ScopeNode::new(label, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Convert the tree back to a template document
    ///
    /// Check state is not part of a template and is not written.
    pub fn serialize(&self) -> TemplateDocument {
        TemplateDocument {
            template_name: self.name.clone(),
            sections: self.sections_of(Self::ROOT),
        }
    }

    fn sections_of(&self, id: NodeId) -> Vec<Section> {
        self.nodes[id.0]
            .children
            .iter()
            .map(|&child| {
                let node = &self.nodes[child.0];
                Section {
                    title: Some(node.label.clone()),
                    text: None,
                    locked: node.locked,
                    highlight: node.highlighted,
                    children: self.sections_of(child),
                }
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn node(&self, id: NodeId) -> &ScopeNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut ScopeNode {
        &mut self.nodes[id.0]
    }

    /// Number of reachable items, root excluded
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[Self::ROOT.0].children.is_empty()
    }

    /// Depth-first traversal in document order yielding `(depth, id)`
    pub fn walk(&self) -> Walk<'_> {
        let stack: Vec<(usize, NodeId)> = self.nodes[Self::ROOT.0]
            .children
            .iter()
            .rev()
            .map(|&id| (0, id))
            .collect();
        Walk { tree: self, stack }
    }

    /// Depth of a node (0 for top-level sections, `None` for the root)
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.nodes[id.0].parent?;
        while let Some(parent) = self.nodes[current.0].parent {
            depth += 1;
            current = parent;
        }
        Some(depth)
    }

    /// Rebuild the label path of a node by following parent links
    pub fn path_of(&self, id: NodeId) -> LabelPath {
        let mut labels = Vec::new();
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            labels.push(self.nodes[current.0].label.clone());
            current = parent;
        }
        labels.reverse();
        LabelPath::from(labels)
    }

    /// Find the first node whose label path matches
    ///
    /// Sibling labels are not required to be unique; the first match in
    /// document order wins.
    pub fn find(&self, path: &LabelPath) -> Result<NodeId, TreeError> {
        if path.is_empty() {
            return Err(TreeError::RootNotAddressable);
        }
        let mut current = Self::ROOT;
        for label in &path.labels {
            current = self.nodes[current.0]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child.0].label == *label)
                .ok_or_else(|| TreeError::PathNotFound(path.clone()))?;
        }
        Ok(current)
    }

    /// Set the checked flag of a node
    ///
    /// # Returns
    /// * The previous value of the flag
    pub fn set_checked(&mut self, id: NodeId, value: bool) -> bool {
        std::mem::replace(&mut self.node_mut(id).checked, value)
    }

    /// Replace the label of an unlocked node
    ///
    /// # Returns
    /// * `Ok(String)` - The previous label
    /// * `Err(TreeError::NodeLocked)` - The node rejects edits
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<String, TreeError> {
        if self.node(id).locked {
            return Err(TreeError::NodeLocked(self.path_of(id)));
        }
        Ok(std::mem::replace(&mut self.node_mut(id).label, label.into()))
    }

    /// Label paths of every checked node, depth-first in document order
    pub fn checked_paths(&self) -> Vec<LabelPath> {
        self.walk()
            .filter(|&(_, id)| self.node(id).checked)
            .map(|(_, id)| self.path_of(id))
            .collect()
    }

    /// Check exactly the nodes whose path is listed and uncheck all others
    ///
    /// Paths that match no node are skipped.
    ///
    /// # Returns
    /// * Number of listed paths that matched no node
    pub fn set_checked_paths(&mut self, paths: &[LabelPath]) -> usize {
        let wanted: HashSet<&LabelPath> = paths.iter().collect();
        let mut matched: HashSet<&LabelPath> = HashSet::new();

        let ids: Vec<NodeId> = self.walk().map(|(_, id)| id).collect();
        for id in ids {
            let path = self.path_of(id);
            let checked = match wanted.get(&path) {
                Some(&listed) => {
                    matched.insert(listed);
                    true
                }
                None => false,
            };
            self.node_mut(id).checked = checked;
        }

        let missing = wanted.len() - matched.len();
        for path in wanted.difference(&matched) {
            log::debug!("Skipping checked item not present in template: {}", path);
        }
        missing
    }

    /// Snapshot of every node's checked flag, indexed by arena slot
    pub fn check_states(&self) -> Vec<bool> {
        self.nodes.iter().map(|node| node.checked).collect()
    }

    /// Restore a snapshot taken with [`ScopeTree::check_states`]
    pub fn restore_check_states(&mut self, states: &[bool]) {
        for (node, &checked) in self.nodes.iter_mut().zip(states) {
            node.checked = checked;
        }
    }

    /// Append a new unchecked child under `parent` (empty path = top level)
    pub fn add_child(
        &mut self,
        parent: &LabelPath,
        label: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        let parent = if parent.is_empty() {
            Self::ROOT
        } else {
            self.find(parent)?
        };
        let label = label.into();
        Ok(self.push_node(parent, &label))
    }

    /// Detach a node and its subtree from the tree
    pub fn remove(&mut self, path: &LabelPath) -> Result<(), TreeError> {
        let id = self.find(path)?;
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
        Ok(())
    }

    /// Flip the lock flag of a node, returning the new value
    pub fn toggle_locked(&mut self, path: &LabelPath) -> Result<bool, TreeError> {
        let id = self.find(path)?;
        let node = self.node_mut(id);
        node.locked = !node.locked;
        Ok(node.locked)
    }

    /// Flip the highlight flag of a node, returning the new value
    pub fn toggle_highlighted(&mut self, path: &LabelPath) -> Result<bool, TreeError> {
        let id = self.find(path)?;
        let node = self.node_mut(id);
        node.highlighted = !node.highlighted;
        Ok(node.highlighted)
    }
}

/// Depth-first iterator over a [`ScopeTree`]
pub struct Walk<'a> {
    tree: &'a ScopeTree,
    stack: Vec<(usize, NodeId)>,
}

impl Iterator for Walk<'_> {
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        self.stack.extend(
            self.tree.nodes[id.0]
                .children
                .iter()
                .rev()
                .map(|&child| (depth + 1, child)),
        );
        Some((depth, id))
    }
}
