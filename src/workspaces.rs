//! Outputs and workspaces.
//!
//! Outputs hang directly off the root; workspaces hang off an output. Both
//! are ordinary containers distinguished by their kind, so everything else in
//! the tree (focus order, ancestor lookups, fullscreen exclusivity) treats
//! them like any other container.

use crate::display::DisplayServer;
use crate::layout::{ConId, ConTree};
use crate::types::ConKind;

impl<D: DisplayServer> ConTree<D> {
    /// Create an output under the root
    pub fn add_output(&mut self, name: &str) -> ConId {
        let root = self.root();
        let output = self.create_kind(ConKind::Output, name);
        self.attach(output, root);
        log::info!("Added output '{}' ({:?})", name, output);
        output
    }

    /// Create a workspace on `output`.
    ///
    /// # Panics
    ///
    /// Panics if `output` is not an output container.
    pub fn add_workspace(&mut self, output: ConId, name: &str) -> ConId {
        assert_eq!(
            self.con(output).kind(),
            ConKind::Output,
            "workspaces must be added to an output"
        );
        let workspace = self.create_kind(ConKind::Workspace, name);
        self.attach(workspace, output);
        log::info!("Added workspace '{}' ({:?})", name, workspace);
        workspace
    }

    fn create_kind(&mut self, kind: ConKind, name: &str) -> ConId {
        let id = self.create_node(None);
        self.set_kind(id, kind);
        self.set_name(id, name);
        id
    }

    /// All outputs in attach order
    pub fn outputs(&self) -> Vec<ConId> {
        self.children_of_kind(self.root(), ConKind::Output)
    }

    /// All workspaces of `output` in attach order
    pub fn workspaces(&self, output: ConId) -> Vec<ConId> {
        self.children_of_kind(output, ConKind::Workspace)
    }

    /// The first workspace called `name`, on any output
    pub fn workspace_by_name(&self, name: &str) -> Option<ConId> {
        self.outputs()
            .into_iter()
            .flat_map(|output| self.workspaces(output))
            .find(|&ws| self.con(ws).name() == name)
    }

    fn children_of_kind(&self, parent: ConId, kind: ConKind) -> Vec<ConId> {
        self.con(parent)
            .children()
            .iter()
            .copied()
            .filter(|&c| self.con(c).kind() == kind)
            .collect()
    }
}
