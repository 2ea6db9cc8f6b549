//! Invariant validation for the container tree.
//!
//! The tree operations panic when a caller breaks their contract; this module
//! is the non-panicking counterpart. It inspects a whole tree and reports
//! every invariant that does not hold:
//!
//! ```text
//!   root ─┬─ output ─┬─ workspace ─┬─ split ── window leaf
//!         │          │             └─ floating group (floating list)
//!         │          └─ workspace
//!         └─ output
//!
//!   parent(child) == node          for every child in node's lists
//!   focus_order(node)              is a permutation of children ∪ floating
//!   orientation != None            ⇒ no window
//!   per workspace                  ≤ 1 fullscreen descendant
//! ```

use std::collections::HashSet;

use crate::display::DisplayServer;
use crate::layout::{ConId, ConTree};
use crate::types::{ConKind, FullscreenMode, Orientation};

/// State violations that can be detected
#[derive(Debug, Clone, PartialEq)]
pub struct StateViolation {
    pub kind: ViolationKind,
    pub con: Option<ConId>,
    pub description: String,
}

/// Types of state violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A child's parent link does not point back to the container listing it
    ParentMismatch,
    /// A container's parent does not list it, or lists it more than once
    NotInParent,
    /// Focus order is not a permutation of the children
    FocusOrderMismatch,
    /// A container with an orientation hosts a window
    WindowOnSplit,
    /// More than one fullscreen container on a workspace
    FullscreenConflict,
    /// Registry and arena disagree
    RegistryMismatch,
    /// The focus pointer refers to a container that no longer exists
    InvalidFocus,
    /// The root has a parent, or a non-root container claims to be the root
    RootMismatch,
}

/// Check every invariant of `tree`. An empty result means the tree is consistent.
pub fn validate<D: DisplayServer>(tree: &ConTree<D>) -> Vec<StateViolation> {
    let mut violations = Vec::new();
    let mut report = |kind, con: Option<ConId>, description: String| {
        violations.push(StateViolation {
            kind,
            con,
            description,
        });
    };

    let registry = tree.registry();
    let registered: HashSet<ConId> = registry.iter().copied().collect();
    if registered.len() != registry.len() {
        report(
            ViolationKind::RegistryMismatch,
            None,
            "registry lists a container twice".to_string(),
        );
    }

    if let Some(focused) = tree.focused() {
        if !registered.contains(&focused) || !tree.contains(focused) {
            report(
                ViolationKind::InvalidFocus,
                Some(focused),
                format!("focused container {:?} is not alive", focused),
            );
        }
    }

    for &id in registry {
        let Some(con) = tree.get(id) else {
            report(
                ViolationKind::RegistryMismatch,
                Some(id),
                format!("registry entry {:?} is not alive", id),
            );
            continue;
        };

        let is_root = id == tree.root();
        if is_root != (con.kind() == ConKind::Root) || (is_root && con.parent().is_some()) {
            report(
                ViolationKind::RootMismatch,
                Some(id),
                format!("{:?} has kind {:?} and parent {:?}", id, con.kind(), con.parent()),
            );
        }

        if con.orientation() != Orientation::None && con.window().is_some() {
            report(
                ViolationKind::WindowOnSplit,
                Some(id),
                format!("{:?} has orientation {:?} and a window", id, con.orientation()),
            );
        }

        for &child in con.children().iter().chain(con.floating_children()) {
            match tree.get(child) {
                Some(c) if c.parent() == Some(id) => {}
                Some(c) => report(
                    ViolationKind::ParentMismatch,
                    Some(child),
                    format!("{:?} is listed under {:?} but its parent is {:?}", child, id, c.parent()),
                ),
                None => report(
                    ViolationKind::ParentMismatch,
                    Some(child),
                    format!("{:?} lists dead child {:?}", id, child),
                ),
            }
        }

        if let Some(parent) = con.parent().and_then(|p| tree.get(p)) {
            let list = if con.kind() == ConKind::FloatingGroup {
                parent.floating_children()
            } else {
                parent.children()
            };
            let count = list.iter().filter(|&&c| c == id).count();
            if count != 1 {
                report(
                    ViolationKind::NotInParent,
                    Some(id),
                    format!("{:?} appears {} times in its parent's list", id, count),
                );
            }
        }

        let mut expected: Vec<ConId> = con
            .children()
            .iter()
            .chain(con.floating_children())
            .copied()
            .collect();
        let mut actual = con.focus_order().to_vec();
        expected.sort();
        actual.sort();
        if expected != actual {
            report(
                ViolationKind::FocusOrderMismatch,
                Some(id),
                format!(
                    "{:?} focus order has {} entries for {} children",
                    id,
                    con.focus_order().len(),
                    expected.len()
                ),
            );
        }

        if con.kind() == ConKind::Workspace {
            let fullscreen = count_fullscreen(tree, id);
            if fullscreen > 1 {
                report(
                    ViolationKind::FullscreenConflict,
                    Some(id),
                    format!("workspace '{}' has {} fullscreen containers", con.name(), fullscreen),
                );
            }
        }
    }

    violations
}

/// Fullscreen containers strictly below `id`, floating groups included
fn count_fullscreen<D: DisplayServer>(tree: &ConTree<D>, id: ConId) -> usize {
    let mut count = 0;
    let con = tree.con(id);
    let mut stack: Vec<ConId> = con
        .children()
        .iter()
        .chain(con.floating_children())
        .copied()
        .collect();
    // Guard against cycles in a corrupted tree
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        let Some(con) = tree.get(current) else {
            continue;
        };
        if con.fullscreen_mode() != FullscreenMode::None {
            count += 1;
        }
        stack.extend(con.children().iter().chain(con.floating_children()).copied());
    }
    count
}
