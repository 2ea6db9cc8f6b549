//! Container tree for tiling window management.
//!
//! The tree is stored in an arena:
//! - Every container lives in a `SlotMap` and is addressed by a [`ConId`]
//! - A container's children, floating children and focus order are ordered
//!   lists of ids; `parent` is a plain lookup key, never ownership
//! - The registry lists every live container in creation order and is what
//!   the window/frame/match lookups scan
//!
//! Child order is the stacking/split order. Focus order is a second, independent
//! ordering of the same children: head = most recently focused.

use slotmap::{new_key_type, SlotMap};
use x11rb::protocol::xproto::Window;

use crate::display::DisplayServer;
use crate::matching::Match;
use crate::types::{
    ClientWindow, ConKind, FloatingMode, FullscreenMode, Orientation, RebalanceAction, WindowState,
};

// Generate unique key types for our arena
new_key_type! {
    /// Unique identifier for a container in the tree
    pub struct ConId;
}

/// A container: output, workspace, split, window leaf or floating group
#[derive(Debug, Clone)]
pub struct Con {
    kind: ConKind,
    /// Display label
    name: String,
    orientation: Orientation,
    /// Share of the parent's space along the split axis; <= 0 means unassigned
    percent: f64,
    window: Option<ClientWindow>,
    /// Display-side frame, set once at creation
    frame: Window,
    fullscreen_mode: FullscreenMode,
    floating: FloatingMode,
    urgent: bool,
    parent: Option<ConId>,
    children: Vec<ConId>,
    floating_children: Vec<ConId>,
    focus_order: Vec<ConId>,
    /// Rules this container claims new windows with, first match wins
    swallows: Vec<Match>,
}

impl Con {
    fn new() -> Self {
        Self {
            kind: ConKind::Split,
            name: String::new(),
            orientation: Orientation::None,
            percent: 0.0,
            window: None,
            frame: 0,
            fullscreen_mode: FullscreenMode::None,
            floating: FloatingMode::AutoOff,
            urgent: false,
            parent: None,
            children: Vec::new(),
            floating_children: Vec::new(),
            focus_order: Vec::new(),
            swallows: Vec::new(),
        }
    }

    pub fn kind(&self) -> ConKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn window(&self) -> Option<&ClientWindow> {
        self.window.as_ref()
    }

    pub fn frame(&self) -> Window {
        self.frame
    }

    pub fn fullscreen_mode(&self) -> FullscreenMode {
        self.fullscreen_mode
    }

    pub fn floating(&self) -> FloatingMode {
        self.floating
    }

    pub fn urgent(&self) -> bool {
        self.urgent
    }

    pub fn parent(&self) -> Option<ConId> {
        self.parent
    }

    pub fn children(&self) -> &[ConId] {
        &self.children
    }

    pub fn floating_children(&self) -> &[ConId] {
        &self.floating_children
    }

    pub fn focus_order(&self) -> &[ConId] {
        &self.focus_order
    }

    pub fn swallows(&self) -> &[Match] {
        &self.swallows
    }
}

/// The container tree together with its registry and focus pointer.
///
/// One `ConTree` is created at startup and owns every container plus the
/// display server the containers are realized on.
#[derive(Debug)]
pub struct ConTree<D> {
    /// Arena storage for all containers
    cons: SlotMap<ConId, Con>,
    /// Every live container in creation order
    all_cons: Vec<ConId>,
    root: ConId,
    /// Currently focused container
    focused: Option<ConId>,
    display: D,
}

impl<D: DisplayServer> ConTree<D> {
    /// Create a tree holding only the root container
    pub fn new(display: D) -> Self {
        let mut tree = Self {
            cons: SlotMap::with_key(),
            all_cons: Vec::new(),
            root: ConId::default(),
            focused: None,
            display,
        };
        let root = tree.create_node(None);
        tree.cons[root].kind = ConKind::Root;
        tree.cons[root].name = "root".to_string();
        tree.root = root;
        tree
    }

    pub fn root(&self) -> ConId {
        self.root
    }

    /// The currently focused container, if any
    pub fn focused(&self) -> Option<ConId> {
        self.focused
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Every live container in creation order
    pub fn registry(&self) -> &[ConId] {
        &self.all_cons
    }

    pub fn len(&self) -> usize {
        self.all_cons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_cons.is_empty()
    }

    /// Get a container by id
    pub fn get(&self, id: ConId) -> Option<&Con> {
        self.cons.get(id)
    }

    pub fn contains(&self, id: ConId) -> bool {
        self.cons.contains_key(id)
    }

    /// Get a container that must exist.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live container.
    pub fn con(&self, id: ConId) -> &Con {
        match self.cons.get(id) {
            Some(con) => con,
            None => panic!("container {:?} is not alive", id),
        }
    }

    pub(crate) fn con_mut(&mut self, id: ConId) -> &mut Con {
        match self.cons.get_mut(id) {
            Some(con) => con,
            None => panic!("container {:?} is not alive", id),
        }
    }

    pub(crate) fn push_window_state(&mut self, window: Window, state: Option<WindowState>) {
        self.display.push_window_state(window, state);
    }

    // =========================================================================
    // Creation and destruction
    // =========================================================================

    /// Create a container with default values, realize its frame and attach
    /// it to `parent` if one is given.
    pub fn create_node(&mut self, parent: Option<ConId>) -> ConId {
        let id = self.cons.insert(Con::new());
        self.all_cons.push(id);

        let frame = self.display.realize_frame(id);
        self.cons[id].frame = frame;
        log::debug!("Created container {:?} (frame 0x{:x})", id, frame);

        if let Some(parent) = parent {
            self.attach(id, parent);
        }
        id
    }

    /// Destroy a container and everything below it, bottom-up.
    ///
    /// The container is detached first if it is attached. Every destroyed
    /// container leaves the registry and has its frame released; the focus
    /// pointer is cleared if it pointed into the subtree.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the root or not alive.
    pub fn destroy_node(&mut self, id: ConId) {
        assert!(id != self.root, "cannot destroy the root container");
        if self.con(id).parent.is_some() {
            self.detach(id);
        }
        self.destroy_subtree(id);
    }

    /// Destroy the whole tree, root included, and hand back the display server.
    pub fn teardown(mut self) -> D {
        // Detached containers are not reachable from the root, so keep going
        // until the registry is empty
        while let Some(&first) = self.all_cons.first() {
            let mut top = first;
            while let Some(parent) = self.con(top).parent {
                top = parent;
            }
            self.destroy_subtree(top);
        }
        self.display
    }

    fn destroy_subtree(&mut self, id: ConId) {
        // Breadth-first collection; destroying in reverse frees leaves first
        let mut subtree = vec![id];
        let mut next = 0;
        while next < subtree.len() {
            let con = self.con(subtree[next]);
            let below: Vec<ConId> = con
                .children
                .iter()
                .chain(con.floating_children.iter())
                .copied()
                .collect();
            subtree.extend(below);
            next += 1;
        }

        for &victim in subtree.iter().rev() {
            let Some(con) = self.cons.remove(victim) else {
                continue;
            };
            self.all_cons.retain(|&c| c != victim);
            if self.focused == Some(victim) {
                self.focused = None;
            }
            self.display.unrealize_frame(con.frame);
            log::debug!("Destroyed container {:?} ({})", victim, con.name);
        }
    }

    // =========================================================================
    // Attachment
    // =========================================================================

    /// Attach `id` as the last child of `parent`.
    ///
    /// The container goes to the tail of the parent's focus order too:
    /// attaching does not focus, [`Self::focus`] does. Floating groups go to
    /// the parent's floating list instead of its children.
    ///
    /// # Panics
    ///
    /// Panics if `id` already has a parent, or if attaching would create a
    /// cycle.
    pub fn attach(&mut self, id: ConId, parent: ConId) {
        assert!(
            self.con(id).parent.is_none(),
            "container {:?} is already attached",
            id
        );
        assert!(
            !self.is_ancestor_or_self(id, parent),
            "attaching {:?} to {:?} would create a cycle",
            id,
            parent
        );

        let floating = self.con(id).kind == ConKind::FloatingGroup;
        self.cons[id].parent = Some(parent);

        let p = self.con_mut(parent);
        if floating {
            p.floating_children.push(id);
        } else {
            p.children.push(id);
        }
        p.focus_order.push(id);
        log::debug!("Attached {:?} to {:?}", id, parent);
    }

    /// Remove `id` from its parent's child (or floating) list and focus order.
    /// The container itself stays alive and can be attached again.
    ///
    /// # Panics
    ///
    /// Panics if `id` has no parent, or is missing from the list it should be in.
    pub fn detach(&mut self, id: ConId) {
        let con = self.con(id);
        let Some(parent) = con.parent else {
            panic!("cannot detach {:?}: it has no parent", id);
        };
        let floating = con.kind == ConKind::FloatingGroup;

        let p = self.con_mut(parent);
        if floating {
            remove_id(&mut p.floating_children, id, "floating children");
        } else {
            remove_id(&mut p.children, id, "children");
        }
        remove_id(&mut p.focus_order, id, "focus order");

        self.cons[id].parent = None;
        log::debug!("Detached {:?} from {:?}", id, parent);
    }

    fn is_ancestor_or_self(&self, ancestor: ConId, id: ConId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.con(c).parent;
        }
        false
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Focus a container.
    ///
    /// The container moves to the head of its parent's focus order, and so does
    /// every ancestor below the root. Child order is never touched. If the
    /// container was urgent, the flag is cleared and its workspace asked to
    /// recheck its own urgency.
    ///
    /// # Panics
    ///
    /// Panics if `id` (or an ancestor on the way up) has no parent, i.e. when
    /// focusing the root or a detached container.
    pub fn focus(&mut self, id: ConId) {
        let mut current = id;
        loop {
            let Some(parent) = self.con(current).parent else {
                panic!("cannot focus {:?}: it has no parent", current);
            };
            let order = &mut self.con_mut(parent).focus_order;
            let Some(pos) = order.iter().position(|&c| c == current) else {
                panic!("{:?} is missing from the focus order of {:?}", current, parent);
            };
            order[..=pos].rotate_right(1);

            if self.con(parent).parent.is_none() {
                break;
            }
            current = parent;
        }

        self.focused = Some(id);
        log::debug!("Focused {:?}", id);

        if self.con(id).urgent {
            self.cons[id].urgent = false;
            let workspace = self.get_workspace(id);
            self.display.notify_urgent_recheck(workspace);
        }
    }

    /// Follow the head of each focus order down to the most recently
    /// focused leaf below `id` (or `id` itself if it has no children).
    pub fn descend_focused(&self, id: ConId) -> ConId {
        let mut current = id;
        while let Some(&next) = self.con(current).focus_order.first() {
            current = next;
        }
        current
    }

    // =========================================================================
    // Ancestors
    // =========================================================================

    /// Nearest container of `kind` walking up from `id` (inclusive)
    pub fn find_ancestor(&self, id: ConId, kind: ConKind) -> Option<ConId> {
        let mut current = Some(id);
        while let Some(c) = current {
            let con = self.cons.get(c)?;
            if con.kind == kind {
                return Some(c);
            }
            current = con.parent;
        }
        None
    }

    /// Nearest container of `kind` walking up from `id` (inclusive).
    ///
    /// # Panics
    ///
    /// Panics if the root is reached without finding one. Focusable
    /// containers always sit below an output and a workspace.
    pub fn ancestor_of_kind(&self, id: ConId, kind: ConKind) -> ConId {
        match self.find_ancestor(id, kind) {
            Some(found) => found,
            None => panic!("{:?} has no {:?} ancestor", id, kind),
        }
    }

    /// The output `id` is on
    pub fn get_output(&self, id: ConId) -> ConId {
        self.ancestor_of_kind(id, ConKind::Output)
    }

    /// The workspace `id` is on
    pub fn get_workspace(&self, id: ConId) -> ConId {
        self.ancestor_of_kind(id, ConKind::Workspace)
    }

    // =========================================================================
    // Layout weights
    // =========================================================================

    /// Rescale the positive `percent` of every child of `parent` after a child
    /// was added or removed. Must run after the child list changed.
    ///
    /// With `n` children after the change, `Add` multiplies by `1 - 1/(n+1)`
    /// and `Remove` by its inverse, so an add followed by a remove at the same
    /// `n` restores the original values.
    pub fn rebalance(&mut self, parent: ConId, action: RebalanceAction) {
        let children = self.con(parent).children.clone();
        let n = children.len() as f64;
        let fix = match action {
            RebalanceAction::Add => 1.0 - 1.0 / (n + 1.0),
            RebalanceAction::Remove => 1.0 / (1.0 - 1.0 / (n + 1.0)),
        };

        for child in children {
            let con = &mut self.cons[child];
            if con.percent <= 0.0 {
                continue;
            }
            con.percent *= fix;
        }
        log::debug!("Rebalanced {:?} ({:?}, factor {:.4})", parent, action, fix);
    }

    // =========================================================================
    // Registry lookups
    // =========================================================================

    /// The first container (in creation order) holding client window `window`
    pub fn find_by_window(&self, window: Window) -> Option<ConId> {
        self.all_cons
            .iter()
            .copied()
            .find(|&id| self.cons[id].window.as_ref().is_some_and(|w| w.id == window))
    }

    /// The first container (in creation order) whose frame is `frame`.
    /// `NONE` marks a frame that was never realized and matches nothing.
    pub fn find_by_frame(&self, frame: Window) -> Option<ConId> {
        if frame == x11rb::NONE {
            return None;
        }
        self.all_cons
            .iter()
            .copied()
            .find(|&id| self.cons[id].frame == frame)
    }

    /// The first container (in creation order) called `name`
    pub fn find_by_name(&self, name: &str) -> Option<ConId> {
        self.all_cons
            .iter()
            .copied()
            .find(|&id| self.cons[id].name == name)
    }

    // =========================================================================
    // Queries and setters
    // =========================================================================

    pub fn is_leaf(&self, id: ConId) -> bool {
        self.con(id).children.is_empty()
    }

    /// Whether a window could be placed directly into `id`
    pub fn accepts_window(&self, id: ConId) -> bool {
        let con = self.con(id);
        if con.kind == ConKind::Workspace {
            return false;
        }
        if con.orientation != Orientation::None {
            log::debug!("{:?} does not accept windows, it has an orientation", id);
            return false;
        }
        con.window.is_none()
    }

    pub fn is_floating(&self, id: ConId) -> bool {
        self.con(id).floating >= FloatingMode::AutoOn
    }

    /// Change what a container represents.
    ///
    /// # Panics
    ///
    /// Panics if the container is attached and the change would move it
    /// between its parent's children and floating children.
    pub fn set_kind(&mut self, id: ConId, kind: ConKind) {
        let con = self.con_mut(id);
        let was_floating = con.kind == ConKind::FloatingGroup;
        let is_floating = kind == ConKind::FloatingGroup;
        assert!(
            con.parent.is_none() || was_floating == is_floating,
            "cannot change {:?} to {:?} while attached",
            id,
            kind
        );
        con.kind = kind;
    }

    /// # Panics
    ///
    /// Panics when giving an orientation to a container that hosts a window.
    pub fn set_orientation(&mut self, id: ConId, orientation: Orientation) {
        let con = self.con_mut(id);
        assert!(
            orientation == Orientation::None || con.window.is_none(),
            "{:?} hosts a window and cannot become a split",
            id
        );
        con.orientation = orientation;
    }

    /// Assign (or clear) the client window of a container.
    ///
    /// # Panics
    ///
    /// Panics when assigning a window to a container with an orientation.
    pub fn set_window(&mut self, id: ConId, window: Option<ClientWindow>) {
        let con = self.con_mut(id);
        assert!(
            window.is_none() || con.orientation == Orientation::None,
            "{:?} is a split container and cannot host a window",
            id
        );
        con.window = window;
    }

    pub fn set_name(&mut self, id: ConId, name: impl Into<String>) {
        self.con_mut(id).name = name.into();
    }

    pub fn set_percent(&mut self, id: ConId, percent: f64) {
        self.con_mut(id).percent = percent;
    }

    pub fn set_urgent(&mut self, id: ConId, urgent: bool) {
        self.con_mut(id).urgent = urgent;
    }

    pub(crate) fn set_fullscreen_mode(&mut self, id: ConId, mode: FullscreenMode) {
        self.con_mut(id).fullscreen_mode = mode;
    }

    pub fn set_floating(&mut self, id: ConId, floating: FloatingMode) {
        self.con_mut(id).floating = floating;
    }

    /// Add a swallow rule after the existing ones
    pub fn swallow(&mut self, id: ConId, rule: Match) {
        self.con_mut(id).swallows.push(rule);
    }
}

fn remove_id(list: &mut Vec<ConId>, id: ConId, what: &str) {
    match list.iter().position(|&c| c == id) {
        Some(pos) => {
            list.remove(pos);
        }
        None => panic!("{:?} is missing from its parent's {}", id, what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::HeadlessDisplay;
    use crate::types::FullscreenMode;

    /// Root -> output -> workspace, returning the workspace
    fn tree_with_workspace() -> (ConTree<HeadlessDisplay>, ConId) {
        let mut tree = ConTree::new(HeadlessDisplay::new());
        let output = tree.add_output("out");
        let ws = tree.add_workspace(output, "1");
        (tree, ws)
    }

    #[test]
    fn test_new_tree_has_root() {
        let tree = ConTree::new(HeadlessDisplay::new());
        let root = tree.con(tree.root());
        assert_eq!(root.kind(), ConKind::Root);
        assert_eq!(root.parent(), None);
        assert_eq!(tree.registry(), &[tree.root()]);
        assert_eq!(tree.display().realized.len(), 1);
    }

    #[test]
    fn test_create_node_defaults() {
        let mut tree = ConTree::new(HeadlessDisplay::new());
        let id = tree.create_node(None);
        let con = tree.con(id);
        assert_eq!(con.kind(), ConKind::Split);
        assert_eq!(con.name(), "");
        assert_eq!(con.orientation(), Orientation::None);
        assert_eq!(con.fullscreen_mode(), FullscreenMode::None);
        assert!(con.window().is_none());
        assert!(!con.urgent());
        assert_eq!(con.parent(), None);
        assert!(con.children().is_empty());
        assert!(con.focus_order().is_empty());
        assert!(con.swallows().is_empty());
        assert_eq!(tree.registry().last(), Some(&id));
    }

    #[test]
    fn test_create_with_parent_attaches_at_tail() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        let b = tree.create_node(Some(ws));
        assert_eq!(tree.con(ws).children(), &[a, b]);
        assert_eq!(tree.con(ws).focus_order(), &[a, b]);
        assert_eq!(tree.con(b).parent(), Some(ws));
    }

    #[test]
    fn test_attach_then_detach_restores_lists() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        let b = tree.create_node(Some(ws));
        tree.focus(b);
        let children = tree.con(ws).children().to_vec();
        let focus = tree.con(ws).focus_order().to_vec();

        let c = tree.create_node(None);
        tree.attach(c, ws);
        tree.detach(c);

        assert_eq!(tree.con(ws).children(), children.as_slice());
        assert_eq!(tree.con(ws).focus_order(), focus.as_slice());
        assert_eq!(focus, vec![b, a]);
        assert_eq!(tree.con(c).parent(), None);
    }

    #[test]
    fn test_floating_group_goes_to_floating_list() {
        let (mut tree, ws) = tree_with_workspace();
        let tiled = tree.create_node(Some(ws));
        let group = tree.create_node(None);
        tree.set_kind(group, ConKind::FloatingGroup);
        tree.attach(group, ws);

        assert_eq!(tree.con(ws).children(), &[tiled]);
        assert_eq!(tree.con(ws).floating_children(), &[group]);
        assert_eq!(tree.con(ws).focus_order(), &[tiled, group]);

        tree.detach(group);
        assert!(tree.con(ws).floating_children().is_empty());
        assert_eq!(tree.con(ws).focus_order(), &[tiled]);
    }

    #[test]
    #[should_panic(expected = "no parent")]
    fn test_detach_root_panics() {
        let mut tree = ConTree::new(HeadlessDisplay::new());
        let root = tree.root();
        tree.detach(root);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn test_double_attach_panics() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        tree.attach(a, ws);
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn test_attach_to_descendant_panics() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        let b = tree.create_node(Some(a));
        tree.detach(a);
        tree.attach(a, b);
    }

    #[test]
    fn test_focus_promotes_ancestors() {
        let (mut tree, ws) = tree_with_workspace();
        let output = tree.get_output(ws);
        let other_ws = tree.add_workspace(output, "2");
        let a = tree.create_node(Some(ws));
        let b = tree.create_node(Some(ws));
        let b1 = tree.create_node(Some(b));
        let b2 = tree.create_node(Some(b));
        let c = tree.create_node(Some(ws));

        // Workspace "2" is in front before the focus call
        tree.focus(other_ws);
        tree.focus(b2);

        assert_eq!(tree.focused(), Some(b2));
        assert_eq!(tree.con(b).focus_order(), &[b2, b1]);
        assert_eq!(tree.con(ws).focus_order(), &[b, a, c]);
        assert_eq!(tree.con(output).focus_order(), &[ws, other_ws]);
        // Child order is untouched
        assert_eq!(tree.con(ws).children(), &[a, b, c]);
        assert_eq!(tree.con(b).children(), &[b1, b2]);
    }

    #[test]
    fn test_focus_keeps_sibling_relative_order() {
        let (mut tree, ws) = tree_with_workspace();
        let ids: Vec<ConId> = (0..5).map(|_| tree.create_node(Some(ws))).collect();
        tree.focus(ids[3]);
        assert_eq!(
            tree.con(ws).focus_order(),
            &[ids[3], ids[0], ids[1], ids[2], ids[4]]
        );
    }

    #[test]
    fn test_focus_clears_urgent_and_notifies_workspace() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        tree.set_urgent(a, true);
        tree.focus(a);
        assert!(!tree.con(a).urgent());
        assert_eq!(tree.display().urgent_rechecks, vec![ws]);

        // Not urgent anymore: no second notification
        tree.focus(a);
        assert_eq!(tree.display().urgent_rechecks.len(), 1);
    }

    #[test]
    #[should_panic(expected = "cannot focus")]
    fn test_focus_root_panics() {
        let mut tree = ConTree::new(HeadlessDisplay::new());
        let root = tree.root();
        tree.focus(root);
    }

    #[test]
    fn test_descend_focused() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        let b = tree.create_node(Some(ws));
        let b1 = tree.create_node(Some(b));
        assert_eq!(tree.descend_focused(ws), a);
        tree.focus(b1);
        assert_eq!(tree.descend_focused(ws), b1);
        assert_eq!(tree.descend_focused(tree.root()), b1);
    }

    #[test]
    fn test_ancestor_locator() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        let a1 = tree.create_node(Some(a));
        assert_eq!(tree.get_workspace(a1), ws);
        assert_eq!(tree.get_workspace(ws), ws);
        assert_eq!(tree.get_output(a1), tree.con(ws).parent().unwrap());
        assert_eq!(tree.find_ancestor(a1, ConKind::FloatingGroup), None);
    }

    #[test]
    #[should_panic(expected = "has no Workspace ancestor")]
    fn test_locator_without_workspace_panics() {
        let mut tree = ConTree::new(HeadlessDisplay::new());
        let output = tree.add_output("out");
        tree.get_workspace(output);
    }

    #[test]
    fn test_rebalance_add_then_remove_restores() {
        let (mut tree, ws) = tree_with_workspace();
        let weights = [0.5, 0.3, 0.2, 0.0];
        let ids: Vec<ConId> = weights
            .iter()
            .map(|&p| {
                let id = tree.create_node(Some(ws));
                tree.set_percent(id, p);
                id
            })
            .collect();

        tree.rebalance(ws, RebalanceAction::Add);
        // n = 4, factor 0.8
        assert!((tree.con(ids[0]).percent() - 0.4).abs() < 1e-9);
        assert_eq!(tree.con(ids[3]).percent(), 0.0);

        tree.rebalance(ws, RebalanceAction::Remove);
        for (id, expected) in ids.iter().zip(weights) {
            assert!((tree.con(*id).percent() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rebalance_skips_unassigned() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        let b = tree.create_node(Some(ws));
        tree.set_percent(a, -1.0);
        tree.set_percent(b, 1.0);
        tree.rebalance(ws, RebalanceAction::Add);
        assert_eq!(tree.con(a).percent(), -1.0);
        assert!((tree.con(b).percent() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_find_by_window_and_frame() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        let b = tree.create_node(Some(ws));
        tree.set_window(b, Some(ClientWindow::new(0x1234)));

        assert_eq!(tree.find_by_window(0x1234), Some(b));
        assert_eq!(tree.find_by_window(0x9999), None);
        let frame = tree.con(a).frame();
        assert_eq!(tree.find_by_frame(frame), Some(a));
        assert_eq!(tree.find_by_frame(0), None);
    }

    /// Display whose frame creation always fails
    #[derive(Debug, Default)]
    struct NoFrames;

    impl DisplayServer for NoFrames {
        fn realize_frame(&mut self, _con: ConId) -> Window {
            x11rb::NONE
        }

        fn push_window_state(&mut self, _window: Window, _state: Option<WindowState>) {}

        fn notify_urgent_recheck(&mut self, _workspace: ConId) {}
    }

    #[test]
    fn test_unrealized_frame_matches_nothing() {
        let mut tree = ConTree::new(NoFrames);
        let output = tree.add_output("out");
        let ws = tree.add_workspace(output, "1");
        let a = tree.create_node(Some(ws));
        assert_eq!(tree.con(a).frame(), x11rb::NONE);
        assert_eq!(tree.find_by_frame(x11rb::NONE), None);
    }

    #[test]
    fn test_accepts_window() {
        let (mut tree, ws) = tree_with_workspace();
        let leaf = tree.create_node(Some(ws));
        let split = tree.create_node(Some(ws));
        tree.set_orientation(split, Orientation::Vertical);

        assert!(!tree.accepts_window(ws));
        assert!(!tree.accepts_window(split));
        assert!(tree.accepts_window(leaf));
        tree.set_window(leaf, Some(ClientWindow::new(1)));
        assert!(!tree.accepts_window(leaf));
    }

    #[test]
    #[should_panic(expected = "cannot host a window")]
    fn test_window_on_split_panics() {
        let (mut tree, ws) = tree_with_workspace();
        let split = tree.create_node(Some(ws));
        tree.set_orientation(split, Orientation::Horizontal);
        tree.set_window(split, Some(ClientWindow::new(1)));
    }

    #[test]
    fn test_is_floating_and_leaf() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        assert!(tree.is_leaf(a));
        assert!(!tree.is_leaf(ws));
        assert!(!tree.is_floating(a));
        tree.set_floating(a, FloatingMode::UserOff);
        assert!(!tree.is_floating(a));
        tree.set_floating(a, FloatingMode::AutoOn);
        assert!(tree.is_floating(a));
        assert_eq!(tree.con(a).floating(), FloatingMode::AutoOn);
    }

    #[test]
    fn test_destroy_subtree() {
        let (mut tree, ws) = tree_with_workspace();
        let a = tree.create_node(Some(ws));
        let a1 = tree.create_node(Some(a));
        let a2 = tree.create_node(Some(a));
        let b = tree.create_node(Some(ws));
        tree.focus(a2);
        let frames: Vec<Window> = [a, a1, a2].iter().map(|&id| tree.con(id).frame()).collect();
        let before = tree.len();

        tree.destroy_node(a);

        assert_eq!(tree.len(), before - 3);
        assert!(!tree.contains(a1));
        assert!(tree.get(a).is_none());
        assert_eq!(tree.focused(), None);
        assert_eq!(tree.con(ws).children(), &[b]);
        assert_eq!(tree.con(ws).focus_order(), &[b]);
        // Leaves are released before their parent
        let released = &tree.display().unrealized;
        assert_eq!(released.last(), Some(&frames[0]));
        assert!(released.contains(&frames[1]) && released.contains(&frames[2]));
    }

    #[test]
    fn test_teardown_releases_every_frame() {
        let (mut tree, ws) = tree_with_workspace();
        tree.create_node(Some(ws));
        let loose = tree.create_node(None);
        tree.create_node(Some(loose));
        let count = tree.len();
        let display = tree.teardown();
        assert_eq!(display.unrealized.len(), count);
    }
}
