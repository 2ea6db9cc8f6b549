//! Fullscreen search and toggling.
//!
//! A workspace allows at most one fullscreen container at a time. Entering
//! fullscreen is refused while another container on the same workspace is
//! fullscreen; leaving is always allowed.

use std::collections::VecDeque;

use crate::display::DisplayServer;
use crate::layout::{ConId, ConTree};
use crate::types::{FullscreenMode, ToggleOutcome, WindowState};

impl<D: DisplayServer> ConTree<D> {
    /// The first fullscreen container below `id`, in level order.
    ///
    /// Each level is scanned completely before the next one, so the
    /// fullscreen container closest to `id` wins. Within a container, tiling
    /// children come first (left to right), then floating groups. `id` itself
    /// is never returned.
    pub fn find_fullscreen_descendant(&self, id: ConId) -> Option<ConId> {
        log::debug!("Looking for a fullscreen container below {:?}", id);
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            let con = self.con(current);
            log::debug!("Checking {:?}", current);
            if current != id && con.fullscreen_mode() != FullscreenMode::None {
                return Some(current);
            }
            queue.extend(con.children().iter().chain(con.floating_children()).copied());
        }
        None
    }

    /// Toggle fullscreen on a container.
    ///
    /// If the container has a client window, its new state is pushed to the
    /// display server: `Fullscreen` when entering, nothing when leaving.
    ///
    /// # Panics
    ///
    /// Panics when entering fullscreen on a container that is not on a
    /// workspace.
    pub fn toggle_fullscreen(&mut self, id: ConId) -> ToggleOutcome<ConId> {
        log::info!("Toggling fullscreen for {:?} ({})", id, self.con(id).name());

        let outcome = match self.con(id).fullscreen_mode() {
            FullscreenMode::None => {
                let workspace = self.get_workspace(id);
                if let Some(existing) = self.find_fullscreen_descendant(workspace) {
                    log::info!(
                        "Not entering fullscreen, {:?} ({}) already is fullscreen",
                        existing,
                        self.con(existing).name()
                    );
                    return ToggleOutcome::Blocked(existing);
                }
                self.set_fullscreen_mode(id, FullscreenMode::PerOutput);
                ToggleOutcome::Entered
            }
            FullscreenMode::PerOutput => {
                self.set_fullscreen_mode(id, FullscreenMode::None);
                ToggleOutcome::Left
            }
        };
        log::info!("Fullscreen mode now {:?}", self.con(id).fullscreen_mode());

        if let Some(window) = self.con(id).window().map(|w| w.id) {
            let state = match outcome {
                ToggleOutcome::Entered => Some(WindowState::Fullscreen),
                _ => None,
            };
            self.push_window_state(window, state);
        }
        outcome
    }
}
