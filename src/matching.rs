//! Swallow rules: deciding which container a new window goes into.
//!
//! Containers carry an ordered list of [`Match`] rules. When a window
//! appears, the registry is scanned in creation order and each container's
//! rules in list order; the first rule that matches wins. There is no
//! priority or specificity ordering.

use serde::Deserialize;
use x11rb::protocol::xproto::Window;

use crate::display::DisplayServer;
use crate::layout::{ConId, ConTree};
use crate::types::ClientWindow;

/// A swallow rule. Unset fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Match {
    pub class: Option<String>,
    pub instance: Option<String>,
    pub title: Option<String>,
    /// Exact client window id
    pub window_id: Option<Window>,
}

impl Match {
    /// A rule with no criteria, which never matches
    pub fn is_empty(&self) -> bool {
        self.class.is_none()
            && self.instance.is_none()
            && self.title.is_none()
            && self.window_id.is_none()
    }
}

/// Decides whether a rule accepts a window
pub trait WindowMatcher {
    fn matches(&self, rule: &Match, window: &ClientWindow) -> bool;
}

/// Every field set in the rule must equal the window's field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl WindowMatcher for ExactMatcher {
    fn matches(&self, rule: &Match, window: &ClientWindow) -> bool {
        if rule.is_empty() {
            return false;
        }

        fn field_ok(want: &Option<String>, have: &Option<String>) -> bool {
            match want {
                Some(want) => have.as_deref() == Some(want.as_str()),
                None => true,
            }
        }

        field_ok(&rule.class, &window.class)
            && field_ok(&rule.instance, &window.instance)
            && field_ok(&rule.title, &window.title)
            && rule.window_id.map_or(true, |id| id == window.id)
    }
}

impl<D: DisplayServer> ConTree<D> {
    /// The container that should swallow `window`, with the rule that matched.
    pub fn find_owner<'a>(
        &'a self,
        window: &ClientWindow,
        matcher: &impl WindowMatcher,
    ) -> Option<(ConId, &'a Match)> {
        log::debug!("Searching container for window 0x{:x} ({:?})", window.id, window.class);

        for &id in self.registry() {
            let con = self.con(id);
            if let Some(rule) = con.swallows().iter().find(|rule| matcher.matches(rule, window)) {
                return Some((id, rule));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::HeadlessDisplay;

    fn class_rule(class: &str) -> Match {
        Match {
            class: Some(class.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_matcher_fields() {
        let window = ClientWindow::new(7)
            .with_class("XTerm")
            .with_instance("xterm")
            .with_title("~");

        assert!(ExactMatcher.matches(&class_rule("XTerm"), &window));
        assert!(!ExactMatcher.matches(&class_rule("Emacs"), &window));

        let both = Match {
            class: Some("XTerm".into()),
            instance: Some("urxvt".into()),
            ..Default::default()
        };
        assert!(!ExactMatcher.matches(&both, &window));

        let by_id = Match {
            window_id: Some(7),
            ..Default::default()
        };
        assert!(ExactMatcher.matches(&by_id, &window));
    }

    #[test]
    fn test_empty_rule_never_matches() {
        let window = ClientWindow::new(1).with_class("XTerm");
        assert!(!ExactMatcher.matches(&Match::default(), &window));
    }

    #[test]
    fn test_missing_window_property_does_not_match() {
        let window = ClientWindow::new(1);
        assert!(!ExactMatcher.matches(&class_rule("XTerm"), &window));
    }

    #[test]
    fn test_first_registered_container_wins() {
        let mut tree = ConTree::new(HeadlessDisplay::new());
        let output = tree.add_output("out");
        let ws = tree.add_workspace(output, "1");
        let early = tree.create_node(Some(ws));
        let late = tree.create_node(Some(ws));
        tree.swallow(late, class_rule("XTerm"));
        tree.swallow(early, class_rule("Emacs"));
        tree.swallow(early, class_rule("XTerm"));

        // Focus order must not influence the result
        tree.focus(late);

        let window = ClientWindow::new(9).with_class("XTerm");
        let (owner, rule) = tree.find_owner(&window, &ExactMatcher).unwrap();
        assert_eq!(owner, early);
        assert_eq!(rule, &class_rule("XTerm"));
    }

    #[test]
    fn test_first_listed_rule_wins() {
        let mut tree = ConTree::new(HeadlessDisplay::new());
        let a = tree.create_node(None);
        let generic = Match {
            instance: Some("xterm".into()),
            ..Default::default()
        };
        tree.swallow(a, generic.clone());
        tree.swallow(a, class_rule("XTerm"));

        let window = ClientWindow::new(9).with_class("XTerm").with_instance("xterm");
        let (_, rule) = tree.find_owner(&window, &ExactMatcher).unwrap();
        assert_eq!(rule, &generic);
    }

    #[test]
    fn test_no_owner() {
        let mut tree = ConTree::new(HeadlessDisplay::new());
        let a = tree.create_node(None);
        tree.swallow(a, class_rule("Emacs"));
        let window = ClientWindow::new(9).with_class("XTerm");
        assert!(tree.find_owner(&window, &ExactMatcher).is_none());
    }

    #[test]
    fn test_custom_matcher() {
        struct Prefix;
        impl WindowMatcher for Prefix {
            fn matches(&self, rule: &Match, window: &ClientWindow) -> bool {
                match (&rule.title, &window.title) {
                    (Some(want), Some(have)) => have.starts_with(want.as_str()),
                    _ => false,
                }
            }
        }

        let mut tree = ConTree::new(HeadlessDisplay::new());
        let a = tree.create_node(None);
        tree.swallow(
            a,
            Match {
                title: Some("vim".into()),
                ..Default::default()
            },
        );
        let window = ClientWindow::new(3).with_title("vim: notes.md");
        assert_eq!(tree.find_owner(&window, &Prefix).map(|(id, _)| id), Some(a));
    }

    #[test]
    fn test_match_from_toml() {
        let rule: Match = toml::from_str(r#"class = "Firefox""#).unwrap();
        assert_eq!(rule, class_rule("Firefox"));
    }
}
