//! Keyboard shortcut mapping.
//!
//! Maps `KeyboardEvent.key` values to semantic [`ShortcutAction`]s so hosts
//! don't hard-code key codes.
//!
//! | Key | Action |
//! |-----|--------|
//! | `t` | toggle topology mode |
//! | `l` | toggle line snapping |
//! | `s` | toggle point snapping |
//! | `Enter` | finish the current edit or add-shape gesture |

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    ToggleTopology,
    ToggleLineSnap,
    TogglePointSnap,
    Finish,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// Any ⌘/Ctrl/Alt combo is left to the host (browser and map
    /// shortcuts), so only bare keys and Shift variants bind.
    pub fn resolve(key: &str, ctrl: bool, _shift: bool, alt: bool, meta: bool) -> Option<ShortcutAction> {
        if ctrl || meta || alt {
            return None;
        }

        match key {
            "t" | "T" => Some(ShortcutAction::ToggleTopology),
            "l" | "L" => Some(ShortcutAction::ToggleLineSnap),
            "s" | "S" => Some(ShortcutAction::TogglePointSnap),
            "Enter" => Some(ShortcutAction::Finish),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_toggles() {
        assert_eq!(
            ShortcutMap::resolve("t", false, false, false, false),
            Some(ShortcutAction::ToggleTopology)
        );
        assert_eq!(
            ShortcutMap::resolve("L", false, true, false, false),
            Some(ShortcutAction::ToggleLineSnap)
        );
        assert_eq!(
            ShortcutMap::resolve("s", false, false, false, false),
            Some(ShortcutAction::TogglePointSnap)
        );
    }

    #[test]
    fn resolve_enter_finishes() {
        assert_eq!(
            ShortcutMap::resolve("Enter", false, false, false, false),
            Some(ShortcutAction::Finish)
        );
    }

    #[test]
    fn modifier_combos_are_ignored() {
        // ⌘S / Ctrl+S belong to the browser.
        assert_eq!(ShortcutMap::resolve("s", false, false, false, true), None);
        assert_eq!(ShortcutMap::resolve("s", true, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("t", false, false, true, false), None);
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("Escape", false, false, false, false), None);
    }
}
