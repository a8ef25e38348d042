//! The store: owns the current snapshot and swaps it per event.

use crate::state::{EditorState, Event, reduce};
use geoedit_core::EditorConfig;
use std::rc::Rc;

pub struct Store {
    state: Rc<EditorState>,
    config: EditorConfig,
}

impl Store {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            state: Rc::new(EditorState::new(&config)),
            config,
        }
    }

    pub fn state(&self) -> &Rc<EditorState> {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    /// Apply `event` and return the snapshot it replaced.
    pub fn dispatch(&mut self, event: Event) -> Rc<EditorState> {
        if !matches!(event, Event::UpdateMousePosition(_)) {
            log::debug!("dispatch {}", event.name());
        }
        let next = Rc::new(reduce(&self.state, event, &self.config));
        std::mem::replace(&mut self.state, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_returns_the_replaced_snapshot() {
        let mut store = Store::new(EditorConfig::default());
        let first = Rc::clone(store.state());
        let prev = store.dispatch(Event::Finish);
        assert!(Rc::ptr_eq(&first, &prev));
        assert!(!Rc::ptr_eq(&first, store.state()));
    }

    #[test]
    fn hover_counter_is_capped() {
        let mut store = Store::new(EditorConfig::default());
        for _ in 0..500 {
            store.dispatch(Event::IncreaseHoverTransition);
        }
        assert_eq!(store.state().hover_transition, 20.0);
    }
}
