use crate::router::location::View;
use std::cell::Cell;
use std::rc::Rc;

/// An input the active view reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    QueryInput,
    ModeToggle,
    RowActivate,
    NextOccurrence,
    NextShortcut,
    BackToTop,
    Scroll,
    BackToIndex,
}

/// Counts live listener registrations across all scopes
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    live: Rc<Cell<usize>>,
}

impl ListenerRegistry {
    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// Open a new, empty scope for a view
    pub fn scope(&self, view: View, generation: u64) -> ViewScope {
        ViewScope {
            view,
            generation,
            listeners: Vec::new(),
            live: Rc::clone(&self.live),
        }
    }
}

/// Listeners registered by one rendered view.
///
/// Dropping the scope tears every registration down, so a view that is
/// rendered again starts from nothing and never stacks duplicate handlers.
#[derive(Debug)]
pub struct ViewScope {
    view: View,
    generation: u64,
    listeners: Vec<Listener>,
    live: Rc<Cell<usize>>,
}

impl ViewScope {
    pub fn view(&self) -> View {
        self.view
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn register(&mut self, listener: Listener) -> bool {
        if self.listeners.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        self.live.set(self.live.get() + 1);
        true
    }

    pub fn handles(&self, listener: Listener) -> bool {
        self.listeners.contains(&listener)
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.live.set(self.live.get() - self.listeners.len());
        tracing::debug!(
            view = ?self.view,
            generation = self.generation,
            listeners = self.listeners.len(),
            "view scope torn down"
        );
    }
}
