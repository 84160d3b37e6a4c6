use crate::index::store::StoreHandle;
use crate::index::types::RecordId;
use crate::router::location::{Location, View};
use crate::router::scope::{ListenerRegistry, ViewScope};
use thiserror::Error;

/// Why a detail location could not be shown
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no record with id {0}")]
    UnknownRecord(RecordId),
    #[error("detail location has no valid record id")]
    InvalidRecordId,
}

/// A location resolved against the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List { query: Option<String> },
    Detail { id: RecordId, query: Option<String> },
}

impl Route {
    pub fn view(&self) -> View {
        match self {
            Route::List { .. } => View::List,
            Route::Detail { .. } => View::Detail,
        }
    }
}

/// Location history plus the listener scope of the view on screen
#[derive(Debug)]
pub struct Router {
    /// Never empty; the last entry is the current location
    history: Vec<Location>,
    registry: ListenerRegistry,
    scope: Option<ViewScope>,
    generation: u64,
}

impl Router {
    pub fn new(initial: Location) -> Self {
        Self {
            history: vec![initial],
            registry: ListenerRegistry::default(),
            scope: None,
            generation: 0,
        }
    }

    pub fn location(&self) -> &Location {
        // history is never empty
        &self.history[self.history.len() - 1]
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Push a new location. Navigating to the current location is a no-op.
    pub fn navigate(&mut self, to: Location) {
        if *self.location() != to {
            self.history.push(to);
        }
    }

    /// Overwrite the current location without adding a history entry
    pub fn replace(&mut self, to: Location) {
        let last = self.history.len() - 1;
        self.history[last] = to;
    }

    /// Step back one history entry. Returns `false` at the first entry.
    pub fn back(&mut self) -> bool {
        if self.history.len() > 1 {
            self.history.pop();
            true
        } else {
            false
        }
    }

    /// Resolve the current location, failing for unknown records
    pub fn resolve(&self, store: &StoreHandle) -> Result<Route, RouteError> {
        let location = self.location();
        match location.view {
            View::List => Ok(Route::List {
                query: location.query.clone(),
            }),
            View::Detail => {
                let id = location.record_id.ok_or(RouteError::InvalidRecordId)?;
                if !store.contains(id) {
                    return Err(RouteError::UnknownRecord(id));
                }
                Ok(Route::Detail {
                    id,
                    query: location.query.clone(),
                })
            }
        }
    }

    /// Resolve the current location, falling back to the list view.
    ///
    /// On fallback the current location is rewritten to the list so the
    /// fragment keeps describing what is on screen.
    pub fn route(&mut self, store: &StoreHandle) -> Route {
        match self.resolve(store) {
            Ok(route) => route,
            Err(err) => {
                tracing::warn!(location = %self.location(), error = %err, "falling back to list view");
                let query = self.location().query.clone();
                self.replace(Location::list(query.clone()));
                Route::List { query }
            }
        }
    }

    /// Tear down the current view's listeners and open a scope for `view`
    pub fn enter(&mut self, view: View) -> &mut ViewScope {
        self.scope = None;
        self.generation += 1;
        self.scope.insert(self.registry.scope(view, self.generation))
    }

    pub fn scope(&self) -> Option<&ViewScope> {
        self.scope.as_ref()
    }

    /// Listener registrations currently alive across every scope
    pub fn live_listeners(&self) -> usize {
        self.registry.live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::scope::Listener;

    fn store() -> StoreHandle {
        let records = r#"{"1": {"id": 1, "title": "t", "msg_count": 1, "filesize": 1, "content": ""}}"#;
        StoreHandle::load(records.as_bytes(), b"{}", b"{}").unwrap()
    }

    #[test]
    fn test_navigate_and_back() {
        let mut router = Router::new(Location::list(Some("rust".into())));
        router.navigate(Location::detail(1, Some("rust".into())));
        assert_eq!(router.history_len(), 2);
        assert!(router.back());
        assert_eq!(router.location(), &Location::list(Some("rust".into())));
        assert!(!router.back());
    }

    #[test]
    fn test_navigate_same_location_is_noop() {
        let mut router = Router::new(Location::list(None));
        router.navigate(Location::list(None));
        assert_eq!(router.history_len(), 1);
    }

    #[test]
    fn test_unknown_record_falls_back() {
        let store = store();
        let mut router = Router::new(Location::detail(99, Some("q".into())));
        assert_eq!(router.resolve(&store), Err(RouteError::UnknownRecord(99)));
        assert_eq!(router.route(&store), Route::List { query: Some("q".into()) });
        assert_eq!(router.location().view, View::List);
    }

    #[test]
    fn test_invalid_id_falls_back() {
        let store = store();
        let mut router = Router::new(Location::parse("#/chat/xyz"));
        assert_eq!(router.resolve(&store), Err(RouteError::InvalidRecordId));
        assert_eq!(router.route(&store).view(), View::List);
    }

    #[test]
    fn test_known_record_routes_to_detail() {
        let store = store();
        let mut router = Router::new(Location::parse("#/chat/1?q=t"));
        assert_eq!(router.route(&store), Route::Detail { id: 1, query: Some("t".into()) });
    }

    #[test]
    fn test_enter_replaces_scope() {
        let mut router = Router::new(Location::list(None));
        router.enter(View::List).register(Listener::QueryInput);
        router.enter(View::List).register(Listener::QueryInput);
        assert_eq!(router.live_listeners(), 1);
        assert_eq!(router.scope().map(|s| s.generation()), Some(2));
    }
}
