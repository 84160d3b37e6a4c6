//! The application root: routes locations to views and dispatches UI events.
//!
//! A [`Session`] borrows the loaded [`StoreHandle`] and owns everything
//! ephemeral: the router, the active view, the highlight cursor. All work is
//! synchronous; each event fully replaces the state it touches.

pub mod surface;
pub mod view;

pub use surface::{DetailSurface, ListSurface, Surface};
pub use view::{ActiveView, DetailHeader, DetailView, ListRow, ListView, MessageView, RenderInstruction};

use crate::index::store::StoreHandle;
use crate::index::types::RecordId;
use crate::query::{QueryState, SearchMode};
use crate::router::{Listener, Location, Route, Router, View};

/// Tunables the presentation layer may override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Mode the list view starts in
    pub default_mode: SearchMode,
    /// Keyboard shortcut advancing to the next highlight
    pub next_key: char,
    /// Scroll offset from which the floating navigation is shown
    pub nav_reveal_offset: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_mode: SearchMode::Token,
            next_key: 'n',
            nav_reveal_offset: 200,
        }
    }
}

/// A user interaction reported by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The query input now holds this text
    QueryInput(String),
    /// The search mode toggle was flipped
    ToggleMode,
    /// A result row was clicked
    RowActivated(RecordId),
    /// The "next occurrence" control was clicked
    NextOccurrence,
    KeyPressed(char),
    BackToTop,
    /// The detail view scrolled to this offset
    Scrolled(u32),
    /// The "back to index" link was followed
    BackToIndex,
}

impl UiEvent {
    /// The listener that must be registered for the event to be handled
    fn listener(&self) -> Listener {
        match self {
            UiEvent::QueryInput(_) => Listener::QueryInput,
            UiEvent::ToggleMode => Listener::ModeToggle,
            UiEvent::RowActivated(_) => Listener::RowActivate,
            UiEvent::NextOccurrence => Listener::NextOccurrence,
            UiEvent::KeyPressed(_) => Listener::NextShortcut,
            UiEvent::BackToTop => Listener::BackToTop,
            UiEvent::Scrolled(_) => Listener::Scroll,
            UiEvent::BackToIndex => Listener::BackToIndex,
        }
    }
}

pub struct Session<'s> {
    store: &'s StoreHandle,
    router: Router,
    view: ActiveView<'s>,
    /// Search mode, kept across re-renders of the list
    mode: SearchMode,
    options: SessionOptions,
}

impl<'s> Session<'s> {
    /// Route `initial` and build the first view. Nothing is painted yet.
    pub fn new(store: &'s StoreHandle, initial: Location, options: SessionOptions) -> Self {
        let mut router = Router::new(initial);
        let mode = options.default_mode;
        let view = build_view(store, &mut router, mode);

        let mut session = Self {
            store,
            router,
            view,
            mode,
            options,
        };
        session.register_listeners();
        session
    }

    pub fn store(&self) -> &'s StoreHandle {
        self.store
    }

    pub fn location(&self) -> &Location {
        self.router.location()
    }

    pub fn view(&self) -> &ActiveView<'s> {
        &self.view
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Render instruction for the view currently built
    pub fn render(&self) -> RenderInstruction {
        self.view.instruction()
    }

    /// Paint the current view and bring its live state onto the surface
    pub fn show(&mut self, surface: &mut dyn Surface) {
        surface.paint(&self.view.instruction());
        surface.set_location(&self.router.location().to_fragment());
        self.attach(surface);
    }

    /// Navigate to a new location, pushing it onto the history
    pub fn navigate(&mut self, to: Location, surface: &mut dyn Surface) {
        self.router.navigate(to);
        self.rerender(surface);
    }

    /// The location changed from outside (address bar, bookmark)
    pub fn location_changed(&mut self, fragment: &str, surface: &mut dyn Surface) {
        self.navigate(Location::parse(fragment), surface);
    }

    /// History back. Returns `false` when already at the first entry.
    pub fn go_back(&mut self, surface: &mut dyn Surface) -> bool {
        if !self.router.back() {
            return false;
        }
        self.rerender(surface);
        true
    }

    /// Dispatch a UI event to the active view.
    ///
    /// Events nobody in the current view scope listens for are dropped.
    pub fn handle(&mut self, event: UiEvent, surface: &mut dyn Surface) {
        let listener = event.listener();
        if !self.router.scope().is_some_and(|s| s.handles(listener)) {
            tracing::trace!(?event, "no listener in active view");
            return;
        }

        match event {
            UiEvent::QueryInput(text) => self.apply_query(QueryState::new(text, self.mode), surface),
            UiEvent::ToggleMode => {
                self.mode = self.mode.toggled();
                surface.set_mode_toggle(self.mode);
                let text = match &self.view {
                    ActiveView::List(list) => list.query().text.clone(),
                    ActiveView::Detail(_) => return,
                };
                self.apply_query(QueryState::new(text, self.mode), surface);
            }
            UiEvent::RowActivated(id) => {
                let query = match &self.view {
                    ActiveView::List(list) => Some(list.query().text.clone()),
                    ActiveView::Detail(_) => None,
                };
                self.navigate(Location::detail(id, query), surface);
            }
            UiEvent::NextOccurrence => self.advance_highlight(surface),
            UiEvent::KeyPressed(key) => {
                if key == self.options.next_key {
                    self.advance_highlight(surface);
                }
            }
            UiEvent::BackToTop => surface.scroll_to_top(),
            UiEvent::Scrolled(offset) => {
                if let ActiveView::Detail(detail) = &mut self.view {
                    let visible = offset >= self.options.nav_reveal_offset;
                    if visible != detail.nav_visible {
                        detail.nav_visible = visible;
                        surface.set_floating_nav(visible);
                    }
                }
            }
            UiEvent::BackToIndex => self.back_to_index(surface),
        }
    }

    /// Rebuild the view for the current location and show it
    fn rerender(&mut self, surface: &mut dyn Surface) {
        self.view = build_view(self.store, &mut self.router, self.mode);
        self.register_listeners();
        self.show(surface);
    }

    /// Open a fresh listener scope for the active view
    fn register_listeners(&mut self) {
        match &self.view {
            ActiveView::List(_) => {
                let scope = self.router.enter(View::List);
                scope.register(Listener::QueryInput);
                scope.register(Listener::ModeToggle);
                scope.register(Listener::RowActivate);
            }
            ActiveView::Detail(detail) => {
                let has_spans = !detail.cursor().is_empty();
                let scope = self.router.enter(View::Detail);
                scope.register(Listener::BackToIndex);
                scope.register(Listener::BackToTop);
                scope.register(Listener::Scroll);
                if has_spans {
                    scope.register(Listener::NextOccurrence);
                    scope.register(Listener::NextShortcut);
                }
            }
        }
    }

    /// Push the view's dynamic state onto a freshly painted surface
    fn attach(&mut self, surface: &mut dyn Surface) {
        match &mut self.view {
            ActiveView::List(list) => {
                surface.set_query_input(&list.query().text);
                surface.set_mode_toggle(list.query().mode);
                sync_rows(list, surface);
            }
            ActiveView::Detail(detail) => {
                surface.set_floating_nav(detail.nav_visible);
                detail.cursor.prime(surface);
                surface.set_next_control(detail.next_label().as_deref());
            }
        }
    }

    fn apply_query(&mut self, query: QueryState, surface: &mut dyn Surface) {
        let ActiveView::List(list) = &mut self.view else {
            return;
        };

        list.update(self.store, query);
        sync_rows(list, surface);

        // Keep the list location in step so back-navigation restores it
        self.router.replace(Location::list(Some(list.query().text.clone())));
        surface.set_location(&self.router.location().to_fragment());
    }

    fn advance_highlight(&mut self, surface: &mut dyn Surface) {
        if let ActiveView::Detail(detail) = &mut self.view {
            detail.cursor.next(surface);
            surface.set_next_control(detail.next_label().as_deref());
        }
    }

    /// Leave the detail view for the list it was entered from
    fn back_to_index(&mut self, surface: &mut dyn Surface) {
        if self.router.history_len() > 1 {
            self.go_back(surface);
        } else {
            let query = self.router.location().query.clone();
            self.navigate(Location::list(query), surface);
        }
    }
}

/// Build the view a location resolves to
fn build_view<'s>(store: &'s StoreHandle, router: &mut Router, mode: SearchMode) -> ActiveView<'s> {
    match router.route(store) {
        Route::List { query } => {
            ActiveView::List(ListView::new(store, QueryState::new(query.unwrap_or_default(), mode)))
        }
        Route::Detail { id, query } => match store.get(id) {
            Some(record) => ActiveView::Detail(DetailView::new(record, query)),
            // resolve() already checked the id
            None => ActiveView::List(ListView::new(store, QueryState::new(String::new(), mode))),
        },
    }
}

fn sync_rows(list: &ListView<'_>, surface: &mut dyn Surface) {
    for record in list.rows() {
        surface.update_row(
            record.id,
            list.is_visible(record.id),
            &list.title_html(record),
            &list.href(record.id),
        );
    }
    surface.set_no_results(list.no_results());
}
