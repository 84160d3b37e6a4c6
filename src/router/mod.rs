//! Fragment-based navigation.
//!
//! - [`location`] - the `#/chat/<id>?q=` grammar
//! - [`state`] - history, resolution against the archive, fallbacks
//! - [`scope`] - view-scoped listener registration

pub mod location;
pub mod scope;
pub mod state;

pub use location::{decode_component, encode_component, Location, View};
pub use scope::{Listener, ListenerRegistry, ViewScope};
pub use state::{Route, RouteError, Router};
