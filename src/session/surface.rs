use crate::highlight::cursor::HighlightSurface;
use crate::index::types::RecordId;
use crate::query::SearchMode;
use crate::session::view::RenderInstruction;

/// Hooks of the list view the engine updates in place on every keystroke
pub trait ListSurface {
    /// Put text into the query input without firing an input event
    fn set_query_input(&mut self, text: &str);

    fn set_mode_toggle(&mut self, mode: SearchMode);

    /// Update one result row: visibility, title markup and link target
    fn update_row(&mut self, id: RecordId, visible: bool, title_html: &str, href: &str);

    fn set_no_results(&mut self, shown: bool);
}

/// Hooks of the detail view
pub trait DetailSurface: HighlightSurface {
    /// Show the "next occurrence" control with a label, or hide it
    fn set_next_control(&mut self, label: Option<&str>);

    /// Show or hide the floating navigation
    fn set_floating_nav(&mut self, visible: bool);

    fn scroll_to_top(&mut self);
}

/// Everything the presentation layer supplies back to the engine
pub trait Surface: ListSurface + DetailSurface {
    /// Replace whatever is on screen with a freshly rendered view
    fn paint(&mut self, instruction: &RenderInstruction);

    /// Mirror the current location into the address fragment
    fn set_location(&mut self, fragment: &str);
}
