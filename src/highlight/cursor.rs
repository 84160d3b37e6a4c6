use crate::highlight::markup::SpanId;

/// Presentation hooks the cursor drives
pub trait HighlightSurface {
    /// Add or remove the "current" styling on one span
    fn set_current(&mut self, span: SpanId, current: bool);

    /// Smoothly scroll so the span sits at the vertical centre of the view
    fn scroll_to_center(&mut self, span: SpanId);
}

/// Cyclable cursor over the highlight spans of one detail view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightCursor {
    spans: Vec<SpanId>,
    /// `None` until the first advance
    index: Option<usize>,
}

impl HighlightCursor {
    pub fn new(spans: Vec<SpanId>) -> Self {
        Self { spans, index: None }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The span currently styled as current
    pub fn current(&self) -> Option<SpanId> {
        self.index.map(|i| self.spans[i])
    }

    /// Advance to the next span, wrapping at the end.
    ///
    /// No-op when there are no spans.
    pub fn next<S: HighlightSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.spans.is_empty() {
            return;
        }

        if let Some(span) = self.current() {
            surface.set_current(span, false);
        }

        let next = self.index.map_or(0, |i| (i + 1) % self.spans.len());
        self.index = Some(next);

        let span = self.spans[next];
        surface.set_current(span, true);
        surface.scroll_to_center(span);
    }

    /// Select the first span on a fresh render, so it starts out in view
    pub fn prime<S: HighlightSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.index.is_none() {
            self.next(surface);
        }
    }

    /// Position label such as `3/7`, once a span is selected
    pub fn label(&self) -> Option<String> {
        self.index.map(|i| format!("{}/{}", i + 1, self.spans.len()))
    }
}
