use crate::index::types::RecordId;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

/// Characters `encodeURIComponent` leaves alone
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Path segment introducing a record in a detail location
const DETAIL_SEGMENT: &str = "chat";

/// Name of the fragment parameter carrying the active query
const QUERY_PARAM: &str = "q";

/// Which view a location addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    List,
    Detail,
}

/// Decoded address fragment: the whole addressable state of the browser.
///
/// Grammar: `#/` or `#/chat/<id>`, optionally followed by `?q=<encoded>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub view: View,
    /// Set for detail locations whose id segment parsed as an integer
    pub record_id: Option<RecordId>,
    /// Carried query, exactly as typed. Never `Some("")`.
    pub query: Option<String>,
}

impl Location {
    pub fn list(query: Option<String>) -> Self {
        Self {
            view: View::List,
            record_id: None,
            query: query.filter(|q| !q.is_empty()),
        }
    }

    pub fn detail(id: RecordId, query: Option<String>) -> Self {
        Self {
            view: View::Detail,
            record_id: Some(id),
            query: query.filter(|q| !q.is_empty()),
        }
    }

    /// The carried query, or `""`
    pub fn query_str(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    /// Decode a fragment such as `#/chat/12?q=rust%20proxy`.
    ///
    /// Never fails: anything without a `/chat/<id>` path is the list view.
    /// A detail path whose id is not an integer keeps `record_id` unset.
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        let (path, params) = match fragment.split_once('?') {
            Some((path, params)) => (path, Some(params)),
            None => (fragment, None),
        };

        let query = params.and_then(query_param);

        let mut parts = path.split('/');
        let _root = parts.next();
        match (parts.next(), parts.next()) {
            (Some(DETAIL_SEGMENT), Some(id)) if !id.is_empty() => Self {
                view: View::Detail,
                record_id: id.parse().ok(),
                query: query.filter(|q| !q.is_empty()),
            },
            _ => Self::list(query),
        }
    }

    /// Encode back into a fragment. `parse(to_fragment(l)) == l` for every
    /// location built through [`Location::list`] / [`Location::detail`].
    pub fn to_fragment(&self) -> String {
        let mut fragment = match (self.view, self.record_id) {
            (View::Detail, Some(id)) => format!("#/{DETAIL_SEGMENT}/{id}"),
            _ => "#/".to_string(),
        };

        if let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) {
            fragment.push('?');
            fragment.push_str(QUERY_PARAM);
            fragment.push('=');
            fragment.push_str(&encode_component(query));
        }

        fragment
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_fragment())
    }
}

/// Percent-encode like `encodeURIComponent`
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Decode a form-encoded value: `+` is a space, then percent escapes
pub fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// First `q` value among `&`-separated parameters
fn query_param(params: &str) -> Option<String> {
    params
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode_component(key) == QUERY_PARAM)
        .map(|(_, value)| decode_component(value))
}
