use serde::{Deserialize, Serialize};

/// How a query string is matched against the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Whole-word lookup in the token index, terms ANDed together
    #[default]
    Token,
    /// Literal substring scan over the full-text index
    Substring,
}

impl SearchMode {
    pub fn toggled(self) -> Self {
        match self {
            SearchMode::Token => SearchMode::Substring,
            SearchMode::Substring => SearchMode::Token,
        }
    }

    pub fn from_pattern_flag(pattern: bool) -> Self {
        if pattern {
            SearchMode::Substring
        } else {
            SearchMode::Token
        }
    }

    pub fn is_substring(self) -> bool {
        self == SearchMode::Substring
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Token => "words",
            SearchMode::Substring => "pattern",
        }
    }
}

/// The text and mode of the query being evaluated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    /// Exactly what the user typed
    pub text: String,
    pub mode: SearchMode,
}

impl QueryState {
    pub fn new(text: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            text: text.into(),
            mode,
        }
    }

    /// Trimmed, lowercased form used for matching
    pub fn normalized(&self) -> String {
        normalize_query(&self.text)
    }
}

/// Trim and lowercase a raw query
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(SearchMode::Token.toggled(), SearchMode::Substring);
        assert_eq!(SearchMode::Token.toggled().toggled(), SearchMode::Token);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(QueryState::new("  Rust PROXY ", SearchMode::Token).normalized(), "rust proxy");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&SearchMode::Substring).unwrap(), "\"substring\"");
        let mode: SearchMode = serde_json::from_str("\"token\"").unwrap();
        assert_eq!(mode, SearchMode::Token);
    }
}
