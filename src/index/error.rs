use crate::index::types::ArchiveDocument;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring up the archive. Always terminal for the session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {document} from {}: {source}", path.display())]
    Fetch {
        document: ArchiveDocument,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{document} is not valid archive JSON: {source}")]
    Parse {
        document: ArchiveDocument,
        #[source]
        source: serde_json::Error,
    },

    #[error("{document} is malformed: {reason}")]
    Malformed {
        document: ArchiveDocument,
        reason: String,
    },
}

impl LoadError {
    pub fn document(&self) -> ArchiveDocument {
        match self {
            LoadError::Fetch { document, .. }
            | LoadError::Parse { document, .. }
            | LoadError::Malformed { document, .. } => *document,
        }
    }

    pub(crate) fn malformed(document: ArchiveDocument, reason: impl Into<String>) -> Self {
        LoadError::Malformed {
            document,
            reason: reason.into(),
        }
    }
}
