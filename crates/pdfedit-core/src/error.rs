use thiserror::Error;

use crate::model::AnnotationId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Failed to load document: {0}")]
    Load(String),

    #[error("Annotation {0} not found")]
    NotFound(AnnotationId),

    #[error("Failed to render page: {0}")]
    Render(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("No document loaded")]
    NoDocument,

    #[error("Page {page} is out of range (1-{page_count})")]
    InvalidPage { page: u32, page_count: u32 },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EditorError {
    /// Logic errors the session survives by treating the call as a no-op.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EditorError::NotFound(_) | EditorError::InvalidPage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(EditorError::NotFound(AnnotationId(3)).is_recoverable());
        assert!(EditorError::InvalidPage { page: 9, page_count: 2 }.is_recoverable());
        assert!(!EditorError::NoDocument.is_recoverable());
        assert!(!EditorError::Load("bad".to_string()).is_recoverable());
    }
}
