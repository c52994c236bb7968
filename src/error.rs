use thiserror::Error;

/// Errors returned by editor commands.
///
/// None of these are fatal: when one is returned the scene, selection and
/// history are exactly as they were before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// A command that must not interrupt a gesture was invoked mid-gesture
    #[error("Editor busy: cannot {action} while {state}")]
    ToolBusy {
        action: &'static str,
        state: &'static str,
    },

    #[error("No element with id {0}")]
    UnknownElement(String),
}

/// Errors that can occur while saving or loading a floor plan document
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to (de)serialize floor plan: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to access floor plan file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur while fetching or decoding a thumbnail
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to fetch asset {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to decode asset {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}
