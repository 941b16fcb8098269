use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid segmenter config: {field}: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },
    /// A planned marker does not come strictly after the previous one.
    #[error(
        "marker [{ordinal}] at byte {position} does not follow marker [{previous_ordinal}] at byte {previous_position}"
    )]
    MarkerOrder {
        ordinal: usize,
        position: usize,
        previous_ordinal: usize,
        previous_position: usize,
    },
    #[error("marker [{ordinal}] offset {position} is not a char boundary of a {chapter_len}-byte chapter")]
    MarkerOffset {
        ordinal: usize,
        position: usize,
        chapter_len: usize,
    },
}

impl SegmentationError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}
