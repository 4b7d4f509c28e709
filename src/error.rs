use thiserror::Error;

use crate::document::DocumentId;

/// Misconfiguration detected while declaring filters or relationships.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing relationship metadata on {shape}.{field}: {reason}")]
    MissingRelationshipMetadata {
        shape: &'static str,
        field: String,
        reason: String,
    },
    #[error("Many-to-many metadata on {shape}.{field} needs four key names, found {found}")]
    MalformedManyToManyMetadata {
        shape: &'static str,
        field: String,
        found: usize,
    },
    #[error("Unsupported filter value type {kind} for field {field}")]
    UnsupportedFilterValueType { field: String, kind: &'static str },
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    #[error("Relationship {shape}.{field} is many-to-many and needs a join document")]
    MissingJoinDocument { shape: &'static str, field: String },
    #[error("Relationship {shape}.{field} is not many-to-many but a join document was given")]
    UnexpectedJoinDocument { shape: &'static str, field: String },
    #[error("Nested declaration {path} on {shape} has no declared parent relationship")]
    OrphanNestedDeclaration { shape: &'static str, path: String },
    #[error("Settings: {0}")]
    Settings(String),
}

#[derive(Error, Debug)]
pub enum DocjoinError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Unknown field {field} in shape {shape}")]
    UnknownField { shape: &'static str, field: String },
    #[error("Decode failure in {context}: {source}")]
    DecodeFailure {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Cyclic relationship: document {document} re-entered with {expression}")]
    CyclicRelationship {
        document: DocumentId,
        expression: String,
    },
    #[error("Relationship depth limit of {0} exceeded")]
    DepthExceeded(usize),
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        position: Option<usize>,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DocjoinError>;

// Helper conversions
impl From<config::ConfigError> for DocjoinError {
    fn from(e: config::ConfigError) -> Self {
        Self::Configuration(ConfigurationError::Settings(e.to_string()))
    }
}

impl DocjoinError {
    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::DecodeFailure {
            context: context.into(),
            source,
        }
    }
    pub(crate) fn parse(message: impl Into<String>, position: usize) -> Self {
        Self::Parse {
            message: message.into(),
            position: Some(position),
        }
    }
}
