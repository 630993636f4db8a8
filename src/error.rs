//! Error types and handling for typeview

/// Result type alias for typeview operations
pub type Result<T> = std::result::Result<T, ViewError>;

/// Errors raised while declaring types, mapping regions and accessing views
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// I/O related errors (file operations, mmap, etc.)
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A struct field was declared with an opaque/reference type
    #[error("Opaque type not supported: field '{field}' has type {type_name}")]
    OpaqueField { field: String, type_name: String },

    /// The same field name was declared twice
    #[error("Duplicate field: {name}")]
    DuplicateField { name: String },

    /// View offset is misaligned for the viewed type
    #[error("Invalid offset for type: {offset} (alignment {alignment})")]
    InvalidOffset { offset: usize, alignment: usize },

    /// Struct declared without `transparent`; only transparent structs exist here
    #[error("Only transparent struct types are supported")]
    NotTransparent,

    /// A feature this library deliberately does not implement
    #[error("Not supported: {feature}")]
    Unsupported { feature: String },

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Named field does not exist on the struct
    #[error("Field not found: {name}")]
    FieldNotFound { name: String },

    /// Accessor or update shape disagrees with the field type
    #[error("Type mismatch on field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Platform-specific errors
    #[error("Platform error: {message}")]
    Platform { message: String },
}

impl ViewError {
    /// Create an I/O error from a standard I/O error
    pub fn from_io(source: std::io::Error, context: &str) -> Self {
        Self::Io {
            message: format!("{}: {}", context, source),
            source: Some(source),
        }
    }

    /// Create an opaque field error
    pub fn opaque_field(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::OpaqueField {
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a duplicate field error
    pub fn duplicate_field(name: impl Into<String>) -> Self {
        Self::DuplicateField { name: name.into() }
    }

    /// Create an invalid offset error
    pub fn invalid_offset(offset: usize, alignment: usize) -> Self {
        Self::InvalidOffset { offset, alignment }
    }

    /// Create an unsupported feature error
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a field not found error
    pub fn field_not_found(name: impl Into<String>) -> Self {
        Self::FieldNotFound { name: name.into() }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a platform error
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }

    /// True for the "deliberately not implemented" class of errors
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::Unsupported { .. } | Self::OpaqueField { .. } | Self::NotTransparent
        )
    }
}

impl From<std::io::Error> for ViewError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io(err, "I/O operation failed")
    }
}

impl From<bincode::Error> for ViewError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization(format!("Bincode error: {}", err))
    }
}
