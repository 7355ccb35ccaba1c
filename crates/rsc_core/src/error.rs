//! Error types shared by every pass over an element tree

use thiserror::Error;

/// Error raised by a component implementation while rendering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ComponentError {
    message: String,
}

impl ComponentError {
    /// Create a new component error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ComponentError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ComponentError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A node whose shape matches none of the variants a pass knows how to handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported node shape: {detail}")]
pub struct StructuralError {
    detail: String,
}

impl StructuralError {
    /// Create a new structural error
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Get the description of the offending node
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_error_display() {
        let err = ComponentError::from("database unreachable");
        assert_eq!(err.message(), "database unreachable");
        assert_eq!(err.to_string(), "database unreachable");
    }

    #[test]
    fn test_structural_error_display() {
        let err = StructuralError::new("composite `Counter` on the client");
        assert_eq!(
            err.to_string(),
            "Unsupported node shape: composite `Counter` on the client"
        );
    }
}
