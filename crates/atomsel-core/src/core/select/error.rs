use thiserror::Error;

/// Errors raised while parsing or evaluating a selection.
///
/// Every variant is recoverable at the call boundary. Evaluation never leaves
/// a partially computed mask behind when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    /// Malformed selection text: an unknown word, an illegal juxtaposition,
    /// unbalanced parentheses or a missing `of`/`as`.
    #[error("Syntax error at position {position}: {message}")]
    Syntax {
        message: String,
        /// Byte offset of the offending token in the input.
        position: usize,
        /// Text of the offending token; empty at end of input.
        token: String,
    },

    /// The selection names an optional column the atomic system does not carry.
    #[error("Field '{field}' is not present in the atomic system")]
    FieldNotFound { field: String },

    /// A literal of the wrong type for its field, or a bad radius or coordinate.
    #[error("Invalid value '{value}': {message}")]
    InvalidValue {
        value: String,
        message: String,
        position: Option<usize>,
    },

    #[error("The atomic system contains no atoms")]
    EmptyInput,
}

impl SelectionError {
    pub(crate) fn syntax(message: impl Into<String>, position: usize, token: &str) -> Self {
        SelectionError::Syntax {
            message: message.into(),
            position,
            token: token.to_string(),
        }
    }

    pub(crate) fn invalid_value(
        value: &str,
        message: impl Into<String>,
        position: Option<usize>,
    ) -> Self {
        SelectionError::InvalidValue {
            value: value.to_string(),
            message: message.into(),
            position,
        }
    }

    /// Byte offset of the error in the selection text, when known.
    pub fn position(&self) -> Option<usize> {
        match self {
            SelectionError::Syntax { position, .. } => Some(*position),
            SelectionError::InvalidValue { position, .. } => *position,
            _ => None,
        }
    }

    /// Renders the error with the input echoed and a caret under the offending token.
    pub fn render(&self, input: &str) -> String {
        let Some(position) = self.position().filter(|&p| p <= input.len()) else {
            return self.to_string();
        };
        let width = match self {
            SelectionError::Syntax { token, .. } => token.chars().count(),
            SelectionError::InvalidValue { value, .. } => value.chars().count(),
            _ => 1,
        };
        let column = input
            .get(..position)
            .map_or(position, |prefix| prefix.chars().count());
        format!(
            "{}\n  {}\n  {}{}",
            self,
            input,
            " ".repeat(column),
            "^".repeat(width.max(1))
        )
    }
}
