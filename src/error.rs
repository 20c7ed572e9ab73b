pub(crate) type ExpandResult<T> = std::result::Result<T, ExpandError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token or construct was expected at the cursor.
    Expected { description: String },
    UnexpectedEof {
        /// Describes what was expected, e.g., "(expected '}')"
        expected_what: String,
    },
    /// The grammar matched a prefix but input remained.
    TrailingInput { rest: String },
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::Expected { description } => {
                write!(f, "expected {}", description)
            }
            ParseErrorKind::UnexpectedEof { expected_what } => {
                write!(f, "unexpected end of input{}", expected_what)
            }
            ParseErrorKind::TrailingInput { rest } => {
                write!(f, "unparsed trailing input: '{}'", rest)
            }
        }
    }
}

impl std::error::Error for ParseErrorKind {}

impl ParseErrorKind {
    pub fn unexpected_eof(expected: Option<String>) -> Self {
        ParseErrorKind::UnexpectedEof {
            expected_what: expected.map_or_else(String::new, |e| format!(" (expected {})", e)),
        }
    }
}

/// An error produced while parsing an abbreviation, carrying the byte
/// offset into the (single-line) input at which parsing failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseError {
    pub position: usize,
    pub kind: ParseErrorKind,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error at offset {}: {}", self.position, self.kind)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpandErrorKind {
    /// The abbreviation did not match the grammar.
    Parse,
    /// A filter name was not recognised. Unknown filters in a chain are
    /// skipped rather than reported; this kind exists for callers that
    /// validate chains up front.
    UnknownFilter,
    /// Invalid input outside the grammar (empty abbreviation, malformed
    /// table documents) or an internal transformer invariant violation.
    InvalidInput,
}

/// The error surface of [`crate::expand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandError {
    pub kind: ExpandErrorKind,
    pub message: String,
    pub position: Option<usize>,
}

impl ExpandError {
    pub(crate) fn invalid_input<M: Into<String>>(message: M) -> Self {
        ExpandError {
            kind: ExpandErrorKind::InvalidInput,
            message: message.into(),
            position: None,
        }
    }
}

impl std::fmt::Display for ExpandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(position) => write!(f, "{} (at offset {})", self.message, position),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ExpandError {}

impl From<ParseError> for ExpandError {
    fn from(error: ParseError) -> Self {
        ExpandError {
            kind: ExpandErrorKind::Parse,
            message: error.kind.to_string(),
            position: Some(error.position),
        }
    }
}
