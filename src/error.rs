use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A 0-based position in the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// 0-based line number
    pub line: usize,
    /// 0-based column (byte offset within the line)
    pub column: usize,
    /// 0-based absolute byte offset from the start of input
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}

/// A `[start, end)` byte range into the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Everything that can stop a parse.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("could not allocate memory")]
    OutOfMemory,

    #[error("unexpected {} at {position}: expected {expected}", describe_found(.found))]
    UnexpectedToken {
        /// Source text of the offending token (empty at end of input).
        found: String,
        expected: String,
        position: Position,
        span: Span,
    },

    #[error("duplicate name `{name}` at {position}")]
    DuplicateName { name: String, position: Position },

    #[error("groups nested deeper than {limit} levels at {position}")]
    DepthLimit { limit: usize, position: Position },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_found(found: &str) -> String {
    if found.is_empty() {
        "end of input".to_string()
    } else {
        format!("`{}`", found)
    }
}

impl Error {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "noodle-invalid-argument",
            Error::OutOfMemory => "noodle-out-of-memory",
            Error::UnexpectedToken { .. } => "noodle-unexpected-token",
            Error::DuplicateName { .. } => "noodle-duplicate-name",
            Error::DepthLimit { .. } => "noodle-depth-limit",
            Error::Io { .. } => "noodle-io",
        }
    }

    /// Where in the source the error was detected, if it has a location.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::UnexpectedToken { position, .. }
            | Error::DuplicateName { position, .. }
            | Error::DepthLimit { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Copy the diagnostic message into `buf` as a NUL-terminated string.
    ///
    /// At most `buf.len() - 1` message bytes are written, truncating on a
    /// UTF-8 character boundary. Returns the number of message bytes written
    /// (the terminator is not counted). An empty buffer is left untouched.
    pub fn write_diagnostic(&self, buf: &mut [u8]) -> usize {
        let Some(capacity) = buf.len().checked_sub(1) else {
            return 0;
        };
        let message = self.to_string();
        let mut len = message.len().min(capacity);
        while !message.is_char_boundary(len) {
            len -= 1;
        }
        buf[..len].copy_from_slice(&message.as_bytes()[..len]);
        buf[len..].fill(0);
        len
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}
