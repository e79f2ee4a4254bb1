//! Parser and in-memory model for Noodle, a small configuration language.
//!
//! ```
//! let root = noodle::parse("window = { title = \"demo\", size = [1920, 1080] }").unwrap();
//! let window = root.get_group("window").unwrap();
//! assert_eq!(window.get_str("title"), Ok("demo"));
//! assert_eq!(window.get_array("size").unwrap().int_at(1), Ok(1080));
//! ```
//!
//! A parse returns the owned root [`Group`]; dropping it frees the whole tree.

pub mod error;
pub mod group;
pub mod json;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod tree;

use std::path::Path;

pub use error::{Error, Position, Span};
pub use group::Group;
pub use parser::{parse, parse_with_options, ParseOptions};
pub use tree::{AccessError, Array, ArrayValues, Kind, Node, Scalar, Value};

/// Parse a raw byte buffer. Text ends at the first NUL byte, if any.
pub fn parse_bytes(input: &[u8]) -> Result<Group, Error> {
    parse_bytes_with_options(input, &ParseOptions::default())
}

pub fn parse_bytes_with_options(input: &[u8], options: &ParseOptions) -> Result<Group, Error> {
    let end = input.iter().position(|&b| b == 0).unwrap_or(input.len());
    let text = std::str::from_utf8(&input[..end])
        .map_err(|e| Error::InvalidArgument(format!("input is not valid UTF-8: {}", e)))?;
    parse_with_options(text, options)
}

/// Read a file and parse its contents.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Group, Error> {
    parse_file_with_options(path, &ParseOptions::default())
}

pub fn parse_file_with_options(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<Group, Error> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "read file");
    parse_bytes_with_options(&bytes, options)
}
