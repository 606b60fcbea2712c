//! Request line decoding.

use cortexd_types::Request;

use super::errors::DispatchError;

/// Parses one JSONL line into a [`Request`].
///
/// Trailing whitespace, including the newline delimiter, is trimmed before
/// parsing.
pub(crate) fn parse_request(line: &[u8]) -> Result<Request, DispatchError> {
    let trimmed = line.trim_ascii_end();
    if trimmed.is_empty() {
        return Err(DispatchError::malformed("empty request line"));
    }
    serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)
}
