//! Response serialization for the connection handler.

use std::io::Write;

use cortexd_types::Response;

use super::errors::DispatchError;

/// Writes protocol responses as JSONL lines.
pub(crate) struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Serializes `response`, appends the newline delimiter and flushes.
    pub(crate) fn write(&mut self, response: &Response) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.writer, response)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
