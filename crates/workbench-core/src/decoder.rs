//! Incremental UTF-8 decoding for streamed bodies.
//!
//! Transports hand over bytes in arbitrary slices, so a multi-byte
//! character can be split across two reads. The decoder keeps the
//! incomplete tail of one slice and prepends it to the next.

use workbench_types::{Result, WorkbenchError};

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
    /// Bytes consumed so far, for error positions
    offset: usize,
    bom_checked: bool,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next slice. Returns the text that is complete so far;
    /// an incomplete trailing sequence is held back for the next call.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<String> {
        self.pending.extend_from_slice(bytes);

        if !self.bom_checked {
            // Wait until we can tell whether the body starts with a BOM
            if self.pending.len() < BOM.len() && BOM.starts_with(&self.pending) {
                return Ok(String::new());
            }
            if self.pending.starts_with(BOM) {
                self.pending.drain(..BOM.len());
                self.offset += BOM.len();
            }
            self.bom_checked = true;
        }

        let complete = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(WorkbenchError::Decode(format!(
                        "invalid UTF-8 sequence at byte {}",
                        self.offset + e.valid_up_to()
                    )));
                }
                e.valid_up_to()
            }
        };

        let head: Vec<u8> = self.pending.drain(..complete).collect();
        self.offset += head.len();
        String::from_utf8(head).map_err(|e| WorkbenchError::Decode(e.to_string()))
    }

    /// Signal end of input. Fails if a partial sequence is still buffered.
    pub fn finish(self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        Err(WorkbenchError::Decode(format!(
            "stream ended inside a UTF-8 sequence ({} dangling bytes)",
            self.pending.len()
        )))
    }

    /// Number of bytes held back waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
