//! Canned quote source
//!
//! Serves a fixed byte buffer and then end-of-stream. Used for replaying a
//! captured boundary file and for deterministic runs in tests.

use super::{QuoteSource, QuoteStream};
use crate::codec::encode_record;
use crate::core::{Quote, SourceError};
use parking_lot::Mutex;
use std::io::Cursor;
use std::path::Path;

pub struct ScriptedSource {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl ScriptedSource {
    /// Raw boundary bytes, served verbatim
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
        }
    }

    /// Encode each quote as a terminated record
    pub fn from_quotes<'a>(quotes: impl IntoIterator<Item = &'a Quote>) -> Self {
        let bytes = quotes.into_iter().flat_map(encode_record).collect::<Vec<u8>>();
        Self::from_bytes(bytes)
    }

    /// Replay a captured boundary file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self::from_bytes(std::fs::read(path)?))
    }
}

impl QuoteSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn start(&self) -> Result<QuoteStream, SourceError> {
        let bytes = self.bytes.lock().take().ok_or(SourceError::AlreadyStarted)?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    // The stream ends on its own
    fn stop(&self) {}

    fn wait(&self) -> Result<(), SourceError> {
        Ok(())
    }
}
