//! In-process quote producer
//!
//! A dedicated thread drives a `QuoteGenerator` and pushes encoded records
//! through a bounded crossbeam channel. The venue reads them through
//! `ChannelReader`, which turns the channel into a `Read` stream: a
//! disconnected channel reads as end-of-stream, exactly like a closed pipe.

use super::{QuoteGenerator, QuoteSource, QuoteStream};
use crate::codec::encode_record;
use crate::core::SourceError;
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::io::{self, Read};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Encoded records buffered between producer thread and reader
const CHANNEL_DEPTH: usize = 64;

pub struct SyntheticSource {
    generator: Mutex<Option<QuoteGenerator>>,
    interval: Duration,
    stop_tx: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<u64>>>,
}

impl SyntheticSource {
    pub fn new(generator: QuoteGenerator, interval: Duration) -> Self {
        Self {
            generator: Mutex::new(Some(generator)),
            interval,
            stop_tx: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    fn produce(
        mut generator: QuoteGenerator,
        interval: Duration,
        data_tx: Sender<Vec<u8>>,
        stop_rx: Receiver<()>,
    ) -> u64 {
        let mut emitted = 0u64;

        loop {
            let record = encode_record(&generator.next_quote());

            crossbeam::select! {
                send(data_tx, record) -> sent => {
                    if sent.is_err() {
                        debug!("Quote reader dropped, producer exiting");
                        break;
                    }
                    emitted += 1;
                }
                recv(stop_rx) -> _ => break,
            }

            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                // Stop requested or stop handle dropped
                _ => break,
            }
        }

        info!(emitted, "Synthetic quote producer stopped");
        emitted
    }
}

impl QuoteSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn start(&self) -> Result<QuoteStream, SourceError> {
        let generator = self
            .generator
            .lock()
            .take()
            .ok_or(SourceError::AlreadyStarted)?;

        let (data_tx, data_rx) = bounded(CHANNEL_DEPTH);
        let (stop_tx, stop_rx) = bounded(1);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("quote-producer".to_string())
            .spawn(move || Self::produce(generator, interval, data_tx, stop_rx))?;

        *self.stop_tx.lock() = Some(stop_tx);
        *self.handle.lock() = Some(handle);

        info!(interval_ms = interval.as_millis() as u64, "Synthetic quote producer started");
        Ok(Box::new(ChannelReader::new(data_rx)))
    }

    fn stop(&self) {
        // Dropping the sender disconnects the stop channel and wakes the producer
        if self.stop_tx.lock().take().is_some() {
            debug!("Synthetic quote producer stop requested");
        }
    }

    fn wait(&self) -> Result<(), SourceError> {
        let Some(handle) = self.handle.lock().take() else {
            return Ok(());
        };
        handle
            .join()
            .map(|_| ())
            .map_err(|_| SourceError::ProducerPanicked)
    }
}

/// `Read` adapter over a channel of byte chunks
pub struct ChannelReader {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    pos: usize,
}

impl ChannelReader {
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        while self.pos >= self.pending.len() {
            match self.rx.recv() {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.pos = 0;
                }
                // All senders gone: end of stream
                Err(_) => return Ok(0),
            }
        }

        let n = out.len().min(self.pending.len() - self.pos);
        out[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
