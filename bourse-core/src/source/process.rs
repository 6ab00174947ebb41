//! Out-of-process quote producer
//!
//! Spawns a command whose stdout is the quote boundary. Killing the child
//! closes the write end of the pipe, so the ingest loop sees a zero-byte read.

use super::{QuoteSource, QuoteStream};
use crate::core::SourceError;
use parking_lot::Mutex;
use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

pub struct ProcessSource {
    program: OsString,
    args: Vec<OsString>,
    child: Mutex<Option<Child>>,
}

impl ProcessSource {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            child: Mutex::new(None),
        }
    }

    fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl QuoteSource for ProcessSource {
    fn name(&self) -> &'static str {
        "process"
    }

    fn start(&self) -> Result<QuoteStream, SourceError> {
        let mut slot = self.child.lock();
        if slot.is_some() {
            return Err(SourceError::AlreadyStarted);
        }

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        // Own process group: a terminal Ctrl-C reaches the venue only, and the
        // venue ends the child through `stop`
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .map_err(|source| SourceError::Spawn {
                command: self.command_line(),
                source,
            })?;

        let Some(stdout) = child.stdout.take() else {
            // Do not leave an orphan behind
            let _ = child.kill();
            let _ = child.wait();
            return Err(SourceError::MissingStdout);
        };

        info!(pid = child.id(), command = %self.command_line(), "Quote producer process started");
        *slot = Some(child);
        Ok(Box::new(stdout))
    }

    fn stop(&self) {
        let mut slot = self.child.lock();
        let Some(child) = slot.as_mut() else {
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => debug!(%status, "Quote producer already exited"),
            _ => {
                if let Err(e) = child.kill() {
                    // Raced with a natural exit
                    debug!("Failed to kill quote producer: {}", e);
                } else {
                    info!(pid = child.id(), "Quote producer terminated");
                }
            }
        }
    }

    fn wait(&self) -> Result<(), SourceError> {
        let Some(mut child) = self.child.lock().take() else {
            return Ok(());
        };

        let status = child.wait()?;
        if status.success() {
            info!(%status, "Quote producer reaped");
        } else {
            // Killed by stop() or crashed; either way the stream is closed
            warn!(%status, "Quote producer exited with non-zero status");
        }
        Ok(())
    }
}
