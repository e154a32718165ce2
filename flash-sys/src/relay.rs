// SPDX-License-Identifier: GPL-3.0-only

//! Running the flash script and relaying its output
//!
//! [`run_flash`] blocks until the script exits, so callers run it on a
//! blocking thread and forward the [`RelayEvent`]s it emits to the UI.

use crate::launcher::{LaunchOptions, flash_expression, render_command, stop_udisks};
use duct::ReaderHandle;
use flash_types::{FlashInvocation, FlashOutcome, LineOutcome, RelayState};
use std::fmt;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Shared handle to a running flash script.
#[derive(Clone)]
pub struct FlashHandle {
    reader: Arc<ReaderHandle>,
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl FlashHandle {
    fn new(reader: ReaderHandle) -> Self {
        Self {
            reader: Arc::new(reader),
            cancelled: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn pids(&self) -> Vec<u32> {
        self.reader.pids()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Ask the script to stop.
    ///
    /// Sends SIGTERM to the child's process group rather than SIGKILL:
    /// `sudo` relays it to the elevated supervisor, which an unprivileged
    /// kill could not reach, and the supervisor forwards it to the script's
    /// own children.
    pub fn cancel(&self) {
        if self.is_finished() || self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.signal_group(libc::SIGTERM);
    }

    fn signal_group(&self, signal: libc::c_int) {
        for pid in self.reader.pids() {
            // The child leads its own group, see `flash_expression`.
            let result = unsafe { libc::kill(-(pid as libc::pid_t), signal) };
            if result != 0 {
                warn!(
                    "Failed to signal flash process group {}: {}",
                    pid,
                    std::io::Error::last_os_error()
                );
            } else {
                info!("Sent signal {} to flash process group {}", signal, pid);
            }
        }
    }
}

impl fmt::Debug for FlashHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashHandle")
            .field("pids", &self.pids())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum RelayEvent {
    Started(FlashHandle),
    Progress(u8),
    /// A line printed by the script.
    Output(String),
    /// A status line from the utility itself.
    Notice(String),
    Error(String),
    /// Always the last event of a run.
    Finished(FlashOutcome),
}

/// Splits a byte stream on `\n` and `\r`, so carriage-return progress meters
/// produce one line per redraw.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
    after_cr: bool,
}

impl LineSplitter {
    fn feed(&mut self, bytes: &[u8], mut emit: impl FnMut(String)) {
        for &byte in bytes {
            match byte {
                b'\n' | b'\r' => {
                    // "\r\n" ends one line, not two.
                    let skip = byte == b'\n' && self.after_cr && self.pending.is_empty();
                    if !skip {
                        emit(String::from_utf8_lossy(&self.pending).into_owned());
                    }
                    self.pending.clear();
                    self.after_cr = byte == b'\r';
                }
                _ => {
                    self.pending.push(byte);
                    self.after_cr = false;
                }
            }
        }
    }

    fn finish(&mut self, emit: impl FnOnce(String)) {
        if !self.pending.is_empty() {
            emit(String::from_utf8_lossy(&self.pending).into_owned());
            self.pending.clear();
        }
    }
}

/// How often the read loop checks for a cancel while the script is quiet.
const CANCEL_POLL: Duration = Duration::from_millis(100);
/// How long a cancelled script may keep its output open.
const CANCEL_GRACE: Duration = Duration::from_secs(5);

/// Read the script's output on a separate thread, so the relay can stop
/// waiting after a cancel even if a straggler keeps the pipe open.
fn spawn_pump(reader: Arc<ReaderHandle>) -> mpsc::Receiver<std::io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        let mut source: &ReaderHandle = &reader;
        loop {
            let chunk = match source.read(&mut buf) {
                Ok(0) => return,
                Ok(n) => Ok(buf[..n].to_vec()),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
            let failed = chunk.is_err();
            if tx.send(chunk).is_err() || failed {
                return;
            }
        }
    });
    rx
}

fn relay_line(state: &mut RelayState, line: String, emit: &mut impl FnMut(RelayEvent)) {
    match state.classify(&line) {
        LineOutcome::Progress(percent) => emit(RelayEvent::Progress(percent)),
        LineOutcome::Log => emit(RelayEvent::Output(line)),
        LineOutcome::MalformedProgress(e) => {
            warn!("{}", e);
            emit(RelayEvent::Error(e.to_string()));
        }
    }
}

fn finish(outcome: FlashOutcome, emit: &mut impl FnMut(RelayEvent)) -> FlashOutcome {
    info!("{}", outcome);
    let line = outcome.to_string();
    if outcome.is_success() {
        emit(RelayEvent::Notice(line));
    } else {
        emit(RelayEvent::Error(line));
    }
    emit(RelayEvent::Finished(outcome));
    outcome
}

/// Run the flash script to completion, emitting events as output arrives.
///
/// Every run ends with exactly one [`RelayEvent::Finished`], including runs
/// that fail to start.
pub fn run_flash(
    invocation: &FlashInvocation,
    options: &LaunchOptions,
    mut emit: impl FnMut(RelayEvent),
) -> FlashOutcome {
    info!("Flashing {}", invocation.describe());

    if options.stop_udisks {
        match stop_udisks(&invocation.credential, options.elevate) {
            Ok(()) => emit(RelayEvent::Notice(
                "Stopped udisks2 to prevent auto-mounting".to_string(),
            )),
            Err(e) => {
                warn!("Could not stop udisks2: {}", e);
                emit(RelayEvent::Error(format!("Could not stop udisks2: {e}")));
            }
        }
    }

    let command = render_command(invocation, options);
    debug!("Running {}", command);

    let reader = match flash_expression(invocation, options).and_then(|expression| {
        expression.reader().map_err(|e| crate::SysError::SpawnFailed {
            command: command.clone(),
            reason: e.to_string(),
        })
    }) {
        Ok(reader) => reader,
        Err(e) => {
            warn!("{}", e);
            emit(RelayEvent::Error(e.to_string()));
            return finish(FlashOutcome::Failed { code: None }, &mut emit);
        }
    };

    let handle = FlashHandle::new(reader);
    emit(RelayEvent::Notice(format!("$ {command}")));
    emit(RelayEvent::Started(handle.clone()));

    let mut state = RelayState::new();
    let mut splitter = LineSplitter::default();
    let mut lines = Vec::new();
    let chunks = spawn_pump(Arc::clone(&handle.reader));
    let mut cancel_seen: Option<Instant> = None;

    loop {
        match chunks.recv_timeout(CANCEL_POLL) {
            Ok(Ok(chunk)) => {
                splitter.feed(&chunk, |line| lines.push(line));
                for line in lines.drain(..) {
                    relay_line(&mut state, line, &mut emit);
                }
            }
            Ok(Err(e)) => {
                warn!("Failed to read flash output: {}", e);
                emit(RelayEvent::Error(format!("Failed to read script output: {e}")));
                break;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if !handle.is_cancelled() {
                    continue;
                }
                let since = *cancel_seen.get_or_insert_with(Instant::now);
                if since.elapsed() >= CANCEL_GRACE {
                    // Something still holds the pipe open. Stop waiting for it.
                    warn!("Flash output still open after cancel, no longer reading it");
                    handle.signal_group(libc::SIGKILL);
                    break;
                }
            }
        }
    }
    splitter.finish(|line| lines.push(line));
    for line in lines.drain(..) {
        relay_line(&mut state, line, &mut emit);
    }

    let outcome = match handle.reader.try_wait() {
        _ if handle.is_cancelled() => FlashOutcome::Cancelled,
        Ok(Some(output)) if output.status.success() => FlashOutcome::Succeeded,
        Ok(Some(output)) => FlashOutcome::Failed {
            code: output.status.code(),
        },
        Ok(None) => FlashOutcome::Failed { code: None },
        Err(e) => {
            warn!("Failed to collect flash exit status: {}", e);
            FlashOutcome::Failed { code: None }
        }
    };
    handle.finished.store(true, Ordering::SeqCst);

    finish(outcome, &mut emit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(chunks: &[&[u8]]) -> Vec<String> {
        let mut splitter = LineSplitter::default();
        let mut lines = Vec::new();
        for chunk in chunks {
            splitter.feed(chunk, |l| lines.push(l));
        }
        splitter.finish(|l| lines.push(l));
        lines
    }

    #[test]
    fn splits_on_newline_and_carriage_return() {
        assert_eq!(
            split(&[b"a 1%\ra 2%\rdone\n", b"next"]),
            vec!["a 1%", "a 2%", "done", "next"]
        );
    }

    #[test]
    fn crlf_is_one_line_break() {
        assert_eq!(split(&[b"one\r", b"\ntwo\r\n"]), vec!["one", "two"]);
    }

    #[test]
    fn blank_lines_are_kept() {
        assert_eq!(split(&[b"a\n\nb\n"]), vec!["a", "", "b"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let lines = split(&[b"bad \xff byte\n"]);
        assert_eq!(lines, vec!["bad \u{fffd} byte"]);
    }
}
