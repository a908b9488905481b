//! Dedicated threads that feed the session's event channel.
//!
//! The stdin reader blocks on raw reads and forwards undecoded byte chunks;
//! decoding happens on the session thread so decoder state never crosses
//! threads. On unix a second thread watches signals: `SIGWINCH` becomes a
//! resize marker, fatal signals restore the terminal before the process
//! exits.

use std::io::Read;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::debug;

/// Raw happenings delivered to the session loop, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    /// A chunk of raw bytes from the terminal.
    Bytes(Vec<u8>),
    /// The window size changed.
    Winch,
    /// Stdin reached end of file or failed.
    HangUp,
}

/// Handle to the blocking stdin reader thread.
///
/// The thread parks in `read()` and cannot be interrupted, so dropping the
/// handle detaches it; it exits on EOF, on a send to a closed channel, or
/// with the process.
pub(crate) struct StdinReader {
    handle: Option<JoinHandle<()>>,
}

impl StdinReader {
    pub(crate) fn spawn(sender: Sender<ReaderEvent>) -> std::io::Result<Self> {
        let handle = thread::Builder::new()
            .name("weft-stdin".to_string())
            .spawn(move || read_loop(&sender))?;
        Ok(Self {
            handle: Some(handle),
        })
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        // Detach; see the struct docs.
        drop(self.handle.take());
    }
}

fn read_loop(sender: &Sender<ReaderEvent>) {
    let mut stdin = std::io::stdin();
    let mut buf = [0u8; 1024];
    loop {
        match stdin.read(&mut buf) {
            Ok(0) => {
                debug!("stdin closed");
                let _ = sender.send(ReaderEvent::HangUp);
                break;
            }
            Ok(n) => {
                if sender.send(ReaderEvent::Bytes(buf[..n].to_vec())).is_err() {
                    // Receiver dropped, session is gone
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                debug!(error = %e, "stdin read failed");
                let _ = sender.send(ReaderEvent::HangUp);
                break;
            }
        }
    }
}

#[cfg(unix)]
pub(crate) use unix::SignalWatcher;

#[cfg(unix)]
mod unix {
    use std::thread::{self, JoinHandle};

    use crossbeam_channel::Sender;
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGWINCH};
    use signal_hook::iterator::{Handle, Signals};
    use tracing::debug;

    use super::ReaderEvent;
    use crate::terminal::restore_now;

    /// Handle to the signal-watching thread.
    pub(crate) struct SignalWatcher {
        handle: Handle,
        thread: Option<JoinHandle<()>>,
    }

    impl SignalWatcher {
        pub(crate) fn spawn(sender: Sender<ReaderEvent>) -> std::io::Result<Self> {
            let mut signals = Signals::new([SIGWINCH, SIGTERM, SIGINT, SIGHUP])?;
            let handle = signals.handle();
            let thread = thread::Builder::new()
                .name("weft-signals".to_string())
                .spawn(move || {
                    for signal in &mut signals {
                        match signal {
                            SIGWINCH => {
                                if sender.send(ReaderEvent::Winch).is_err() {
                                    break;
                                }
                            }
                            fatal => {
                                debug!(signal = fatal, "fatal signal, restoring terminal");
                                restore_now();
                                // 128 + signal matches shell convention
                                std::process::exit(128 + fatal);
                            }
                        }
                    }
                })?;
            Ok(Self {
                handle,
                thread: Some(thread),
            })
        }
    }

    impl Drop for SignalWatcher {
        fn drop(&mut self) {
            self.handle.close();
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
    }
}
