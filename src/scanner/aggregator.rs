//! Fan-in of worker classifications into result lists.
//!
//! Workers hold an [`Emitter`]; each classification is sent on the channel
//! for its kind and drained by a dedicated collector thread. Collectors stop
//! once every emitter is dropped and their channel is empty, which makes
//! [`ResultAggregator::finish`] the barrier after which results are complete.

use super::ScanError;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::thread::{self, JoinHandle};
use tracing::error;

/// Sending half handed to each worker.
#[derive(Debug, Clone)]
pub struct Emitter {
    new: Sender<String>,
    modified: Sender<String>,
}

impl Emitter {
    /// Report a file that had no valid entry in the index
    pub fn emit_new(&self, path: String) {
        if let Err(e) = self.new.send(path) {
            error!(path = %e.0, "new-file collector is gone");
        }
    }

    /// Report a file whose snapshot differs from the recorded one
    pub fn emit_modified(&self, path: String) {
        if let Err(e) = self.modified.send(path) {
            error!(path = %e.0, "modified-file collector is gone");
        }
    }
}

/// Collector threads draining the emission channels.
#[derive(Debug)]
pub struct ResultAggregator {
    new: JoinHandle<Vec<String>>,
    modified: JoinHandle<Vec<String>>,
}

/// Paths drained from both channels, in arrival order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Collected {
    pub new: Vec<String>,
    pub modified: Vec<String>,
}

impl ResultAggregator {
    /// Start both collectors and return the emitter feeding them.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Spawn`] if a collector thread cannot be started.
    pub fn start() -> Result<(Emitter, Self), ScanError> {
        let (new_tx, new_rx) = unbounded();
        let (modified_tx, modified_rx) = unbounded();

        let new = spawn_collector("roster-collect-new", new_rx)?;
        let modified = spawn_collector("roster-collect-modified", modified_rx)?;

        Ok((
            Emitter {
                new: new_tx,
                modified: modified_tx,
            },
            Self { new, modified },
        ))
    }

    /// Wait for both collectors to drain and return what they gathered.
    ///
    /// Every [`Emitter`] clone must be dropped first, otherwise this blocks
    /// forever.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::CollectorPanicked`] if a collector panicked.
    pub fn finish(self) -> Result<Collected, ScanError> {
        let new = self.new.join().map_err(|_| ScanError::CollectorPanicked)?;
        let modified = self
            .modified
            .join()
            .map_err(|_| ScanError::CollectorPanicked)?;
        Ok(Collected { new, modified })
    }
}

fn spawn_collector(
    name: &str,
    receiver: Receiver<String>,
) -> Result<JoinHandle<Vec<String>>, ScanError> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || receiver.iter().collect())
        .map_err(ScanError::Spawn)
}
