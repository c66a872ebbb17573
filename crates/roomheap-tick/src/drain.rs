//! Keep-alive drain loops with cooperative shutdown.
//!
//! A drain loop owns the receiving end of a bounded channel. Each frame
//! it takes at most one item off the channel without waiting, throws it
//! away, and goes back to sleep. It stops when the shared shutdown flag
//! flips to `true`, or when every sender is gone and the channel is empty.

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use crate::{TickConfig, TickScheduler};

/// What a drain loop did before it stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub name: String,
    /// Frames that fired.
    pub frames: u64,
    /// Items taken off the channel.
    pub drained: u64,
}

/// One drain loop, not yet running.
pub struct DrainLoop<T> {
    name: String,
    receiver: mpsc::Receiver<T>,
    scheduler: TickScheduler,
}

impl<T: Send + 'static> DrainLoop<T> {
    pub fn new(name: impl Into<String>, receiver: mpsc::Receiver<T>, scheduler: TickScheduler) -> Self {
        Self {
            name: name.into(),
            receiver,
            scheduler,
        }
    }

    /// Runs until `shutdown` reads `true` (or its sender is dropped), or
    /// the channel is closed and empty.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> DrainReport {
        info!(loop_name = %self.name, "drain loop started");
        let mut report = DrainReport {
            name: self.name.clone(),
            frames: 0,
            drained: 0,
        };

        loop {
            match self.receiver.try_recv() {
                Ok(_) => report.drained += 1,
                Err(mpsc::error::TryRecvError::Empty) => {}
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    debug!(loop_name = %self.name, "all senders dropped");
                    break;
                }
            }

            if *shutdown.borrow_and_update() {
                debug!(loop_name = %self.name, "shutdown signal received");
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!(loop_name = %self.name, "shutdown sender dropped");
                        break;
                    }
                    if *shutdown.borrow_and_update() {
                        debug!(loop_name = %self.name, "shutdown signal received");
                        break;
                    }
                }
                _ = self.scheduler.wait_for_tick() => {
                    report.frames += 1;
                }
            }
        }

        info!(
            loop_name = %self.name,
            frames = report.frames,
            drained = report.drained,
            "drain loop ended"
        );
        report
    }
}

/// A set of running drain loops sharing one shutdown flag.
pub struct DrainPool<T> {
    senders: Vec<(String, mpsc::Sender<T>)>,
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<DrainReport>>,
}

impl<T: Send + 'static> DrainPool<T> {
    /// Sender for the loop called `name`.
    pub fn sender(&self, name: &str) -> Option<mpsc::Sender<T>> {
        self.senders
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, tx)| tx.clone())
    }

    /// Names of the loops, in spawn order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.senders.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Signals every loop to stop and waits for all of them.
    ///
    /// Reports come back in spawn order.
    pub async fn shutdown(self) -> Result<Vec<DrainReport>, JoinError> {
        self.shutdown.send_replace(true);
        drop(self.senders);

        let mut reports = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            reports.push(handle.await?);
        }
        Ok(reports)
    }
}

/// Spawns one drain loop per name, each with a channel of `capacity`
/// items, running at `fps` frames per second.
///
/// Must be called from inside a Tokio runtime.
pub fn spawn_drain_loops<T: Send + 'static>(names: &[&str], capacity: usize, fps: u32) -> DrainPool<T> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut senders = Vec::with_capacity(names.len());
    let mut handles = Vec::with_capacity(names.len());

    for name in names {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let scheduler = TickScheduler::new(TickConfig::with_rate(fps));
        let drain = DrainLoop::new(*name, rx, scheduler);
        handles.push(tokio::spawn(drain.run(shutdown_rx.clone())));
        senders.push((name.to_string(), tx));
    }

    DrainPool {
        senders,
        shutdown: shutdown_tx,
        handles,
    }
}
