//! Snapshot fan-out to view subscribers

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use stint_domain::constants::SNAPSHOT_CHANNEL_CAPACITY;
use stint_domain::DisplaySnapshot;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Position of a state read among all reads taken for publication.
///
/// Taken before the reads start, so a ticket that is larger saw state at
/// least as new as any smaller one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReadTicket(u64);

struct Published {
    ticket: ReadTicket,
    snapshot: Option<Arc<DisplaySnapshot>>,
}

/// Publishes display snapshots and remembers the most recent one.
///
/// Refreshes run concurrently and may finish out of order. A snapshot built
/// from an older read than the one already published is dropped, so the
/// view never steps backwards. Accepted snapshots get the next sequence
/// number and reach subscribers in sequence order.
pub struct SnapshotPublisher {
    sender: broadcast::Sender<Arc<DisplaySnapshot>>,
    latest: Mutex<Published>,
    reads: AtomicU64,
    sequence: AtomicU64,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self::with_capacity(SNAPSHOT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            latest: Mutex::new(Published { ticket: ReadTicket(0), snapshot: None }),
            reads: AtomicU64::new(0),
            sequence: AtomicU64::new(0),
        }
    }

    /// Reserve a ticket for a read that is about to start.
    pub fn begin_read(&self) -> ReadTicket {
        ReadTicket(self.reads.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Stamp and deliver a snapshot built from a fresh read.
    pub fn publish(&self, snapshot: DisplaySnapshot) -> Arc<DisplaySnapshot> {
        let ticket = self.begin_read();
        self.publish_read(ticket, snapshot)
    }

    /// Stamp and deliver a snapshot built from the read behind `ticket`.
    ///
    /// Returns the published snapshot, or the newer one already published
    /// when this read has been superseded.
    pub fn publish_read(
        &self,
        ticket: ReadTicket,
        snapshot: DisplaySnapshot,
    ) -> Arc<DisplaySnapshot> {
        let mut latest = self.latest.lock();
        if let Some(current) = latest.snapshot.as_ref() {
            if ticket < latest.ticket {
                debug!(
                    read = ticket.0,
                    published_read = latest.ticket.0,
                    "snapshot superseded by a newer read"
                );
                return Arc::clone(current);
            }
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(snapshot.with_sequence(sequence));
        latest.ticket = ticket;
        latest.snapshot = Some(Arc::clone(&snapshot));

        // Sent under the lock so subscribers see sequences in order. No
        // receivers is fine: the view may simply not be listening.
        if self.sender.send(Arc::clone(&snapshot)).is_err() {
            debug!(sequence, "snapshot published with no subscribers");
        }
        snapshot
    }

    pub fn subscribe(&self) -> SnapshotSubscription {
        SnapshotSubscription { receiver: self.sender.subscribe() }
    }

    pub fn latest(&self) -> Option<Arc<DisplaySnapshot>> {
        self.latest.lock().snapshot.clone()
    }

    /// Number of snapshots published so far.
    pub fn published(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end handed to the view.
pub struct SnapshotSubscription {
    receiver: broadcast::Receiver<Arc<DisplaySnapshot>>,
}

impl SnapshotSubscription {
    /// Wait for the next snapshot.
    ///
    /// A slow subscriber skips the snapshots it missed and continues with
    /// the oldest one still buffered. Returns `None` once the publisher is
    /// gone.
    pub async fn recv(&mut self) -> Option<Arc<DisplaySnapshot>> {
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "snapshot subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<Arc<DisplaySnapshot>> {
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "snapshot subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}
