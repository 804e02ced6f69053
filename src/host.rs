//! Host-side capabilities the timeline drives.
//!
//! The embedding environment owns the event loop: it fires timers, completes network requests and
//! forwards clicks by handing [`HostEvent`]s to [`Timeline::dispatch`](crate::Timeline::dispatch).
//! Nothing here blocks or spawns threads.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use crate::foundation::core::{NodeId, RequestId, TimerId};
use crate::foundation::error::{TimelineError, TimelineResult};

/// Recurring timer contract.
pub trait Timer {
    /// Start a timer that fires every `interval` until stopped.
    fn start(&mut self, interval: Duration) -> TimelineResult<TimerId>;
    /// Stop a timer. Stopping an unknown or already stopped timer is a no-op.
    fn stop(&mut self, id: TimerId);
}

/// Network contract: a single asynchronous GET whose body comes back as [`HostEvent::Loaded`].
pub trait Transport {
    fn get(&mut self, url: &str) -> TimelineResult<RequestId>;
}

/// Something the host event loop delivers to a timeline.
#[derive(Debug)]
pub enum HostEvent {
    /// A timer fired.
    Tick(TimerId),
    /// The user clicked an element.
    Click(NodeId),
    /// A GET completed, successfully or not.
    Loaded {
        request: RequestId,
        body: TimelineResult<String>,
    },
}

/// Timer driven by hand. Tracks which timers are running so tests and headless hosts can fire them.
#[derive(Debug, Default)]
pub struct ManualTimer {
    next: u64,
    running: BTreeMap<TimerId, Duration>,
    started: u64,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, id: TimerId) -> bool {
        self.running.contains_key(&id)
    }

    /// Every running timer, oldest first.
    pub fn running(&self) -> impl Iterator<Item = (TimerId, Duration)> + '_ {
        self.running.iter().map(|(&id, &d)| (id, d))
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Total number of timers ever started.
    pub fn started(&self) -> u64 {
        self.started
    }
}

impl Timer for ManualTimer {
    fn start(&mut self, interval: Duration) -> TimelineResult<TimerId> {
        if interval.is_zero() {
            return Err(TimelineError::validation("timer interval must be > 0"));
        }
        let id = TimerId(self.next);
        self.next += 1;
        self.started += 1;
        self.running.insert(id, interval);
        Ok(id)
    }

    fn stop(&mut self, id: TimerId) {
        self.running.remove(&id);
    }
}

/// Transport that records requests for the host to answer later.
#[derive(Debug, Default)]
pub struct QueuedTransport {
    next: u64,
    pending: VecDeque<(RequestId, String)>,
    issued: Vec<(RequestId, String)>,
}

impl QueuedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request issued so far, in order.
    pub fn issued(&self) -> &[(RequestId, String)] {
        &self.issued
    }

    /// Take the oldest request that has not been answered yet.
    pub fn next_pending(&mut self) -> Option<(RequestId, String)> {
        self.pending.pop_front()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Transport for QueuedTransport {
    fn get(&mut self, url: &str) -> TimelineResult<RequestId> {
        if url.is_empty() {
            return Err(TimelineError::load("request url is empty"));
        }
        let id = RequestId(self.next);
        self.next += 1;
        self.pending.push_back((id, url.to_owned()));
        self.issued.push((id, url.to_owned()));
        Ok(id)
    }
}
