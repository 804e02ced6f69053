use std::sync::Arc;

use crate::foundation::core::RequestId;
use crate::foundation::error::TimelineResult;
use crate::host::Transport;
use crate::model::TimelineDataset;

/// Where the loader stands with respect to its dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// No request issued yet.
    Idle,
    /// A GET is in flight; further `load` calls wait on it.
    InFlight(RequestId),
    /// A dataset is cached.
    Loaded,
    /// The last attempt failed. The next `load` retries.
    Failed(String),
}

/// Result of asking for the dataset.
#[derive(Clone, Debug)]
pub enum LoadPoll {
    Ready(Arc<TimelineDataset>),
    Pending,
}

/// Outcome of a completed request.
#[derive(Clone, Debug)]
pub enum LoadOutcome {
    /// The body decoded and replaced the cache with a different dataset.
    Updated(Arc<TimelineDataset>),
    /// The body decoded to the dataset already cached.
    Unchanged(Arc<TimelineDataset>),
    /// The request failed or its body did not decode.
    Failed(String),
    /// A request other than the one in flight failed. The outstanding request still decides.
    Stale(String),
}

/// Fetches the dataset once and caches it for the lifetime of the timeline.
#[derive(Debug)]
pub struct DataLoader {
    url: String,
    cached: Option<Arc<TimelineDataset>>,
    state: LoadState,
    requests: u64,
}

impl DataLoader {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cached: None,
            state: LoadState::Idle,
            requests: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn cached(&self) -> Option<&Arc<TimelineDataset>> {
        self.cached.as_ref()
    }

    /// Number of GETs issued so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Seed the cache without a network round trip.
    pub fn prime(&mut self, dataset: TimelineDataset) -> Arc<TimelineDataset> {
        let ds = Arc::new(dataset);
        self.cached = Some(Arc::clone(&ds));
        self.state = LoadState::Loaded;
        ds
    }

    /// Return the cached dataset, or make sure a request for it is in flight.
    ///
    /// Calls made while a request is outstanding coalesce onto it. A transport failure is
    /// recorded as [`LoadState::Failed`] and reported as `Pending`.
    #[tracing::instrument(skip(self, transport), fields(url = %self.url))]
    pub fn load(&mut self, transport: &mut dyn Transport) -> LoadPoll {
        if let Some(ds) = &self.cached {
            return LoadPoll::Ready(Arc::clone(ds));
        }
        if let LoadState::InFlight(request) = self.state {
            tracing::debug!(request = request.0, "dataset request already in flight");
            return LoadPoll::Pending;
        }

        match transport.get(&self.url) {
            Ok(request) => {
                self.requests += 1;
                tracing::info!(request = request.0, "requesting dataset");
                self.state = LoadState::InFlight(request);
            }
            Err(err) => {
                tracing::warn!(error = %err, "dataset request could not be issued");
                self.state = LoadState::Failed(err.to_string());
            }
        }
        LoadPoll::Pending
    }

    /// Accept the body of a completed request.
    ///
    /// A decoded body always becomes the cached dataset, even when it answers a request other than
    /// the one in flight. Failures never disturb a dataset that is already cached, and a failure
    /// for another request while one is still in flight is reported as [`LoadOutcome::Stale`].
    #[tracing::instrument(skip(self, body))]
    pub fn complete(
        &mut self,
        request: RequestId,
        body: TimelineResult<String>,
    ) -> LoadOutcome {
        if self.state == LoadState::InFlight(request) {
            self.state = LoadState::Idle;
        }

        let decoded = body.and_then(|b| TimelineDataset::from_json(&b));
        match decoded {
            Ok(ds) => {
                if let Some(cached) = &self.cached
                    && **cached == ds
                {
                    self.state = LoadState::Loaded;
                    return LoadOutcome::Unchanged(Arc::clone(cached));
                }
                tracing::info!(events = ds.events.len(), "dataset loaded");
                LoadOutcome::Updated(self.prime(ds))
            }
            Err(err) => {
                let reason = err.to_string();
                if self.cached.is_none() && matches!(self.state, LoadState::InFlight(_)) {
                    tracing::debug!(error = %reason, "failure for a superseded request ignored");
                    return LoadOutcome::Stale(reason);
                }
                tracing::warn!(error = %reason, "dataset load failed");
                if self.cached.is_some() {
                    self.state = LoadState::Loaded;
                } else if self.state == LoadState::Idle {
                    self.state = LoadState::Failed(reason.clone());
                }
                LoadOutcome::Failed(reason)
            }
        }
    }
}
