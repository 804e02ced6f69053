use std::sync::Arc;

use crate::foundation::core::{NodeId, RequestId, TickRate, TimerId};
use crate::foundation::error::TimelineResult;
use crate::frames::FrameDurations;
use crate::host::{HostEvent, Timer, Transport};
use crate::loader::{DataLoader, LoadOutcome, LoadPoll, LoadState};
use crate::model::TimelineDataset;
use crate::playback::{PlaybackCursor, PlaybackState, Step};
use crate::render::Renderer;
use crate::surface::Surface;

/// Options for a [`Timeline`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimelineOpts {
    /// Where the dataset is fetched from.
    pub url: String,
    /// Timer cadence in milliseconds.
    pub tick_ms: u32,
    /// Wall time for one simulated year, in milliseconds.
    pub ms_per_year: u32,
}

impl Default for TimelineOpts {
    fn default() -> Self {
        Self {
            url: "/timeline.json".to_owned(),
            tick_ms: TickRate::DEFAULT_TICK_MS,
            ms_per_year: TickRate::DEFAULT_MS_PER_YEAR,
        }
    }
}

impl TimelineOpts {
    pub fn rate(&self) -> TimelineResult<TickRate> {
        TickRate::new(self.tick_ms, self.ms_per_year)
    }
}

/// Biographical timeline widget.
///
/// The widget is single-threaded and host-driven: every state change happens inside a method
/// call on `&mut self`, typically from [`Timeline::dispatch`]. Rendering, timers and the network
/// are reached only through the injected capabilities.
pub struct Timeline<S, T, N> {
    rate: TickRate,
    surface: S,
    timer: T,
    transport: N,
    loader: DataLoader,
    renderer: Renderer,

    state: PlaybackState,
    durations: Option<FrameDurations>,
    cursor: Option<PlaybackCursor>,
    timer_id: Option<TimerId>,
}

impl<S, T, N> Timeline<S, T, N>
where
    S: Surface,
    T: Timer,
    N: Transport,
{
    pub fn new(opts: TimelineOpts, surface: S, timer: T, transport: N) -> TimelineResult<Self> {
        let rate = opts.rate()?;
        Ok(Self {
            rate,
            surface,
            timer,
            transport,
            loader: DataLoader::new(opts.url),
            renderer: Renderer::new(),
            state: PlaybackState::Reset,
            durations: None,
            cursor: None,
            timer_id: None,
        })
    }

    /// Seed the dataset cache so no request is needed.
    pub fn with_dataset(mut self, dataset: TimelineDataset) -> Self {
        self.loader.prime(dataset);
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn control_label(&self) -> &'static str {
        self.state.control_label()
    }

    pub fn cursor(&self) -> Option<PlaybackCursor> {
        self.cursor
    }

    pub fn durations(&self) -> Option<&FrameDurations> {
        self.durations.as_ref()
    }

    /// Id of the running tick timer, if any.
    pub fn timer_id(&self) -> Option<TimerId> {
        self.timer_id
    }

    pub fn dataset(&self) -> Option<&Arc<TimelineDataset>> {
        self.loader.cached()
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn transport(&self) -> &N {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut N {
        &mut self.transport
    }

    /// Mount the widget under `container` (the document root when `None`) and start loading.
    ///
    /// Mounting happens once per instance; later calls do nothing.
    #[tracing::instrument(skip(self))]
    pub fn render(&mut self, container: Option<NodeId>) -> TimelineResult<()> {
        let container = container.unwrap_or_else(|| self.surface.document_root());
        if !self.renderer.mount(&mut self.surface, container)? {
            tracing::debug!("already mounted");
            return Ok(());
        }
        self.reset(false);
        self.request_dataset();
        Ok(())
    }

    /// Start or resume playback.
    ///
    /// Without a dataset only the state flips; playback begins when the data arrives.
    #[tracing::instrument(skip(self), fields(state = ?self.state))]
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Playing => return,
            PlaybackState::Completed => {
                tracing::debug!("playback already complete");
                return;
            }
            PlaybackState::Reset | PlaybackState::Paused => {}
        }

        self.set_state(PlaybackState::Playing);
        if self.cursor.is_some() {
            self.start_timer();
            return;
        }

        match self.loader.cached().cloned() {
            Some(ds) => self.begin_cycle(&ds),
            None => {
                tracing::debug!("no dataset yet; playback starts once it loads");
                self.request_dataset();
            }
        }
    }

    /// Stop the timer, keeping the cursor.
    #[tracing::instrument(skip(self), fields(state = ?self.state))]
    pub fn pause(&mut self) {
        self.stop_timer();
        if self.state == PlaybackState::Playing {
            self.set_state(PlaybackState::Paused);
        } else {
            self.set_state(self.state);
        }
    }

    /// Drop all progress and show the title frame. Playback restarts unless `autoplay` is false.
    #[tracing::instrument(skip(self), fields(state = ?self.state))]
    pub fn reset(&mut self, autoplay: bool) {
        self.stop_timer();
        self.cursor = None;
        self.durations = None;
        self.paint(|r, s| r.restage(s));
        self.set_state(PlaybackState::Reset);
        if autoplay {
            self.play();
        }
    }

    /// Handle one firing of the tick timer. Ticks from a stopped timer are ignored.
    pub fn tick(&mut self, id: TimerId) {
        if self.timer_id != Some(id) || self.state != PlaybackState::Playing {
            tracing::trace!(timer = id.0, "stale tick ignored");
            return;
        }
        let (Some(cursor), Some(durations)) = (self.cursor.as_mut(), self.durations.as_ref())
        else {
            return;
        };

        match cursor.tick(durations) {
            Step::Hold => {}
            Step::Advanced { from, to } => {
                tracing::debug!(from, to, "frame advanced");
                self.paint(|r, s| r.activate(s, to + 1));
            }
            Step::Completed { from } => {
                tracing::debug!(from, "playback complete");
                self.stop_timer();
                self.set_state(PlaybackState::Completed);
            }
        }
    }

    /// Handle a click. Only the control reacts.
    pub fn click(&mut self, node: NodeId) {
        let Some(m) = self.renderer.mounted() else {
            return;
        };
        if node != m.control {
            return;
        }
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Reset | PlaybackState::Paused => self.play(),
            PlaybackState::Completed => self.reset(true),
        }
    }

    /// Accept the body of a dataset request.
    #[tracing::instrument(skip(self, body))]
    pub fn loaded(&mut self, request: RequestId, body: TimelineResult<String>) {
        match self.loader.complete(request, body) {
            LoadOutcome::Updated(ds) => self.apply_dataset(ds),
            LoadOutcome::Unchanged(_) => tracing::debug!("dataset unchanged"),
            LoadOutcome::Failed(reason) => self.load_failed(reason),
            LoadOutcome::Stale(reason) => {
                tracing::debug!(error = %reason, "stale load failure ignored");
            }
        }
    }

    /// Route a host event to the matching handler.
    pub fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::Tick(id) => self.tick(id),
            HostEvent::Click(node) => self.click(node),
            HostEvent::Loaded { request, body } => self.loaded(request, body),
        }
    }

    fn request_dataset(&mut self) {
        match self.loader.load(&mut self.transport) {
            LoadPoll::Ready(ds) => self.apply_dataset(ds),
            LoadPoll::Pending => {
                if let LoadState::Failed(reason) = self.loader.state() {
                    let reason = reason.clone();
                    self.load_failed(reason);
                }
            }
        }
    }

    fn apply_dataset(&mut self, ds: Arc<TimelineDataset>) {
        self.paint(|r, s| r.build_frames(s, &ds));

        if self.cursor.is_some() {
            // The running cycle was derived from other data.
            let autoplay = self.state == PlaybackState::Playing;
            self.reset(autoplay);
        } else if self.state == PlaybackState::Playing {
            self.begin_cycle(&ds);
        }
    }

    fn load_failed(&mut self, reason: String) {
        if self.loader.cached().is_some() {
            return;
        }
        self.paint(|r, s| r.show_error(s, &reason));
        if self.cursor.is_none() && self.state != PlaybackState::Reset {
            self.set_state(PlaybackState::Reset);
        }
    }

    fn begin_cycle(&mut self, ds: &TimelineDataset) {
        let durations = FrameDurations::build(ds, self.rate);
        let cursor = PlaybackCursor::start(&durations);
        let count = durations.len();
        let complete = cursor.is_complete(&durations);
        tracing::debug!(frames = count, ticks = durations.total_ticks(), "playback cycle built");

        self.durations = Some(durations);
        self.cursor = Some(cursor);

        if complete {
            if count > 0 {
                self.paint(|r, s| r.activate(s, count));
            }
            self.set_state(PlaybackState::Completed);
            return;
        }

        self.paint(|r, s| r.activate(s, cursor.frame + 1));
        self.start_timer();
    }

    fn start_timer(&mut self) {
        self.stop_timer();
        match self.timer.start(self.rate.tick_interval()) {
            Ok(id) => self.timer_id = Some(id),
            Err(err) => {
                tracing::warn!(error = %err, "tick timer could not be started");
                self.set_state(PlaybackState::Paused);
            }
        }
    }

    fn stop_timer(&mut self) {
        if let Some(id) = self.timer_id.take() {
            self.timer.stop(id);
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "playback state");
        }
        self.state = state;
        let label = state.control_label();
        self.paint(|r, s| r.set_control_label(s, label));
    }

    // Visual updates never fail playback; a broken surface only loses the update.
    fn paint(&mut self, f: impl FnOnce(&mut Renderer, &mut dyn Surface) -> TimelineResult<()>) {
        if self.renderer.mounted().is_none() {
            return;
        }
        if let Err(err) = f(&mut self.renderer, &mut self.surface) {
            tracing::warn!(error = %err, "render update failed");
        }
    }
}
