use crate::frames::FrameDurations;

/// Playback states. The control affordance label follows the state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// No cursor; the title frame is shown.
    #[default]
    Reset,
    /// Cursor active and the tick timer running.
    Playing,
    /// Cursor retained, no timer.
    Paused,
    /// Every frame has played; the cursor sits one past the last frame.
    Completed,
}

impl PlaybackState {
    /// Label shown on the control while in this state.
    pub fn control_label(self) -> &'static str {
        match self {
            Self::Reset | Self::Paused => "Play",
            Self::Playing => "Pause",
            Self::Completed => "Reset",
        }
    }
}

/// Playback progress: the event frame on screen and the ticks it has left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackCursor {
    /// Index into the event frames. Equal to the frame count once playback completes.
    pub frame: usize,
    /// Ticks left before moving past `frame`.
    pub remaining: u64,
}

/// What a single tick did to the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Still counting down the same frame.
    Hold,
    /// Moved from one event frame to another.
    Advanced { from: usize, to: usize },
    /// Moved past the last frame.
    Completed { from: usize },
}

impl PlaybackCursor {
    /// Cursor at the first frame that lasts at least one tick.
    pub fn start(durations: &FrameDurations) -> Self {
        let mut cursor = Self {
            frame: 0,
            remaining: durations.get(0).unwrap_or(0),
        };
        cursor.skip_empty(durations);
        cursor
    }

    pub fn is_complete(&self, durations: &FrameDurations) -> bool {
        self.frame >= durations.len()
    }

    /// Count down one tick, moving to the next frame when the current one runs out.
    pub fn tick(&mut self, durations: &FrameDurations) -> Step {
        if self.is_complete(durations) {
            return Step::Hold;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Step::Hold;
        }

        let from = self.frame;
        self.frame += 1;
        self.remaining = durations.get(self.frame).unwrap_or(0);
        self.skip_empty(durations);

        if self.is_complete(durations) {
            Step::Completed { from }
        } else {
            Step::Advanced {
                from,
                to: self.frame,
            }
        }
    }

    // Zero-length frames come from equal ages; they never get a tick of their own.
    fn skip_empty(&mut self, durations: &FrameDurations) {
        while self.remaining == 0 && !self.is_complete(durations) {
            self.frame += 1;
            self.remaining = durations.get(self.frame).unwrap_or(0);
        }
    }
}
