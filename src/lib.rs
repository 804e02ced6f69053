//! Storyline renders a biographical timeline widget: a title frame followed by one frame per life
//! event, played back at a pace proportional to the years between events.
//!
//! The widget talks to its host only through capabilities:
//!
//! - a [`Surface`] to build and update elements,
//! - a [`Timer`] that fires the playback tick,
//! - a [`Transport`] that fetches the dataset.
//!
//! The host feeds timer firings, clicks and fetch results back through [`Timeline::dispatch`].
#![forbid(unsafe_code)]

pub mod escape;
pub mod foundation;
pub mod frames;
pub mod host;
pub mod loader;
pub mod model;
pub mod playback;
pub mod render;
pub mod surface;
pub mod timeline;

pub use escape::escape_html;
pub use foundation::core::{NodeId, RequestId, TickRate, TimerId};
pub use foundation::error::{TimelineError, TimelineResult};
pub use frames::FrameDurations;
pub use host::{HostEvent, ManualTimer, QueuedTransport, Timer, Transport};
pub use loader::{DataLoader, LoadOutcome, LoadPoll, LoadState};
pub use model::{Event, TimelineDataset};
pub use playback::{PlaybackCursor, PlaybackState, Step};
pub use render::{FrameClass, Mounted, Renderer};
pub use surface::{MemorySurface, Surface};
pub use timeline::{Timeline, TimelineOpts};
