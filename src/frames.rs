use crate::{foundation::core::TickRate, model::TimelineDataset};

/// Per-event frame lengths, in ticks.
///
/// `durations[i]` is the span from event `i` to the next event (or to the terminal age for the
/// last event), scaled by the tick rate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameDurations(Vec<u64>);

impl FrameDurations {
    /// Derive frame lengths from a dataset.
    ///
    /// Ages are expected to be non-decreasing. A span that runs backwards is clamped to a
    /// zero-length frame, which playback passes through without waiting.
    #[tracing::instrument(skip(dataset), fields(events = dataset.events.len()))]
    pub fn build(dataset: &TimelineDataset, rate: TickRate) -> Self {
        let mut out = Vec::with_capacity(dataset.events.len());
        for (i, event) in dataset.events.iter().enumerate() {
            let end = dataset.span_end(i).unwrap_or(dataset.age);
            let span = end - event.age;
            if span < 0.0 {
                tracing::warn!(
                    event = i,
                    from = event.age,
                    to = end,
                    "age runs backwards; clamping frame to zero ticks"
                );
            }
            out.push(rate.years_to_ticks(span));
        }
        Self(out)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u64> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Ticks needed to play every frame from the start. Saturates at `u64::MAX`.
    pub fn total_ticks(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, &d| acc.saturating_add(d))
    }
}

impl From<Vec<u64>> for FrameDurations {
    fn from(v: Vec<u64>) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Event;

    fn dataset(ages: &[f64], terminal: f64) -> TimelineDataset {
        TimelineDataset {
            first_name: "Chip".to_owned(),
            last_name: "Bitly".to_owned(),
            age: terminal,
            events: ages
                .iter()
                .map(|&age| Event {
                    age,
                    content: "did something".to_owned(),
                })
                .collect(),
        }
    }

    #[test]
    fn chip_durations_match_reference() {
        let d = FrameDurations::build(&dataset(&[0.0, 4.0, 12.0], 46.0), TickRate::default());
        assert_eq!(d.as_slice(), &[32, 64, 272]);
        assert_eq!(d.total_ticks(), 368);
    }

    #[test]
    fn one_duration_per_event() {
        let ds = dataset(&[1.0, 2.0, 2.0, 7.5, 30.0], 31.0);
        let d = FrameDurations::build(&ds, TickRate::default());
        assert_eq!(d.len(), ds.events.len());
        assert_eq!(d.as_slice(), &[8, 0, 44, 180, 8]);
    }

    #[test]
    fn backwards_ages_clamp_to_zero() {
        let d = FrameDurations::build(&dataset(&[10.0, 5.0], 4.0), TickRate::default());
        assert_eq!(d.as_slice(), &[0, 0]);
    }

    #[test]
    fn custom_rate_scales_spans() {
        let rate = TickRate::new(500, 1000).unwrap();
        let d = FrameDurations::build(&dataset(&[0.0, 3.0], 4.0), rate);
        assert_eq!(d.as_slice(), &[6, 2]);
    }

    #[test]
    fn huge_spans_saturate_instead_of_overflowing() {
        let d = FrameDurations::build(&dataset(&[0.0, 3e18], 6e18), TickRate::default());
        assert_eq!(d.as_slice(), &[u64::MAX, u64::MAX]);
        assert_eq!(d.total_ticks(), u64::MAX);
    }

    #[test]
    fn empty_dataset_yields_no_frames() {
        let d = FrameDurations::build(&dataset(&[], 10.0), TickRate::default());
        assert!(d.is_empty());
        assert_eq!(d.total_ticks(), 0);
    }
}
