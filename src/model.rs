use crate::foundation::error::{TimelineError, TimelineResult};

/// Biographical dataset served as `timeline.json`.
///
/// Text fields are untrusted: they are shown to the user only after HTML escaping.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDataset {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Terminal age: the span of the last event runs up to this value.
    pub age: f64,
    pub events: Vec<Event>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    pub age: f64,
    pub content: String,
}

impl TimelineDataset {
    /// Decode a dataset from a JSON body.
    pub fn from_json(body: &str) -> TimelineResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Full name shown on the title frame (raw, unescaped).
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            return self.first_name.clone();
        }
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age reached at the end of event `index`: the next event's age, or the terminal age.
    pub fn span_end(&self, index: usize) -> Option<f64> {
        if index >= self.events.len() {
            return None;
        }
        Some(
            self.events
                .get(index + 1)
                .map_or(self.age, |next| next.age),
        )
    }

    /// Strict checks on ages. Loading does not require these to pass.
    pub fn validate(&self) -> TimelineResult<()> {
        if !self.age.is_finite() || self.age < 0.0 {
            return Err(TimelineError::validation("age must be a finite value >= 0"));
        }

        let mut prev: Option<f64> = None;
        for (i, event) in self.events.iter().enumerate() {
            if !event.age.is_finite() || event.age < 0.0 {
                return Err(TimelineError::validation(format!(
                    "event {i} has invalid age {}",
                    event.age
                )));
            }
            if let Some(p) = prev
                && event.age < p
            {
                return Err(TimelineError::validation(format!(
                    "event {i} age {} is before the previous event age {p}",
                    event.age
                )));
            }
            prev = Some(event.age);
        }

        if let Some(last) = prev
            && self.age < last
        {
            return Err(TimelineError::validation(format!(
                "terminal age {} is before the last event age {last}",
                self.age
            )));
        }

        Ok(())
    }
}

impl Event {
    /// Caption shown on the event frame (raw, unescaped).
    pub fn caption(&self, first_name: &str) -> String {
        format!("At age {}, {} {}", self.age, first_name, self.content)
    }
}
