pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(thiserror::Error, Debug)]
pub enum TimelineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("load error: {0}")]
    Load(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TimelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            TimelineError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(TimelineError::load("x").to_string().contains("load error:"));
        assert!(
            TimelineError::decode("x")
                .to_string()
                .contains("decode error:")
        );
        assert!(
            TimelineError::render("x")
                .to_string()
                .contains("render error:")
        );
    }

    #[test]
    fn json_errors_become_decode_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = TimelineError::from(err);
        assert!(matches!(err, TimelineError::Decode(_)));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = TimelineError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
