use serde::Serialize;

/// Tri-state result published to display logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    /// No listing has arrived since (re)initialization.
    Loading,
    /// Most recent projected listing.
    Success(T),
    /// Observation failed; holds a human-readable message.
    Error(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Loading | Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            Self::Loading | Self::Success(_) => None,
        }
    }

    /// Applies one stream result, honoring the terminal `Error` state.
    ///
    /// Returns `false` when the transition was refused.
    pub fn advance<E: ToString>(&mut self, next: Result<T, E>) -> bool {
        if self.is_error() {
            return false;
        }
        *self = match next {
            Ok(data) => Self::Success(data),
            Err(err) => Self::Error(err.to_string()),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::ViewState;

    #[test]
    fn success_replaces_success() {
        let mut state = ViewState::Loading;
        assert!(state.advance::<String>(Ok(1)));
        assert!(state.advance::<String>(Ok(2)));
        assert_eq!(state, ViewState::Success(2));
    }

    #[test]
    fn error_is_terminal() {
        let mut state = ViewState::Success(1);
        assert!(state.advance(Err("disk gone")));
        assert!(!state.advance::<String>(Ok(2)));
        assert_eq!(state.error(), Some("disk gone"));
        assert_eq!(state.data(), None);
    }

    #[test]
    fn loading_can_fail_directly() {
        let mut state: ViewState<u8> = ViewState::Loading;
        assert!(state.is_loading());
        state.advance(Err("boom"));
        assert!(state.is_error());
    }
}
