//! Per-screen load state.

use std::future::Future;

/// Lifecycle of one piece of remotely loaded data.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Idle
    }
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Drive `Idle/Loaded/Failed → Loading → Loaded | Failed`.
    ///
    /// A load already in flight is not restarted; the call returns the
    /// current state untouched.
    pub async fn load<F, E>(&mut self, fut: F) -> &Self
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        if self.is_loading() {
            return self;
        }
        *self = ViewState::Loading;
        *self = match fut.await {
            Ok(data) => ViewState::Loaded(data),
            Err(e) => {
                tracing::debug!(error = %e, "view load failed");
                ViewState::Failed(e.to_string())
            }
        };
        self
    }

    pub fn reset(&mut self) {
        *self = ViewState::Idle;
    }

    /// The loaded data, or the failure message. A view that never finished
    /// loading reports that instead.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            ViewState::Loaded(data) => Ok(data),
            ViewState::Failed(message) => Err(message),
            ViewState::Idle | ViewState::Loading => Err("no data loaded".to_string()),
        }
    }
}
