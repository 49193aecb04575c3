use std::fmt;

/// Dictation session state machine
///
/// `Listening` and `Restarting` are exactly the states in which the session
/// still wants to hear the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not listening; `start()` is required.
    #[default]
    Idle,
    /// A recognition activation is live or about to be re-armed.
    Listening,
    /// Waiting out the delay after a recoverable engine error.
    Restarting,
}

impl SessionState {
    /// Whether the session intends to keep listening in this state
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Listening | Self::Restarting)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Listening => write!(f, "listening"),
            Self::Restarting => write!(f, "restarting"),
        }
    }
}

/// Caller-observable view of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    /// Listening indicator shown to the user
    pub listening: bool,
    /// Most recent transcript delivered by the engine
    pub last_transcript: String,
}

/// Foreground visibility of the host window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Window is in the foreground
    Visible,
    /// Window is hidden or minimized
    Hidden,
}
