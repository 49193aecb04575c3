/// Dictation session state machine
pub mod dictation;
/// Event loop and caller handle
pub mod driver;
/// Recognition engine collaborator
pub mod engine;
/// Session states and observable status
pub mod state;
/// Wake-lock collaborator
pub mod wake_lock;

pub use dictation::{DictationSession, LogSink, ResultSink, SessionSettings};
pub use driver::{EventSender, SessionCommand, SessionError, SessionEvent, SessionHandle};
pub use engine::{
    ActivationId, EngineError, EngineErrorKind, EngineEvent, EngineEventKind, RecognitionEngine,
    RecognitionSettings,
};
pub use state::{SessionState, SessionStatus, Visibility};
pub use wake_lock::{NoWakeLock, WakeLock, WakeLockError, WakeLockHandle, WakeLockKind, WakeLockProvider};
