//! Continuous dictation over a single-utterance recognition engine.
//!
//! The engine delivers one utterance per activation and then ends. The
//! session re-arms a fresh activation after every end for as long as the
//! caller wants to listen, so "continuous" dictation is really a loop of
//! short activations. Recoverable errors (`no-speech`, `aborted`) go through
//! the same loop after a short delay; any other error ends the session.
//!
//! All mutation happens through `&mut self`. Delays are kept as deadlines
//! inside the session and fired by [`DictationSession::fire_due`], so `stop`
//! cancels them synchronously. A re-arm never fires before every queued
//! result has been forwarded.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::engine::{
    ActivationId, EngineErrorKind, EngineEvent, EngineEventKind, RecognitionEngine,
    RecognitionSettings,
};
use super::state::{SessionState, SessionStatus, Visibility};
use super::wake_lock::{WakeLockProvider, WakeLockSlot};
use crate::numeral;

/// Receives every recognized utterance with its parsed value
pub type ResultSink = Box<dyn FnMut(&str, Option<u32>) + Send>;

/// Receives human-readable diagnostics
pub type LogSink = Box<dyn FnMut(&str) + Send>;

/// Tunables for a dictation session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Settings pushed to the engine on `start()`
    pub recognition: RecognitionSettings,
    /// Delay before re-arming after a recoverable error or an activation end
    pub restart_delay: Duration,
    /// Delay before a parsed result is handed to the caller
    pub result_delay: Duration,
    /// Hold a screen wake lock while listening
    pub wake_lock: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            recognition: RecognitionSettings::default(),
            restart_delay: Duration::from_millis(100),
            result_delay: Duration::from_millis(50),
            wake_lock: true,
        }
    }
}

/// A parsed utterance waiting for its forward deadline.
#[derive(Debug)]
struct PendingResult {
    due: Instant,
    transcript: String,
    value: Option<u32>,
}

/// Supervises a recognition engine and forwards parsed utterances
///
/// Invariant: `state` is `Listening` or `Restarting` exactly when the
/// should-keep-listening flag is set, and the published `listening`
/// indicator always equals that flag.
pub struct DictationSession<E: RecognitionEngine, W: WakeLockProvider> {
    engine: E,
    wake_locks: W,
    wake_lock: WakeLockSlot,
    settings: SessionSettings,
    state: SessionState,
    should_listen: bool,
    /// Live activation, if the engine is currently running one
    activation: Option<ActivationId>,
    activations_started: u64,
    restart_due: Option<Instant>,
    pending_results: VecDeque<PendingResult>,
    status: watch::Sender<SessionStatus>,
    on_result: ResultSink,
    on_log: LogSink,
}

impl<E: RecognitionEngine, W: WakeLockProvider> fmt::Debug for DictationSession<E, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictationSession")
            .field("state", &self.state)
            .field("should_listen", &self.should_listen)
            .field("activation", &self.activation)
            .field("restart_due", &self.restart_due)
            .field("pending_results", &self.pending_results.len())
            .field("wake_lock_held", &self.wake_lock.is_held())
            .finish_non_exhaustive()
    }
}

impl<E: RecognitionEngine, W: WakeLockProvider> DictationSession<E, W> {
    /// Create an idle session
    pub fn new(
        engine: E,
        wake_locks: W,
        settings: SessionSettings,
        on_result: impl FnMut(&str, Option<u32>) + Send + 'static,
        on_log: impl FnMut(&str) + Send + 'static,
    ) -> Self {
        let (status, _) = watch::channel(SessionStatus::default());
        Self {
            engine,
            wake_locks,
            wake_lock: WakeLockSlot::default(),
            settings,
            state: SessionState::Idle,
            should_listen: false,
            activation: None,
            activations_started: 0,
            restart_due: None,
            pending_results: VecDeque::new(),
            status,
            on_result: Box::new(on_result),
            on_log: Box::new(on_log),
        }
    }

    /// Current state machine state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session wants to keep listening
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.should_listen
    }

    /// Most recent transcript delivered by the engine
    #[must_use]
    pub fn last_transcript(&self) -> String {
        self.status.borrow().last_transcript.clone()
    }

    /// Live engine activation, if any
    #[must_use]
    pub const fn activation(&self) -> Option<ActivationId> {
        self.activation
    }

    /// Whether a screen wake lock is currently held
    #[must_use]
    pub fn holds_wake_lock(&self) -> bool {
        self.wake_lock.is_held()
    }

    /// Watch the caller-facing `(listening, last_transcript)` pair
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Start listening
    ///
    /// A second call while already listening is a no-op: no extra wake lock,
    /// no extra activation.
    pub fn start(&mut self) {
        if self.should_listen {
            debug!(state = %self.state, "start ignored, already listening");
            return;
        }

        info!(lang = %self.settings.recognition.lang, "dictation starting");
        self.should_listen = true;
        self.state = SessionState::Listening;
        self.publish_listening(true);

        if self.settings.wake_lock && self.wake_lock.acquire(&mut self.wake_locks) {
            self.log("wake lock acquired, screen will stay on");
        }

        self.engine.configure(&self.settings.recognition);
        self.activate();
    }

    /// Stop listening
    ///
    /// Takes effect immediately: pending restarts and result forwards are
    /// dropped, the live activation is stopped and the wake lock released.
    pub fn stop(&mut self) {
        self.pending_results.clear();
        self.shut_down("stopped by caller");
    }

    /// Forget the last transcript
    pub fn clear_transcript(&mut self) {
        self.status.send_modify(|status| status.last_transcript.clear());
    }

    /// Feed an engine callback into the session
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if self.activation != Some(event.activation) {
            debug!(
                activation = %event.activation,
                current = ?self.activation,
                "ignoring event from stale activation"
            );
            return;
        }

        match event.kind {
            EngineEventKind::Result(transcript) => self.on_transcript(transcript),
            EngineEventKind::Error(kind) => self.on_engine_error(&kind),
            EngineEventKind::End => self.on_activation_end(),
        }
    }

    /// React to the host window changing visibility
    ///
    /// Platforms drop wake locks when the window is hidden; on return to
    /// the foreground the lock is requested again while still listening.
    pub fn handle_visibility(&mut self, visibility: Visibility) {
        if visibility != Visibility::Visible || !self.state.is_active() || !self.settings.wake_lock
        {
            return;
        }
        if self.wake_lock.acquire(&mut self.wake_locks) {
            self.log("wake lock re-acquired after returning to foreground");
        }
    }

    /// The platform revoked the wake lock
    pub fn handle_wake_lock_released(&mut self) {
        if self.wake_lock.forget_revoked() {
            info!("wake lock revoked by platform");
            self.log("wake lock released");
        }
    }

    /// Earliest scheduled restart or result forward
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let next_result = self.pending_results.front().map(|pending| pending.due);
        match (self.restart_due, next_result) {
            (Some(restart), Some(result)) => Some(restart.min(result)),
            (restart, result) => restart.or(result),
        }
    }

    /// Run everything due at `now`: result forwards first, in arrival order,
    /// then the restart
    pub fn fire_due(&mut self, now: Instant) {
        while self
            .pending_results
            .front()
            .is_some_and(|pending| pending.due <= now)
        {
            if let Some(pending) = self.pending_results.pop_front() {
                debug!(
                    transcript = %pending.transcript,
                    value = ?pending.value,
                    "forwarding result"
                );
                (self.on_result)(&pending.transcript, pending.value);
            }
        }

        if self.restart_due.is_some_and(|due| due <= now) {
            self.restart_due = None;
            if self.should_listen && self.activation.is_none() {
                debug!(state = %self.state, "re-arming recognition");
                self.activate();
            }
        }
    }

    fn on_transcript(&mut self, transcript: String) {
        self.log(&format!("heard \"{transcript}\""));

        let value = numeral::parse(&transcript);
        match value {
            Some(number) => self.log(&format!("-> number {number}")),
            None => self.log("-> no number detected"),
        }
        info!(transcript = %transcript, value = ?value, "utterance recognized");

        self.status
            .send_modify(|status| status.last_transcript.clone_from(&transcript));
        self.pending_results.push_back(PendingResult {
            due: Instant::now() + self.settings.result_delay,
            transcript,
            value,
        });
    }

    fn on_engine_error(&mut self, kind: &EngineErrorKind) {
        self.activation = None;

        if kind.is_recoverable() {
            debug!(error = %kind, "recoverable recognition error, restarting");
            self.state = SessionState::Restarting;
            self.schedule_restart();
            return;
        }

        warn!(error = %kind, "recognition failed");
        self.log(&format!("recognition error: {kind}"));
        self.shut_down("engine error");
    }

    fn on_activation_end(&mut self) {
        self.activation = None;
        if self.should_listen {
            self.schedule_restart();
        }
    }

    fn schedule_restart(&mut self) {
        if self.restart_due.is_none() {
            let earliest = Instant::now() + self.settings.restart_delay;
            let last_forward = self.pending_results.back().map(|pending| pending.due);
            self.restart_due = Some(last_forward.map_or(earliest, |due| due.max(earliest)));
        }
    }

    fn activate(&mut self) {
        self.activations_started += 1;
        let activation = ActivationId(self.activations_started);

        match self.engine.start(activation) {
            Ok(()) => {
                debug!(activation = %activation, "recognition activation started");
                self.activation = Some(activation);
                self.state = SessionState::Listening;
            }
            Err(e) => {
                warn!(error = %e, activation = %activation, "failed to start recognition");
                self.log(&format!("recognition failed to start: {e}"));
                self.shut_down("engine start failed");
            }
        }
    }

    /// Go idle. Queued forwards survive; only `stop` and teardown drop them.
    fn shut_down(&mut self, reason: &str) {
        let was_listening = self.should_listen;

        self.should_listen = false;
        self.state = SessionState::Idle;
        self.restart_due = None;

        if let Some(activation) = self.activation.take() {
            debug!(activation = %activation, "stopping live activation");
            self.engine.stop();
        }
        if self.wake_lock.release() {
            self.log("wake lock released");
        }
        self.publish_listening(false);

        if was_listening {
            info!(reason = reason, "dictation stopped");
        }
    }

    fn publish_listening(&self, listening: bool) {
        self.status.send_if_modified(|status| {
            let changed = status.listening != listening;
            status.listening = listening;
            changed
        });
    }

    fn log(&mut self, message: &str) {
        (self.on_log)(message);
    }
}

impl<E: RecognitionEngine, W: WakeLockProvider> Drop for DictationSession<E, W> {
    fn drop(&mut self) {
        self.pending_results.clear();
        self.shut_down("session closed");
    }
}
