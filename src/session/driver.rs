use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::dictation::DictationSession;
use super::engine::{EngineEvent, RecognitionEngine};
use super::state::{SessionStatus, Visibility};
use super::wake_lock::WakeLockProvider;

/// Caller requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Begin listening
    Start,
    /// Stop listening
    Stop,
    /// Forget the last transcript
    ClearTranscript,
    /// Tear the session down and end the event loop
    Close,
}

/// Everything the event loop reacts to, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// From the caller
    Command(SessionCommand),
    /// From the recognition engine
    Engine(EngineEvent),
    /// From the host window
    Visibility(Visibility),
    /// The platform revoked the wake lock
    WakeLockReleased,
}

/// Errors surfaced to callers of the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The event loop has exited
    #[error("dictation session is no longer running")]
    Closed,
}

/// Cloneable producer side of a session's event queue
///
/// Engines, wake-lock providers and visibility watchers all push through
/// the same queue, so the session sees one serial stream of callbacks.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    /// Create a queue
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue any event
    ///
    /// # Errors
    /// Returns `Closed` if the event loop has exited
    pub fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.tx.send(event).map_err(|_| SessionError::Closed)
    }

    /// Queue a caller command
    ///
    /// # Errors
    /// Returns `Closed` if the event loop has exited
    pub fn command(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.send(SessionEvent::Command(command))
    }

    /// Queue an engine callback
    ///
    /// # Errors
    /// Returns `Closed` if the event loop has exited
    pub fn engine(&self, event: EngineEvent) -> Result<(), SessionError> {
        self.send(SessionEvent::Engine(event))
    }

    /// Queue a visibility change
    ///
    /// # Errors
    /// Returns `Closed` if the event loop has exited
    pub fn visibility(&self, visibility: Visibility) -> Result<(), SessionError> {
        self.send(SessionEvent::Visibility(visibility))
    }

    /// Queue a wake-lock revocation
    ///
    /// # Errors
    /// Returns `Closed` if the event loop has exited
    pub fn wake_lock_released(&self) -> Result<(), SessionError> {
        self.send(SessionEvent::WakeLockReleased)
    }
}

/// Caller-side handle to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    events: EventSender,
    status: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    /// Bundle a queue producer with the session's status channel
    #[must_use]
    pub const fn new(events: EventSender, status: watch::Receiver<SessionStatus>) -> Self {
        Self { events, status }
    }

    /// Begin listening
    ///
    /// # Errors
    /// Returns `Closed` if the event loop has exited
    pub fn start(&self) -> Result<(), SessionError> {
        self.events.command(SessionCommand::Start)
    }

    /// Stop listening
    ///
    /// # Errors
    /// Returns `Closed` if the event loop has exited
    pub fn stop(&self) -> Result<(), SessionError> {
        self.events.command(SessionCommand::Stop)
    }

    /// Forget the last transcript
    ///
    /// # Errors
    /// Returns `Closed` if the event loop has exited
    pub fn clear_transcript(&self) -> Result<(), SessionError> {
        self.events.command(SessionCommand::ClearTranscript)
    }

    /// Tear the session down
    ///
    /// # Errors
    /// Returns `Closed` if the event loop has already exited
    pub fn close(&self) -> Result<(), SessionError> {
        self.events.command(SessionCommand::Close)
    }

    /// Listening indicator
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.status.borrow().listening
    }

    /// Most recent transcript
    #[must_use]
    pub fn last_transcript(&self) -> String {
        self.status.borrow().last_transcript.clone()
    }

    /// Independent status receiver, for awaiting changes
    #[must_use]
    pub fn status(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }
}

impl<E: RecognitionEngine, W: WakeLockProvider> DictationSession<E, W> {
    /// Apply one queued event
    ///
    /// Returns `false` once the session has been closed.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Command(SessionCommand::Start) => self.start(),
            SessionEvent::Command(SessionCommand::Stop) => self.stop(),
            SessionEvent::Command(SessionCommand::ClearTranscript) => self.clear_transcript(),
            SessionEvent::Command(SessionCommand::Close) => {
                self.stop();
                return false;
            }
            SessionEvent::Engine(event) => self.handle_engine_event(event),
            SessionEvent::Visibility(visibility) => self.handle_visibility(visibility),
            SessionEvent::WakeLockReleased => self.handle_wake_lock_released(),
        }
        true
    }

    /// Serial event loop
    ///
    /// Applies queued events and fires scheduled restarts and result
    /// forwards until `Close` arrives or every sender is dropped. The session
    /// is torn down on exit.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        info!("dictation session running");
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        debug!("event queue closed");
                        break;
                    };
                    if !self.handle_event(event) {
                        break;
                    }
                }
                () = wait_until(deadline) => self.fire_due(Instant::now()),
            }
        }
        info!("dictation session closed");
    }

    /// Run the event loop on the tokio runtime
    pub fn spawn(self, events: mpsc::UnboundedReceiver<SessionEvent>) -> JoinHandle<()>
    where
        E: Send + 'static,
        W: Send + 'static,
    {
        tokio::spawn(self.run(events))
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::dictation::SessionSettings;
    use crate::session::engine::{ActivationId, MockRecognitionEngine};
    use crate::session::wake_lock::NoWakeLock;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn engine_recording_starts(starts: Arc<Mutex<Vec<ActivationId>>>) -> MockRecognitionEngine {
        let mut engine = MockRecognitionEngine::new();
        engine.expect_configure().return_const(());
        engine.expect_start().returning(move |activation| {
            starts.lock().unwrap().push(activation);
            Ok(())
        });
        engine.expect_stop().return_const(());
        engine
    }

    #[test]
    fn test_sender_reports_closed_queue() {
        let (sender, rx) = EventSender::channel();
        drop(rx);
        assert_eq!(
            sender.command(SessionCommand::Start),
            Err(SessionError::Closed)
        );
    }

    #[test]
    fn test_handle_event_close_stops_session() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let mut session = DictationSession::new(
            engine_recording_starts(Arc::clone(&starts)),
            NoWakeLock,
            SessionSettings::default(),
            |_, _| {},
            |_| {},
        );

        assert!(session.handle_event(SessionEvent::Command(SessionCommand::Start)));
        assert!(session.is_listening());
        assert!(!session.handle_event(SessionEvent::Command(SessionCommand::Close)));
        assert!(!session.is_listening());
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_loop_forwards_and_rearms() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        let (sender, rx) = EventSender::channel();
        let session = DictationSession::new(
            engine_recording_starts(Arc::clone(&starts)),
            NoWakeLock,
            SessionSettings::default(),
            move |text: &str, value| sink.lock().unwrap().push((text.to_owned(), value)),
            |_| {},
        );
        let handle = SessionHandle::new(sender.clone(), session.subscribe());
        let task = session.spawn(rx);

        handle.start().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_listening());

        let first = ActivationId(1);
        sender.engine(EngineEvent::result(first, "soixante-dix")).unwrap();
        sender.engine(EngineEvent::end(first)).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(
            results.lock().unwrap().clone(),
            vec![("soixante-dix".to_owned(), Some(70))]
        );
        assert_eq!(starts.lock().unwrap().len(), 2);
        assert_eq!(handle.last_transcript(), "soixante-dix");

        handle.close().unwrap();
        task.await.unwrap();
        assert!(!handle.is_listening());
        assert_eq!(handle.start(), Err(SessionError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_loop_stop_cancels_restart() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let (sender, rx) = EventSender::channel();
        let session = DictationSession::new(
            engine_recording_starts(Arc::clone(&starts)),
            NoWakeLock,
            SessionSettings::default(),
            |_, _| {},
            |_| {},
        );
        let handle = SessionHandle::new(sender.clone(), session.subscribe());
        let task = session.spawn(rx);

        handle.start().unwrap();
        sender.engine(EngineEvent::end(ActivationId(1))).unwrap();
        handle.stop().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(starts.lock().unwrap().len(), 1);
        assert!(!handle.is_listening());

        drop(handle);
        drop(sender);
        task.await.unwrap();
    }
}
