//! Terminal stand-in for a speech engine.
//!
//! Each typed line is one utterance for the armed activation. Lines starting
//! with `!` inject an engine error code, lines starting with `:` drive the
//! session.

use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::session::{
    ActivationId, EngineError, EngineErrorKind, EngineEvent, EventSender, RecognitionEngine,
    RecognitionSettings, SessionCommand, Visibility,
};

/// No activation armed
const IDLE: u64 = 0;

/// What a console line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// Spoken text for the armed activation
    Utterance(String),
    /// Simulated engine error
    EngineError(EngineErrorKind),
    /// Session command
    Command(SessionCommand),
    /// Window visibility change
    Visibility(Visibility),
    /// Leave the program
    Quit,
    /// Blank line or unknown command
    Ignored,
}

impl ConsoleLine {
    /// Interpret one line of input
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Ignored;
        }
        if let Some(code) = line.strip_prefix('!') {
            return Self::EngineError(EngineErrorKind::from_code(code));
        }
        if let Some(command) = line.strip_prefix(':') {
            return match command.trim() {
                "start" => Self::Command(SessionCommand::Start),
                "stop" => Self::Command(SessionCommand::Stop),
                "clear" => Self::Command(SessionCommand::ClearTranscript),
                "hide" => Self::Visibility(Visibility::Hidden),
                "show" => Self::Visibility(Visibility::Visible),
                "quit" | "q" => Self::Quit,
                _ => Self::Ignored,
            };
        }
        Self::Utterance(line.to_owned())
    }
}

/// Recognition engine fed by [`ConsoleInput`]
#[derive(Debug)]
pub struct ConsoleEngine {
    armed: Arc<AtomicU64>,
    events: EventSender,
    settings: RecognitionSettings,
}

impl ConsoleEngine {
    /// Engine and its matching stdin reader
    #[must_use]
    pub fn pair(events: EventSender) -> (Self, ConsoleInput) {
        let armed = Arc::new(AtomicU64::new(IDLE));
        let engine = Self {
            armed: Arc::clone(&armed),
            events: events.clone(),
            settings: RecognitionSettings::default(),
        };
        (engine, ConsoleInput { armed, events })
    }
}

impl RecognitionEngine for ConsoleEngine {
    fn configure(&mut self, settings: &RecognitionSettings) {
        debug!(lang = %settings.lang, "console engine configured");
        self.settings = settings.clone();
    }

    fn start(&mut self, activation: ActivationId) -> Result<(), EngineError> {
        self.armed
            .compare_exchange(IDLE, activation.0, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| EngineError::AlreadyStarted)?;
        debug!(activation = %activation, lang = %self.settings.lang, "console activation armed");
        Ok(())
    }

    fn stop(&mut self) {
        let previous = self.armed.swap(IDLE, Ordering::SeqCst);
        if previous != IDLE
            && self
                .events
                .engine(EngineEvent::end(ActivationId(previous)))
                .is_err()
        {
            debug!("session gone, end of activation not delivered");
        }
    }
}

/// Reads stdin and feeds the session
#[derive(Debug)]
pub struct ConsoleInput {
    armed: Arc<AtomicU64>,
    events: EventSender,
}

impl ConsoleInput {
    /// Read stdin until EOF or `:quit`
    ///
    /// Stdin is read on a detached thread so a pending read never holds up
    /// runtime shutdown.
    ///
    /// # Errors
    /// Returns error if stdin cannot be read or the session is gone
    pub async fn run(self) -> Result<()> {
        let (tx, mut lines) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("console-input".to_owned())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })
            .context("failed to spawn console reader")?;

        while let Some(line) = lines.recv().await {
            let line = line.context("failed to read stdin")?;
            if !self.dispatch(ConsoleLine::parse(&line))? {
                break;
            }
        }
        Ok(())
    }

    /// Apply one console line; returns `false` on quit
    ///
    /// # Errors
    /// Returns error if the session event loop has exited
    pub fn dispatch(&self, line: ConsoleLine) -> Result<bool> {
        match line {
            ConsoleLine::Utterance(text) => match self.disarm() {
                Some(activation) => {
                    self.events.engine(EngineEvent::result(activation, text))?;
                    self.events.engine(EngineEvent::end(activation))?;
                }
                None => warn!(text = %text, "not listening, utterance dropped"),
            },
            ConsoleLine::EngineError(kind) => match self.disarm() {
                Some(activation) => {
                    self.events.engine(EngineEvent::error(activation, kind))?;
                    self.events.engine(EngineEvent::end(activation))?;
                }
                None => warn!(error = %kind, "not listening, error dropped"),
            },
            ConsoleLine::Command(command) => self.events.command(command)?,
            ConsoleLine::Visibility(visibility) => self.events.visibility(visibility)?,
            ConsoleLine::Quit => return Ok(false),
            ConsoleLine::Ignored => {}
        }
        Ok(true)
    }

    fn disarm(&self) -> Option<ActivationId> {
        match self.armed.swap(IDLE, Ordering::SeqCst) {
            IDLE => None,
            id => Some(ActivationId(id)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{EngineEventKind, SessionEvent};

    #[test]
    fn test_parse_lines() {
        assert_eq!(
            ConsoleLine::parse("  quarante-deux "),
            ConsoleLine::Utterance("quarante-deux".to_owned())
        );
        assert_eq!(
            ConsoleLine::parse("!no-speech"),
            ConsoleLine::EngineError(EngineErrorKind::NoSpeech)
        );
        assert_eq!(
            ConsoleLine::parse(":stop"),
            ConsoleLine::Command(SessionCommand::Stop)
        );
        assert_eq!(
            ConsoleLine::parse(":show"),
            ConsoleLine::Visibility(Visibility::Visible)
        );
        assert_eq!(ConsoleLine::parse(":q"), ConsoleLine::Quit);
        assert_eq!(ConsoleLine::parse(":bogus"), ConsoleLine::Ignored);
        assert_eq!(ConsoleLine::parse("   "), ConsoleLine::Ignored);
    }

    #[test]
    fn test_engine_refuses_double_start() {
        let (events, _rx) = EventSender::channel();
        let (mut engine, _input) = ConsoleEngine::pair(events);

        assert_eq!(engine.start(ActivationId(1)), Ok(()));
        assert_eq!(
            engine.start(ActivationId(2)),
            Err(EngineError::AlreadyStarted)
        );
    }

    #[test]
    fn test_utterance_goes_to_armed_activation() {
        let (events, mut rx) = EventSender::channel();
        let (mut engine, input) = ConsoleEngine::pair(events);
        engine.start(ActivationId(3)).unwrap();

        assert!(input.dispatch(ConsoleLine::parse("sept")).unwrap());

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Engine(EngineEvent::result(ActivationId(3), "sept"))
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Engine(EngineEvent::end(ActivationId(3)))
        );
        // one utterance per activation
        assert!(input.dispatch(ConsoleLine::parse("huit")).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stop_ends_armed_activation() {
        let (events, mut rx) = EventSender::channel();
        let (mut engine, _input) = ConsoleEngine::pair(events);
        engine.start(ActivationId(1)).unwrap();

        engine.stop();
        engine.stop();

        let event = rx.try_recv().unwrap();
        assert!(matches!(
            event,
            SessionEvent::Engine(EngineEvent {
                kind: EngineEventKind::End,
                ..
            })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_quit_ends_dispatch() {
        let (events, _rx) = EventSender::channel();
        let (_engine, input) = ConsoleEngine::pair(events);
        assert!(!input.dispatch(ConsoleLine::Quit).unwrap());
    }
}
