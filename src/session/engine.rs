use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifies one recognition activation
///
/// The engine echoes the id it was started with on every event, which lets
/// the session drop events from activations it has already abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActivationId(pub u64);

impl fmt::Display for ActivationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Recognition settings pushed to the engine before each session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    /// BCP 47 locale
    pub lang: String,
    /// Keep the activation open after an utterance
    pub continuous: bool,
    /// Deliver partial transcripts
    pub interim_results: bool,
    /// Alternatives per result
    pub max_alternatives: u32,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self::single_utterance("fr-FR")
    }
}

impl RecognitionSettings {
    /// One final utterance per activation, no interim results
    #[must_use]
    pub fn single_utterance(lang: &str) -> Self {
        Self {
            lang: lang.to_owned(),
            continuous: false,
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// Speech-to-text engine driven by a dictation session
///
/// Implementations report back through [`EngineEvent`]s carrying the
/// activation id passed to [`start`](Self::start). Each activation delivers
/// at most one final transcript and always finishes with `End`.
#[cfg_attr(test, mockall::automock)]
pub trait RecognitionEngine {
    /// Apply recognition settings
    fn configure(&mut self, settings: &RecognitionSettings);

    /// Begin one recognition activation
    ///
    /// # Errors
    /// Returns error if the engine refuses to start (already active, no platform support)
    fn start(&mut self, activation: ActivationId) -> Result<(), EngineError>;

    /// Stop the live activation, if any
    fn stop(&mut self);
}

/// Failure to begin an activation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// An activation is already running
    #[error("recognition already started")]
    AlreadyStarted,

    /// Speech recognition is not available on this platform
    #[error("speech recognition unavailable: {0}")]
    Unavailable(String),
}

/// Error codes reported mid-activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// No speech detected before the engine timed out
    NoSpeech,
    /// The activation was aborted
    Aborted,
    /// Microphone capture failed
    AudioCapture,
    /// Network recognition service unreachable
    Network,
    /// User or platform denied microphone access
    NotAllowed,
    /// Recognition service refused the request
    ServiceNotAllowed,
    /// Locale not supported
    LanguageNotSupported,
    /// Grammar rejected
    BadGrammar,
    /// Any other code
    Other(String),
}

impl EngineErrorKind {
    /// Whether the session should transparently restart after this error
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoSpeech | Self::Aborted)
    }

    /// Wire code of this error
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::LanguageNotSupported => "language-not-supported",
            Self::BadGrammar => "bad-grammar",
            Self::Other(code) => code.as_str(),
        }
    }
}

impl EngineErrorKind {
    /// Interpret a wire code; unknown codes become `Other`
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "language-not-supported" => Self::LanguageNotSupported,
            "bad-grammar" => Self::BadGrammar,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl FromStr for EngineErrorKind {
    type Err = std::convert::Infallible;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_code(code))
    }
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Something the engine reports about one activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    /// Activation this event belongs to
    pub activation: ActivationId,
    /// What happened
    pub kind: EngineEventKind,
}

/// Engine callbacks: `onresult`, `onerror`, `onend`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEventKind {
    /// Final transcript of the utterance
    Result(String),
    /// Activation failed
    Error(EngineErrorKind),
    /// Activation finished
    End,
}

impl EngineEvent {
    /// Final transcript for `activation`
    #[must_use]
    pub fn result(activation: ActivationId, transcript: impl Into<String>) -> Self {
        Self {
            activation,
            kind: EngineEventKind::Result(transcript.into()),
        }
    }

    /// Error for `activation`
    #[must_use]
    pub const fn error(activation: ActivationId, kind: EngineErrorKind) -> Self {
        Self {
            activation,
            kind: EngineEventKind::Error(kind),
        }
    }

    /// End of `activation`
    #[must_use]
    pub const fn end(activation: ActivationId) -> Self {
        Self {
            activation,
            kind: EngineEventKind::End,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        assert!(EngineErrorKind::NoSpeech.is_recoverable());
        assert!(EngineErrorKind::Aborted.is_recoverable());
        assert!(!EngineErrorKind::NotAllowed.is_recoverable());
        assert!(!EngineErrorKind::Network.is_recoverable());
        assert!(!EngineErrorKind::Other("weird".to_owned()).is_recoverable());
    }

    #[test]
    fn test_parse_error_codes() {
        assert_eq!("no-speech".parse::<EngineErrorKind>(), Ok(EngineErrorKind::NoSpeech));
        assert_eq!(" aborted ".parse::<EngineErrorKind>(), Ok(EngineErrorKind::Aborted));
        assert_eq!("not-allowed".parse::<EngineErrorKind>(), Ok(EngineErrorKind::NotAllowed));
        assert_eq!(
            "mystery".parse::<EngineErrorKind>(),
            Ok(EngineErrorKind::Other("mystery".to_owned()))
        );
    }

    #[test]
    fn test_code_round_trips_through_display() {
        let kind = EngineErrorKind::LanguageNotSupported;
        assert_eq!(kind.to_string(), "language-not-supported");
        assert_eq!(kind.to_string().parse::<EngineErrorKind>(), Ok(kind));
    }

    #[test]
    fn test_default_settings_are_single_utterance_french() {
        let settings = RecognitionSettings::default();
        assert_eq!(settings.lang, "fr-FR");
        assert!(!settings.continuous);
        assert!(!settings.interim_results);
        assert_eq!(settings.max_alternatives, 1);
    }

    #[test]
    fn test_activation_display() {
        assert_eq!(ActivationId(7).to_string(), "#7");
    }
}
