//! Dictée - French spoken-numeral dictation
//!
//! A numeral parser for French number words and a dictation session that
//! keeps an unreliable speech engine listening.

/// Configuration management
pub mod config;
/// Console input (stand-in speech engine)
pub mod input;
/// French numeral parsing
pub mod numeral;
/// Dictation session lifecycle
pub mod session;
/// Logging setup
pub mod telemetry;
