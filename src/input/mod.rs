/// Console-backed recognition engine
pub mod console;

pub use console::{ConsoleEngine, ConsoleInput, ConsoleLine};
