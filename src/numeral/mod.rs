/// French numeral vocabulary and token classification
pub mod lexicon;
/// Text to value conversion
pub mod parser;

pub use lexicon::NumeralToken;
pub use parser::{extract_digits, normalize, parse};
