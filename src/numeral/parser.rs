use tracing::debug;

use super::lexicon::{self, NumeralToken};

/// Characters removed before matching.
const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// Parse spoken or typed French numeral text into a value
///
/// Resolution order:
/// 1. whole-utterance match (digit string, unit, ten, "cent")
/// 2. curated compound table
/// 3. compositional walk over the words
/// 4. first run of digits anywhere in the raw text
///
/// Returns `None` when nothing numeric is found. That is a normal outcome,
/// not an error. Zero is only reachable through step 1.
#[must_use]
pub fn parse(text: &str) -> Option<u32> {
    if text.trim().is_empty() {
        return None;
    }

    let normalized = normalize(text);
    let key = lexicon::canonical(&normalized);

    if let Some(value) = parse_digit_string(&normalized).or_else(|| lexicon::lookup_direct(&key)) {
        debug!(text = text, value = value, "numeral matched directly");
        return Some(value);
    }

    if let Some(value) = lexicon::lookup_compound(&key) {
        debug!(text = text, value = value, "numeral matched compound table");
        return Some(value);
    }

    if let Some(value) = compose(&normalized) {
        debug!(text = text, value = value, "numeral composed from words");
        return Some(value);
    }

    let value = extract_digits(text);
    if let Some(value) = value {
        debug!(text = text, value = value, "numeral extracted from digits");
    } else {
        debug!(text = text, "no numeral found");
    }
    value
}

/// Lower-case, strip `. , ! ? ; :`, collapse whitespace and trim
#[must_use]
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !PUNCTUATION.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First run of ASCII digits in `text`, as a base-10 value
///
/// Runs too large for a `u32` yield `None`.
#[must_use]
pub fn extract_digits(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let run = &text[start..];
    let end = run.find(|c: char| !c.is_ascii_digit()).unwrap_or(run.len());
    run[..end].parse().ok()
}

fn parse_digit_string(normalized: &str) -> Option<u32> {
    if normalized.is_empty() || !normalized.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    normalized.parse().ok()
}

fn compose(normalized: &str) -> Option<u32> {
    let mut walk = Walk::default();
    normalized
        .split([' ', '-'])
        .filter(|word| !word.is_empty())
        .map(NumeralToken::classify)
        .for_each(|token| walk.push(token));
    walk.finish()
}

/// Left-to-right accumulator for the compositional path.
#[derive(Debug, Default)]
struct Walk {
    total: u32,
    current: u32,
    previous: Option<NumeralToken>,
}

impl Walk {
    fn push(&mut self, token: NumeralToken) {
        match (self.previous, token) {
            // quatre-vingt(s)
            (Some(NumeralToken::Unit(4)), NumeralToken::Ten(20)) => {
                self.replace_previous(4, 80);
            }
            // "quatre dix" with the "vingt" lost by the recognizer
            (Some(NumeralToken::Unit(4)), NumeralToken::Ten(10)) => {
                self.replace_previous(4, 90);
            }
            (Some(NumeralToken::Unit(4)), NumeralToken::Unit(unit)) if unit > 10 => {
                self.replace_previous(4, 80 + unit);
            }
            // soixante-dix is one lexeme
            (Some(NumeralToken::Ten(60)), NumeralToken::Ten(10)) => {
                self.replace_previous(60, 70);
            }
            (_, NumeralToken::Unit(value) | NumeralToken::Ten(value)) => {
                self.current = self.current.saturating_add(value);
            }
            (_, NumeralToken::Hundred) => {
                let multiplier = if self.current == 0 { 1 } else { self.current };
                self.total = self.total.saturating_add(multiplier.saturating_mul(100));
                self.current = 0;
            }
            (_, NumeralToken::Conjunction | NumeralToken::Unrecognized) => {}
        }
        self.previous = Some(token);
    }

    fn replace_previous(&mut self, previous: u32, value: u32) {
        self.current = self
            .current
            .saturating_sub(previous)
            .saturating_add(value);
    }

    fn finish(self) -> Option<u32> {
        let total = self.total.saturating_add(self.current);
        (total > 0).then_some(total)
    }
}
