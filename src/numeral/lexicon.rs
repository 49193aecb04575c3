//! French numeral vocabulary and word classification.
//!
//! Keys are stored in canonical form: hyphens replaced by spaces, so
//! "vingt-et-un" and "vingt et un" resolve to the same entry.

/// Single-word units, 0 to 16. "dix" lives in [`TENS`].
const UNITS: &[(&str, u32)] = &[
    ("zéro", 0),
    ("zero", 0),
    ("un", 1),
    ("une", 1),
    ("deux", 2),
    ("trois", 3),
    ("quatre", 4),
    ("cinq", 5),
    ("six", 6),
    ("sept", 7),
    ("huit", 8),
    ("neuf", 9),
    ("onze", 11),
    ("douze", 12),
    ("treize", 13),
    ("quatorze", 14),
    ("quinze", 15),
    ("seize", 16),
];

/// Compound units 17 to 19, only matched as a whole utterance.
const COMPOUND_UNITS: &[(&str, u32)] = &[("dix sept", 17), ("dix huit", 18), ("dix neuf", 19)];

/// Tens, including the Belgian/Swiss forms.
const TENS: &[(&str, u32)] = &[
    ("dix", 10),
    ("vingt", 20),
    ("vingts", 20),
    ("trente", 30),
    ("quarante", 40),
    ("cinquante", 50),
    ("soixante", 60),
    ("septante", 70),
    ("huitante", 80),
    ("octante", 80),
    ("nonante", 90),
];

/// Multi-word tens the recognizer emits as one utterance.
const COMPOUND_TENS: &[(&str, u32)] = &[
    ("soixante dix", 70),
    ("quatre vingt", 80),
    ("quatre vingts", 80),
    ("quatrevingt", 80),
    ("quatrevingts", 80),
    ("quatre vingt dix", 90),
];

/// Multiplication-table products whose spoken form is irregular or
/// frequently mis-split by the recognizer.
const COMMON_COMPOUNDS: &[(&str, u32)] = &[
    ("vingt et un", 21),
    ("vingt deux", 22),
    ("vingt trois", 23),
    ("vingt quatre", 24),
    ("vingt cinq", 25),
    ("vingt six", 26),
    ("vingt sept", 27),
    ("vingt huit", 28),
    ("vingt neuf", 29),
    ("trente et un", 31),
    ("trente deux", 32),
    ("trente cinq", 35),
    ("trente six", 36),
    ("quarante deux", 42),
    ("quarante cinq", 45),
    ("quarante huit", 48),
    ("quarante neuf", 49),
    ("cinquante quatre", 54),
    ("cinquante six", 56),
    ("soixante trois", 63),
    ("soixante quatre", 64),
    ("soixante douze", 72),
    ("septante deux", 72),
    ("quatre vingt un", 81),
    ("quatre vingt et un", 81),
    ("huitante et un", 81),
    ("cent vingt et un", 121),
];

/// Classification of one word of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumeralToken {
    /// 0 to 16.
    Unit(u32),
    /// 10, 20, ... 90, regional variants included.
    Ten(u32),
    /// "cent" / "cents".
    Hundred,
    /// "et", as in "vingt et un".
    Conjunction,
    /// Anything else; ignored by the compositional walk.
    Unrecognized,
}

impl NumeralToken {
    /// Classifies a single normalized word (no spaces, no hyphens).
    #[must_use]
    pub fn classify(word: &str) -> Self {
        if let Some(value) = lookup(UNITS, word) {
            return Self::Unit(value);
        }
        if let Some(value) = lookup(TENS, word) {
            return Self::Ten(value);
        }
        match word {
            "cent" | "cents" => Self::Hundred,
            "et" => Self::Conjunction,
            _ => Self::Unrecognized,
        }
    }
}

/// Converts normalized text to the form the tables are keyed by.
pub(crate) fn canonical(normalized: &str) -> String {
    normalized.replace('-', " ")
}

/// Exact match against units, tens and "cent".
pub(crate) fn lookup_direct(key: &str) -> Option<u32> {
    if key == "cent" {
        return Some(100);
    }
    lookup(UNITS, key)
        .or_else(|| lookup(COMPOUND_UNITS, key))
        .or_else(|| lookup(TENS, key))
        .or_else(|| lookup(COMPOUND_TENS, key))
}

/// Exact match against the curated compound table.
pub(crate) fn lookup_compound(key: &str) -> Option<u32> {
    lookup(COMMON_COMPOUNDS, key)
}

fn lookup(table: &[(&str, u32)], key: &str) -> Option<u32> {
    table
        .iter()
        .find(|(word, _)| *word == key)
        .map(|&(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_units_and_tens() {
        assert_eq!(NumeralToken::classify("zéro"), NumeralToken::Unit(0));
        assert_eq!(NumeralToken::classify("une"), NumeralToken::Unit(1));
        assert_eq!(NumeralToken::classify("seize"), NumeralToken::Unit(16));
        assert_eq!(NumeralToken::classify("dix"), NumeralToken::Ten(10));
        assert_eq!(NumeralToken::classify("nonante"), NumeralToken::Ten(90));
        assert_eq!(NumeralToken::classify("vingts"), NumeralToken::Ten(20));
    }

    #[test]
    fn test_classify_structural_words() {
        assert_eq!(NumeralToken::classify("cent"), NumeralToken::Hundred);
        assert_eq!(NumeralToken::classify("cents"), NumeralToken::Hundred);
        assert_eq!(NumeralToken::classify("et"), NumeralToken::Conjunction);
        assert_eq!(NumeralToken::classify("égale"), NumeralToken::Unrecognized);
        assert_eq!(NumeralToken::classify(""), NumeralToken::Unrecognized);
    }

    #[test]
    fn test_canonical_replaces_hyphens() {
        assert_eq!(canonical("vingt-et-un"), "vingt et un");
        assert_eq!(canonical("quatre-vingt dix"), "quatre vingt dix");
    }

    #[test]
    fn test_direct_lookup() {
        assert_eq!(lookup_direct("cent"), Some(100));
        assert_eq!(lookup_direct("dix sept"), Some(17));
        assert_eq!(lookup_direct("quatrevingts"), Some(80));
        assert_eq!(lookup_direct("soixante dix"), Some(70));
        assert_eq!(lookup_direct("vingt deux"), None);
    }

    #[test]
    fn test_compound_table_entries_are_canonical() {
        for (key, _) in COMMON_COMPOUNDS {
            assert!(!key.contains('-'), "non-canonical key: {key}");
            assert!(lookup_compound(key).is_some());
        }
    }
}
