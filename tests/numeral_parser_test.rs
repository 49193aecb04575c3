//! Multiplication-table coverage for the numeral parser

use dictee::numeral::parse;

const PRODUCTS: &[(&str, u32)] = &[
    ("un", 1),
    ("deux", 2),
    ("trois", 3),
    ("quatre", 4),
    ("cinq", 5),
    ("six", 6),
    ("sept", 7),
    ("huit", 8),
    ("neuf", 9),
    ("dix", 10),
    ("douze", 12),
    ("quatorze", 14),
    ("quinze", 15),
    ("seize", 16),
    ("dix-huit", 18),
    ("vingt", 20),
    ("vingt et un", 21),
    ("vingt-quatre", 24),
    ("vingt-cinq", 25),
    ("vingt-sept", 27),
    ("vingt-huit", 28),
    ("trente", 30),
    ("trente-deux", 32),
    ("trente-cinq", 35),
    ("trente-six", 36),
    ("quarante", 40),
    ("quarante-deux", 42),
    ("quarante-cinq", 45),
    ("quarante-huit", 48),
    ("quarante-neuf", 49),
    ("cinquante", 50),
    ("cinquante-quatre", 54),
    ("cinquante-six", 56),
    ("soixante", 60),
    ("soixante-trois", 63),
    ("soixante-quatre", 64),
    ("soixante-dix", 70),
    ("soixante-douze", 72),
    ("quatre-vingts", 80),
    ("quatre-vingt-un", 81),
    ("quatre-vingt-dix", 90),
    ("cent", 100),
    ("cent vingt et un", 121),
];

const REGIONAL: &[(&str, u32)] = &[
    ("septante", 70),
    ("septante-deux", 72),
    ("huitante", 80),
    ("huitante et un", 81),
    ("nonante", 90),
];

#[test]
fn test_every_product_parses() {
    for &(spoken, value) in PRODUCTS.iter().chain(REGIONAL) {
        assert_eq!(parse(spoken), Some(value), "spoken: {spoken}");
    }
}

#[test]
fn test_recognizer_casing_and_punctuation() {
    for &(spoken, value) in PRODUCTS {
        let shouted = format!("{}.", spoken.to_uppercase());
        assert_eq!(parse(&shouted), Some(value), "spoken: {shouted}");
    }
}

#[test]
fn test_digit_strings_round_trip() {
    for n in 0..=200_u32 {
        assert_eq!(parse(&n.to_string()), Some(n));
    }
}

#[test]
fn test_non_numbers_are_absent() {
    for text in ["", "   ", "xyz", "abcdef", "je ne sais pas", "..."] {
        assert_eq!(parse(text), None, "text: {text:?}");
    }
}

#[test]
fn test_zero_spellings() {
    assert_eq!(parse("zéro"), Some(0));
    assert_eq!(parse("zero"), Some(0));
}
