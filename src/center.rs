//! Health center names are typed in by hand, so we map the spellings we know about onto one
//! canonical name each. Anything we don't recognise is kept as typed (trimmed): near-duplicate
//! names are not merged.
use crate::ArcStr;
use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use once_cell::sync::Lazy;

/// (substring to look for, canonical name). Earlier rules win.
const RULES: &[(&str, &str)] = &[
    ("multaqa", "Al Multaqa"),
    ("tareef", "Al Tareef"),
    ("falaj", "Al Falaj"),
    ("uwaynat", "Al Uwaynat"),
    ("uwinat", "Al Uwaynat"),
    ("uwenat", "Al Uwaynat"),
    ("wadi hibi", "Wadi Hibi"),
    ("wadi ahin", "Wadi Ahin"),
];

static MATCHER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .build(RULES.iter().map(|(pattern, _)| pattern))
});

/// The canonical name for a health center.
pub fn normalize(name: &str) -> ArcStr {
    let name = name.trim();
    // pattern ids are rule indices, so the lowest id is the first rule that matches.
    match MATCHER
        .find_overlapping_iter(name)
        .map(|m| m.pattern())
        .min()
    {
        Some(rule) => RULES[rule].1.into(),
        None => name.into(),
    }
}

/// The canonical names we know about, in rule order without duplicates.
pub fn known() -> impl Iterator<Item = &'static str> {
    let mut seen = Vec::new();
    RULES.iter().filter_map(move |(_, canonical)| {
        if seen.contains(canonical) {
            None
        } else {
            seen.push(*canonical);
            Some(*canonical)
        }
    })
}

#[cfg(test)]
mod test {
    use super::{known, normalize};

    #[test]
    fn known_spellings() {
        assert_eq!(&*normalize("AL MULTAQA"), "Al Multaqa");
        assert_eq!(&*normalize("Multaqa health center"), "Al Multaqa");
        assert_eq!(&*normalize("al-tareef"), "Al Tareef");
        assert_eq!(&*normalize("Falaj Al Qabail"), "Al Falaj");
        assert_eq!(&*normalize("Al Uwinat"), "Al Uwaynat");
        assert_eq!(&*normalize("uwenat HC"), "Al Uwaynat");
        assert_eq!(&*normalize("WADI HIBI"), "Wadi Hibi");
        assert_eq!(&*normalize("Wadi Ahin Health Center"), "Wadi Ahin");
    }

    #[test]
    fn first_rule_wins() {
        assert_eq!(&*normalize("Wadi Hibi near Multaqa"), "Al Multaqa");
    }

    #[test]
    fn unknown_passes_through() {
        assert_eq!(&*normalize("  Sohar Polyclinic "), "Sohar Polyclinic");
        // not merged with "Wadi Hibi"
        assert_eq!(&*normalize("Wadi-Hibi"), "Wadi-Hibi");
    }

    #[test]
    fn known_names() {
        assert_eq!(
            known().collect::<Vec<_>>(),
            [
                "Al Multaqa",
                "Al Tareef",
                "Al Falaj",
                "Al Uwaynat",
                "Wadi Hibi",
                "Wadi Ahin"
            ]
        );
    }
}
