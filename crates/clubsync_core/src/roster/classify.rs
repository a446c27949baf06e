//! Membership status classifiers over the displayed roster name.
//!
//! A name carries a status when, after trimming, it ends with one of the
//! suffixes below preceded by at least one horizontal whitespace character.

const CURRENT_MEMBER: [&str; 2] = ["(lid)", "(member)"];
const MENTOR_OR_COACH: [&str; 2] = ["(mentor)", "(coach)"];
const PROSPECTIVE_MEMBER: [&str; 2] = ["(aspirantlid)", "(aspiring)"];

/// With `include_candidates`, prospective members also count as current.
pub fn is_current_member(name: &str, include_candidates: bool) -> bool {
    has_status_suffix(name, &CURRENT_MEMBER)
        || (include_candidates && is_prospective_member(name))
}

pub fn is_mentor_or_coach(name: &str) -> bool {
    has_status_suffix(name, &MENTOR_OR_COACH)
}

pub fn is_prospective_member(name: &str) -> bool {
    has_status_suffix(name, &PROSPECTIVE_MEMBER)
}

fn has_status_suffix(name: &str, suffixes: &[&str]) -> bool {
    let trimmed = name.trim();
    suffixes.iter().any(|suffix| {
        trimmed
            .strip_suffix(suffix)
            .is_some_and(|rest| rest.ends_with(is_horizontal_whitespace))
    })
}

fn is_horizontal_whitespace(ch: char) -> bool {
    ch.is_whitespace()
        && !matches!(
            ch,
            '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_table() {
        let rows = [
            ("Guido Steger", false, false, false),
            ("Bart van Stekelenburg (lid)", true, false, false),
            ("Zoë Aspirant (aspirantlid)", false, false, true),
            ("Hans Zoete (mentor)", false, true, false),
        ];
        for (name, current, coach, prospective) in rows {
            assert_eq!(is_current_member(name, false), current, "{name}");
            assert_eq!(is_mentor_or_coach(name), coach, "{name}");
            assert_eq!(is_prospective_member(name), prospective, "{name}");
        }
        assert!(is_current_member("Zoë Aspirant (aspirantlid)", true));
    }

    #[test]
    fn english_variants_and_whitespace() {
        assert!(is_current_member("Ann Smith\t(member)  ", false));
        assert!(is_mentor_or_coach("Ann Smith\u{A0}(coach)"));
        assert!(is_prospective_member("Ann Smith (aspiring)"));
    }

    #[test]
    fn suffix_must_follow_whitespace() {
        assert!(!is_current_member("Ann Smith(lid)", false));
        assert!(!is_current_member("(lid)", false));
        assert!(!is_current_member("Ann Smith\n(lid)", false));
        assert!(!is_mentor_or_coach("Ann (coach) Smith"));
    }
}
