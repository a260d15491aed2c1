use std::sync::LazyLock;

use regex::Regex;

use crate::email::Email;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)").unwrap());
static DIFFICULTY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(Easy|Medium|Hard)").unwrap());
// ASCII letters and whitespace only, so "asked by Google." captures "Google"
static COMPANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"asked by ([a-zA-Z\t\n\f\r ]+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Easy" => Some(Difficulty::Easy),
            "Medium" => Some(Difficulty::Medium),
            "Hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Fields pulled out of one email before the duplicate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// `None` when the subject has no digits or the digits overflow `i64`.
    pub number: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub company: String,
}

/// Leftmost match wins for every field; nothing is disambiguated.
pub fn extract(email: &Email) -> Extracted {
    // a digit run too long for i64 counts as no number, so the email is skipped
    let number = first_capture(&NUMBER_RE, &email.subject).and_then(|n| n.parse::<i64>().ok());
    let difficulty = first_capture(&DIFFICULTY_RE, &email.subject).and_then(Difficulty::from_label);
    let company = first_capture(&COMPANY_RE, &email.text)
        .unwrap_or_default()
        .to_string();

    Extracted {
        number,
        difficulty,
        company,
    }
}

fn first_capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn email(subject: &str, text: &str) -> Email {
        Email {
            subject: subject.to_string(),
            text: text.to_string(),
            html: String::new(),
            date: Utc.with_ymd_and_hms(2019, 4, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn problem_scenario() {
        let e = email(
            "Problem #42 [Medium] asked by...",
            "Good morning!\n\nThis problem was asked by Google.\n\nGiven a list of numbers...",
        );
        let x = extract(&e);
        assert_eq!(x.number, Some(42));
        assert_eq!(x.difficulty, Some(Difficulty::Medium));
        assert_eq!(x.company, "Google");
    }

    #[test]
    fn every_difficulty_label() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let subject = format!("Daily Coding Problem: Problem #7 [{}]", d.as_str());
            assert_eq!(extract(&email(&subject, "")).difficulty, Some(d));
        }
    }

    #[test]
    fn difficulty_is_case_sensitive() {
        let x = extract(&email("Problem #7 [easy]", ""));
        assert_eq!(x.difficulty, None);
    }

    #[test]
    fn leftmost_number_wins() {
        let x = extract(&email("Problem #120 of 365 [Hard]", ""));
        assert_eq!(x.number, Some(120));
    }

    #[test]
    fn leading_number() {
        for n in [0_i64, 1, 99, 1234] {
            let x = extract(&email(&format!("{} problems later", n), ""));
            assert_eq!(x.number, Some(n));
        }
    }

    #[test]
    fn no_number_in_subject() {
        let x = extract(&email("Welcome to Daily Coding Problem!", "asked by nobody"));
        assert_eq!(x.number, None);
    }

    #[test]
    fn number_overflowing_i64_is_absent() {
        let x = extract(&email("Problem #99999999999999999999999", ""));
        assert_eq!(x.number, None);
    }

    #[test]
    fn non_ascii_digits_are_not_numbers() {
        // Arabic-Indic digits
        let x = extract(&email("Problem #\u{0664}\u{0662}", ""));
        assert_eq!(x.number, None);
    }

    #[test]
    fn missing_company_and_difficulty_are_empty() {
        let x = extract(&email("Problem #5", "No attribution here."));
        assert_eq!(x.difficulty, None);
        assert_eq!(x.company, "");
    }

    #[test]
    fn company_phrase_is_case_sensitive() {
        let x = extract(&email("Problem #5", "This problem was Asked By Google."));
        assert_eq!(x.company, "");
    }

    #[test]
    fn company_spans_letters_and_whitespace() {
        let x = extract(&email("Problem #5", "This problem was asked by Jane Street, then..."));
        assert_eq!(x.company, "Jane Street");
    }

    #[test]
    fn company_is_read_from_text_not_subject() {
        let x = extract(&email("Problem #5 asked by Google", ""));
        assert_eq!(x.company, "");
    }
}
