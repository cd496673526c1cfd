//! Field readers that accumulate errors while a schema walks a value tree.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{FieldValue, RawValues, ValidationErrors};
use crate::models::FileAttachment;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// `+`, then digits with at most one space or dash between any two.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+\d(?:[ -]?\d)+$").expect("valid phone pattern"));

const PHONE_MIN_DIGITS: usize = 8;
const PHONE_MAX_DIGITS: usize = 15;

pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

pub fn is_valid_phone(s: &str) -> bool {
    if !PHONE_RE.is_match(s) {
        return false;
    }
    let digits = s.chars().filter(char::is_ascii_digit).count();
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

/// Walks a value tree and records one error per failing field.
///
/// Readers return placeholder values on failure; callers must go through
/// [`Checker::finish`] so placeholders never leave a failed validation.
pub(crate) struct Checker<'a> {
    values: &'a RawValues,
    errors: ValidationErrors,
}

impl<'a> Checker<'a> {
    pub fn new(values: &'a RawValues) -> Self {
        Self {
            values,
            errors: ValidationErrors::new(),
        }
    }

    fn value(&self, field: &str) -> &'a FieldValue {
        static EMPTY: FieldValue = FieldValue::Empty;
        self.values.get(field).unwrap_or(&EMPTY)
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// Swap the most recent message for `field`, if there is one.
    pub fn replace_last(&mut self, field: &str, message: impl Into<String>) {
        if let Some(last) = self.errors.fields.get_mut(field).and_then(|m| m.last_mut()) {
            *last = message.into();
        }
    }

    /// Required text with a trimmed length in `min..=max` characters.
    pub fn required_text(&mut self, field: &str, label: &str, min: usize, max: usize) -> String {
        match self.value(field) {
            value if value.is_blank() => {
                self.fail(field, format!("{} is required", label));
                String::new()
            }
            FieldValue::Text(s) => {
                let s = s.trim();
                let len = s.chars().count();
                if len < min {
                    self.fail(field, format!("{} must be at least {} characters", label, min));
                } else if len > max {
                    self.fail(field, format!("{} must be at most {} characters", label, max));
                }
                s.to_string()
            }
            _ => {
                self.fail(field, format!("{} is invalid", label));
                String::new()
            }
        }
    }

    /// Optional text; blank becomes `None`.
    pub fn optional_text(&mut self, field: &str, label: &str, max: usize) -> Option<String> {
        match self.value(field) {
            value if value.is_blank() => None,
            FieldValue::Text(s) => {
                let s = s.trim();
                if s.chars().count() > max {
                    self.fail(field, format!("{} must be at most {} characters", label, max));
                }
                Some(s.to_string())
            }
            _ => {
                self.fail(field, format!("{} is invalid", label));
                None
            }
        }
    }

    pub fn email(&mut self, field: &str) -> String {
        match self.value(field).as_text().map(str::trim) {
            Some(s) if is_valid_email(s) => s.to_string(),
            _ => {
                self.fail(field, "Invalid email address");
                String::new()
            }
        }
    }

    pub fn phone(&mut self, field: &str) -> String {
        match self.value(field).as_text().map(str::trim) {
            Some(s) if is_valid_phone(s) => s.to_string(),
            _ => {
                self.fail(field, "Invalid phone number");
                String::new()
            }
        }
    }

    /// Required calendar date. Accepts date, date-time and `YYYY-MM-DD` or
    /// RFC 3339 text.
    pub fn date(&mut self, field: &str) -> NaiveDate {
        let parsed = match self.value(field) {
            FieldValue::Date(d) => Some(*d),
            FieldValue::DateTime(dt) => Some(dt.date_naive()),
            FieldValue::Text(s) => parse_date(s.trim()),
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            self.fail(field, "Invalid date");
            NaiveDate::default()
        })
    }

    /// Required date-time. A bare date means midnight UTC.
    pub fn date_time(&mut self, field: &str) -> DateTime<Utc> {
        let parsed = match self.value(field) {
            FieldValue::DateTime(dt) => Some(*dt),
            FieldValue::Date(d) => Some(d.and_time(NaiveTime::MIN).and_utc()),
            FieldValue::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            self.fail(field, "Invalid date");
            DateTime::<Utc>::default()
        })
    }

    /// Text accepted by `parse`, trimmed first. Fails with "Select a valid {label}".
    pub fn choice<T>(&mut self, field: &str, label: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let parsed = self.value(field).as_text().and_then(|s| parse(s.trim()));
        if parsed.is_none() {
            self.fail(field, format!("Select a valid {}", label));
        }
        parsed
    }

    /// Boolean that must be exactly `true`.
    pub fn must_be_true(&mut self, field: &str, message: &str) -> bool {
        let accepted = self.value(field).as_bool() == Some(true);
        if !accepted {
            self.fail(field, message);
        }
        accepted
    }

    /// Zero or one attached file.
    pub fn single_file(&mut self, field: &str, label: &str) -> Option<FileAttachment> {
        match self.value(field) {
            FieldValue::Empty => None,
            FieldValue::Files(files) => match files.as_slice() {
                [] => None,
                [file] => Some(file.clone()),
                _ => {
                    self.fail(field, format!("Only one {} may be attached", label));
                    None
                }
            },
            _ => {
                self.fail(field, format!("{} must be a file", label));
                None
            }
        }
    }

    /// Hand back `output` unless a check failed.
    pub fn finish<T>(self, output: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(output)
        } else {
            Err(self.errors)
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use crate::validation::raw_values;

    #[test]
    fn test_phone_formats() {
        assert!(is_valid_phone("+225 0102030405"));
        assert!(is_valid_phone("+2250102030405"));
        assert!(is_valid_phone("+33 6 12 34 56 78"));
        assert!(is_valid_phone("+1-555-123-4567"));

        assert!(!is_valid_phone("0102030405"));
        assert!(!is_valid_phone("+225"));
        assert!(!is_valid_phone("+225  0102030405"));
        assert!(!is_valid_phone("+225 01020304050607080"));
        assert!(!is_valid_phone("+225 abc"));
    }

    #[test]
    fn test_email_formats() {
        assert!(is_valid_email("jean@x.com"));
        assert!(!is_valid_email("jean@x"));
        assert!(!is_valid_email("jean x@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_required_text_bounds() {
        let values = raw_values([("a", "x"), ("b", "  ok  ")]);
        let mut check = Checker::new(&values);
        check.required_text("a", "A", 2, 10);
        let b = check.required_text("b", "B", 2, 10);
        check.required_text("missing", "Missing", 2, 10);
        assert_eq!(b, "ok");

        let errors = check.finish(()).unwrap_err();
        assert_eq!(errors.first("a"), Some("A must be at least 2 characters"));
        assert_eq!(errors.first("missing"), Some("Missing is required"));
        assert!(!errors.contains("b"));
    }

    #[test]
    fn test_date_accepts_text_and_rejects_garbage() {
        let values = raw_values([("ok", "1990-04-12"), ("bad", "12/04/1990")]);
        let mut check = Checker::new(&values);
        assert_eq!(check.date("ok"), NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
        check.date("bad");
        let errors = check.finish(()).unwrap_err();
        assert_eq!(errors.first("bad"), Some("Invalid date"));
    }

    #[test]
    fn test_choice_uses_parser() {
        let values = raw_values([("gender", " Female "), ("other", "Robot")]);
        let mut check = Checker::new(&values);
        assert_eq!(check.choice("gender", "gender", Gender::parse), Some(Gender::Female));
        assert_eq!(check.choice("other", "gender", Gender::parse), None);
        assert_eq!(check.choice("missing", "gender", Gender::parse), None);

        let errors = check.finish(()).unwrap_err();
        assert_eq!(errors.first("other"), Some("Select a valid gender"));
        assert!(errors.contains("missing"));
        assert!(!errors.contains("gender"));
    }

    #[test]
    fn test_single_file() {
        let one = vec![FileAttachment::new("a.png", "image/png", vec![0])];
        let two = vec![one[0].clone(), one[0].clone()];
        let mut values = RawValues::new();
        values.insert("one".into(), FieldValue::Files(one));
        values.insert("two".into(), FieldValue::Files(two));
        values.insert("text".into(), FieldValue::from("a.png"));

        let mut check = Checker::new(&values);
        assert!(check.single_file("one", "document").is_some());
        assert!(check.single_file("none", "document").is_none());
        check.single_file("two", "document");
        check.single_file("text", "Document");
        let errors = check.finish(()).unwrap_err();
        assert!(errors.contains("two"));
        assert!(errors.contains("text"));
        assert!(!errors.contains("one"));
    }
}
