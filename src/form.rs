//! Form definitions: field maps and per-step completion rules
//!
//! A form is a fixed number of steps plus a pure predicate per step over
//! the current field values. Keeping the rules here, away from the wizard
//! machine, means they can be checked without any controller around them.
//!
//! Two forms exist on the site:
//!
//! | Form | Steps | Completion |
//! |------|-------|------------|
//! | [`BookingForm`] | 4 | service, then a date not in the past, then a time slot, then name + phone + email |
//! | [`ContactForm`] | 1 | name + email + message |

use crate::notify::Notice;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Field names shared by the site's forms
pub mod field {
    pub const SERVICE: &str = "service";
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";
    pub const NAME: &str = "name";
    pub const PHONE: &str = "phone";
    pub const EMAIL: &str = "email";
    pub const MESSAGE: &str = "message";
    pub const SUBJECT: &str = "subject";
}

/// Date format produced by the booking date picker
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// First entry of the contact subject picker
pub const DEFAULT_SUBJECT: &str = "General Question";

/// Which form a submission came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Booking,
    Contact,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Booking => "booking",
            FormKind::Contact => "contact",
        }
    }

    /// Human label used in failure notices
    pub fn label(&self) -> &'static str {
        match self {
            FormKind::Booking => "Booking",
            FormKind::Contact => "Message",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to value map. Missing fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, String>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Non-empty check. Format validation belongs to the page, not here.
    pub fn is_filled(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    pub fn all_filled(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.is_filled(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A fixed-length form the wizard can drive
pub trait FormSchema: Send + Sync + 'static {
    /// Which form this is
    const KIND: FormKind;

    /// Number of steps (N). Steps are numbered 1..=N.
    const STEPS: u8;

    /// Values the form starts with and resets to after a successful submit
    fn defaults() -> Fields;

    /// Whether `step` is complete for `fields`, given today's date.
    /// Steps outside 1..=N are never complete.
    fn is_step_complete(step: u8, fields: &Fields, today: NaiveDate) -> bool;

    /// Notice shown once a submission succeeds
    fn success_notice() -> Notice;
}

/// Appointment booking: service, date, time, contact details
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingForm;

impl FormSchema for BookingForm {
    const KIND: FormKind = FormKind::Booking;
    const STEPS: u8 = 4;

    fn defaults() -> Fields {
        [
            field::SERVICE,
            field::DATE,
            field::TIME,
            field::NAME,
            field::PHONE,
            field::EMAIL,
            field::MESSAGE,
        ]
        .into_iter()
        .map(|name| (name, ""))
        .collect()
    }

    fn is_step_complete(step: u8, fields: &Fields, today: NaiveDate) -> bool {
        match step {
            1 => fields.is_filled(field::SERVICE),
            2 => is_bookable_date(fields.get(field::DATE), today),
            3 => fields.is_filled(field::TIME),
            4 => fields.all_filled(&[field::NAME, field::PHONE, field::EMAIL]),
            _ => false,
        }
    }

    fn success_notice() -> Notice {
        Notice::success(
            "Appointment Booked!",
            "We'll contact you within 24 hours to confirm your appointment.",
        )
    }
}

/// Contact message: a single step
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactForm;

impl FormSchema for ContactForm {
    const KIND: FormKind = FormKind::Contact;
    const STEPS: u8 = 1;

    fn defaults() -> Fields {
        Fields::from_iter([
            (field::NAME, ""),
            (field::EMAIL, ""),
            (field::PHONE, ""),
            (field::SUBJECT, DEFAULT_SUBJECT),
            (field::MESSAGE, ""),
        ])
    }

    fn is_step_complete(step: u8, fields: &Fields, _today: NaiveDate) -> bool {
        step == 1 && fields.all_filled(&[field::NAME, field::EMAIL, field::MESSAGE])
    }

    fn success_notice() -> Notice {
        Notice::success(
            "Message Sent!",
            "Thank you for contacting us. We'll get back to you within 24 hours.",
        )
    }
}

/// A booking date must be a real calendar date and not before today
pub fn is_bookable_date(raw: &str, today: NaiveDate) -> bool {
    if raw.is_empty() {
        return false;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(|date| date >= today)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_booking_defaults_are_empty() {
        let fields = BookingForm::defaults();
        assert_eq!(fields.iter().count(), 7);
        assert!(fields.iter().all(|(_, value)| value.is_empty()));
    }

    #[test]
    fn test_booking_step_rules() {
        let mut fields = BookingForm::defaults();
        for step in 1..=4 {
            assert!(!BookingForm::is_step_complete(step, &fields, today()));
        }

        fields.set(field::SERVICE, "Teeth Cleaning");
        assert!(BookingForm::is_step_complete(1, &fields, today()));

        fields.set(field::DATE, "2026-03-10");
        assert!(BookingForm::is_step_complete(2, &fields, today()));

        fields.set(field::TIME, "9:00 AM");
        assert!(BookingForm::is_step_complete(3, &fields, today()));

        fields.set(field::NAME, "Sarah M.");
        fields.set(field::PHONE, "(555) 123-4567");
        assert!(!BookingForm::is_step_complete(4, &fields, today()));
        fields.set(field::EMAIL, "sarah@example.com");
        assert!(BookingForm::is_step_complete(4, &fields, today()));
    }

    #[test]
    fn test_booking_out_of_range_steps_never_complete() {
        let fields = Fields::from_iter([(field::SERVICE, "x")]);
        assert!(!BookingForm::is_step_complete(0, &fields, today()));
        assert!(!BookingForm::is_step_complete(5, &fields, today()));
    }

    #[test]
    fn test_bookable_date() {
        assert!(is_bookable_date("2026-03-10", today()));
        assert!(is_bookable_date("2026-12-01", today()));
        assert!(!is_bookable_date("2026-03-09", today()));
        assert!(!is_bookable_date("", today()));
        assert!(!is_bookable_date("next tuesday", today()));
        assert!(!is_bookable_date("2026-02-30", today()));
    }

    #[test]
    fn test_contact_defaults_pick_first_subject() {
        let fields = ContactForm::defaults();
        assert_eq!(fields.get(field::SUBJECT), DEFAULT_SUBJECT);
        assert_eq!(fields.get(field::NAME), "");
    }

    #[test]
    fn test_contact_requires_name_email_message() {
        let mut fields = ContactForm::defaults();
        fields.set(field::NAME, "Mike R.");
        fields.set(field::EMAIL, "mike@example.com");
        assert!(!ContactForm::is_step_complete(1, &fields, today()));

        fields.set(field::MESSAGE, "Do you take my insurance?");
        assert!(ContactForm::is_step_complete(1, &fields, today()));
        // Phone is optional on the contact form
        assert!(!fields.is_filled(field::PHONE));
    }

    #[test]
    fn test_missing_field_reads_empty() {
        let fields = Fields::new();
        assert_eq!(fields.get("anything"), "");
        assert!(!fields.is_filled("anything"));
    }
}
