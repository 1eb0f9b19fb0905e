//! Schema checks for the submission form.
//!
//! Everything here is pure: a [`FormDraft`] goes in, either a
//! [`ValidSubmissionInput`] or the full set of [`FieldErrors`] comes out.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use shared::domain::{PreferredContact, Submission, SubmissionInput};

pub const FULL_NAME_REQUIRED: &str = "Full Name is required";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const INVALID_PHONE: &str = "Phone Number must be 7-20 digits";
pub const AGE_NOT_A_NUMBER: &str = "Age must be a whole number";
pub const AGE_OUT_OF_RANGE: &str = "Age must be between 18 and 120";
pub const CONTACT_REQUIRED: &str = "Select a contact method";

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 120;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
    )
    .expect("email pattern compiles")
});

// `\d` would admit non-ASCII digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{7,20}$").expect("phone pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    Email,
    PhoneNumber,
    Age,
    Address,
    PreferredContact,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Self::FullName,
        Self::Email,
        Self::PhoneNumber,
        Self::Age,
        Self::Address,
        Self::PreferredContact,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Age => "age",
            Self::Address => "address",
            Self::PreferredContact => "preferred_contact",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw, as-typed form contents. An empty `preferred_contact` means nothing
/// was selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDraft {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub age: String,
    pub address: String,
    pub preferred_contact: String,
}

impl FormDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::PhoneNumber => &self.phone_number,
            Field::Age => &self.age,
            Field::Address => &self.address,
            Field::PreferredContact => &self.preferred_contact,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::FullName => self.full_name = value,
            Field::Email => self.email = value,
            Field::PhoneNumber => self.phone_number = value,
            Field::Age => self.age = value,
            Field::Address => self.address = value,
            Field::PreferredContact => self.preferred_contact = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&Submission> for FormDraft {
    fn from(value: &Submission) -> Self {
        Self {
            full_name: value.full_name.clone(),
            email: value.email.clone(),
            phone_number: value.phone_number.clone(),
            age: value.age.to_string(),
            address: value.address.clone().unwrap_or_default(),
            preferred_contact: value.preferred_contact.as_str().to_string(),
        }
    }
}

/// Every failing field with its message, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub(crate) fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_string());
    }

    pub(crate) fn remove(&mut self, field: Field) {
        self.0.remove(&field);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// A [`SubmissionInput`] that has passed [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmissionInput(SubmissionInput);

impl ValidSubmissionInput {
    pub fn as_input(&self) -> &SubmissionInput {
        &self.0
    }

    pub fn into_input(self) -> SubmissionInput {
        self.0
    }
}

pub fn validate(draft: &FormDraft) -> Result<ValidSubmissionInput, FieldErrors> {
    let mut errors = FieldErrors::default();

    let full_name = draft.full_name.trim();
    if full_name.is_empty() {
        errors.insert(Field::FullName, FULL_NAME_REQUIRED);
    }

    let email = draft.email.trim();
    if !is_email(email) {
        errors.insert(Field::Email, INVALID_EMAIL);
    }

    let phone_number = draft.phone_number.trim();
    if !PHONE_RE.is_match(phone_number) {
        errors.insert(Field::PhoneNumber, INVALID_PHONE);
    }

    let age = match parse_whole_number(draft.age.trim()) {
        Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Some(age),
        Some(_) => {
            errors.insert(Field::Age, AGE_OUT_OF_RANGE);
            None
        }
        None => {
            errors.insert(Field::Age, AGE_NOT_A_NUMBER);
            None
        }
    };

    let preferred_contact = match draft.preferred_contact.parse::<PreferredContact>() {
        Ok(contact) => Some(contact),
        Err(_) => {
            errors.insert(Field::PreferredContact, CONTACT_REQUIRED);
            None
        }
    };

    let address = draft.address.trim();
    let address = (!address.is_empty()).then(|| address.to_string());

    match (age, preferred_contact) {
        (Some(age), Some(preferred_contact)) if errors.is_empty() => {
            Ok(ValidSubmissionInput(SubmissionInput {
                full_name: full_name.to_string(),
                email: email.to_string(),
                phone_number: phone_number.to_string(),
                age,
                address,
                preferred_contact,
            }))
        }
        _ => Err(errors),
    }
}

/// Integers, or numerals like `18.0` whose value is integral.
fn parse_whole_number(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
        .then_some(value as i64)
}

fn is_email(candidate: &str) -> bool {
    EMAIL_RE.is_match(candidate) && !candidate.contains("..") && !candidate.starts_with('.')
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
