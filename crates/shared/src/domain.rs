use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseContactError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SubmissionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreferredContact {
    Email,
    Phone,
    Both,
}

impl PreferredContact {
    pub const ALL: [PreferredContact; 3] = [Self::Email, Self::Phone, Self::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Both => "Both",
        }
    }
}

impl fmt::Display for PreferredContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferredContact {
    type Err = ParseContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Email" => Ok(Self::Email),
            "Phone" => Ok(Self::Phone),
            "Both" => Ok(Self::Both),
            other => Err(ParseContactError(other.to_string())),
        }
    }
}

/// Server-owned submission as returned by the collection resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub age: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub preferred_contact: PreferredContact,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-writable subset of a [`Submission`], sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionInput {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub age: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub preferred_contact: PreferredContact,
}

impl From<&Submission> for SubmissionInput {
    fn from(value: &Submission) -> Self {
        Self {
            full_name: value.full_name.clone(),
            email: value.email.clone(),
            phone_number: value.phone_number.clone(),
            age: value.age,
            address: value.address.clone(),
            preferred_contact: value.preferred_contact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_contact_parses_exact_labels_only() {
        for contact in PreferredContact::ALL {
            assert_eq!(contact.as_str().parse::<PreferredContact>().ok(), Some(contact));
        }
        assert_eq!(" Both ".parse::<PreferredContact>().ok(), Some(PreferredContact::Both));
        assert!("".parse::<PreferredContact>().is_err());
        assert!("email".parse::<PreferredContact>().is_err());
    }

    #[test]
    fn submission_id_serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&SubmissionId(42)).expect("json"), "42");
    }

    #[test]
    fn input_omits_absent_address() {
        let input = SubmissionInput {
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone_number: "5551234".to_string(),
            age: 30,
            address: None,
            preferred_contact: PreferredContact::Phone,
        };
        let value = serde_json::to_value(&input).expect("json");
        assert!(value.get("address").is_none());
        assert_eq!(value["preferred_contact"], "Phone");
    }
}
