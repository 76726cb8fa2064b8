// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form validation.
//!
//! Every field is checked independently and all failures are returned
//! together, so the form can show every problem in one round trip. Messages
//! are the Hebrew texts the site displays verbatim.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Local phone number: leading 0, one digit, then 7 or 8 digits, each
/// optionally preceded by a single hyphen or space.
pub const PHONE_PATTERN: &str = r"^0[0-9](?:[- ]?[0-9]){7,8}$";

const NAME_MIN_CHARS: usize = 2;
const DESCRIPTION_MIN_CHARS: usize = 10;

/// Validation error types.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("שם מלא חייב להכיל לפחות 2 תווים")]
    NameTooShort,

    #[error("מספר טלפון חסר")]
    MissingPhone,

    #[error("מספר טלפון לא תקין")]
    InvalidPhone,

    #[error("נא לבחור סוג פרויקט")]
    MissingProjectType,

    #[error("תיאור הפרויקט חייב להכיל לפחות 10 תווים")]
    DescriptionTooShort,
}

/// Kinds of project the contact form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Residential,
    Commercial,
    Institutional,
    Contractor,
    Emergency,
    Other,
}

impl ProjectType {
    pub const ALL: [ProjectType; 6] = [
        ProjectType::Residential,
        ProjectType::Commercial,
        ProjectType::Institutional,
        ProjectType::Contractor,
        ProjectType::Emergency,
        ProjectType::Other,
    ];

    /// Parse the form value; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Value submitted by the form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Institutional => "institutional",
            Self::Contractor => "contractor",
            Self::Emergency => "emergency",
            Self::Other => "other",
        }
    }

    /// Hebrew label used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Residential => "פרויקט מגורים",
            Self::Commercial => "פרויקט מסחרי",
            Self::Institutional => "פרויקט ציבורי",
            Self::Contractor => "קבלן / יזם",
            Self::Emergency => "שירות חירום",
            Self::Other => "אחר",
        }
    }
}

/// A validated, normalised submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub phone: String,
    /// Kept as submitted; unknown values are allowed through.
    pub project_type: String,
    pub description: String,
}

impl ContactSubmission {
    /// Hebrew label for the project type, or the raw value if unrecognised.
    pub fn project_type_label(&self) -> &str {
        match ProjectType::parse(&self.project_type) {
            Some(t) => t.label(),
            None => &self.project_type,
        }
    }
}

/// Contact form validator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactValidator;

impl ContactValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a raw JSON body.
    ///
    /// Absent, `null`, empty or non-string fields count as missing.
    pub fn validate(&self, body: &Value) -> Result<ContactSubmission, Vec<ValidationError>> {
        let name = string_field(body, "name");
        let phone = string_field(body, "phone");
        let project_type = string_field(body, "projectType");
        let description = string_field(body, "description");

        let mut errors = Vec::new();

        if !name.is_some_and(|n| trimmed_chars(n) >= NAME_MIN_CHARS) {
            errors.push(ValidationError::NameTooShort);
        }

        match phone {
            None => errors.push(ValidationError::MissingPhone),
            Some(p) if !is_valid_phone(p) => errors.push(ValidationError::InvalidPhone),
            Some(_) => {}
        }

        if project_type.is_none() {
            errors.push(ValidationError::MissingProjectType);
        }

        if !description.is_some_and(|d| trimmed_chars(d) >= DESCRIPTION_MIN_CHARS) {
            errors.push(ValidationError::DescriptionTooShort);
        }

        match (name, phone, project_type, description) {
            (Some(name), Some(phone), Some(project_type), Some(description))
                if errors.is_empty() =>
            {
                Ok(ContactSubmission {
                    name: name.trim().to_string(),
                    phone: phone.trim().to_string(),
                    project_type: project_type.to_string(),
                    description: description.trim().to_string(),
                })
            }
            _ => {
                debug!(?errors, "Submission failed validation");
                Err(errors)
            }
        }
    }
}

/// Check a phone number against [`PHONE_PATTERN`].
pub fn is_valid_phone(phone: &str) -> bool {
    static PHONE_RE: OnceLock<Regex> = OnceLock::new();
    PHONE_RE
        .get_or_init(|| Regex::new(PHONE_PATTERN).expect("literal phone pattern compiles"))
        .is_match(phone)
}

fn string_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Length in Unicode scalar values after trimming `White_Space` characters.
/// An astral character counts once, and U+FEFF is not whitespace so it is
/// kept and counted.
fn trimmed_chars(s: &str) -> usize {
    s.trim().chars().count()
}
