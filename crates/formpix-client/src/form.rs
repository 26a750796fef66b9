//! Contact form model.

use formpix_core::IntakeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

const MISSING_FIELD: &str = "Please fill in all required fields";
const INVALID_EMAIL: &str = "Please enter a valid email address.";

/// Required fields, in the order problems are reported.
const REQUIRED_FIELDS: [(&str, &str); 4] = [
    ("first_name", "first name"),
    ("last_name", "last name"),
    ("email", "email"),
    ("message", "message"),
];

/// Package the enquiry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Basic,
    Standard,
    Ultimate,
    Consultation,
    Other,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Basic => "basic",
            Service::Standard => "standard",
            Service::Ultimate => "ultimate",
            Service::Consultation => "consultation",
            Service::Other => "other",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Service::Basic),
            "standard" => Ok(Service::Standard),
            "ultimate" => Ok(Service::Ultimate),
            "consultation" => Ok(Service::Consultation),
            "other" => Ok(Service::Other),
            other => Err(format!(
                "Unknown service '{}'. Expected one of: basic, standard, ultimate, consultation, other",
                other
            )),
        }
    }
}

/// Fields of the "get in touch" form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[validate(custom(function = "not_blank", message = "Please fill in all required fields"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank", message = "Please fill in all required fields"))]
    pub last_name: String,
    #[validate(
        custom(function = "not_blank", message = "Please fill in all required fields"),
        email(message = "Please enter a valid email address.")
    )]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service: Option<Service>,
    #[validate(custom(function = "not_blank", message = "Please fill in all required fields"))]
    pub message: String,
    /// Hidden field; humans leave it empty.
    #[serde(default)]
    pub honey: String,
}

impl ContactForm {
    /// A filled-in honeypot means the form was submitted by a bot.
    pub fn is_bot(&self) -> bool {
        !self.honey.trim().is_empty()
    }

    /// Check required fields (first name, last name, email, message) and the
    /// email's shape. Reports the first problem found.
    pub fn validate_fields(&self) -> Result<(), IntakeError> {
        self.validate()
            .map_err(|errors| IntakeError::InvalidForm(first_problem(&errors)))
    }

    /// Url-encoded fields for the spreadsheet webhook.
    pub fn webhook_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("firstName", self.first_name.trim().to_string()),
            ("lastName", self.last_name.trim().to_string()),
            ("email", self.email.trim().to_string()),
            ("phone", self.phone.trim().to_string()),
            (
                "service",
                self.service.map(|s| s.as_str().to_string()).unwrap_or_default(),
            ),
            ("message", self.message.trim().to_string()),
            ("honey", self.honey.clone()),
        ]
    }

    /// Text parts of the multipart enquiry; the message travels as `description`.
    pub fn enquiry_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("firstName", self.first_name.trim().to_string()),
            ("lastName", self.last_name.trim().to_string()),
            ("email", self.email.trim().to_string()),
            ("phone", self.phone.trim().to_string()),
            ("description", self.message.trim().to_string()),
        ];
        if let Some(service) = self.service {
            fields.push(("service", service.as_str().to_string()));
        }
        fields
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn first_problem(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    for (field, label) in REQUIRED_FIELDS {
        let Some(field_errors) = fields.get(field) else {
            continue;
        };
        if field_errors.iter().any(|e| e.code == "blank") {
            return format!("{} (missing: {}).", MISSING_FIELD, label);
        }
        if field_errors.iter().any(|e| e.code == "email") {
            return INVALID_EMAIL.to_string();
        }
    }
    format!("Validation error: {}", errors)
}
