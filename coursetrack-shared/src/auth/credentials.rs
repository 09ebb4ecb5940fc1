/// Registration and profile input validation
///
/// Inputs are normalized first (emails trimmed and lower-cased, names
/// trimmed) and then checked with `validator`. Every violation is collected,
/// but the error message reported to the caller is the highest-priority one:
///
/// 1. a required field is empty: `All fields are required`
/// 2. the email is malformed: `Invalid email format`
/// 3. the password is too short: `Password must be at least 6 characters long`
///
/// # Example
///
/// ```
/// use coursetrack_shared::auth::credentials::Registration;
///
/// let input = Registration::new(" A@B.com ", "secret1", "A", "B");
/// assert_eq!(input.email, "a@b.com");
/// assert!(input.check().is_ok());
///
/// let err = Registration::new("a@b.com", "123", "", "B").check().unwrap_err();
/// assert_eq!(err.message, "All fields are required");
/// assert_eq!(err.fields.len(), 2);
/// ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::password::{validate_password_length, PASSWORD_TOO_SHORT};

pub const FIELDS_REQUIRED: &str = "All fields are required";
pub const INVALID_EMAIL: &str = "Invalid email format";

const CODE_REQUIRED: &str = "required";
const CODE_EMAIL: &str = "email";
const CODE_PASSWORD: &str = "password_length";

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Rejected input: the reported message plus every field violation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InvalidInput {
    pub message: String,
    pub fields: Vec<FieldViolation>,
}

impl InvalidInput {
    /// A single-field rejection
    pub fn field(field: &str, message: &str) -> Self {
        Self {
            message: message.to_string(),
            fields: vec![FieldViolation {
                field: field.to_string(),
                message: message.to_string(),
            }],
        }
    }

    fn from_errors(errors: &ValidationErrors) -> Self {
        // (rank, field, message)
        let mut found: Vec<(u8, String, String)> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string());
                    (rank(&error.code), field.to_string(), message)
                })
            })
            .collect();

        found.sort();

        let message = found
            .first()
            .map(|(_, _, message)| message.clone())
            .unwrap_or_else(|| "Validation failed".to_string());

        Self {
            message,
            fields: found
                .into_iter()
                .map(|(_, field, message)| FieldViolation { field, message })
                .collect(),
        }
    }
}

fn rank(code: &str) -> u8 {
    match code {
        CODE_REQUIRED => 0,
        CODE_EMAIL => 1,
        CODE_PASSWORD => 2,
        _ => 3,
    }
}

/// Trims and lower-cases an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the
/// domain with at least one character on either side
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    // emptiness is reported by the length check
    if email.is_empty() || is_valid_email(email) {
        return Ok(());
    }
    let mut error = ValidationError::new(CODE_EMAIL);
    error.message = Some(Cow::Borrowed(INVALID_EMAIL));
    Err(error)
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Ok(());
    }
    validate_password_length(password).map_err(|_| {
        let mut error = ValidationError::new(CODE_PASSWORD);
        error.message = Some(Cow::Borrowed(PASSWORD_TOO_SHORT));
        error
    })
}

/// New-account input
#[derive(Debug, Clone, Validate)]
pub struct Registration {
    #[validate(
        length(min = 1, code = "required", message = "All fields are required"),
        custom(function = "validate_email_format")
    )]
    pub email: String,

    #[validate(
        length(min = 1, code = "required", message = "All fields are required"),
        custom(function = "validate_password")
    )]
    pub password: String,

    #[validate(length(min = 1, code = "required", message = "All fields are required"))]
    pub first_name: String,

    #[validate(length(min = 1, code = "required", message = "All fields are required"))]
    pub last_name: String,
}

impl Registration {
    /// Builds a normalized registration; the password is kept verbatim
    pub fn new(email: &str, password: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            email: normalize_email(email),
            password: password.to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
        }
    }

    pub fn check(&self) -> Result<(), InvalidInput> {
        self.validate().map_err(|e| InvalidInput::from_errors(&e))
    }
}

/// Changes to an existing account; absent fields are left alone
#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileChanges {
    #[validate(
        length(min = 1, code = "required", message = "All fields are required"),
        custom(function = "validate_email_format")
    )]
    pub email: Option<String>,

    #[validate(
        length(min = 1, code = "required", message = "All fields are required"),
        custom(function = "validate_password")
    )]
    pub password: Option<String>,

    #[validate(length(min = 1, code = "required", message = "All fields are required"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, code = "required", message = "All fields are required"))]
    pub last_name: Option<String>,
}

impl ProfileChanges {
    pub fn new(
        email: Option<&str>,
        password: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Self {
        Self {
            email: email.map(normalize_email),
            password: password.map(str::to_string),
            first_name: first_name.map(|s| s.trim().to_string()),
            last_name: last_name.map(|s| s.trim().to_string()),
        }
    }

    pub fn check(&self) -> Result<(), InvalidInput> {
        self.validate().map_err(|e| InvalidInput::from_errors(&e))
    }
}
