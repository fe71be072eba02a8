//! Registration form validation.
//!
//! All checks run locally so that malformed input never reaches the
//! backend. Phone numbers are accepted in Yemeni or Saudi formats, local or
//! international, and normalized to international form before sending.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LEN: usize = 6;

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("static email pattern"));

#[allow(clippy::expect_used)]
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+9677\d{8}|\+9665\d{8}|7\d{8,9}|05\d{8})$").expect("static phone pattern")
});

#[allow(clippy::expect_used)]
static YEMENI_LOCAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^7\d{8,9}$").expect("static pattern"));

#[allow(clippy::expect_used)]
static SAUDI_LOCAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^05\d{8}$").expect("static pattern"));

/// Rewrites a local phone number to international form.
///
/// Spaces and dashes are removed. `7xxxxxxxx` gets `+967`, `05xxxxxxxx`
/// becomes `+9665xxxxxxxx`. Numbers already starting with `+`, and anything
/// else, are returned unchanged apart from the cleanup.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let phone: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if phone.is_empty() || phone.starts_with('+') {
        return phone;
    }
    if YEMENI_LOCAL_RE.is_match(&phone) {
        return format!("+967{phone}");
    }
    if SAUDI_LOCAL_RE.is_match(&phone) {
        return format!("+966{}", &phone[1..]);
    }
    phone
}

/// Raw input of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Phone number as typed.
    pub phone: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

/// Validated `POST /auth/register` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    /// Display name.
    pub name: String,
    /// Trimmed e-mail.
    pub email: String,
    /// Phone in international form.
    pub phone: String,
    /// Password.
    pub password: String,
    /// Confirmation.
    pub confirm_password: String,
    /// Same confirmation under the alternate field name some backends read.
    pub password_confirm: String,
}

impl RegistrationForm {
    /// Validates the form and builds the request payload.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in form order: missing fields,
    /// e-mail shape, phone format, password length, password confirmation.
    pub fn validate(&self) -> DomainResult<RegistrationPayload> {
        let email = self.email.trim();
        let phone = self.phone.trim();

        for (field, value) in [
            ("name", self.name.as_str()),
            ("email", email),
            ("phone", phone),
            ("password", self.password.as_str()),
            ("confirm_password", self.confirm_password.as_str()),
        ] {
            if value.is_empty() {
                return Err(DomainError::MissingField(field));
            }
        }

        if !EMAIL_RE.is_match(email) {
            return Err(DomainError::InvalidEmail(email.to_string()));
        }
        if !PHONE_RE.is_match(phone) {
            return Err(DomainError::InvalidPhone(phone.to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        if self.password != self.confirm_password {
            return Err(DomainError::PasswordMismatch);
        }

        Ok(RegistrationPayload {
            name: self.name.clone(),
            email: email.to_string(),
            phone: normalize_phone(phone),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            password_confirm: self.confirm_password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: "Ahmed".into(),
            email: " ahmed@example.com ".into(),
            phone: "772292869".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        }
    }

    #[test]
    fn normalizes_local_numbers() {
        assert_eq!(normalize_phone("772292869"), "+967772292869");
        assert_eq!(normalize_phone("0563713163"), "+966563713163");
        assert_eq!(normalize_phone("056-371 3163"), "+966563713163");
        assert_eq!(normalize_phone("+966563713163"), "+966563713163");
        assert_eq!(normalize_phone("12345"), "12345");
        assert_eq!(normalize_phone("  "), "");
    }

    #[test]
    fn valid_form_builds_payload() {
        let payload = form().validate();
        let payload = payload.as_ref().map(|p| (p.email.as_str(), p.phone.as_str()));
        assert_eq!(payload, Ok(("ahmed@example.com", "+967772292869")));
    }

    #[test]
    fn payload_serializes_both_confirmation_names() {
        let Ok(payload) = form().validate() else {
            unreachable!("form is valid");
        };
        let value = serde_json::to_value(&payload).unwrap_or_default();
        assert_eq!(value["confirmPassword"], "secret1");
        assert_eq!(value["passwordConfirm"], "secret1");
    }

    #[test]
    fn missing_fields_are_reported_first() {
        let mut f = form();
        f.name.clear();
        f.password = "1".into();
        assert_eq!(f.validate(), Err(DomainError::MissingField("name")));
    }

    #[test]
    fn rejects_bad_email_and_phone() {
        let mut f = form();
        f.email = "not-an-email".into();
        assert!(matches!(f.validate(), Err(DomainError::InvalidEmail(_))));

        let mut f = form();
        f.phone = "+201001234567".into();
        assert!(matches!(f.validate(), Err(DomainError::InvalidPhone(_))));
    }

    #[test]
    fn rejects_short_or_mismatched_passwords() {
        let mut f = form();
        f.password = "abc".into();
        f.confirm_password = "abc".into();
        assert_eq!(
            f.validate(),
            Err(DomainError::PasswordTooShort { min: MIN_PASSWORD_LEN })
        );

        let mut f = form();
        f.confirm_password = "secret2".into();
        assert_eq!(f.validate(), Err(DomainError::PasswordMismatch));
    }
}
