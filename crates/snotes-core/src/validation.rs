//! Client-side form checks run before anything is submitted.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

const MIN_NAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 8;

/// Field name to message, in stable field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}

/// Registration form as entered by the user
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_to_terms: bool,
}

impl SignupForm {
    /// Name sent to the backend
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.insert("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.insert("email", "Please enter a valid email address");
    }
}

fn check_name(errors: &mut ValidationErrors, field: &'static str, label: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.insert(field, format!("{label} is required"));
    } else if value.chars().count() < MIN_NAME_CHARS {
        errors.insert(
            field,
            format!("{label} must be at least {MIN_NAME_CHARS} characters"),
        );
    }
}

fn check_password_strength(errors: &mut ValidationErrors, password: &str) {
    if password.is_empty() {
        errors.insert("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.insert(
            "password",
            format!("Password must be at least {MIN_PASSWORD_CHARS} characters"),
        );
    } else {
        let has_lower = password.chars().any(char::is_lowercase);
        let has_upper = password.chars().any(char::is_uppercase);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !(has_lower && has_upper && has_digit) {
            errors.insert(
                "password",
                "Password must contain uppercase, lowercase, and number",
            );
        }
    }
}

pub fn validate_signup(form: &SignupForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_name(&mut errors, "first_name", "First name", &form.first_name);
    check_name(&mut errors, "last_name", "Last name", &form.last_name);
    check_email(&mut errors, &form.email);
    check_password_strength(&mut errors, &form.password);

    if form.confirm_password.is_empty() {
        errors.insert("confirm_password", "Please confirm your password");
    } else if form.password != form.confirm_password {
        errors.insert("confirm_password", "Passwords do not match");
    }

    if !form.agree_to_terms {
        errors.insert(
            "agree_to_terms",
            "You must agree to the terms and conditions",
        );
    }

    errors.into_result()
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.insert("password", "Password is required");
    }
    errors.into_result()
}

pub fn validate_invite_email(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, email);
    errors.into_result()
}
