//! Submitted forms and the validation schemas they are bound to.
//!
//! Validation runs before any backend call; a failing form is re-rendered with
//! one message per offending field.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::models::{
    ActivityDraft, LoginRequest, NewsDraft, ProfileUpdate, RegisterRequest, ReviewDraft,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    MinLen(usize),
    MaxLen(usize),
    Email,
    /// Must equal the value of the named field.
    SameAs(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

const fn check(field: &'static str, rule: Rule, message: &'static str) -> Check {
    Check {
        field,
        rule,
        message,
    }
}

pub type Schema = &'static [Check];

pub const ACTIVITY_SCHEMA: Schema = &[
    check("title", Rule::Required, "Title is required"),
    check("title", Rule::MinLen(2), "Minimum 2 characters"),
    check("address", Rule::Required, "Address is required"),
    check("startDate", Rule::Required, "Date is required"),
    check("description", Rule::Required, "Description is required"),
];

pub const REVIEW_SCHEMA: Schema = &[
    check("title", Rule::Required, "Title is required"),
    check("description", Rule::Required, "Description is required"),
];

pub const RESPONSE_SCHEMA: Schema = &[check("content", Rule::Required, "Response cannot be empty")];

pub const NEWS_SCHEMA: Schema = &[
    check("title", Rule::Required, "Title is required"),
    check("description", Rule::Required, "Description is required"),
];

pub const LOGIN_SCHEMA: Schema = &[
    check("username", Rule::Required, "Mandatory field"),
    check("password", Rule::Required, "Mandatory field"),
];

pub const REGISTER_SCHEMA: Schema = &[
    check("username", Rule::Required, "Mandatory field"),
    check("username", Rule::MinLen(2), "Minimum 2 characters"),
    check("username", Rule::MaxLen(20), "Maximum 20 characters"),
    check("email", Rule::Required, "Mandatory field"),
    check("email", Rule::Email, "Wrong email format"),
    check("password", Rule::Required, "Mandatory field"),
    check("password", Rule::MinLen(2), "Minimum 2 characters"),
    check("password", Rule::MaxLen(20), "Maximum 20 characters"),
];

pub const FORGOT_PASSWORD_SCHEMA: Schema = &[
    check("email", Rule::Required, "Mandatory field"),
    check("email", Rule::Email, "Wrong email format"),
];

pub const RESET_PASSWORD_SCHEMA: Schema = &[
    check("password", Rule::Required, "Mandatory field"),
    check(
        "password",
        Rule::MinLen(8),
        "Password must be at least 8 characters long",
    ),
    check(
        "confirmPassword",
        Rule::SameAs("password"),
        "Passwords do not match",
    ),
];

pub const PROFILE_SCHEMA: Schema = &[
    check("username", Rule::Required, "Mandatory field"),
    check("email", Rule::Required, "Mandatory field"),
    check("email", Rule::Email, "Wrong email format"),
];

/// Field lookup by the name used in the HTML form.
pub trait FormValues {
    fn value(&self, field: &str) -> &str;
}

/// First failing message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    /// Message for `field`, or an empty string when it passed.
    pub fn message(&self, field: &str) -> &str {
        self.0.get(field).copied().unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

pub fn validate<F: FormValues>(form: &F, schema: Schema) -> Result<(), FieldErrors> {
    let mut errors = BTreeMap::new();
    for c in schema {
        if errors.contains_key(c.field) {
            continue;
        }
        if !passes(form, c) {
            errors.insert(c.field, c.message);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FieldErrors(errors))
    }
}

fn passes<F: FormValues>(form: &F, c: &Check) -> bool {
    let raw = form.value(c.field);
    let value = raw.trim();
    match c.rule {
        Rule::Required => !value.is_empty(),
        // Length rules leave empty values to `Required`.
        Rule::MinLen(min) => value.is_empty() || value.chars().count() >= min,
        Rule::MaxLen(max) => value.chars().count() <= max,
        Rule::Email => value.is_empty() || looks_like_email(value),
        Rule::SameAs(other) => raw == form.value(other),
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, rename = "startDate")]
    pub start_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl FormValues for ActivityForm {
    fn value(&self, field: &str) -> &str {
        match field {
            "title" => &self.title,
            "address" => &self.address,
            "startDate" => &self.start_date,
            "description" => &self.description,
            "image" => &self.image,
            _ => "",
        }
    }
}

impl ActivityForm {
    pub fn to_draft(&self) -> ActivityDraft {
        ActivityDraft {
            title: self.title.trim().to_string(),
            address: self.address.trim().to_string(),
            start_date: self.start_date.trim().to_string(),
            description: self.description.trim().to_string(),
            image: self.image.trim().to_string(),
        }
    }
}

impl From<&ActivityDraft> for ActivityForm {
    fn from(draft: &ActivityDraft) -> Self {
        Self {
            title: draft.title.clone(),
            address: draft.address.clone(),
            start_date: draft.start_date.clone(),
            description: draft.description.clone(),
            image: draft.image.clone(),
        }
    }
}

/// Shared by reviews and news: both are a title plus a description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitledForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl FormValues for TitledForm {
    fn value(&self, field: &str) -> &str {
        match field {
            "title" => &self.title,
            "description" => &self.description,
            _ => "",
        }
    }
}

impl TitledForm {
    pub fn to_review_draft(&self, created_by_id: Option<i64>) -> ReviewDraft {
        ReviewDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            created_by_id,
        }
    }

    pub fn to_news_draft(&self) -> NewsDraft {
        NewsDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseForm {
    #[serde(default)]
    pub content: String,
}

impl FormValues for ResponseForm {
    fn value(&self, field: &str) -> &str {
        match field {
            "content" => &self.content,
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl FormValues for LoginForm {
    fn value(&self, field: &str) -> &str {
        match field {
            "username" => &self.username,
            "password" => &self.password,
            _ => "",
        }
    }
}

impl LoginForm {
    pub fn to_request(&self) -> LoginRequest {
        LoginRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl FormValues for RegisterForm {
    fn value(&self, field: &str) -> &str {
        match field {
            "username" => &self.username,
            "email" => &self.email,
            "password" => &self.password,
            _ => "",
        }
    }
}

impl RegisterForm {
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
}

impl FormValues for ForgotPasswordForm {
    fn value(&self, field: &str) -> &str {
        match field {
            "email" => &self.email,
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confirmPassword")]
    pub confirm_password: String,
}

impl FormValues for ResetPasswordForm {
    fn value(&self, field: &str) -> &str {
        match field {
            "token" => &self.token,
            "password" => &self.password,
            "confirmPassword" => &self.confirm_password,
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl FormValues for ProfileForm {
    fn value(&self, field: &str) -> &str {
        match field {
            "username" => &self.username,
            "email" => &self.email,
            _ => "",
        }
    }
}

impl ProfileForm {
    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yoga() -> ActivityForm {
        ActivityForm {
            title: "Yoga".into(),
            address: "Park".into(),
            start_date: "2024-05-01".into(),
            description: "Morning session".into(),
            image: String::new(),
        }
    }

    #[test]
    fn complete_activity_passes() {
        assert_eq!(validate(&yoga(), ACTIVITY_SCHEMA), Ok(()));
    }

    #[test]
    fn reports_first_failure_per_field() {
        let form = ActivityForm {
            title: "Y".into(),
            address: "   ".into(),
            ..yoga()
        };
        let errors = validate(&form, ACTIVITY_SCHEMA).unwrap_err();
        assert_eq!(errors.message("title"), "Minimum 2 characters");
        assert_eq!(errors.message("address"), "Address is required");
        assert_eq!(errors.message("description"), "");
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["address", "title"]);
    }

    #[test]
    fn empty_title_is_required_not_too_short() {
        let form = ActivityForm {
            title: String::new(),
            ..yoga()
        };
        let errors = validate(&form, ACTIVITY_SCHEMA).unwrap_err();
        assert_eq!(errors.message("title"), "Title is required");
    }

    #[test]
    fn registration_limits_and_email() {
        let form = RegisterForm {
            username: "a".repeat(21),
            email: "anna.example.org".into(),
            password: "pw".into(),
        };
        let errors = validate(&form, REGISTER_SCHEMA).unwrap_err();
        assert_eq!(errors.message("username"), "Maximum 20 characters");
        assert_eq!(errors.message("email"), "Wrong email format");
        assert_eq!(errors.message("password"), "");
    }

    #[test]
    fn reset_password_needs_matching_long_password() {
        let short = ResetPasswordForm {
            token: "t".into(),
            password: "short".into(),
            confirm_password: "short".into(),
        };
        assert_eq!(
            validate(&short, RESET_PASSWORD_SCHEMA)
                .unwrap_err()
                .message("password"),
            "Password must be at least 8 characters long"
        );

        let mismatch = ResetPasswordForm {
            token: "t".into(),
            password: "long enough".into(),
            confirm_password: "long enougH".into(),
        };
        assert_eq!(
            validate(&mismatch, RESET_PASSWORD_SCHEMA)
                .unwrap_err()
                .message("confirmPassword"),
            "Passwords do not match"
        );
    }

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("anna@example.org"));
        assert!(!looks_like_email("anna@"));
        assert!(!looks_like_email("@example.org"));
        assert!(!looks_like_email("anna@localhost"));
        assert!(!looks_like_email("an na@example.org"));
        assert!(!looks_like_email("a@b@example.org"));
    }

    #[test]
    fn drafts_are_trimmed() {
        let form = ActivityForm {
            title: "  Yoga ".into(),
            ..yoga()
        };
        assert_eq!(form.to_draft().title, "Yoga");
    }
}
