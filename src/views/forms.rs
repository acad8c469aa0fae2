//! Login and register forms
//!
//! Only presence/format checks happen here; everything else is the
//! server's call.

use crate::api::{Credentials, Registration};
use regex::Regex;
use std::sync::OnceLock;

pub const MIN_PASSWORD_LEN: usize = 6;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// One editable single-line input
#[derive(Debug, Clone, Default)]
pub struct TextField {
    pub label: &'static str,
    pub value: String,
    /// Rendered as bullets
    pub secret: bool,
    pub error: Option<String>,
}

impl TextField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Default::default()
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            label,
            secret: true,
            ..Default::default()
        }
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
        self.error = None;
    }

    pub fn backspace(&mut self) {
        self.value.pop();
        self.error = None;
    }

    pub fn display_value(&self) -> String {
        if self.secret {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Shared focus and editing behavior for both forms
#[derive(Debug, Clone)]
pub struct Form {
    fields: Vec<TextField>,
    focus: usize,
    /// Message from the last failed submit (server side)
    pub banner: Option<String>,
    pub submitting: bool,
}

impl Form {
    fn new(fields: Vec<TextField>) -> Self {
        Self {
            fields,
            focus: 0,
            banner: None,
            submitting: false,
        }
    }

    pub fn fields(&self) -> &[TextField] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn input(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.push(c);
        }
        self.banner = None;
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.backspace();
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    fn set_error(&mut self, index: usize, message: &str) {
        if let Some(field) = self.fields.get_mut(index) {
            field.error = Some(message.to_string());
        }
    }

    fn clear_errors(&mut self) {
        for field in &mut self.fields {
            field.error = None;
        }
    }

    fn has_errors(&self) -> bool {
        self.fields.iter().any(|f| f.error.is_some())
    }

    /// Move focus to the first invalid field
    fn focus_first_error(&mut self) {
        if let Some(i) = self.fields.iter().position(|f| f.error.is_some()) {
            self.focus = i;
        }
    }

    pub fn clear_secrets(&mut self) {
        for field in self.fields.iter_mut().filter(|f| f.secret) {
            field.value.clear();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Login
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub form: Form,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    const USERNAME: usize = 0;
    const PASSWORD: usize = 1;

    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                TextField::new("Username"),
                TextField::secret("Password"),
            ]),
        }
    }

    /// Validate and build the request body, marking invalid fields
    pub fn submit(&mut self) -> Option<Credentials> {
        let form = &mut self.form;
        form.clear_errors();
        if form.value(Self::USERNAME).trim().is_empty() {
            form.set_error(Self::USERNAME, "Please input your username!");
        }
        if form.value(Self::PASSWORD).is_empty() {
            form.set_error(Self::PASSWORD, "Please input your password!");
        }
        if form.has_errors() {
            form.focus_first_error();
            return None;
        }

        Some(Credentials {
            username: form.value(Self::USERNAME).trim().to_string(),
            password: form.value(Self::PASSWORD).to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Register
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub form: Form,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterForm {
    const USERNAME: usize = 0;
    const EMAIL: usize = 1;
    const PASSWORD: usize = 2;
    const CONFIRM: usize = 3;

    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                TextField::new("Username"),
                TextField::new("Email"),
                TextField::secret("Password"),
                TextField::secret("Confirm Password"),
            ]),
        }
    }

    pub fn submit(&mut self) -> Option<Registration> {
        let form = &mut self.form;
        form.clear_errors();

        let username = form.value(Self::USERNAME).trim().to_string();
        let email = form.value(Self::EMAIL).trim().to_string();
        let password = form.value(Self::PASSWORD).to_string();
        let confirm = form.value(Self::CONFIRM).to_string();

        if username.is_empty() {
            form.set_error(Self::USERNAME, "Please input your username!");
        }
        if email.is_empty() {
            form.set_error(Self::EMAIL, "Please input your email!");
        } else if !is_valid_email(&email) {
            form.set_error(Self::EMAIL, "Please enter a valid email!");
        }
        if password.is_empty() {
            form.set_error(Self::PASSWORD, "Please input your password!");
        } else if password.chars().count() < MIN_PASSWORD_LEN {
            form.set_error(
                Self::PASSWORD,
                "Password must be at least 6 characters long!",
            );
        }
        if confirm.is_empty() {
            form.set_error(Self::CONFIRM, "Please confirm your password!");
        } else if confirm != password {
            form.set_error(Self::CONFIRM, "The two passwords do not match!");
        }

        if form.has_errors() {
            form.focus_first_error();
            return None;
        }

        Some(Registration {
            username,
            email,
            password,
            password2: confirm,
        })
    }
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    match EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()) {
        Some(re) => re.is_match(email),
        None => email.contains('@'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.input(c);
        }
    }

    fn fill_register(values: [&str; 4]) -> RegisterForm {
        let mut register = RegisterForm::new();
        for value in values {
            type_into(&mut register.form, value);
            register.form.focus_next();
        }
        register
    }

    #[test]
    fn login_requires_both_fields() {
        let mut login = LoginForm::new();
        assert!(login.submit().is_none());
        assert!(login.form.fields().iter().all(|f| f.error.is_some()));

        type_into(&mut login.form, "alice");
        login.form.focus_next();
        type_into(&mut login.form, "secret");
        let creds = login.submit().unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn register_checks_email_length_and_match() {
        let mut register = fill_register(["bob", "not-an-email", "123", "456"]);
        assert!(register.submit().is_none());

        let errors: Vec<_> = register
            .form
            .fields()
            .iter()
            .map(|f| f.error.as_deref())
            .collect();
        assert_eq!(errors[0], None);
        assert_eq!(errors[1], Some("Please enter a valid email!"));
        assert_eq!(errors[2], Some("Password must be at least 6 characters long!"));
        assert_eq!(errors[3], Some("The two passwords do not match!"));
        assert_eq!(register.form.focus(), 1);
    }

    #[test]
    fn valid_registration_builds_payload() {
        let mut register = fill_register(["bob", "bob@example.com", "secret1", "secret1"]);
        let payload = register.submit().unwrap();
        assert_eq!(payload.email, "bob@example.com");
        assert_eq!(payload.password2, "secret1");
    }

    #[test]
    fn secrets_are_masked() {
        let mut login = LoginForm::new();
        login.form.focus_next();
        type_into(&mut login.form, "abc");
        assert_eq!(login.form.fields()[1].display_value(), "•••");
        login.form.clear_secrets();
        assert!(login.form.fields()[1].value.is_empty());
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut login = LoginForm::new();
        login.form.focus_prev();
        assert_eq!(login.form.focus(), 1);
        login.form.focus_next();
        assert_eq!(login.form.focus(), 0);
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.io"));
    }
}
