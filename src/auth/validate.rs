/// Field-level login errors. Submission is blocked while any is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginErrors {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

/// Field-level reset-password errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPasswordErrors {
    pub password: Option<String>,
    pub confirm: Option<String>,
}

impl NewPasswordErrors {
    pub fn is_empty(&self) -> bool {
        self.password.is_none() && self.confirm.is_none()
    }
}

pub const PASSWORD_MIN_LEN: usize = 8;

pub fn validate_login(email: &str, password: &str) -> LoginErrors {
    LoginErrors {
        email: validate_email(email),
        password: if password.is_empty() {
            Some("Password is required".to_string())
        } else {
            None
        },
    }
}

/// Validate an email: required, one '@', a non-empty local part and a
/// dotted domain, no whitespace.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 || !is_email(trimmed) {
        return Some("Invalid email address".to_string());
    }
    None
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// Password policy for new passwords: at least 8 characters with an
/// upper-case letter, a lower-case letter and a digit.
pub fn validate_password_policy(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Some(format!("Password must be at least {PASSWORD_MIN_LEN} characters"));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Some("Password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Some("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain a number".to_string());
    }
    None
}

pub fn validate_new_password(password: &str, confirm: &str) -> NewPasswordErrors {
    let confirm_error = if confirm.is_empty() {
        Some("Please confirm your password".to_string())
    } else if confirm != password {
        Some("Passwords do not match".to_string())
    } else {
        None
    };
    NewPasswordErrors { password: validate_password_policy(password), confirm: confirm_error }
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}
