use askama::Template;

use crate::auth::reset::ResetStage;
use crate::auth::validate::LoginErrors;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub app_name: String,
    pub csrf_token: String,
    pub email: String,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
    pub error: Option<String>,
    pub flash: Option<String>,
}

impl LoginTemplate {
    pub fn new(app_name: &str, csrf_token: String) -> Self {
        Self {
            app_name: app_name.to_string(),
            csrf_token,
            email: String::new(),
            email_error: None,
            password_error: None,
            error: None,
            flash: None,
        }
    }

    pub fn with_field_errors(mut self, email: &str, errors: LoginErrors) -> Self {
        self.email = email.to_string();
        self.email_error = errors.email;
        self.password_error = errors.password;
        self
    }

    pub fn with_error(mut self, email: &str, error: &str) -> Self {
        self.email = email.to_string();
        self.error = Some(error.to_string());
        self
    }
}

#[derive(Template)]
#[template(path = "forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub app_name: String,
    pub csrf_token: String,
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "reset_password.html")]
pub struct ResetPasswordTemplate {
    pub app_name: String,
    pub csrf_token: String,
    pub token: String,
    pub invalid_message: Option<String>,
    pub success: bool,
    pub redirect_secs: u64,
    pub password_error: Option<String>,
    pub confirm_error: Option<String>,
    pub server_error: Option<String>,
}

impl ResetPasswordTemplate {
    pub fn new(app_name: &str, csrf_token: String, token: &str, stage: &ResetStage) -> Self {
        let mut tmpl = Self {
            app_name: app_name.to_string(),
            csrf_token,
            token: token.to_string(),
            invalid_message: None,
            success: false,
            redirect_secs: 0,
            password_error: None,
            confirm_error: None,
            server_error: None,
        };
        match stage {
            ResetStage::InvalidToken { message } => tmpl.invalid_message = Some(message.to_string()),
            ResetStage::Form { errors, server_error } => {
                tmpl.password_error = errors.password.clone();
                tmpl.confirm_error = errors.confirm.clone();
                tmpl.server_error = server_error.clone();
            }
            ResetStage::Success { redirect } => {
                tmpl.success = true;
                tmpl.redirect_secs = redirect.after.as_secs();
            }
        }
        tmpl
    }
}
