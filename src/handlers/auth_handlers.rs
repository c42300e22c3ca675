use actix_session::Session;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::api::{ApiError, LoginRequest};
use crate::auth::reset::{LINK_SENT_MESSAGE, LinkRequest, ResetPasswordFlow, ResetStage};
use crate::auth::session::{self, SessionUser};
use crate::auth::{csrf, rate_limit::RateLimiter, validate};
use crate::errors::{AppError, render, see_other};
use crate::state::AppState;
use crate::templates_structs::{ForgotPasswordTemplate, LoginTemplate, ResetPasswordTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct ForgotForm {
    pub email: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct TokenParams {
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetForm {
    pub password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

pub async fn login_page(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    // If already logged in, redirect to dashboard
    if session::get_user(&session).is_some() {
        return Ok(see_other("/dashboard"));
    }

    let csrf_token = csrf::get_or_create_token(&session);
    let mut tmpl = LoginTemplate::new(&state.config.app_name, csrf_token);
    tmpl.flash = session::take_flash(&session);
    render(tmpl)
}

pub async fn login_submit(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let csrf_token = csrf::get_or_create_token(&session);
    let app_name = &state.config.app_name;

    // Field validation happens before anything leaves this server
    let errors = validate::validate_login(&form.email, &form.password);
    if !errors.is_empty() {
        return render(LoginTemplate::new(app_name, csrf_token).with_field_errors(&form.email, errors));
    }

    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        return render(LoginTemplate::new(app_name, csrf_token).with_error(
            &form.email,
            "Too many failed login attempts. Please try again later.",
        ));
    }

    let request = LoginRequest {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    };
    match state.api.login(&request).await {
        Ok(auth) => {
            limiter.clear(ip);
            let user = SessionUser::from(auth);
            log::info!("User {} signed in", user.id);
            session::set_user(&session, &user)?;
            Ok(see_other("/dashboard"))
        }
        Err(ApiError::Unauthorized) | Err(ApiError::Status { status: 400..=403, .. }) => {
            limiter.record_failure(ip);
            render(LoginTemplate::new(app_name, csrf_token)
                .with_error(&form.email, "Invalid email or password"))
        }
        Err(e) => {
            log::error!("Login request failed: {e}");
            render(LoginTemplate::new(app_name, csrf_token).with_error(
                &form.email,
                "Unable to sign in right now. Please try again.",
            ))
        }
    }
}

pub async fn logout(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    if let Some(user) = session::get_user(&session) {
        state.cache.clear_scope(&user.scope());
        log::info!("User {} signed out", user.id);
    }
    session.purge();
    Ok(see_other("/login"))
}

pub async fn forgot_page(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    render(ForgotPasswordTemplate {
        app_name: state.config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(&session),
        email: String::new(),
        error: None,
        notice: None,
    })
}

pub async fn forgot_submit(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<ForgotForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let flow = ResetPasswordFlow::new(&state.api, state.config.reset_redirect_after);
    let mut tmpl = ForgotPasswordTemplate {
        app_name: state.config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(&session),
        email: form.email.clone(),
        error: None,
        notice: None,
    };
    match flow.request_link(&form.email).await {
        LinkRequest::Sent => {
            tmpl.email.clear();
            tmpl.notice = Some(LINK_SENT_MESSAGE.to_string());
        }
        LinkRequest::Rejected(error) | LinkRequest::Failed(error) => tmpl.error = Some(error),
    }
    render(tmpl)
}

pub async fn reset_page(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<TokenParams>,
) -> Result<HttpResponse, AppError> {
    let flow = ResetPasswordFlow::new(&state.api, state.config.reset_redirect_after);
    let token = query.token.as_deref();
    let stage = flow.verify(token).await;

    render(ResetPasswordTemplate::new(
        &state.config.app_name,
        csrf::get_or_create_token(&session),
        token.unwrap_or_default(),
        &stage,
    ))
}

pub async fn reset_submit(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<TokenParams>,
    form: web::Form<ResetForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let flow = ResetPasswordFlow::new(&state.api, state.config.reset_redirect_after);
    let token = query.token.as_deref();
    let stage = flow
        .submit(token, &form.password, &form.confirm_password)
        .await;

    let tmpl = ResetPasswordTemplate::new(
        &state.config.app_name,
        csrf::get_or_create_token(&session),
        token.unwrap_or_default(),
        &stage,
    );
    let mut response = render(tmpl)?;
    if let ResetStage::Success { redirect } = &stage {
        session::set_flash(&session, "Your password has been reset. Please sign in.");
        if let Ok(value) = HeaderValue::from_str(&redirect.refresh_header()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("refresh"), value);
        }
    }
    Ok(response)
}
