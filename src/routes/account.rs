use crate::{
    auth::{
        expired_session_cookie, generate_token, safe_return_url, session_cookie,
        AccountFormView, CurrentUser, LoginForm, LoginView, RegisterForm, SessionKeys,
        LOGIN_PATH,
    },
    error::AppError,
    identity::{AccountError, AccountViolation, CredentialStore},
    locale::{FieldErrors, Locale},
    models::{NewAccount, User},
    routes::see_other,
    security::{validate_antiforgery, AntiForgeryForm},
};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct ReturnUrlQuery {
    #[serde(rename = "ReturnUrl")]
    pub return_url: Option<String>,
}

/// Login page. Anonymous.
#[get("/Login")]
pub async fn login_form(query: web::Query<ReturnUrlQuery>) -> HttpResponse {
    HttpResponse::Ok().json(LoginView {
        return_url: query.into_inner().return_url,
    })
}

/// Signs a user in.
///
/// ## Responses:
/// - `303 See Other` to the local `ReturnUrl`, or `/Tasks`, with the session cookie set.
/// - `401 Unauthorized`: unknown user name or wrong password; the message does not say which.
/// - `422 Unprocessable Entity`: user name or password left empty.
#[post("/Login")]
pub async fn login(
    store: web::Data<dyn CredentialStore>,
    keys: web::Data<SessionKeys>,
    locale: web::Data<Locale>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    if let Err(errors) = form.validate() {
        return Ok(HttpResponse::UnprocessableEntity().json(AccountFormView {
            errors: locale.localize(&errors),
            form,
        }));
    }

    match store.verify_credential(&form.username, &form.password).await? {
        Some(user) => {
            log::info!("{} signed in", user.username);
            let target = safe_return_url(form.return_url.as_deref()).to_string();
            sign_in(&user, &keys, form.remember_me, &target)
        }
        None => {
            log::info!("Failed sign-in attempt for {}", form.username);
            let mut errors = FieldErrors::new();
            errors.insert(String::new(), vec![locale.message("", "invalid_login")]);
            Ok(HttpResponse::Unauthorized().json(AccountFormView { form, errors }))
        }
    }
}

/// Empty registration page. Anonymous.
#[get("/Register")]
pub async fn register_form() -> HttpResponse {
    HttpResponse::Ok().json(AccountFormView {
        form: RegisterForm::default(),
        errors: FieldErrors::new(),
    })
}

/// Creates an account and signs it in.
///
/// ## Responses:
/// - `303 See Other` to `/Tasks` with the session cookie set.
/// - `422 Unprocessable Entity`: form errors, password policy violations, or a user
///   name / e-mail already in use.
#[post("/Register")]
pub async fn register(
    store: web::Data<dyn CredentialStore>,
    keys: web::Data<SessionKeys>,
    locale: web::Data<Locale>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let locale = *locale.get_ref();

    if let Err(errors) = form.validate() {
        return Ok(HttpResponse::UnprocessableEntity().json(AccountFormView {
            errors: locale.localize(&errors),
            form,
        }));
    }

    let account = NewAccount {
        username: form.username.clone(),
        email: form.email.clone(),
        full_name: form.full_name.clone(),
        password: form.password.clone(),
    };

    match store.create_account(account).await {
        Ok(user) => sign_in(&user, &keys, false, "/Tasks"),
        Err(AccountError::Rejected(violations)) => {
            Ok(HttpResponse::UnprocessableEntity().json(AccountFormView {
                errors: violation_errors(&violations, locale),
                form,
            }))
        }
        Err(AccountError::Store(err)) => Err(err),
    }
}

/// Ends the session.
#[post("/Logout")]
pub async fn logout(
    req: HttpRequest,
    user: CurrentUser,
    form: Option<web::Form<AntiForgeryForm>>,
) -> Result<HttpResponse, AppError> {
    let token = form.map(|form| form.into_inner().token).unwrap_or_default();
    validate_antiforgery(&req, &user, &token)?;

    log::info!("{} signed out", user.username());
    let mut response = see_other(LOGIN_PATH);
    response.add_cookie(&expired_session_cookie())?;
    Ok(response)
}

fn sign_in(
    user: &User,
    keys: &SessionKeys,
    persistent: bool,
    target: &str,
) -> Result<HttpResponse, AppError> {
    let token = generate_token(keys, user)?;
    let mut response = see_other(target);
    response.add_cookie(&session_cookie(token, keys, persistent))?;
    Ok(response)
}

fn violation_errors(violations: &[AccountViolation], locale: Locale) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for violation in violations {
        errors
            .entry(violation.field.to_string())
            .or_default()
            .push(locale.message(violation.field, violation.code));
    }
    errors
}
