//! Sign-in and sign-out handlers.
//!
//! ```text
//! GET  /login               issue an anti-forgery nonce
//! POST /gconnect?state=...  run the provider callback (body = auth code)
//! GET  /gdisconnect         revoke the stored access token
//! GET  /disconnect          full logout and redirect to the catalog
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::{ConnectAttempt, ConnectOutcome, Error, LoginNonce, User};

use super::session::SessionContext;
use super::state::HttpState;
use super::{see_other, ApiResult};

/// Provider label stored in the session; the only provider supported today.
pub(crate) const GOOGLE_PROVIDER: &str = "google";

/// Login view payload carrying the freshly issued nonce.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginView {
    /// Anti-forgery nonce the callback must echo in its `state` parameter.
    pub state: String,
}

/// Render the login prompt data and issue a fresh anti-forgery nonce.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login nonce issued", body = LoginView),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "showLogin",
    security([])
)]
#[get("/login")]
pub async fn show_login(session: SessionContext) -> ApiResult<web::Json<LoginView>> {
    let nonce = LoginNonce::generate();
    session.issue_state(&nonce)?;
    Ok(web::Json(LoginView {
        state: nonce.as_ref().to_owned(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    state: Option<String>,
}

fn welcome_snippet(user: &User) -> String {
    let mut output = String::new();
    output.push_str("<h1 class=\"centered-text\">Welcome, ");
    output.push_str(user.name());
    output.push_str("!</h1>");
    if let Some(picture) = user.picture() {
        output.push_str("<img class=\"google-login-picture\" src=\"");
        output.push_str(picture);
        output.push_str("\">");
    }
    output
}

/// Execute the provider callback: nonce check, code exchange, token
/// validation, then local user resolution.
#[utoipa::path(
    post,
    path = "/gconnect",
    params(("state" = Option<String>, Query, description = "Anti-forgery nonce issued by /login")),
    request_body(content = String, description = "Provider authorization code"),
    responses(
        (status = 200, description = "Session established (HTML welcome snippet) or already connected"),
        (status = 401, description = "Nonce, subject, or audience mismatch", body = Error),
        (status = 500, description = "Provider-reported token error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "gconnect",
    security([])
)]
#[post("/gconnect")]
pub async fn gconnect(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ConnectQuery>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let code = std::str::from_utf8(&body)
        .map_err(|_| Error::invalid_request("authorization code must be valid UTF-8"))?;
    let presented_state = query.into_inner().state.unwrap_or_default();
    let issued_state = session.state()?;

    let outcome = state
        .connect
        .connect(ConnectAttempt {
            issued_state: issued_state.as_deref(),
            presented_state: &presented_state,
            code: code.trim(),
            current: session.identity()?,
        })
        .await?;

    match outcome {
        ConnectOutcome::AlreadyConnected => {
            Ok(HttpResponse::Ok().json("User is already connected."))
        }
        ConnectOutcome::Established(established) => {
            session.establish(&established, GOOGLE_PROVIDER)?;
            session.push_notice(format!(
                "You are now logged in as {}",
                established.user.name()
            ))?;
            Ok(HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(welcome_snippet(&established.user)))
        }
    }
}

/// Revoke the stored access token with the provider.
#[utoipa::path(
    get,
    path = "/gdisconnect",
    responses(
        (status = 200, description = "Token revoked"),
        (status = 400, description = "Provider refused the revocation"),
        (status = 401, description = "No user connected", body = Error)
    ),
    tags = ["auth"],
    operation_id = "gdisconnect"
)]
#[get("/gdisconnect")]
pub async fn gdisconnect(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let Some(access_token) = session.access_token()? else {
        return Err(Error::unauthorized("Current user not connected."));
    };
    match state.connect.disconnect(&access_token).await {
        Ok(()) => Ok(HttpResponse::Ok().json("Successfully disconnected.")),
        Err(err) => {
            warn!(error = %err, "token revocation failed");
            Ok(HttpResponse::BadRequest().json("Failed to revoke token for given user."))
        }
    }
}

/// Log out: best-effort token revocation, then clear the session and redirect
/// to the catalog.
#[utoipa::path(
    get,
    path = "/disconnect",
    responses(
        (status = 303, description = "Redirect to the catalog listing")
    ),
    tags = ["auth"],
    operation_id = "disconnect"
)]
#[get("/disconnect")]
pub async fn disconnect(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if session.provider()?.is_some() {
        if let Some(access_token) = session.access_token()? {
            // Revocation failure is reported but never blocks the local logout.
            if let Err(err) = state.connect.disconnect(&access_token).await {
                warn!(error = %err, "best-effort token revocation failed during logout");
            }
        }
        session.clear_login();
        session.push_notice("You have successfully been logged out.")?;
    } else {
        session.push_notice("You were not logged in")?;
    }
    Ok(see_other("/arrangements"))
}
