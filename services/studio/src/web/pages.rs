//! services/studio/src/web/pages.rs
//!
//! Axum handlers for the studio pages. Every form post becomes one `Event` for
//! the session state machine; the response is the freshly rendered page.

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use bytes::Bytes;
use echoverse_core::{
    domain::Page,
    flow::{Event, GenerateForm, LoginForm, Notice, SessionContext, SignupForm, Upload},
    ports::PortError,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::web::{cookie, render::render_page, state::AppState};

type HandlerResult = Result<Response, (StatusCode, String)>;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SignupRequest {
    pub username: String,
    pub display_name: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl From<SignupRequest> for SignupForm {
    fn from(req: SignupRequest) -> Self {
        SignupForm {
            username: req.username,
            display_name: req.display_name,
            phone: req.phone,
            password: req.password,
            confirm_password: req.confirm_password,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub page: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct GenerateRequest {
    pub text: String,
    pub tone: String,
    pub voice: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SpeechQuery {
    pub download: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET / - Render whatever page the session is on, opening a session if needed.
pub async fn index_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> HandlerResult {
    let (ctx, is_new) = open_or_resume(&state, &headers).await?;
    respond(&state, ctx, is_new, &[]).await
}

/// POST /signup
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(req): Form<SignupRequest>,
) -> HandlerResult {
    dispatch(&state, &headers, Event::Signup(req.into())).await
}

/// POST /login
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(req): Form<LoginRequest>,
) -> HandlerResult {
    let form = LoginForm {
        username: req.username,
        password: req.password,
    };
    dispatch(&state, &headers, Event::Login(form)).await
}

/// POST /navigate - Switch between the signup and login pages.
pub async fn navigate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(req): Form<NavigateRequest>,
) -> HandlerResult {
    let event = match req.page.parse::<Page>() {
        Ok(Page::Login) => Event::ShowLogin,
        Ok(Page::Signup) => Event::ShowSignup,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Cannot navigate to '{}'", req.page),
            ))
        }
    };
    dispatch(&state, &headers, event).await
}

/// POST /logout
pub async fn logout_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> HandlerResult {
    dispatch(&state, &headers, Event::Logout).await
}

/// POST /upload - Accepts a multipart/form-data request with a `file` part.
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> HandlerResult {
    let mut upload = Upload::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        if field.name() != Some("file") {
            continue;
        }
        upload.file_name = field.file_name().unwrap_or_default().to_string();
        upload.content_type = field.content_type().map(str::to_string);
        upload.bytes = field
            .bytes()
            .await
            .map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file bytes: {}", e),
                )
            })?
            .to_vec();
    }

    dispatch(&state, &headers, Event::Upload(upload)).await
}

/// POST /generate
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(req): Form<GenerateRequest>,
) -> HandlerResult {
    let form = GenerateForm {
        text: req.text,
        tone: req.tone,
        voice: req.voice,
    };
    dispatch(&state, &headers, Event::Generate(form)).await
}

/// GET /speech.wav - The session's latest clip; `?download=true` makes it an attachment.
pub async fn speech_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SpeechQuery>,
) -> HandlerResult {
    let not_found = || (StatusCode::NOT_FOUND, "No audio generated yet".to_string());

    let session_id = cookie::session_id(&headers).ok_or_else(not_found)?;
    let ctx = match state.sessions.load_session(session_id).await {
        Ok(ctx) => ctx,
        Err(PortError::NotFound(_)) => return Err(not_found()),
        Err(e) => {
            error!("Failed to load session {}: {:?}", session_id, e);
            return Err(internal("Failed to load session"));
        }
    };
    let clip = ctx.session.last_audio.ok_or_else(not_found)?;

    let disposition = if query.download {
        r#"attachment; filename="speech.wav""#
    } else {
        r#"inline; filename="speech.wav""#
    };

    Ok((
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "no-store"),
        ],
        Bytes::from(clip.wav),
    )
        .into_response())
}

//=========================================================================================
// Helpers
//=========================================================================================

fn internal(message: &str) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
}

/// Loads the session named by the cookie, or opens a new one.
async fn open_or_resume(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(SessionContext, bool), (StatusCode, String)> {
    if let Some(session_id) = cookie::session_id(headers) {
        match state.sessions.load_session(session_id).await {
            Ok(ctx) => return Ok((ctx, false)),
            Err(PortError::NotFound(_)) => {
                info!("Session {} is unknown, opening a new one", session_id);
            }
            Err(e) => {
                error!("Failed to load session {}: {:?}", session_id, e);
                return Err(internal("Failed to load session"));
            }
        }
    }

    let ctx = state.flow.open_session();
    info!("Opened session {}", ctx.session.id);
    Ok((ctx, true))
}

async fn dispatch(state: &AppState, headers: &HeaderMap, event: Event) -> HandlerResult {
    let (mut ctx, is_new) = open_or_resume(state, headers).await?;
    let outcome = state.flow.handle(&mut ctx, event).await.map_err(|e| {
        error!("Session {} failed to apply event: {:?}", ctx.session.id, e);
        internal("Failed to process the request")
    })?;
    respond(state, ctx, is_new, &outcome.notices).await
}

/// Saves the session and renders its page, setting the cookie for new sessions.
async fn respond(
    state: &AppState,
    ctx: SessionContext,
    is_new: bool,
    notices: &[Notice],
) -> HandlerResult {
    let body = render_page(&ctx.session, notices);
    let session_id = ctx.session.id;

    state.sessions.save_session(ctx).await.map_err(|e| {
        error!("Failed to save session {}: {:?}", session_id, e);
        internal("Failed to save session")
    })?;

    let mut response = Html(body).into_response();
    if is_new {
        let cookie = cookie::session_cookie(session_id, state.config.secure_cookies);
        let value = HeaderValue::from_str(&cookie).map_err(|e| {
            error!("Failed to build session cookie: {:?}", e);
            internal("Failed to create session")
        })?;
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}
