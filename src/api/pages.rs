//! Protected HTML pages. Everything else in the public directory is served
//! without checks by [`public_fallback`].

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_sessions::Session;

use super::session::current_user;
use super::{ApiError, AppState};

pub const LOGIN_PAGE: &str = "/login.html";

const FORBIDDEN_HTML: &str = "<h1>You are not allowed to view this page.</h1><a href='/'>Home</a>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    LoggedIn,
    Admin,
}

/// GET / and GET /index.html
pub async fn index_page(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
) -> Result<Response, ApiError> {
    guarded_page(&state, &session, "index.html", Access::LoggedIn, request).await
}

/// GET /library.html
pub async fn library_page(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
) -> Result<Response, ApiError> {
    guarded_page(&state, &session, "library.html", Access::LoggedIn, request).await
}

/// GET /admin.html
pub async fn admin_page(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
) -> Result<Response, ApiError> {
    guarded_page(&state, &session, "admin.html", Access::Admin, request).await
}

/// Any path without a route of its own. Requests that resolve to a guarded
/// page once decoded and normalised (`/%61dmin.html`, `//admin.html`,
/// `/index.html/`) go through the same checks as the page routes.
pub async fn public_fallback(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
) -> Result<Response, ApiError> {
    let Some(relative) = normalize_path(request.uri().path()) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    if let Some((file_name, access)) = guarded_file(&relative) {
        return guarded_page(&state, &session, file_name, access, request).await;
    }

    match ServeDir::new(&state.config().server.public_dir)
        .oneshot(request)
        .await
    {
        Ok(response) => Ok(response.map(Body::new)),
        Err(never) => match never {},
    }
}

/// Percent-decodes `path` and drops empty and `.` segments, the same way the
/// static file service resolves it. `None` for undecodable or `..` paths.
fn normalize_path(path: &str) -> Option<String> {
    let decoded = urlencoding::decode(path).ok()?;
    let mut segments = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return None,
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

/// The guarded file a normalised path would be served from, if any. The
/// directory root serves `index.html`.
fn guarded_file(relative: &str) -> Option<(&'static str, Access)> {
    let is = |name: &str| relative.eq_ignore_ascii_case(name);
    if relative.is_empty() || is("index.html") {
        Some(("index.html", Access::LoggedIn))
    } else if is("library.html") {
        Some(("library.html", Access::LoggedIn))
    } else if is("admin.html") {
        Some(("admin.html", Access::Admin))
    } else {
        None
    }
}

async fn guarded_page(
    state: &AppState,
    session: &Session,
    file_name: &str,
    access: Access,
    request: Request,
) -> Result<Response, ApiError> {
    let Some(user) = current_user(session).await? else {
        return Ok(Redirect::to(LOGIN_PAGE).into_response());
    };

    if access == Access::Admin && !user.is_admin() {
        return Ok((StatusCode::FORBIDDEN, Html(FORBIDDEN_HTML)).into_response());
    }

    let path = Path::new(&state.config().server.public_dir).join(file_name);
    Ok(serve_file(&path, request).await)
}

async fn serve_file(path: &Path, request: Request) -> Response {
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}
