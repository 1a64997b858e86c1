//! Route handlers

use super::error::ApiError;
use super::state::AppState;
use axum::Json;
use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use chrono::Local;
use crew_application::ReviewOutcome;
use crew_domain::{ReviewRequest, parse_file_selection};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Fields shared by every successful review response
fn outcome_fields(outcome: &ReviewOutcome) -> serde_json::Map<String, Value> {
    let mut body = serde_json::Map::new();
    body.insert("status".into(), json!("success"));
    body.insert("report".into(), json!(outcome.report.raw));
    body.insert(
        "report_path".into(),
        json!(outcome.saved.markdown_path.display().to_string()),
    );
    body.insert(
        "raw_path".into(),
        json!(outcome.saved.raw_path.display().to_string()),
    );
    body.insert("findings".into(), json!(outcome.report.findings));
    body.insert("summary".into(), json!(outcome.report.summary));
    body.insert(
        "timestamp".into(),
        json!(outcome.report.generated_at.to_rfc3339()),
    );
    body
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Local::now().to_rfc3339(),
    }))
}

/// GET / - the front-end page when one is deployed, otherwise an API banner
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let page = state.settings.static_dir.join("index.html");
    match tokio::fs::read_to_string(&page).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => Json(json!({
            "message": "Code Review Crew API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "upload": "POST /api/review/upload",
                "github": "POST /api/review/github",
                "files": "GET /api/files/list?repo_url=",
                "health": "GET /health",
            },
        }))
        .into_response(),
    }
}

/// POST /api/review/upload - multipart with a `file` field
pub async fn review_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::bad_request("No file uploaded"));
    };
    if filename.trim().is_empty() {
        return Err(ApiError::bad_request("No file selected"));
    }

    info!("Upload review: {} ({} bytes)", filename, bytes.len());
    let outcome = state
        .review
        .execute(ReviewRequest::upload(filename, bytes.to_vec()))
        .await?;

    let mut body = outcome_fields(&outcome);
    body.insert("filename".into(), json!(outcome.source_name));
    Ok(Json(Value::Object(body)))
}

#[derive(Debug, Default, Deserialize)]
pub struct GithubForm {
    #[serde(default)]
    pub repo_url: String,
    /// Comma-separated relative paths; empty means the default selection
    #[serde(default)]
    pub selected_files: String,
}

impl GithubForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = GithubForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            match name.as_str() {
                "repo_url" => form.repo_url = value,
                "selected_files" => form.selected_files = value,
                _ => {}
            }
        }
        Ok(form)
    }
}

/// POST /api/review/github - urlencoded or multipart form
pub async fn review_github(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let form = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        GithubForm::from_multipart(multipart).await?
    } else {
        let axum::Form(form) = axum::Form::<GithubForm>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        form
    };

    let repo_url = form.repo_url.trim().to_string();
    if repo_url.is_empty() {
        return Err(ApiError::bad_request("repo_url is required"));
    }
    let selected = parse_file_selection(&form.selected_files);

    info!("Repository review: {} ({} files selected)", repo_url, selected.len());
    let outcome = state
        .review
        .execute(ReviewRequest::repository(repo_url.clone(), selected))
        .await?;

    let mut body = outcome_fields(&outcome);
    body.insert("repo_url".into(), json!(repo_url));
    body.insert("files_analyzed".into(), json!(outcome.files));
    Ok(Json(Value::Object(body)))
}

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    pub repo_url: Option<String>,
}

/// GET /api/files/list?repo_url=
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilesQuery>,
) -> Result<Json<Value>, ApiError> {
    let repo_url = query
        .repo_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("repo_url is required"))?;

    let files = state.review.list_repository_files(&repo_url).await?;
    Ok(Json(json!({
        "status": "success",
        "repo_url": repo_url,
        "total": files.len(),
        "files": files,
    })))
}
