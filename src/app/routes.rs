use crate::app::form::PredictForm;
use crate::app::pages;
use crate::app::state::SharedState;
use crate::utils::error::{PestError, Result};
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Html;
use axum::{Form, Json};
use serde::Serialize;

/// GET /
pub async fn index() -> Html<String> {
    Html(pages::render_index())
}

/// GET /predictor
pub async fn predictor(State(state): State<SharedState>) -> Html<String> {
    Html(pages::render_predictor(state.predictor.known_crops()))
}

/// GET /questionnaire
pub async fn questionnaire() -> Html<String> {
    Html(pages::render_questionnaire())
}

/// GET /waitlist
pub async fn waitlist() -> Html<String> {
    Html(pages::render_waitlist())
}

/// POST /predict
pub async fn predict(
    State(state): State<SharedState>,
    form: std::result::Result<Form<PredictForm>, FormRejection>,
) -> Result<Html<String>> {
    // 表單解析失敗 (重複欄位、缺少 Content-Type) 也走 HTML 錯誤頁
    let Form(form) = form.map_err(|rejection| PestError::MalformedFormError {
        reason: rejection.body_text(),
    })?;
    let record = form.into_record()?;
    let prediction = state.predictor.assess(record)?;

    tracing::info!(
        "🐛 {} risk for {} ({:.2}%)",
        prediction.risk,
        prediction.input.crop_type,
        prediction.likelihood
    );

    Ok(Html(pages::render_result(&prediction)))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub trees: usize,
    pub categories: Vec<String>,
    pub holdout_accuracy: Option<f64>,
}

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        trees: state.report.n_trees,
        categories: state.report.categories.clone(),
        holdout_accuracy: state.report.accuracy,
    })
}
