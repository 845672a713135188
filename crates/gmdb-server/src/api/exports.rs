use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;
use gmdb_core::Store;
use gmdb_report::{
    load_report, render_report_csv, render_scores_csv, report_filename, scores_filename,
    ReportError,
};
use serde::Deserialize;

use super::{map_store_error, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ReportQuery {
    days: Option<u32>,
}

fn csv_attachment(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

fn map_report_error(request_id: String, error: &ReportError) -> ApiError {
    match error {
        ReportError::Store(e) => map_store_error(request_id, e),
        ReportError::WindowOutOfRange(_) => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        other => {
            tracing::error!(error = %other, "export rendering failed");
            ApiError::new(request_id, "internal_error", "export rendering failed")
        }
    }
}

pub(super) async fn download_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let today = Utc::now().date_naive();
    let days = query.days.unwrap_or(state.config.report_window_days);

    let report = load_report(&state.store, today, days)
        .await
        .map_err(|e| map_report_error(req_id.0.clone(), &e))?;
    let body = render_report_csv(&report).map_err(|e| map_report_error(req_id.0, &e))?;

    Ok(csv_attachment(&report_filename(today), body))
}

pub(super) async fn download_scores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let scores = state
        .store
        .all_scores()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    let body = render_scores_csv(&scores).map_err(|e| map_report_error(req_id.0, &e))?;

    Ok(csv_attachment(
        &scores_filename(Utc::now().date_naive()),
        body,
    ))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use gmdb_db::PgStore;
    use tower::ServiceExt;

    use super::*;
    use crate::api::build_app;
    use crate::api::test_support::unreachable_state;

    #[test]
    fn attachment_headers() {
        let response = csv_attachment("gmdb_scores_2024-03-31_utc.csv", b"a\n".to_vec());
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"gmdb_scores_2024-03-31_utc.csv\""
        );
    }

    #[tokio::test]
    async fn store_failure_is_an_internal_error() {
        let response = build_app(unreachable_state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/scores/export")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "internal_error");
    }

    #[tokio::test]
    async fn non_numeric_days_is_rejected() {
        let response = build_app(unreachable_state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/report?days=ninety")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn report_downloads_as_two_section_csv(pool: sqlx::PgPool) {
        let mut state = unreachable_state();
        state.store = PgStore::new(pool);

        let response = build_app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/report?days=30")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("gmdb_report_"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("# software_sales\n"));
        assert!(text.contains("\n# hardware_sales\n"));
    }
}
