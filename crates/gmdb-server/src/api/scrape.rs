use axum::{
    extract::{Query, State},
    Extension, Json,
};
use gmdb_scraper::{
    run_bulletin_crawl, run_score_crawl, BulletinRunSummary, CrawlMode, CrawlSettings,
    ScoreCrawlSettings, ScoreRunSummary, ScraperError,
};
use serde::{Deserialize, Serialize};

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize, Default)]
pub(super) struct BulletinScrapeQuery {
    mode: Option<String>,
    page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(super) struct BulletinScrapeData {
    mode: CrawlMode,
    summary: BulletinRunSummary,
}

/// Resolves the query into a crawl mode.
///
/// `page=N` alone implies `mode=page`. No mode and no page means `latest`.
fn parse_mode(query: &BulletinScrapeQuery) -> Result<CrawlMode, String> {
    let mode = query
        .mode
        .as_deref()
        .map(str::trim)
        .map(str::to_ascii_lowercase);

    match (mode.as_deref(), query.page) {
        (None, None) | (Some("latest"), None) => Ok(CrawlMode::Latest),
        (Some("full"), None) => Ok(CrawlMode::Full),
        (Some("poll"), None) => Ok(CrawlMode::Poll),
        (None | Some("page"), Some(0)) => Err("page must be at least 1".to_string()),
        (None | Some("page"), Some(n)) => Ok(CrawlMode::Page(n)),
        (Some("page"), None) => Err("mode=page requires a page number".to_string()),
        (Some(other @ ("latest" | "full" | "poll")), Some(_)) => {
            Err(format!("page is only valid with mode=page, not mode={other}"))
        }
        (Some(other), _) => Err(format!(
            "unknown mode \"{other}\" (expected latest, full, poll or page)"
        )),
    }
}

fn map_scraper_error(request_id: String, error: &ScraperError) -> ApiError {
    match error {
        ScraperError::Store(e) => map_store_error(request_id, e),
        other => {
            tracing::error!(error = %other, "crawl failed");
            ApiError::new(request_id, "upstream_error", other.to_string())
        }
    }
}

fn crawl_in_progress(request_id: String) -> ApiError {
    ApiError::new(request_id, "conflict", "a crawl is already running")
}

pub(super) async fn scrape_bulletins(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BulletinScrapeQuery>,
) -> Result<Json<ApiResponse<BulletinScrapeData>>, ApiError> {
    let mode = parse_mode(&query)
        .map_err(|msg| ApiError::new(req_id.0.clone(), "validation_error", msg))?;

    let Ok(_guard) = state.crawl_lock.try_lock() else {
        return Err(crawl_in_progress(req_id.0));
    };

    let settings = CrawlSettings::from_app_config(&state.config);
    let summary = run_bulletin_crawl(&state.fetcher, &state.store, &settings, mode)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: BulletinScrapeData { mode, summary },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn scrape_scores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ScoreRunSummary>>, ApiError> {
    let Ok(_guard) = state.crawl_lock.try_lock() else {
        return Err(crawl_in_progress(req_id.0));
    };

    let settings = ScoreCrawlSettings::from_app_config(&state.config);
    let summary = run_score_crawl(&state.fetcher, &state.store, &settings)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}
