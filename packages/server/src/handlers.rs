//! HTTP handler functions for the radon map API.

use actix_web::{HttpResponse, web};
use radon_map_analytics::hot;
use radon_map_server_models::{
    ApiDataSourceStatus, ApiHealth, ApiHotNeighborhood, ApiMessage, ApiPathPoint, ApiRadonResult,
    ApiStatus, HotNeighborhoodParams, RadonResultsParams,
};
use radon_map_source::Origin;

use crate::AppState;

/// Response header naming where the data came from.
pub const ORIGIN_HEADER: &str = "X-Data-Origin";

fn ok_with_origin<T: serde::Serialize>(origin: &Origin, body: &T) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((ORIGIN_HEADER, origin.label()))
        .json(body)
}

/// `GET /`
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(ApiMessage {
        message: "Radon Map API".to_string(),
    })
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/status`
///
/// Reports whether the warehouse is configured and reachable.
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    let source = state.engine.status().await;

    HttpResponse::Ok().json(ApiStatus {
        status: "running".to_string(),
        data_source: ApiDataSourceStatus {
            warehouse_enabled: source.enabled,
            warehouse_connected: source.connected,
            using_sample_data: !source.connected,
            error: source.error,
        },
        checked_at: chrono::Utc::now(),
    })
}

/// `GET /api/map/tornado-path`
pub async fn tornado_path(state: web::Data<AppState>) -> HttpResponse {
    let path = state.engine.tornado_path().await;
    let points: Vec<ApiPathPoint> = path.points.iter().map(ApiPathPoint::from).collect();
    ok_with_origin(&path.origin, &points)
}

/// `GET /api/map/radon-results`
///
/// Radon test results, optionally limited to those within `radius_miles`
/// of the storm track.
pub async fn radon_results(
    state: web::Data<AppState>,
    params: web::Query<RadonResultsParams>,
) -> HttpResponse {
    let results = state
        .engine
        .radon_results(params.near_tornado, params.radius_miles)
        .await;
    let body: Vec<ApiRadonResult> = results.records.iter().map(ApiRadonResult::from).collect();
    ok_with_origin(&results.origin, &body)
}

/// `GET /api/radon/hot-neighborhoods`
///
/// Neighborhoods with at least `minTests` tests, ordered by `sortBy`.
pub async fn hot_neighborhoods(
    state: web::Data<AppState>,
    params: web::Query<HotNeighborhoodParams>,
) -> HttpResponse {
    let result = hot::hot_neighborhoods(
        &state.engine,
        &state.hot_neighborhoods,
        params.min_samples(),
        &params.sort_by,
    )
    .await;
    let body: Vec<ApiHotNeighborhood> = result
        .aggregates
        .iter()
        .map(ApiHotNeighborhood::from)
        .collect();
    ok_with_origin(&result.origin, &body)
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use radon_map_source::orchestrator::Orchestrator;
    use serde_json::Value;

    use super::*;
    use crate::configure;

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::new(Orchestrator::new(None))))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn root_returns_message() {
        let app = app!();
        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(body["message"], "Radon Map API");
    }

    #[actix_web::test]
    async fn status_reports_disabled_warehouse() {
        let app = app!();
        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/status").to_request(),
        )
        .await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["data_source"]["warehouse_enabled"], false);
        assert_eq!(body["data_source"]["using_sample_data"], true);
    }

    #[actix_web::test]
    async fn tornado_path_serves_sample_track() {
        let app = app!();
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/map/tornado-path").to_request(),
        )
        .await;
        assert!(resp.status().is_success());
        assert_eq!(resp.headers().get(ORIGIN_HEADER).unwrap(), "sample");

        let body: Vec<ApiPathPoint> = test::read_body_json(resp).await;
        assert_eq!(body.len(), 6);
        assert!((body[0].latitude - 38.658).abs() < 1e-9);
    }

    #[actix_web::test]
    async fn radon_results_filter_near_track() {
        let app = app!();
        let all: Vec<ApiRadonResult> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/map/radon-results").to_request(),
        )
        .await;
        let near: Vec<ApiRadonResult> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/map/radon-results?near_tornado=true&radius_miles=0.5")
                .to_request(),
        )
        .await;

        assert_eq!(all.len(), 28);
        assert!(!near.is_empty());
        assert!(near.len() < all.len());
    }

    #[actix_web::test]
    async fn hot_neighborhoods_honor_threshold_and_sort() {
        let app = app!();
        let body: Vec<ApiHotNeighborhood> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/radon/hot-neighborhoods?minTests=40&sortBy=count")
                .to_request(),
        )
        .await;

        let names: Vec<&str> = body.iter().map(|n| n.neighborhood.as_str()).collect();
        assert_eq!(names, vec!["Penrose", "The Ville", "Fairground Neighborhood"]);
        assert!((body[1].percent_above_action_level - 71.1).abs() < 1e-9);
    }

    #[actix_web::test]
    async fn hot_neighborhoods_unknown_sort_keeps_order() {
        let app = app!();
        let body: Vec<ApiHotNeighborhood> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/radon/hot-neighborhoods?sortBy=ward")
                .to_request(),
        )
        .await;

        assert_eq!(body.len(), 10);
        assert_eq!(body[0].neighborhood, "The Ville");
        assert_eq!(body[9].neighborhood, "Baden");
    }
}
