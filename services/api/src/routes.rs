use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use espaco_vital::catalog::search::HOME_FEATURED_LIMIT;
use espaco_vital::catalog::{
    catalog_router, CatalogRepository, DirectoryService, SpecialtyTag, TherapistCard,
};
use espaco_vital::site::{site_router, SiteConfiguration, SiteRepository, SiteService};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

const HOME_TAGLINE: &str = "Conectando você ao cuidado terapêutico";

#[derive(Debug, Serialize)]
pub(crate) struct HomePage {
    pub(crate) title: String,
    pub(crate) configuration: SiteConfiguration,
    pub(crate) featured_specialties: Vec<SpecialtyTag>,
    pub(crate) featured_therapists: Vec<TherapistCard>,
}

pub(crate) struct HomeState<C, S> {
    directory: Arc<DirectoryService<C>>,
    site: Arc<SiteService<S>>,
}

impl<C, S> Clone for HomeState<C, S> {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
            site: self.site.clone(),
        }
    }
}

pub(crate) fn app_router<C, S>(
    directory: Arc<DirectoryService<C>>,
    site: Arc<SiteService<S>>,
) -> Router
where
    C: CatalogRepository + 'static,
    S: SiteRepository + 'static,
{
    let home = Router::new()
        .route("/", get(home_endpoint::<C, S>))
        .with_state(HomeState {
            directory: directory.clone(),
            site: site.clone(),
        });

    home.merge(catalog_router(directory))
        .merge(site_router(site))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn home_endpoint<C, S>(State(state): State<HomeState<C, S>>) -> Response
where
    C: CatalogRepository + 'static,
    S: SiteRepository + 'static,
{
    let configuration = match state.site.configuration() {
        Ok(configuration) => configuration,
        Err(error) => {
            tracing::error!(%error, "site configuration unavailable");
            return internal_error();
        }
    };

    let featured = state
        .directory
        .featured_specialties()
        .and_then(|specialties| {
            let therapists = state.directory.featured(HOME_FEATURED_LIMIT)?;
            Ok((specialties, therapists))
        });
    let (featured_specialties, featured_therapists) = match featured {
        Ok(featured) => featured,
        Err(error) => {
            tracing::error!(%error, "home catalog unavailable");
            return internal_error();
        }
    };

    let page = HomePage {
        title: format!("{} - {HOME_TAGLINE}", configuration.site_name),
        configuration,
        featured_specialties,
        featured_therapists,
    };
    (StatusCode::OK, Json(page)).into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
        .into_response()
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{load_demo_catalog, load_demo_site};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use espaco_vital::catalog::InMemoryCatalog;
    use espaco_vital::site::InMemorySite;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn demo_app(ready: bool) -> Router {
        let catalog = InMemoryCatalog::new();
        load_demo_catalog(&catalog).expect("demo catalog");
        let site = InMemorySite::new();
        load_demo_site(&site).expect("demo site");

        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        state.readiness.store(ready, Ordering::Release);

        app_router(
            Arc::new(DirectoryService::new(Arc::new(catalog))),
            Arc::new(SiteService::new(Arc::new(site))),
        )
        .layer(Extension(state))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1 << 20)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn home_lists_featured_content() {
        let (status, body) = get_json(demo_app(true), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["title"],
            "Espaço Vital - Conectando você ao cuidado terapêutico"
        );

        let specialties: Vec<&str> = body["featured_specialties"]
            .as_array()
            .expect("specialties")
            .iter()
            .filter_map(|tag| tag["name"].as_str())
            .collect();
        assert_eq!(specialties, ["Reiki", "Massoterapia", "Acupuntura", "Meditação"]);

        let therapists = body["featured_therapists"]
            .as_array()
            .expect("therapists");
        assert!(!therapists.is_empty());
        assert!(therapists.len() <= HOME_FEATURED_LIMIT);
        assert!(therapists.iter().all(|card| card["featured"] == true));
    }

    #[tokio::test]
    async fn readiness_reflects_the_flag() {
        let (status, body) = get_json(demo_app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let (status, _) = get_json(demo_app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn directory_and_site_routes_are_mounted() {
        let (status, body) = get_json(demo_app(true), "/terapeutas/perfil/espaco-lotus/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["therapist"]["display_name"], "Espaço Lótus");

        let (status, body) = get_json(demo_app(true), "/faq/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["secoes"][0]["label"], "Geral");

        let (status, _) = get_json(demo_app(true), "/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}
