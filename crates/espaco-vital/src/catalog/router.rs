use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::StateId;
use super::filters::{parse_page, SearchParams};
use super::repository::{CatalogRepository, RepositoryError};
use super::service::{ContactForm, DirectoryService, DirectoryServiceError};

const CONTACT_SENT: &str = "Mensagem enviada com sucesso!";
const CONTACT_FAILED: &str = "Erro ao enviar mensagem.";
const CONTACT_FAILED_PAGE: &str = "Ocorreu um erro ao enviar sua mensagem. Tente novamente.";

/// Router exposing the public therapist directory.
pub fn catalog_router<R>(service: Arc<DirectoryService<R>>) -> Router
where
    R: CatalogRepository + 'static,
{
    Router::new()
        .route("/terapeutas/", get(search_handler::<R>))
        .route("/terapeutas/buscar/", get(search_handler::<R>))
        .route("/terapeutas/lista/", get(listing_handler::<R>))
        .route(
            "/terapeutas/especialidade/:slug/",
            get(specialty_listing_handler::<R>),
        )
        .route("/terapeutas/perfil/:slug/", get(profile_handler::<R>))
        .route(
            "/terapeutas/contatar/:slug/",
            get(contact_form_handler::<R>).post(contact_submit_handler::<R>),
        )
        .route("/terapeutas/api/buscar/", get(autocomplete_handler::<R>))
        .route(
            "/terapeutas/api/cidades-por-estado/",
            get(cities_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AutocompleteQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CitiesQuery {
    estado_id: Option<String>,
}

pub(crate) async fn search_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    let params = SearchParams::from_pairs(pairs);
    match service.search(&params) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn listing_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Query(query): Query<PageQuery>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.listing(parse_page(query.page.as_deref())) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn specialty_listing_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.specialty_listing(&slug, parse_page(query.page.as_deref())) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn profile_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Path(slug): Path<String>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.profile(&slug) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn contact_form_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Path(slug): Path<String>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.contact_form(&slug) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Answers in the `{success, message}` shape when the request comes from
/// script (`X-Requested-With: XMLHttpRequest`), otherwise with the
/// confirmation payload.
pub(crate) async fn contact_submit_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Form(form): Form<ContactForm>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    let ajax = is_ajax(&headers);
    let origin_ip = connect_info.map(|ConnectInfo(addr)| addr.ip());

    match service.submit_contact(&slug, form, origin_ip) {
        Ok(_) if ajax => {
            let payload = json!({
                "success": true,
                "message": CONTACT_SENT,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(confirmation) => (StatusCode::OK, axum::Json(confirmation)).into_response(),
        Err(DirectoryServiceError::NotFound) => error_response(DirectoryServiceError::NotFound),
        Err(DirectoryServiceError::Validation(error)) => {
            let payload = if ajax {
                json!({
                    "success": false,
                    "message": error.to_string(),
                })
            } else {
                json!({
                    "error": error.to_string(),
                    "form": service.contact_form(&slug).ok(),
                })
            };
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(DirectoryServiceError::Repository(_)) => {
            let payload = if ajax {
                json!({
                    "success": false,
                    "message": CONTACT_FAILED,
                })
            } else {
                json!({
                    "error": CONTACT_FAILED_PAGE,
                })
            };
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn autocomplete_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Query(query): Query<AutocompleteQuery>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.autocomplete(&query.q) {
        Ok(hits) => (StatusCode::OK, axum::Json(json!({ "terapeutas": hits }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cities_handler<R>(
    State(service): State<Arc<DirectoryService<R>>>,
    Query(query): Query<CitiesQuery>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    let raw = query.estado_id.unwrap_or_default();
    let raw = raw.trim();
    if raw.is_empty() {
        return (StatusCode::OK, axum::Json(json!({ "cidades": [] }))).into_response();
    }

    let state_id = match raw.parse::<u64>() {
        Ok(id) => StateId(id),
        Err(error) => {
            let payload = json!({
                "error": format!("invalid estado_id '{raw}': {error}"),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.cities_by_state(state_id) {
        Ok(cities) => (StatusCode::OK, axum::Json(json!({ "cidades": cities }))).into_response(),
        Err(error) => error_response(error),
    }
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"))
}

pub(crate) fn error_response(error: DirectoryServiceError) -> Response {
    match error {
        DirectoryServiceError::NotFound => {
            let payload = json!({
                "error": "not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        DirectoryServiceError::Validation(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        DirectoryServiceError::Repository(RepositoryError::Conflict(_)) => {
            let payload = json!({
                "error": "record already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        DirectoryServiceError::Repository(error) => {
            tracing::error!(%error, "catalog request failed");
            let payload = json!({
                "error": "internal error",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
