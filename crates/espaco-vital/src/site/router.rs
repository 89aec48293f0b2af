use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{FaqCategory, FaqId};
use super::repository::SiteRepository;
use super::service::{ContactMessageForm, NewsletterForm, SiteService, SiteServiceError};
use crate::catalog::repository::RepositoryError;

/// Router exposing the institutional endpoints.
pub fn site_router<R>(service: Arc<SiteService<R>>) -> Router
where
    R: SiteRepository + 'static,
{
    Router::new()
        .route("/contato/", post(contact_handler::<R>))
        .route("/newsletter/", post(subscribe_handler::<R>))
        .route("/newsletter/confirmar/", post(confirm_handler::<R>))
        .route("/newsletter/cancelar/", post(unsubscribe_handler::<R>))
        .route("/faq/", get(faq_handler::<R>))
        .route("/faq/:id/", get(faq_detail_handler::<R>))
        .route("/faq/:id/util/", post(faq_helpful_handler::<R>))
        .route("/configuracao/", get(configuration_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmailForm {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FaqQuery {
    categoria: Option<String>,
}

pub(crate) async fn contact_handler<R>(
    State(service): State<Arc<SiteService<R>>>,
    Form(form): Form<ContactMessageForm>,
) -> Response
where
    R: SiteRepository + 'static,
{
    match service.submit_contact(form) {
        Ok(message) => {
            let payload = json!({
                "success": true,
                "id": message.id,
                "message": "Mensagem enviada com sucesso! Entraremos em contato em breve.",
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn subscribe_handler<R>(
    State(service): State<Arc<SiteService<R>>>,
    Form(form): Form<NewsletterForm>,
) -> Response
where
    R: SiteRepository + 'static,
{
    match service.subscribe(form) {
        Ok(subscription) => {
            let payload = json!({
                "success": true,
                "email": subscription.email,
                "message": "Inscrição realizada com sucesso!",
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirm_handler<R>(
    State(service): State<Arc<SiteService<R>>>,
    Form(form): Form<EmailForm>,
) -> Response
where
    R: SiteRepository + 'static,
{
    match service.confirm_subscription(&form.email) {
        Ok(subscription) => {
            let payload = json!({
                "success": true,
                "email": subscription.email,
                "confirmed_at": subscription.confirmed_at,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn unsubscribe_handler<R>(
    State(service): State<Arc<SiteService<R>>>,
    Form(form): Form<EmailForm>,
) -> Response
where
    R: SiteRepository + 'static,
{
    match service.unsubscribe(&form.email) {
        Ok(subscription) => {
            let payload = json!({
                "success": true,
                "email": subscription.email,
                "unsubscribed_at": subscription.unsubscribed_at,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

/// Unknown categories are ignored and every section is returned.
pub(crate) async fn faq_handler<R>(
    State(service): State<Arc<SiteService<R>>>,
    Query(query): Query<FaqQuery>,
) -> Response
where
    R: SiteRepository + 'static,
{
    let category = query
        .categoria
        .as_deref()
        .and_then(|code| FaqCategory::from_code(code.trim()));
    match service.faq_sections(category) {
        Ok(sections) => {
            (StatusCode::OK, axum::Json(json!({ "secoes": sections }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn faq_detail_handler<R>(
    State(service): State<Arc<SiteService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: SiteRepository + 'static,
{
    match service.view_faq(FaqId(id)) {
        Ok(faq) => (StatusCode::OK, axum::Json(faq)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn faq_helpful_handler<R>(
    State(service): State<Arc<SiteService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: SiteRepository + 'static,
{
    match service.mark_faq_helpful(FaqId(id)) {
        Ok(helpful_count) => {
            let payload = json!({
                "success": true,
                "helpful_count": helpful_count,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn configuration_handler<R>(
    State(service): State<Arc<SiteService<R>>>,
) -> Response
where
    R: SiteRepository + 'static,
{
    match service.configuration() {
        Ok(configuration) => (StatusCode::OK, axum::Json(configuration)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: SiteServiceError) -> Response {
    match error {
        SiteServiceError::Validation(error) => {
            let payload = json!({
                "success": false,
                "error": error.to_string(),
                "campo": error.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        SiteServiceError::NotFound => {
            let payload = json!({
                "error": "not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        SiteServiceError::AlreadySubscribed | SiteServiceError::ConfigurationExists => {
            let payload = json!({
                "success": false,
                "error": error.to_string(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        SiteServiceError::Repository(RepositoryError::Conflict(_)) => {
            let payload = json!({
                "error": "record already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        SiteServiceError::Repository(error) => {
            tracing::error!(%error, "site request failed");
            let payload = json!({
                "error": "internal error",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
