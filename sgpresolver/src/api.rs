//! Endpoint HTTP du résolveur
//!
//! Une seule route utile, `GET /resolve?url=<page-url>`. Toutes les réponses
//! (erreurs et 404 compris) portent des en-têtes CORS permissifs, et toute
//! requête `OPTIONS` reçoit un 200 vide.

use crate::client::ResolverClient;
use axum::{
    extract::{RawQuery, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Content-Type des réponses JSON
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const CORS_HEADERS: &[(&str, &str)] = &[
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, OPTIONS"),
    ("access-control-allow-headers", "Content-Type"),
    ("access-control-max-age", "86400"),
];

/// Crée le router du résolveur
pub fn create_router(client: Arc<ResolverClient>) -> Router {
    Router::new()
        .route("/resolve", get(resolve).head(not_found).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn(cors))
        .with_state(client)
}

/// Construit une réponse JSON avec le Content-Type explicite
pub(crate) fn json_response(status: StatusCode, body: &serde_json::Value) -> Response {
    (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body.to_string()).into_response()
}

fn apply_cors(headers: &mut HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers.insert(*name, HeaderValue::from_static(*value));
    }
}

async fn cors(request: Request, next: Next) -> Response {
    // Pré-vol : réponse immédiate, sans corps
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        apply_cors(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors(response.headers_mut());
    response
}

/// Première valeur du paramètre `url`, vide s'il est absent
fn page_url_param(query: Option<&str>) -> String {
    query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

/// GET /resolve?url=<page-url>
async fn resolve(
    State(client): State<Arc<ResolverClient>>,
    RawQuery(query): RawQuery,
) -> Response {
    let page_url = page_url_param(query.as_deref());

    match client.resolve(&page_url).await {
        Ok(resolution) => {
            info!("Resolved {} -> {}", page_url, resolution.audio_url);
            match serde_json::to_value(&resolution) {
                Ok(body) => json_response(StatusCode::OK, &body),
                Err(e) => json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &serde_json::json!({ "error": e.to_string() }),
                ),
            }
        }
        Err(e) => {
            warn!("Resolution of {:?} failed: {}", page_url, e);
            e.into_response()
        }
    }
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
