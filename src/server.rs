//! HTTP routes of the asset host

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use crate::output::content_type;
use crate::service::{AssetError, AssetService};

type SharedService = Arc<AssetService>;

/// Build the router over a shared service.
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/assets/list", get(list_items))
        .route("/assets/item/:id", get(item))
        .route("/assets/head/:id", get(head))
        .route("/assets/essence/list", get(list_essences))
        .route("/assets/essence/:id", get(essence))
        .with_state(service)
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve(addr: SocketAddr, service: SharedService) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(port = addr.port(), "Asset host listening");
    axum::serve(listener, router(service)).with_graceful_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[derive(Debug, Default, Deserialize)]
struct ItemQuery {
    glow: Option<String>,
}

impl ItemQuery {
    fn glow(&self) -> bool {
        matches!(self.glow.as_deref().map(str::trim), Some("1" | "true" | "TRUE" | "True"))
    }
}

impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        if self.is_not_found() {
            return (StatusCode::NOT_FOUND, self.to_string()).into_response();
        }
        error!(error = %self, "Failed to serve asset");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render asset").into_response()
    }
}

fn image_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, content_type(&bytes))], bytes).into_response()
}

async fn list_items(State(service): State<SharedService>) -> Json<Vec<String>> {
    Json(service.item_ids())
}

async fn item(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    Query(query): Query<ItemQuery>,
) -> Result<Response, AssetError> {
    Ok(image_response(service.item(&id, query.glow()).await?))
}

async fn head(State(service): State<SharedService>, Path(id): Path<String>) -> Result<Response, AssetError> {
    Ok(image_response(service.head(&id).await?))
}

async fn list_essences(State(service): State<SharedService>) -> Json<Vec<String>> {
    Json(service.essence_ids())
}

async fn essence(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Response, AssetError> {
    Ok(image_response(service.essence(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(glow: Option<&str>) -> ItemQuery {
        ItemQuery { glow: glow.map(str::to_string) }
    }

    #[test]
    fn test_glow_query_values() {
        assert!(query(Some("1")).glow());
        assert!(query(Some("true")).glow());
        assert!(!query(Some("0")).glow());
        assert!(!query(Some("false")).glow());
        assert!(!query(Some("")).glow());
        assert!(!query(None).glow());
    }

    #[test]
    fn test_not_found_status() {
        let response = AssetError::NotFound { kind: "item", id: "NOPE".into() }.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_other_errors_are_server_errors() {
        let error = AssetError::Glint(crate::glint::GlintError::NoFrames { dir: "glint".into() });
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
