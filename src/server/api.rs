use crate::error::RelayError;
use crate::models::api::{ AskRequest, AskResponse, ErrorResponse };
use crate::relay::CompletionRelay;
use crate::server::identity::IdentityResolver;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use axum::{
    routing::post,
    Router,
    Json,
    extract::{ State, ConnectInfo },
    body::Bytes,
    response::{ IntoResponse, Response },
    http::{ HeaderMap, StatusCode },
};
use tower::ServiceBuilder;
use tower_http::cors::{ Any, CorsLayer };
use tower_http::services::{ ServeDir, ServeFile };
use log::{ info, warn };

#[derive(Clone)]
pub struct AppState {
    pub relay: CompletionRelay,
    pub identity: Arc<IdentityResolver>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) | RelayError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// `/` serves `index.html` from `static_dir`; everything else in it is
/// under `/static`.
pub fn router(state: AppState, static_dir: impl Into<PathBuf>) -> Router {
    let static_dir = static_dir.into();
    let index = static_dir.join("index.html");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ask", post(ask_handler))
        .route_service("/", ServeFile::new(index))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

async fn ask_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Parsed whatever the declared content type is; plain `curl -d` sends
    // form-urlencoded headers with a JSON body.
    let req = match serde_json::from_slice::<AskRequest>(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!("{}: rejected /ask body: {}", peer, e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: format!("Invalid JSON body: {}", e) }),
            ).into_response();
        }
    };

    let identity = state.identity.resolve(&headers, peer);
    info!("Question from {}", identity);

    match state.relay.answer(&identity, req.question()).await {
        Ok(answer) => Json(AskResponse { answer }).into_response(),
        Err(e) => e.into_response(),
    }
}
