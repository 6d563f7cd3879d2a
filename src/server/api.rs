use super::DashboardHandle;
use std::error::Error;
use std::net::SocketAddr;
use axum::{
    routing::{ get, post },
    Router,
    Form,
    Json,
    extract::{ State, Path },
    response::{ Html, IntoResponse, Redirect, Response },
    http::StatusCode,
};
use serde::{ Deserialize, Serialize };
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn };

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub confirm: bool,
}

#[derive(Serialize)]
struct ApiError {
    success: bool,
    message: String,
}

fn api_error(code: StatusCode, message: impl Into<String>) -> Response {
    (code, Json(ApiError { success: false, message: message.into() })).into_response()
}

pub fn router(handle: DashboardHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(page_handler))
        .route("/refresh", post(refresh_form_handler))
        .route("/remove/{query_id}", post(remove_form_handler))
        .route("/confirm", post(confirm_form_handler))
        .route("/dismiss", post(dismiss_form_handler))
        .route("/api/bookmarks", get(snapshot_handler))
        .route("/api/refresh", post(refresh_handler))
        .route("/api/bookmarks/{query_id}/remove", post(remove_handler))
        .route("/api/confirmation", post(confirmation_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(cors)
        .with_state(handle)
}

pub async fn start_http_server(
    addr: &str,
    handle: DashboardHandle
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
    })?;
    info!("Dashboard available on: http://{}", addr);

    axum::serve(listener, router(handle).into_make_service()).await?;
    Ok(())
}

async fn page_handler(State(handle): State<DashboardHandle>) -> Html<String> {
    Html(handle.renderer.render_page(&handle.controller.snapshot()))
}

async fn refresh_form_handler(State(handle): State<DashboardHandle>) -> Redirect {
    handle.controller.load().await;
    Redirect::to("/")
}

async fn remove_form_handler(
    State(handle): State<DashboardHandle>,
    Path(query_id): Path<String>
) -> Redirect {
    if !handle.begin_removal(&query_id).await {
        warn!("Remove requested for bookmark {} which is not displayed", query_id);
        handle.controller.show_error("That bookmark is no longer displayed.");
    }
    Redirect::to("/")
}

async fn confirm_form_handler(
    State(handle): State<DashboardHandle>,
    Form(req): Form<ConfirmRequest>
) -> Redirect {
    if !handle.answer(req.confirm).await {
        handle.controller.show_error("No bookmark is awaiting removal.");
    }
    Redirect::to("/")
}

async fn dismiss_form_handler(State(handle): State<DashboardHandle>) -> Redirect {
    if !handle.dismiss().await {
        warn!("Dismiss received with no confirmation open");
    }
    Redirect::to("/")
}

async fn snapshot_handler(State(handle): State<DashboardHandle>) -> impl IntoResponse {
    Json(handle.controller.snapshot())
}

async fn refresh_handler(State(handle): State<DashboardHandle>) -> impl IntoResponse {
    Json(handle.controller.load().await)
}

async fn remove_handler(
    State(handle): State<DashboardHandle>,
    Path(query_id): Path<String>
) -> Response {
    if !handle.begin_removal(&query_id).await {
        return api_error(StatusCode::NOT_FOUND, format!("Bookmark {} is not displayed", query_id));
    }
    (StatusCode::ACCEPTED, Json(handle.controller.snapshot())).into_response()
}

async fn confirmation_handler(
    State(handle): State<DashboardHandle>,
    Json(req): Json<ConfirmRequest>
) -> Response {
    if !handle.answer(req.confirm).await {
        return api_error(StatusCode::CONFLICT, "No bookmark is awaiting removal");
    }
    (StatusCode::OK, Json(handle.controller.snapshot())).into_response()
}
