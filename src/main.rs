// region:    --- Imports
use crate::database::DatabaseManager;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod access;
mod bidding;
mod database;
mod error;
mod handlers;
mod identity;
mod query;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new().await);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = Router::new()
        .route("/users/sync", post(handlers::handle_sync_user))
        .route("/users", get(handlers::handle_get_users))
        .route("/users/:id", get(handlers::handle_get_user))
        .route("/users/:id/bids", get(handlers::handle_get_user_bids))
        .route(
            "/users/:id/overview",
            get(handlers::handle_get_overview_stats),
        )
        .route(
            "/collections",
            get(handlers::handle_get_collections).post(handlers::handle_create_collection),
        )
        .route(
            "/collections/details",
            get(handlers::handle_get_collections_with_details),
        )
        .route(
            "/collections/:id",
            get(handlers::handle_get_collection)
                .put(handlers::handle_update_collection)
                .delete(handlers::handle_delete_collection),
        )
        .route(
            "/collections/:id/details",
            get(handlers::handle_get_collection_with_details),
        )
        .route(
            "/collections/:id/bids",
            get(handlers::handle_get_collection_bids),
        )
        .route(
            "/collections/:id/highest-bid",
            get(handlers::handle_get_highest_bid),
        )
        .route("/bids", post(handlers::handle_place_bid))
        .route("/bids/accept", post(handlers::handle_accept_bid))
        .route("/bids/reject", post(handlers::handle_reject_bid))
        .route(
            "/bids/:id",
            put(handlers::handle_update_bid).delete(handlers::handle_cancel_bid),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 20))
        .with_state(db_manager);

    // 리스너 생성(로컬 호스트의 3000번 포트를 사용)
    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr().unwrap()
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
