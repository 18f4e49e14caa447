// region:    --- Imports
use crate::access;
use crate::bidding::commands;
use crate::bidding::model::{AcceptOutcome, Bid, Collection, CollectionWithDetails, User};
use crate::database::DatabaseManager;
use crate::error::ServiceError;
use crate::identity;
use crate::query;
use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Commands

/// 외부 인증 사용자 동기화 명령
#[derive(Debug, Deserialize)]
pub struct SyncUserCommand {
    pub external_id: String,
    pub name: String,
    pub email: String,
}

/// 컬렉션 생성 명령
#[derive(Debug, Deserialize)]
pub struct CreateCollectionCommand {
    pub name: String,
    pub description: String,
    pub stock: i32,
    pub price: Decimal,
    pub owner_id: Uuid,
}

/// 컬렉션 수정 명령 (부분 수정)
#[derive(Debug, Deserialize)]
pub struct UpdateCollectionCommand {
    pub actor_id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub price: Option<Decimal>,
}

/// 행위자만 필요한 명령 (컬렉션 삭제, 입찰 취소)
#[derive(Debug, Deserialize)]
pub struct ActorCommand {
    pub actor_id: Uuid,
}

/// 입찰 생성 명령
#[derive(Debug, Deserialize)]
pub struct PlaceBidCommand {
    pub collection_id: Uuid,
    pub actor_id: Uuid,
    pub price: Decimal,
}

/// 입찰 수정 명령
#[derive(Debug, Deserialize)]
pub struct UpdateBidCommand {
    pub actor_id: Uuid,
    pub price: Decimal,
}

/// 입찰 수락 명령
#[derive(Debug, Deserialize)]
pub struct AcceptBidCommand {
    pub collection_id: Uuid,
    pub bid_id: Uuid,
    pub actor_id: Uuid,
}

/// 입찰 거절 명령
#[derive(Debug, Deserialize)]
pub struct RejectBidCommand {
    pub bid_id: Uuid,
    pub actor_id: Uuid,
}

// endregion: --- Commands

// region:    --- User Handlers

/// 외부 인증 사용자 동기화 요청 처리
pub async fn handle_sync_user(
    State(db_manager): State<Arc<DatabaseManager>>,
    Json(cmd): Json<SyncUserCommand>,
) -> Result<Json<User>, ServiceError> {
    info!("{:<12} --> 사용자 동기화 요청: {:?}", "Handler", cmd);
    let user = identity::sync_user(&db_manager, cmd.external_id, cmd.name, cmd.email).await?;
    Ok(Json(user))
}

/// 사용자 목록 조회
pub async fn handle_get_users(
    State(db_manager): State<Arc<DatabaseManager>>,
) -> Result<Json<Vec<User>>, ServiceError> {
    Ok(Json(query::handlers::get_users(&db_manager).await?))
}

/// 사용자 조회
pub async fn handle_get_user(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ServiceError> {
    Ok(Json(query::handlers::get_user(&db_manager, user_id).await?))
}

/// 사용자 입찰 목록 조회
pub async fn handle_get_user_bids(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Bid>>, ServiceError> {
    Ok(Json(
        query::handlers::get_bids_by_user(&db_manager, user_id).await?,
    ))
}

/// 사용자 요약 통계 조회
pub async fn handle_get_overview_stats(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<query::handlers::OverviewStats>, ServiceError> {
    Ok(Json(
        query::handlers::get_overview_stats(&db_manager, user_id).await?,
    ))
}

// endregion: --- User Handlers

// region:    --- Collection Handlers

/// 모든 컬렉션 조회
pub async fn handle_get_collections(
    State(db_manager): State<Arc<DatabaseManager>>,
) -> Result<Json<Vec<Collection>>, ServiceError> {
    Ok(Json(query::handlers::get_collections(&db_manager).await?))
}

/// 모든 컬렉션 상세 조회
pub async fn handle_get_collections_with_details(
    State(db_manager): State<Arc<DatabaseManager>>,
) -> Result<Json<Vec<CollectionWithDetails>>, ServiceError> {
    Ok(Json(
        query::handlers::get_collections_with_details(&db_manager).await?,
    ))
}

/// 컬렉션 조회
pub async fn handle_get_collection(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(collection_id): Path<Uuid>,
) -> Result<Json<Collection>, ServiceError> {
    Ok(Json(
        query::handlers::get_collection(&db_manager, collection_id).await?,
    ))
}

/// 컬렉션 상세 조회
pub async fn handle_get_collection_with_details(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(collection_id): Path<Uuid>,
) -> Result<Json<CollectionWithDetails>, ServiceError> {
    Ok(Json(
        query::handlers::get_collection_with_details(&db_manager, collection_id).await?,
    ))
}

/// 컬렉션 생성 요청 처리
pub async fn handle_create_collection(
    State(db_manager): State<Arc<DatabaseManager>>,
    Json(cmd): Json<CreateCollectionCommand>,
) -> Result<Json<Collection>, ServiceError> {
    info!("{:<12} --> 컬렉션 생성 요청: {:?}", "Handler", cmd);
    let collection = commands::create_collection(
        &db_manager,
        cmd.name,
        cmd.description,
        cmd.stock,
        cmd.price,
        cmd.owner_id,
    )
    .await?;
    Ok(Json(collection))
}

/// 컬렉션 수정 요청 처리 (소유자 전용)
pub async fn handle_update_collection(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(collection_id): Path<Uuid>,
    Json(cmd): Json<UpdateCollectionCommand>,
) -> Result<Json<Collection>, ServiceError> {
    info!(
        "{:<12} --> 컬렉션 수정 요청: id={}, {:?}",
        "Handler", collection_id, cmd
    );
    let collection = access::update_collection(
        &db_manager,
        cmd.actor_id,
        collection_id,
        cmd.name,
        cmd.description,
        cmd.stock,
        cmd.price,
    )
    .await?;
    Ok(Json(collection))
}

/// 컬렉션 삭제 요청 처리 (소유자 전용)
pub async fn handle_delete_collection(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(collection_id): Path<Uuid>,
    Json(cmd): Json<ActorCommand>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    info!(
        "{:<12} --> 컬렉션 삭제 요청: id={}, actor={}",
        "Handler", collection_id, cmd.actor_id
    );
    access::delete_collection(&db_manager, cmd.actor_id, collection_id).await?;
    Ok(Json(serde_json::json!({
        "message": "collection deleted"
    })))
}

/// 컬렉션 입찰 목록 조회
pub async fn handle_get_collection_bids(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(collection_id): Path<Uuid>,
) -> Result<Json<Vec<Bid>>, ServiceError> {
    Ok(Json(
        query::handlers::get_bids_by_collection(&db_manager, collection_id).await?,
    ))
}

/// 최고 입찰가 조회
pub async fn handle_get_highest_bid(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(collection_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let highest_bid = query::handlers::get_highest_bid(&db_manager, collection_id).await?;
    Ok(Json(serde_json::json!({ "highest_bid": highest_bid })))
}

// endregion: --- Collection Handlers

// region:    --- Bid Handlers

/// 입찰 생성 요청 처리
pub async fn handle_place_bid(
    State(db_manager): State<Arc<DatabaseManager>>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<Json<Bid>, ServiceError> {
    info!("{:<12} --> 입찰 생성 요청: {:?}", "Handler", cmd);
    let bid = access::place_bid(&db_manager, cmd.actor_id, cmd.collection_id, cmd.price).await?;
    Ok(Json(bid))
}

/// 입찰 수정 요청 처리 (입찰자 전용)
pub async fn handle_update_bid(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(bid_id): Path<Uuid>,
    Json(cmd): Json<UpdateBidCommand>,
) -> Result<Json<Bid>, ServiceError> {
    info!(
        "{:<12} --> 입찰 수정 요청: id={}, {:?}",
        "Handler", bid_id, cmd
    );
    let bid = access::update_bid(&db_manager, cmd.actor_id, bid_id, cmd.price).await?;
    Ok(Json(bid))
}

/// 입찰 취소 요청 처리 (입찰자 전용)
pub async fn handle_cancel_bid(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(bid_id): Path<Uuid>,
    Json(cmd): Json<ActorCommand>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    info!(
        "{:<12} --> 입찰 취소 요청: id={}, actor={}",
        "Handler", bid_id, cmd.actor_id
    );
    access::cancel_bid(&db_manager, cmd.actor_id, bid_id).await?;
    Ok(Json(serde_json::json!({
        "message": "bid cancelled"
    })))
}

/// 입찰 수락 요청 처리 (컬렉션 소유자 전용)
pub async fn handle_accept_bid(
    State(db_manager): State<Arc<DatabaseManager>>,
    Json(cmd): Json<AcceptBidCommand>,
) -> Result<Json<AcceptOutcome>, ServiceError> {
    info!("{:<12} --> 입찰 수락 요청: {:?}", "Handler", cmd);
    let outcome =
        access::accept_bid(&db_manager, cmd.actor_id, cmd.collection_id, cmd.bid_id).await?;
    Ok(Json(outcome))
}

/// 입찰 거절 요청 처리 (컬렉션 소유자 전용)
pub async fn handle_reject_bid(
    State(db_manager): State<Arc<DatabaseManager>>,
    Json(cmd): Json<RejectBidCommand>,
) -> Result<Json<Bid>, ServiceError> {
    info!("{:<12} --> 입찰 거절 요청: {:?}", "Handler", cmd);
    let bid = access::reject_bid(&db_manager, cmd.actor_id, cmd.bid_id).await?;
    Ok(Json(bid))
}

// endregion: --- Bid Handlers
