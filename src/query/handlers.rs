// region:    --- Imports
use super::queries;
use crate::bidding::model::{Bid, BidWithBidder, Collection, CollectionWithDetails, User};
use crate::database::DatabaseManager;
use crate::error::ServiceError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- User Queries

/// 사용자 목록 조회
pub async fn get_users(db_manager: &DatabaseManager) -> Result<Vec<User>, ServiceError> {
    info!("{:<12} --> 사용자 목록 조회", "Query");
    let users = sqlx::query_as::<_, User>(queries::GET_USERS)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(users)
}

/// 사용자 조회
pub async fn get_user(db_manager: &DatabaseManager, user_id: Uuid) -> Result<User, ServiceError> {
    info!("{:<12} --> 사용자 조회 id: {}", "Query", user_id);
    sqlx::query_as::<_, User>(queries::GET_USER)
        .bind(user_id)
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or(ServiceError::NotFound("user"))
}

// endregion: --- User Queries

// region:    --- Collection Queries

/// 모든 컬렉션 조회
pub async fn get_collections(
    db_manager: &DatabaseManager,
) -> Result<Vec<Collection>, ServiceError> {
    info!("{:<12} --> 모든 컬렉션 조회", "Query");
    let collections = sqlx::query_as::<_, Collection>(queries::GET_COLLECTIONS)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(collections)
}

/// 컬렉션 조회
pub async fn get_collection(
    db_manager: &DatabaseManager,
    collection_id: Uuid,
) -> Result<Collection, ServiceError> {
    info!("{:<12} --> 컬렉션 조회 id: {}", "Query", collection_id);
    sqlx::query_as::<_, Collection>(queries::GET_COLLECTION)
        .bind(collection_id)
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or(ServiceError::NotFound("collection"))
}

/// 모든 컬렉션 상세 조회 (소유자 + 입찰 + 입찰자)
/// 컬렉션 수와 무관하게 트랜잭션 1건, 쿼리 3번으로 조회한 뒤 메모리에서 조립한다.
pub async fn get_collections_with_details(
    db_manager: &DatabaseManager,
) -> Result<Vec<CollectionWithDetails>, ServiceError> {
    info!("{:<12} --> 모든 컬렉션 상세 조회", "Query");
    let (collections, users, bids) = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let collections = sqlx::query_as::<_, Collection>(queries::GET_COLLECTIONS)
                    .fetch_all(&mut **tx)
                    .await?;
                let users = sqlx::query_as::<_, User>(queries::GET_USERS)
                    .fetch_all(&mut **tx)
                    .await?;
                let bids = sqlx::query_as::<_, Bid>(queries::GET_ALL_BIDS)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok::<_, ServiceError>((collections, users, bids))
            })
        })
        .await?;

    Ok(stitch_details(collections, users, bids))
}

/// 컬렉션 1건 상세 조회 (소유자 + 입찰 + 입찰자)
pub async fn get_collection_with_details(
    db_manager: &DatabaseManager,
    collection_id: Uuid,
) -> Result<CollectionWithDetails, ServiceError> {
    info!("{:<12} --> 컬렉션 상세 조회 id: {}", "Query", collection_id);
    let (collection, users, bids) = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let collection = sqlx::query_as::<_, Collection>(queries::GET_COLLECTION)
                    .bind(collection_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(ServiceError::NotFound("collection"))?;
                let users = sqlx::query_as::<_, User>(queries::GET_COLLECTION_RELATED_USERS)
                    .bind(collection_id)
                    .fetch_all(&mut **tx)
                    .await?;
                let bids = sqlx::query_as::<_, Bid>(queries::GET_COLLECTION_BIDS)
                    .bind(collection_id)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok::<_, ServiceError>((collection, users, bids))
            })
        })
        .await?;

    stitch_details(vec![collection], users, bids)
        .into_iter()
        .next()
        .ok_or(ServiceError::NotFound("collection"))
}

// endregion: --- Collection Queries

// region:    --- Bid Queries

/// 컬렉션 입찰 목록 조회
/// 컬렉션이 삭제된 경우에도 빈 목록을 반환한다 (cascade 로 입찰이 남지 않는다).
pub async fn get_bids_by_collection(
    db_manager: &DatabaseManager,
    collection_id: Uuid,
) -> Result<Vec<Bid>, ServiceError> {
    info!("{:<12} --> 컬렉션 입찰 조회 id: {}", "Query", collection_id);
    let bids = sqlx::query_as::<_, Bid>(queries::GET_COLLECTION_BIDS)
        .bind(collection_id)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(bids)
}

/// 사용자 입찰 목록 조회
pub async fn get_bids_by_user(
    db_manager: &DatabaseManager,
    user_id: Uuid,
) -> Result<Vec<Bid>, ServiceError> {
    info!("{:<12} --> 사용자 입찰 조회 id: {}", "Query", user_id);
    let bids = sqlx::query_as::<_, Bid>(queries::GET_USER_BIDS)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(bids)
}

/// 최고 입찰가 조회
/// 입찰이 하나도 없으면 컬렉션 기준가를 반환한다. 표시 용도다.
pub async fn get_highest_bid(
    db_manager: &DatabaseManager,
    collection_id: Uuid,
) -> Result<Decimal, ServiceError> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", collection_id);
    sqlx::query_scalar::<_, Decimal>(queries::GET_HIGHEST_BID)
        .bind(collection_id)
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or(ServiceError::NotFound("collection"))
}

// endregion: --- Bid Queries

// region:    --- Overview

/// 사용자 기준 대시보드 요약 통계
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OverviewStats {
    pub my_collections: i64,
    pub my_active_bids: i64,
    pub my_successful_sales: i64,
    pub bids_on_my_collections: i64,
}

/// 요약 통계 조회
pub async fn get_overview_stats(
    db_manager: &DatabaseManager,
    user_id: Uuid,
) -> Result<OverviewStats, ServiceError> {
    info!("{:<12} --> 요약 통계 조회 id: {}", "Query", user_id);
    let stats = sqlx::query_as::<_, OverviewStats>(queries::GET_OVERVIEW_STATS)
        .bind(user_id)
        .fetch_one(db_manager.pool())
        .await?;
    Ok(stats)
}

// endregion: --- Overview

// region:    --- Stitching

/// 컬렉션/사용자/입찰 세 결과를 상세 뷰로 조립한다.
/// 입력 정렬(컬렉션 최신순, 입찰 최신순)을 그대로 유지한다.
fn stitch_details(
    collections: Vec<Collection>,
    users: Vec<User>,
    bids: Vec<Bid>,
) -> Vec<CollectionWithDetails> {
    let users_by_id: HashMap<Uuid, User> = users.into_iter().map(|u| (u.id, u)).collect();

    let mut bids_by_collection: HashMap<Uuid, Vec<BidWithBidder>> = HashMap::new();
    for bid in bids {
        let user = users_by_id.get(&bid.user_id).cloned();
        bids_by_collection
            .entry(bid.collection_id)
            .or_default()
            .push(BidWithBidder { bid, user });
    }

    collections
        .into_iter()
        .filter_map(|collection| {
            let Some(owner) = users_by_id.get(&collection.owner_id).cloned() else {
                // FK 제약상 도달 불가
                warn!(
                    "{:<12} --> 소유자 없는 컬렉션 제외: {}",
                    "Query", collection.id
                );
                return None;
            };
            let bids = bids_by_collection.remove(&collection.id).unwrap_or_default();
            Some(CollectionWithDetails {
                collection,
                owner,
                bids,
            })
        })
        .collect()
}

// endregion: --- Stitching

// endregion: --- Tests
