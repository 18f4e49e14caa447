/// 접근 제어 게이트
/// 행위자(actor)를 명시적으로 받아 순수 함수 검사를 통과한 요청만
/// 생명주기 커맨드에 위임한다. 세션 같은 암묵적 현재 사용자는 없다.
// region:    --- Imports
use crate::bidding::commands;
use crate::bidding::model::{AcceptOutcome, Bid, Collection};
use crate::database::DatabaseManager;
use crate::error::ServiceError;
use rust_decimal::Decimal;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Checks

/// 컬렉션 변경/입찰 결정 권한은 소유자에게만 있다.
pub fn ensure_collection_owner(actor_id: Uuid, collection: &Collection) -> Result<(), ServiceError> {
    if collection.owner_id != actor_id {
        return Err(ServiceError::Forbidden);
    }
    Ok(())
}

/// 입찰 수정/취소 권한은 입찰자에게만 있다.
pub fn ensure_bidder(actor_id: Uuid, bid: &Bid) -> Result<(), ServiceError> {
    if bid.user_id != actor_id {
        return Err(ServiceError::Forbidden);
    }
    Ok(())
}

// endregion: --- Checks

// region:    --- Gate Operations

/// 컬렉션 수정 (소유자 전용)
pub async fn update_collection(
    db_manager: &DatabaseManager,
    actor_id: Uuid,
    collection_id: Uuid,
    name: Option<String>,
    description: Option<String>,
    stock: Option<i32>,
    price: Option<Decimal>,
) -> Result<Collection, ServiceError> {
    let collection = fetch_collection(db_manager, collection_id).await?;
    ensure_collection_owner(actor_id, &collection)?;
    commands::update_collection(db_manager, collection_id, name, description, stock, price).await
}

/// 컬렉션 삭제 (소유자 전용)
pub async fn delete_collection(
    db_manager: &DatabaseManager,
    actor_id: Uuid,
    collection_id: Uuid,
) -> Result<(), ServiceError> {
    let collection = fetch_collection(db_manager, collection_id).await?;
    ensure_collection_owner(actor_id, &collection)?;
    commands::delete_collection(db_manager, collection_id).await
}

/// 입찰 생성
/// 자기 컬렉션 입찰 금지 규칙은 엔진이 직접 검사한다.
pub async fn place_bid(
    db_manager: &DatabaseManager,
    actor_id: Uuid,
    collection_id: Uuid,
    price: Decimal,
) -> Result<Bid, ServiceError> {
    commands::place_bid(db_manager, collection_id, actor_id, price).await
}

/// 입찰 수정 (입찰자 전용)
pub async fn update_bid(
    db_manager: &DatabaseManager,
    actor_id: Uuid,
    bid_id: Uuid,
    new_price: Decimal,
) -> Result<Bid, ServiceError> {
    let bid = fetch_bid(db_manager, bid_id).await?;
    ensure_bidder(actor_id, &bid)?;
    commands::update_bid(db_manager, bid_id, new_price).await
}

/// 입찰 취소 (입찰자 전용)
pub async fn cancel_bid(
    db_manager: &DatabaseManager,
    actor_id: Uuid,
    bid_id: Uuid,
) -> Result<(), ServiceError> {
    let bid = fetch_bid(db_manager, bid_id).await?;
    ensure_bidder(actor_id, &bid)?;
    commands::cancel_bid(db_manager, bid_id).await
}

/// 입찰 수락 (해당 컬렉션 소유자 전용)
pub async fn accept_bid(
    db_manager: &DatabaseManager,
    actor_id: Uuid,
    collection_id: Uuid,
    bid_id: Uuid,
) -> Result<AcceptOutcome, ServiceError> {
    let collection = fetch_collection(db_manager, collection_id).await?;
    ensure_collection_owner(actor_id, &collection)?;
    commands::accept_bid(db_manager, collection_id, bid_id).await
}

/// 입찰 거절 (해당 컬렉션 소유자 전용)
pub async fn reject_bid(
    db_manager: &DatabaseManager,
    actor_id: Uuid,
    bid_id: Uuid,
) -> Result<Bid, ServiceError> {
    let bid = fetch_bid(db_manager, bid_id).await?;
    let collection = fetch_collection(db_manager, bid.collection_id).await?;
    ensure_collection_owner(actor_id, &collection)?;
    commands::reject_bid(db_manager, bid_id).await
}

// endregion: --- Gate Operations

// region:    --- Lookups

async fn fetch_collection(
    db_manager: &DatabaseManager,
    collection_id: Uuid,
) -> Result<Collection, ServiceError> {
    sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = $1")
        .bind(collection_id)
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or(ServiceError::NotFound("collection"))
}

async fn fetch_bid(db_manager: &DatabaseManager, bid_id: Uuid) -> Result<Bid, ServiceError> {
    sqlx::query_as::<_, Bid>("SELECT * FROM bids WHERE id = $1")
        .bind(bid_id)
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or(ServiceError::NotFound("bid"))
}

// endregion: --- Lookups

// endregion: --- Tests
