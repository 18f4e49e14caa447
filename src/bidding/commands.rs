/// 입찰 생명주기 커맨드 처리
/// 1. 입찰 생성/수정/취소
/// 2. 입찰 수락/거절
/// 3. 컬렉션 생성/수정/삭제
// region:    --- Imports
use crate::bidding::model::{
    validate_price, validate_stock, validate_text, AcceptOutcome, Bid, BidStatus, Collection,
};
use crate::database::DatabaseManager;
use crate::error::ServiceError;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Bid Commands

/// 1. 입찰 생성
/// 컬렉션 소유자는 입찰 불가, 대기 중 입찰은 (컬렉션, 입찰자)당 1건.
/// 동시 중복 제출은 one_pending_bid_per_bidder 부분 유니크 인덱스가 최종적으로 걸러낸다.
pub async fn place_bid(
    db_manager: &DatabaseManager,
    collection_id: Uuid,
    bidder_id: Uuid,
    price: Decimal,
) -> Result<Bid, ServiceError> {
    info!(
        "{:<12} --> 입찰 생성: collection={}, bidder={}",
        "Command", collection_id, bidder_id
    );
    validate_price("bid price", price)?;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let collection =
                    sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = $1")
                        .bind(collection_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or(ServiceError::NotFound("collection"))?;

                if collection.owner_id == bidder_id {
                    return Err(ServiceError::SelfBidForbidden);
                }

                // 사전 점검. 경합의 최종 판정은 유니크 인덱스가 한다.
                let has_pending = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (
                        SELECT 1 FROM bids
                        WHERE collection_id = $1 AND user_id = $2 AND status = 'pending'
                    )",
                )
                .bind(collection_id)
                .bind(bidder_id)
                .fetch_one(&mut **tx)
                .await?;

                if has_pending {
                    return Err(ServiceError::DuplicatePendingBid);
                }

                let bid = sqlx::query_as::<_, Bid>(
                    "INSERT INTO bids (collection_id, user_id, price, status)
                     VALUES ($1, $2, $3, 'pending')
                     RETURNING *",
                )
                .bind(collection_id)
                .bind(bidder_id)
                .bind(price)
                .fetch_one(&mut **tx)
                .await?;

                Ok(bid)
            })
        })
        .await
}

/// 2. 입찰 가격 수정
/// pending 상태에서만 허용. 상태와 참조는 바뀌지 않는다.
pub async fn update_bid(
    db_manager: &DatabaseManager,
    bid_id: Uuid,
    new_price: Decimal,
) -> Result<Bid, ServiceError> {
    info!("{:<12} --> 입찰 수정: bid={}", "Command", bid_id);
    validate_price("bid price", new_price)?;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let bid = sqlx::query_as::<_, Bid>("SELECT * FROM bids WHERE id = $1 FOR UPDATE")
                    .bind(bid_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(ServiceError::NotFound("bid"))?;

                bid.ensure_pending("update")?;

                let updated = sqlx::query_as::<_, Bid>(
                    "UPDATE bids SET price = $2, updated_at = now() WHERE id = $1 RETURNING *",
                )
                .bind(bid_id)
                .bind(new_price)
                .fetch_one(&mut **tx)
                .await?;

                Ok(updated)
            })
        })
        .await
}

/// 3. 입찰 취소(삭제)
/// pending 상태에서만 허용. 행을 영구 삭제한다.
pub async fn cancel_bid(db_manager: &DatabaseManager, bid_id: Uuid) -> Result<(), ServiceError> {
    info!("{:<12} --> 입찰 취소: bid={}", "Command", bid_id);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let bid = sqlx::query_as::<_, Bid>("SELECT * FROM bids WHERE id = $1 FOR UPDATE")
                    .bind(bid_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(ServiceError::NotFound("bid"))?;

                bid.ensure_pending("delete")?;

                sqlx::query("DELETE FROM bids WHERE id = $1")
                    .bind(bid_id)
                    .execute(&mut **tx)
                    .await?;

                Ok(())
            })
        })
        .await
}

/// 4. 입찰 수락
/// 하나의 트랜잭션 안에서 같은 컬렉션의 다른 pending 입찰을 전부 거절한 뒤
/// 대상 입찰을 수락한다. 컬렉션 행 잠금이 동일 컬렉션에 대한 동시 수락을 직렬화하고,
/// one_accepted_bid_per_collection 인덱스가 2차 방어선이다.
pub async fn accept_bid(
    db_manager: &DatabaseManager,
    collection_id: Uuid,
    bid_id: Uuid,
) -> Result<AcceptOutcome, ServiceError> {
    info!(
        "{:<12} --> 입찰 수락: collection={}, bid={}",
        "Command", collection_id, bid_id
    );

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 컬렉션 행 잠금
                sqlx::query_as::<_, Collection>(
                    "SELECT * FROM collections WHERE id = $1 FOR UPDATE",
                )
                .bind(collection_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(ServiceError::NotFound("collection"))?;

                let target = sqlx::query_as::<_, Bid>(
                    "SELECT * FROM bids WHERE id = $1 AND collection_id = $2",
                )
                .bind(bid_id)
                .bind(collection_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(ServiceError::NotFound("bid"))?;

                // 이미 낙찰된 컬렉션은 재수락 불가
                let already_resolved = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (
                        SELECT 1 FROM bids
                        WHERE collection_id = $1 AND status = 'accepted'
                    )",
                )
                .bind(collection_id)
                .fetch_one(&mut **tx)
                .await?;

                if already_resolved {
                    return Err(ServiceError::AlreadyResolved);
                }

                target.ensure_pending("accept")?;

                // 나머지 pending 입찰 일괄 거절
                let mut rejected = sqlx::query_as::<_, Bid>(
                    "UPDATE bids SET status = 'rejected', updated_at = now()
                     WHERE collection_id = $1 AND id <> $2 AND status = 'pending'
                     RETURNING *",
                )
                .bind(collection_id)
                .bind(bid_id)
                .fetch_all(&mut **tx)
                .await?;
                rejected.sort_by(|a, b| b.created_at.cmp(&a.created_at));

                let accepted = sqlx::query_as::<_, Bid>(
                    "UPDATE bids SET status = 'accepted', updated_at = now()
                     WHERE id = $1
                     RETURNING *",
                )
                .bind(bid_id)
                .fetch_one(&mut **tx)
                .await?;

                info!(
                    "{:<12} --> 입찰 수락 완료: accepted={}, rejected={}건",
                    "Command",
                    accepted.id,
                    rejected.len()
                );

                Ok(AcceptOutcome {
                    accepted_bid: accepted,
                    rejected_bids: rejected,
                })
            })
        })
        .await
}

/// 5. 입찰 거절
/// 소유자 권한의 강제 거절. 이전 상태와 무관하게 rejected 로 만들며 멱등하다.
pub async fn reject_bid(db_manager: &DatabaseManager, bid_id: Uuid) -> Result<Bid, ServiceError> {
    info!("{:<12} --> 입찰 거절: bid={}", "Command", bid_id);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let bid = sqlx::query_as::<_, Bid>(
                    "UPDATE bids SET status = 'rejected', updated_at = now()
                     WHERE id = $1
                     RETURNING *",
                )
                .bind(bid_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(ServiceError::NotFound("bid"))?;

                debug_assert_eq!(bid.status, BidStatus::Rejected);
                Ok(bid)
            })
        })
        .await
}

// endregion: --- Bid Commands

// region:    --- Collection Commands

/// 컬렉션 생성
pub async fn create_collection(
    db_manager: &DatabaseManager,
    name: String,
    description: String,
    stock: i32,
    price: Decimal,
    owner_id: Uuid,
) -> Result<Collection, ServiceError> {
    info!(
        "{:<12} --> 컬렉션 생성: owner={}, name={}",
        "Command", owner_id, name
    );
    validate_text("name", &name)?;
    validate_text("description", &description)?;
    validate_stock(stock)?;
    validate_price("price", price)?;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let owner_exists =
                    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                        .bind(owner_id)
                        .fetch_one(&mut **tx)
                        .await?;
                if !owner_exists {
                    return Err(ServiceError::NotFound("user"));
                }

                let collection = sqlx::query_as::<_, Collection>(
                    "INSERT INTO collections (name, description, stock, price, owner_id)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING *",
                )
                .bind(name)
                .bind(description)
                .bind(stock)
                .bind(price)
                .bind(owner_id)
                .fetch_one(&mut **tx)
                .await?;

                Ok(collection)
            })
        })
        .await
}

/// 컬렉션 부분 수정 (이름/설명/재고/가격)
/// 소유자와 생성 시각은 변경 불가.
pub async fn update_collection(
    db_manager: &DatabaseManager,
    collection_id: Uuid,
    name: Option<String>,
    description: Option<String>,
    stock: Option<i32>,
    price: Option<Decimal>,
) -> Result<Collection, ServiceError> {
    info!("{:<12} --> 컬렉션 수정: id={}", "Command", collection_id);
    if let Some(ref name) = name {
        validate_text("name", name)?;
    }
    if let Some(ref description) = description {
        validate_text("description", description)?;
    }
    if let Some(stock) = stock {
        validate_stock(stock)?;
    }
    if let Some(price) = price {
        validate_price("price", price)?;
    }

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let updated = sqlx::query_as::<_, Collection>(
                    "UPDATE collections
                     SET name = COALESCE($2, name),
                         description = COALESCE($3, description),
                         stock = COALESCE($4, stock),
                         price = COALESCE($5, price),
                         updated_at = now()
                     WHERE id = $1
                     RETURNING *",
                )
                .bind(collection_id)
                .bind(name)
                .bind(description)
                .bind(stock)
                .bind(price)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(ServiceError::NotFound("collection"))?;

                Ok(updated)
            })
        })
        .await
}

/// 컬렉션 삭제
/// 참조하는 입찰은 FK cascade 로 함께 삭제된다.
pub async fn delete_collection(
    db_manager: &DatabaseManager,
    collection_id: Uuid,
) -> Result<(), ServiceError> {
    info!("{:<12} --> 컬렉션 삭제: id={}", "Command", collection_id);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let deleted =
                    sqlx::query_scalar::<_, Uuid>("DELETE FROM collections WHERE id = $1 RETURNING id")
                        .bind(collection_id)
                        .fetch_optional(&mut **tx)
                        .await?;

                if deleted.is_none() {
                    return Err(ServiceError::NotFound("collection"));
                }
                Ok(())
            })
        })
        .await
}

// endregion: --- Collection Commands
