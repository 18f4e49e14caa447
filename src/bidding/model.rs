// region:    --- Imports
use crate::error::ServiceError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Models

// 사용자 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub clerk_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 컬렉션(경매 대상 묶음) 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub stock: i32,
    pub price: Decimal,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 입찰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub price: Decimal,
    pub user_id: Uuid,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 입찰 상태
/// pending 상태만 수정/취소/수락이 가능하다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "bid_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Pending => "pending",
            BidStatus::Accepted => "accepted",
            BidStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Bid {
    /// pending 상태가 아니면 해당 작업을 거부한다.
    pub fn ensure_pending(&self, action: &'static str) -> Result<(), ServiceError> {
        if self.status != BidStatus::Pending {
            return Err(ServiceError::InvalidStateTransition {
                action,
                status: self.status,
            });
        }
        Ok(())
    }
}

// endregion: --- Models

// region:    --- Views

/// 입찰 + 입찰자 조회용 뷰
#[derive(Debug, Clone, Serialize)]
pub struct BidWithBidder {
    #[serde(flatten)]
    pub bid: Bid,
    pub user: Option<User>,
}

/// 컬렉션 + 소유자 + 입찰 목록 조회용 뷰
#[derive(Debug, Clone, Serialize)]
pub struct CollectionWithDetails {
    #[serde(flatten)]
    pub collection: Collection,
    pub owner: User,
    pub bids: Vec<BidWithBidder>,
}

/// 입찰 수락 결과
/// 수락된 입찰과 이번 호출로 새로 거절된 입찰 목록(최신순)을 반환한다.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptOutcome {
    pub accepted_bid: Bid,
    pub rejected_bids: Vec<Bid>,
}

// endregion: --- Views

// region:    --- Validation

// 최소 가격 (0.01)
fn min_price() -> Decimal {
    Decimal::new(1, 2)
}

/// 가격 검증 (0.01 이상)
pub fn validate_price(field: &str, price: Decimal) -> Result<(), ServiceError> {
    if price < min_price() {
        return Err(ServiceError::Validation(format!(
            "{field} must be at least 0.01"
        )));
    }
    Ok(())
}

/// 재고 검증 (1 이상)
pub fn validate_stock(stock: i32) -> Result<(), ServiceError> {
    if stock < 1 {
        return Err(ServiceError::Validation(
            "stock must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// 이름/설명 검증 (공백 불가)
pub fn validate_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

// endregion: --- Validation

// endregion: --- Tests
