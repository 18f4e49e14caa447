// region:    --- Imports
use crate::bidding::model::BidStatus;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- Service Error

/// 비즈니스 규칙 위반 및 저장소 오류
/// 예상 가능한 규칙 위반은 전부 타입으로 표현하고, 저장소 장애만 Database 로 전파한다.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("you do not have permission to perform this action")]
    Forbidden,

    #[error("you cannot bid on your own collection")]
    SelfBidForbidden,

    #[error("you already have a pending bid on this collection")]
    DuplicatePendingBid,

    #[error("cannot {action} {status} bid")]
    InvalidStateTransition {
        action: &'static str,
        status: BidStatus,
    },

    #[error("collection already has an accepted bid")]
    AlreadyResolved,

    #[error("another request resolved this collection first, please refresh")]
    Conflict,

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl ServiceError {
    /// 클라이언트용 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Forbidden => "FORBIDDEN",
            ServiceError::SelfBidForbidden => "SELF_BID_FORBIDDEN",
            ServiceError::DuplicatePendingBid => "DUPLICATE_PENDING_BID",
            ServiceError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            ServiceError::AlreadyResolved => "ALREADY_RESOLVED",
            ServiceError::Conflict => "CONFLICT",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP 상태 코드 매핑
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden | ServiceError::SelfBidForbidden => StatusCode::FORBIDDEN,
            ServiceError::DuplicatePendingBid
            | ServiceError::AlreadyResolved
            | ServiceError::Conflict => StatusCode::CONFLICT,
            ServiceError::InvalidStateTransition { .. } | ServiceError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// sqlx 오류 변환
/// 저장소에 밀어넣은 유일성 제약 위반이 동시 요청 경합의 최종 판정 신호다.
impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            match db_err.constraint() {
                Some("one_pending_bid_per_bidder") => return ServiceError::DuplicatePendingBid,
                Some("one_accepted_bid_per_collection") => return ServiceError::Conflict,
                Some("users_email_key") => {
                    return ServiceError::Validation("email is already in use".to_string())
                }
                _ => {}
            }
        }
        ServiceError::Database(e)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let ServiceError::Database(ref e) = self {
            error!("{:<12} --> 저장소 오류: {:?}", "Error", e);
        }
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (self.status_code(), body).into_response()
    }
}

// endregion: --- Service Error

// endregion: --- Tests
