/// 외부 인증 제공자 연동
/// 검증된 외부 식별자(clerk_id)를 내부 사용자에 매핑하고,
/// 처음 보는 식별자는 사용자 레코드를 생성한다. 사용자는 삭제되지 않는다.
// region:    --- Imports
use crate::bidding::model::{validate_text, User};
use crate::database::DatabaseManager;
use crate::error::ServiceError;
use tracing::info;

// endregion: --- Imports

// region:    --- Identity

/// 외부 식별자 기준 사용자 동기화
/// 같은 식별자로 동시에 호출돼도 upsert 가 단일 레코드를 보장한다.
pub async fn sync_user(
    db_manager: &DatabaseManager,
    external_id: String,
    name: String,
    email: String,
) -> Result<User, ServiceError> {
    info!("{:<12} --> 사용자 동기화: external_id={}", "Identity", external_id);
    validate_text("external id", &external_id)?;
    validate_text("name", &name)?;
    validate_text("email", &email)?;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 기존 사용자 프로필은 건드리지 않는다 (최초 1회 생성)
                let user = sqlx::query_as::<_, User>(
                    "INSERT INTO users (name, email, clerk_id)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (clerk_id) DO UPDATE SET updated_at = now()
                     RETURNING *",
                )
                .bind(name)
                .bind(email)
                .bind(external_id)
                .fetch_one(&mut **tx)
                .await?;

                Ok(user)
            })
        })
        .await
}

// endregion: --- Identity
