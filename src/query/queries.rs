/// 사용자 목록 조회
pub const GET_USERS: &str = "SELECT * FROM users ORDER BY created_at DESC";

/// 사용자 조회
pub const GET_USER: &str = "SELECT * FROM users WHERE id = $1";

/// 모든 컬렉션 조회 (최신순)
pub const GET_COLLECTIONS: &str = "SELECT * FROM collections ORDER BY created_at DESC";

/// 컬렉션 조회
pub const GET_COLLECTION: &str = "SELECT * FROM collections WHERE id = $1";

/// 모든 입찰 조회 (최신순, 상세 뷰 조립용)
pub const GET_ALL_BIDS: &str = "SELECT * FROM bids ORDER BY created_at DESC";

/// 컬렉션 입찰 목록 조회 (최신순)
pub const GET_COLLECTION_BIDS: &str = r#"
    SELECT *
    FROM bids
    WHERE collection_id = $1
    ORDER BY created_at DESC
"#;

/// 사용자 입찰 목록 조회 (최신순)
pub const GET_USER_BIDS: &str = r#"
    SELECT *
    FROM bids
    WHERE user_id = $1
    ORDER BY created_at DESC
"#;

/// 컬렉션 관련 사용자 조회 (소유자 + 입찰자)
pub const GET_COLLECTION_RELATED_USERS: &str = r#"
    SELECT *
    FROM users
    WHERE id IN (
        SELECT owner_id FROM collections WHERE id = $1
        UNION
        SELECT user_id FROM bids WHERE collection_id = $1
    )
"#;

/// 최고 입찰가 조회 (입찰이 없으면 기준가로 대체)
pub const GET_HIGHEST_BID: &str = r#"
    SELECT COALESCE(MAX(b.price), c.price) AS highest_bid
    FROM collections c
    LEFT JOIN bids b ON b.collection_id = c.id
    WHERE c.id = $1
    GROUP BY c.price
"#;

/// 대시보드 요약 통계 조회
pub const GET_OVERVIEW_STATS: &str = r#"
    SELECT
        (SELECT COUNT(*) FROM collections WHERE owner_id = $1) AS my_collections,
        (SELECT COUNT(*) FROM bids WHERE user_id = $1 AND status = 'pending') AS my_active_bids,
        (SELECT COUNT(*) FROM bids WHERE user_id = $1 AND status = 'accepted') AS my_successful_sales,
        (SELECT COUNT(*)
         FROM bids b
         JOIN collections c ON b.collection_id = c.id
         WHERE c.owner_id = $1 AND b.status = 'pending') AS bids_on_my_collections
"#;
