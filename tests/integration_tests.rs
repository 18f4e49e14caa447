use bidding_service::bidding::model::{Bid, BidStatus, Collection, User};
use bidding_service::database::DatabaseManager;
use bidding_service::query;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:3000";

/// 트레이싱 초기화
fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("트레이싱 구독자 설정 실패");
}

/// 데이터베이스 매니저 설정
async fn setup() -> Arc<DatabaseManager> {
    Arc::new(DatabaseManager::new().await)
}

/// 테스트용 사용자 생성 (외부 인증 동기화 경유)
async fn create_test_user(client: &Client, name: &str) -> User {
    let external_id = format!("clerk_{}", Uuid::new_v4());
    let response = client
        .post(format!("{BASE_URL}/users/sync"))
        .json(&json!({
            "external_id": external_id,
            "name": name,
            "email": format!("{}-{}@example.com", name, Uuid::new_v4()),
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse user")
}

/// 테스트용 컬렉션 생성
async fn create_test_collection(client: &Client, owner: &User, price: &str) -> Collection {
    let response = client
        .post(format!("{BASE_URL}/collections"))
        .json(&json!({
            "name": "입찰 테스트 컬렉션",
            "description": "입찰 기능 테스트를 위한 컬렉션입니다.",
            "stock": 3,
            "price": price,
            "owner_id": owner.id,
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse collection")
}

/// 테스트용 입찰 생성
async fn place_test_bid(client: &Client, collection: &Collection, bidder: &User, price: &str) -> Bid {
    let response = client
        .post(format!("{BASE_URL}/bids"))
        .json(&json!({
            "collection_id": collection.id,
            "actor_id": bidder.id,
            "price": price,
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success(), "bid should be created");
    response.json().await.expect("Failed to parse bid")
}

/// 입찰 수락 요청
async fn accept_bid_request(
    client: &Client,
    collection_id: Uuid,
    bid_id: Uuid,
    actor_id: Uuid,
) -> reqwest::Response {
    client
        .post(format!("{BASE_URL}/bids/accept"))
        .json(&json!({
            "collection_id": collection_id,
            "bid_id": bid_id,
            "actor_id": actor_id,
        }))
        .send()
        .await
        .expect("Failed to send request")
}

/// 입찰 수락 원자성 테스트
/// 다른 pending 입찰은 전부 거절되고, 응답에는 최신순으로 담긴다.
#[tokio::test]
async fn test_accept_bid_rejects_all_other_pending_bids() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder1 = create_test_user(&client, "bidder1").await;
    let bidder2 = create_test_user(&client, "bidder2").await;
    let bidder3 = create_test_user(&client, "bidder3").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;

    let b1 = place_test_bid(&client, &collection, &bidder1, "110.00").await;
    let b2 = place_test_bid(&client, &collection, &bidder2, "120.00").await;
    let b3 = place_test_bid(&client, &collection, &bidder3, "130.00").await;

    let response = accept_bid_request(&client, collection.id, b2.id, owner.id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let outcome: Value = response.json().await.unwrap();
    assert_eq!(outcome["accepted_bid"]["id"], json!(b2.id));
    assert_eq!(outcome["accepted_bid"]["status"], json!("accepted"));

    // 새로 거절된 입찰은 최신순 (b3 가 b1 보다 나중)
    let rejected_ids: Vec<Uuid> = outcome["rejected_bids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| serde_json::from_value(b["id"].clone()).unwrap())
        .collect();
    assert_eq!(rejected_ids, vec![b3.id, b1.id]);

    // 저장소 기준으로도 accepted 는 정확히 1건
    let bids = query::handlers::get_bids_by_collection(&db_manager, collection.id)
        .await
        .unwrap();
    let accepted: Vec<&Bid> = bids
        .iter()
        .filter(|b| b.status == BidStatus::Accepted)
        .collect();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].id, b2.id);
    assert!(bids
        .iter()
        .filter(|b| b.id != b2.id)
        .all(|b| b.status == BidStatus::Rejected));
}

/// 자기 컬렉션 입찰 금지 테스트
#[tokio::test]
async fn test_owner_cannot_bid_on_own_collection() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;

    let response = client
        .post(format!("{BASE_URL}/bids"))
        .json(&json!({
            "collection_id": collection.id,
            "actor_id": owner.id,
            "price": "150.00",
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "SELF_BID_FORBIDDEN");

    // 행이 생성되지 않아야 한다
    let bids = query::handlers::get_bids_by_collection(&db_manager, collection.id)
        .await
        .unwrap();
    assert!(bids.is_empty());
}

/// 중복 pending 입찰 금지 테스트
#[tokio::test]
async fn test_duplicate_pending_bid_is_rejected() {
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder = create_test_user(&client, "bidder").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;

    place_test_bid(&client, &collection, &bidder, "110.00").await;

    let response = client
        .post(format!("{BASE_URL}/bids"))
        .json(&json!({
            "collection_id": collection.id,
            "actor_id": bidder.id,
            "price": "200.00",
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "DUPLICATE_PENDING_BID");
}

/// 수정/취소 가드 테스트
/// 확정된 입찰은 수정도 취소도 불가능하고, 에러 메시지에 현재 상태가 담긴다.
#[tokio::test]
async fn test_resolved_bid_cannot_be_updated_or_cancelled() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder = create_test_user(&client, "bidder").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;
    let bid = place_test_bid(&client, &collection, &bidder, "110.00").await;

    let response = accept_bid_request(&client, collection.id, bid.id, owner.id).await;
    assert_eq!(response.status(), StatusCode::OK);

    // 수정 시도
    let response = client
        .put(format!("{BASE_URL}/bids/{}", bid.id))
        .json(&json!({ "actor_id": bidder.id, "price": "999.00" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_STATE_TRANSITION");
    assert!(body["error"].as_str().unwrap().contains("accepted"));

    // 취소 시도
    let response = client
        .delete(format!("{BASE_URL}/bids/{}", bid.id))
        .json(&json!({ "actor_id": bidder.id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 입찰은 그대로
    let bids = query::handlers::get_bids_by_collection(&db_manager, collection.id)
        .await
        .unwrap();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].status, BidStatus::Accepted);
    assert_eq!(bids[0].price, Decimal::from_str("110.00").unwrap());
}

/// pending 입찰 수정/취소 테스트
#[tokio::test]
async fn test_pending_bid_can_be_updated_and_cancelled() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder = create_test_user(&client, "bidder").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;
    let bid = place_test_bid(&client, &collection, &bidder, "110.00").await;

    // 가격 수정
    let response = client
        .put(format!("{BASE_URL}/bids/{}", bid.id))
        .json(&json!({ "actor_id": bidder.id, "price": "125.50" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Bid = response.json().await.unwrap();
    assert_eq!(updated.price, Decimal::from_str("125.50").unwrap());
    assert_eq!(updated.status, BidStatus::Pending);
    assert_eq!(updated.collection_id, bid.collection_id);
    assert_eq!(updated.user_id, bid.user_id);

    // 취소
    let response = client
        .delete(format!("{BASE_URL}/bids/{}", bid.id))
        .json(&json!({ "actor_id": bidder.id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let bids = query::handlers::get_bids_by_collection(&db_manager, collection.id)
        .await
        .unwrap();
    assert!(bids.is_empty());
}

/// 입찰 거절 멱등성 테스트
#[tokio::test]
async fn test_reject_bid_is_idempotent() {
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder = create_test_user(&client, "bidder").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;
    let bid = place_test_bid(&client, &collection, &bidder, "110.00").await;

    for _ in 0..2 {
        let response = client
            .post(format!("{BASE_URL}/bids/reject"))
            .json(&json!({ "bid_id": bid.id, "actor_id": owner.id }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::OK);
        let rejected: Bid = response.json().await.unwrap();
        assert_eq!(rejected.status, BidStatus::Rejected);
    }
}

/// 이미 낙찰된 컬렉션 재수락 금지 테스트
#[tokio::test]
async fn test_accept_on_resolved_collection_is_blocked() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder1 = create_test_user(&client, "bidder1").await;
    let bidder2 = create_test_user(&client, "bidder2").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;
    let b1 = place_test_bid(&client, &collection, &bidder1, "110.00").await;
    let b2 = place_test_bid(&client, &collection, &bidder2, "120.00").await;

    let response = accept_bid_request(&client, collection.id, b1.id, owner.id).await;
    assert_eq!(response.status(), StatusCode::OK);

    // b2 는 이미 거절됐고, 컬렉션도 이미 낙찰 완료
    let response = accept_bid_request(&client, collection.id, b2.id, owner.id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "ALREADY_RESOLVED");

    let bids = query::handlers::get_bids_by_collection(&db_manager, collection.id)
        .await
        .unwrap();
    let accepted_count = bids
        .iter()
        .filter(|b| b.status == BidStatus::Accepted)
        .count();
    assert_eq!(accepted_count, 1);
}

/// 동시 수락 경쟁 테스트
/// 서로 다른 pending 입찰 2건을 동시에 수락하면 정확히 한 건만 성공해야 한다.
#[tokio::test]
async fn test_concurrent_accepts_yield_single_winner() {
    init_tracing();
    let db_manager = setup().await;
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder1 = create_test_user(&client, "bidder1").await;
    let bidder2 = create_test_user(&client, "bidder2").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;
    let b1 = place_test_bid(&client, &collection, &bidder1, "110.00").await;
    let b2 = place_test_bid(&client, &collection, &bidder2, "120.00").await;

    let mut handles = vec![];
    for bid_id in [b1.id, b2.id] {
        let collection_id = collection.id;
        let actor_id = owner.id;
        handles.push(tokio::spawn(async move {
            let client = Client::new();
            let response = accept_bid_request(&client, collection_id, bid_id, actor_id).await;
            let status = response.status();
            let body: Value = response.json().await.unwrap();
            (status, body)
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        if status == StatusCode::OK {
            winners += 1;
        } else {
            losers += 1;
            let code = body["code"].as_str().unwrap();
            assert!(
                code == "ALREADY_RESOLVED"
                    || code == "CONFLICT"
                    || code == "INVALID_STATE_TRANSITION",
                "unexpected loser code: {code}"
            );
        }
    }
    info!("동시 수락 결과: 성공 {}건, 실패 {}건", winners, losers);
    assert_eq!(winners, 1);
    assert_eq!(losers, 1);

    let bids = query::handlers::get_bids_by_collection(&db_manager, collection.id)
        .await
        .unwrap();
    let accepted_count = bids
        .iter()
        .filter(|b| b.status == BidStatus::Accepted)
        .count();
    assert_eq!(accepted_count, 1);
}

/// 컬렉션 삭제 cascade 테스트
#[tokio::test]
async fn test_deleting_collection_removes_its_bids() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder = create_test_user(&client, "bidder").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;
    place_test_bid(&client, &collection, &bidder, "110.00").await;

    let response = client
        .delete(format!("{BASE_URL}/collections/{}", collection.id))
        .json(&json!({ "actor_id": owner.id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    // 고아 입찰이 남지 않는다
    let bids = query::handlers::get_bids_by_collection(&db_manager, collection.id)
        .await
        .unwrap();
    assert!(bids.is_empty());

    let response = client
        .get(format!("{BASE_URL}/collections/{}", collection.id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// 권한 검사 테스트
#[tokio::test]
async fn test_forbidden_for_non_owner_and_non_bidder() {
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder = create_test_user(&client, "bidder").await;
    let stranger = create_test_user(&client, "stranger").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;
    let bid = place_test_bid(&client, &collection, &bidder, "110.00").await;

    // 소유자가 아니면 수락 불가
    let response = accept_bid_request(&client, collection.id, bid.id, stranger.id).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 입찰자가 아니면 수정 불가
    let response = client
        .put(format!("{BASE_URL}/bids/{}", bid.id))
        .json(&json!({ "actor_id": stranger.id, "price": "500.00" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 소유자가 아니면 컬렉션 삭제 불가
    let response = client
        .delete(format!("{BASE_URL}/collections/{}", collection.id))
        .json(&json!({ "actor_id": stranger.id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// 최고 입찰가 조회 테스트
/// 입찰이 없으면 기준가, 있으면 최고 입찰가를 반환한다.
#[tokio::test]
async fn test_highest_bid_falls_back_to_base_price() {
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder = create_test_user(&client, "bidder").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;

    let response = client
        .get(format!("{BASE_URL}/collections/{}/highest-bid", collection.id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let highest = Decimal::from_str(body["highest_bid"].as_str().unwrap()).unwrap();
    assert_eq!(highest, Decimal::from_str("100.00").unwrap());

    place_test_bid(&client, &collection, &bidder, "142.50").await;

    let response = client
        .get(format!("{BASE_URL}/collections/{}/highest-bid", collection.id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.unwrap();
    let highest = Decimal::from_str(body["highest_bid"].as_str().unwrap()).unwrap();
    assert_eq!(highest, Decimal::from_str("142.50").unwrap());
}

/// 컬렉션 상세 조회 테스트
/// 소유자와 입찰자 프로필이 함께 내려오고, 입찰은 최신순이다.
#[tokio::test]
async fn test_collection_details_include_owner_and_bidders() {
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder1 = create_test_user(&client, "bidder1").await;
    let bidder2 = create_test_user(&client, "bidder2").await;
    let collection = create_test_collection(&client, &owner, "100.00").await;
    let b1 = place_test_bid(&client, &collection, &bidder1, "110.00").await;
    let b2 = place_test_bid(&client, &collection, &bidder2, "120.00").await;

    let response = client
        .get(format!("{BASE_URL}/collections/{}/details", collection.id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let details: Value = response.json().await.unwrap();

    assert_eq!(details["owner"]["id"], json!(owner.id));
    let bids = details["bids"].as_array().unwrap();
    assert_eq!(bids.len(), 2);
    // 최신순
    assert_eq!(bids[0]["id"], json!(b2.id));
    assert_eq!(bids[1]["id"], json!(b1.id));
    assert_eq!(bids[0]["user"]["id"], json!(bidder2.id));
    assert_eq!(bids[1]["user"]["id"], json!(bidder1.id));
}

/// 요약 통계 테스트
#[tokio::test]
async fn test_overview_stats_count_per_actor() {
    let client = Client::new();

    let owner = create_test_user(&client, "owner").await;
    let bidder = create_test_user(&client, "bidder").await;
    let c1 = create_test_collection(&client, &owner, "100.00").await;
    let c2 = create_test_collection(&client, &owner, "200.00").await;
    let b1 = place_test_bid(&client, &c1, &bidder, "110.00").await;
    place_test_bid(&client, &c2, &bidder, "210.00").await;

    // c1 의 입찰 수락 → bidder 의 accepted 1건
    let response = accept_bid_request(&client, c1.id, b1.id, owner.id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{BASE_URL}/users/{}/overview", bidder.id))
        .send()
        .await
        .expect("Failed to send request");
    let stats: Value = response.json().await.unwrap();
    assert_eq!(stats["my_collections"], 0);
    assert_eq!(stats["my_active_bids"], 1);
    assert_eq!(stats["my_successful_sales"], 1);
    assert_eq!(stats["bids_on_my_collections"], 0);

    let response = client
        .get(format!("{BASE_URL}/users/{}/overview", owner.id))
        .send()
        .await
        .expect("Failed to send request");
    let stats: Value = response.json().await.unwrap();
    assert_eq!(stats["my_collections"], 2);
    assert_eq!(stats["my_active_bids"], 0);
    assert_eq!(stats["bids_on_my_collections"], 1);
}

/// 사용자 동기화 멱등성 테스트
/// 같은 외부 식별자는 항상 같은 내부 사용자로 매핑된다.
#[tokio::test]
async fn test_sync_user_maps_external_id_once() {
    let client = Client::new();
    let external_id = format!("clerk_{}", Uuid::new_v4());
    let email = format!("sync-{}@example.com", Uuid::new_v4());

    let mut ids = vec![];
    for _ in 0..2 {
        let response = client
            .post(format!("{BASE_URL}/users/sync"))
            .json(&json!({
                "external_id": &external_id,
                "name": "Sync User",
                "email": &email,
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        let user: User = response.json().await.unwrap();
        ids.push(user.id);
    }
    assert_eq!(ids[0], ids[1]);
}
