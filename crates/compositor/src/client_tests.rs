use chrono::NaiveDate;
use serde_json::json;
use tripdesk_core::MicrositeConfig;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::CompositorClient;
use crate::date_window::DateRange;
use crate::error::CompositorError;

fn test_config() -> MicrositeConfig {
    MicrositeConfig::new("primary", "siteone", "agent", "s3cret")
}

async fn mount_auth(server: &MockServer, token: &str, expires_in: u64, times: u64) {
    Mock::given(method("POST"))
        .and(path("/authentication/authenticate"))
        .and(body_json(json!({
            "username": "agent",
            "password": "s3cret",
            "micrositeId": "siteone"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": token, "expirationInSeconds": expires_in})),
        )
        .expect(times)
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> CompositorClient {
    CompositorClient::new(test_config(), &format!("{}/", server.uri())).unwrap()
}

#[tokio::test]
async fn test_token_is_cached_between_requests() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok-1", 3600, 1).await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings/9263"))
        .and(header("auth-token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9263})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.get_booking("9263").await.unwrap().is_some());
    assert!(client.get_booking("9263").await.unwrap().is_some());
}

#[tokio::test]
async fn test_token_inside_expiry_skew_is_refreshed() {
    let server = MockServer::start().await;
    // Lifetime shorter than the skew, so every call logs in again.
    mount_auth(&server, "short", 30, 2).await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get_booking("1").await.unwrap();
    client.get_booking("1").await.unwrap();
}

#[tokio::test]
async fn test_concurrent_callers_share_one_login() {
    let server = MockServer::start().await;
    mount_auth(&server, "shared", 3600, 1).await;

    let client = client_for(&server);
    let (a, b, c) = tokio::join!(client.token(), client.token(), client.token());
    assert_eq!(a.unwrap(), "shared");
    assert_eq!(b.unwrap(), "shared");
    assert_eq!(c.unwrap(), "shared");
}

#[tokio::test]
async fn test_unauthorized_triggers_single_relogin() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 3600, 2).await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings/5"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let booking = client.get_booking("5").await.unwrap().unwrap();
    assert_eq!(booking["id"], 5);
}

#[tokio::test]
async fn test_persistent_forbidden_surfaces_status() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 3600, 2).await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings/5"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_booking("5").await.unwrap_err();
    assert!(matches!(err, CompositorError::HttpStatus { code: 403, .. }));
}

#[tokio::test]
async fn test_rejected_credentials_return_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authentication/authenticate"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_booking("1").await.unwrap_err();
    match err {
        CompositorError::Auth { microsite_id, reason } => {
            assert_eq!(microsite_id, "siteone");
            assert!(reason.contains("401"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_booking_is_none() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 3600, 1).await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings/404404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.get_booking("404404").await.unwrap().is_none());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 3600, 1).await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings/1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_booking("1").await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_list_bookings_sends_window_and_paging() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 3600, 1).await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings"))
        .and(query_param("microsite", "siteone"))
        .and(query_param("from", "20240101"))
        .and(query_param("to", "20240331"))
        .and(query_param("first", "200"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": {"firstResult": 200, "totalResults": 230},
            "bookedTrip": [{"id": 1}, {"id": 2}]
        })))
        .mount(&server)
        .await;

    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    );
    let page = client_for(&server).list_bookings(&range, 200, 100).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.first, 200);
    assert_eq!(page.total, Some(230));
}

#[tokio::test]
async fn test_list_all_bookings_follows_pages() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 3600, 1).await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings"))
        .and(query_param("first", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": {"totalResults": 3},
            "bookedTrip": [{"id": 1}, {"id": 2}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/booking/getBookings"))
        .and(query_param("first", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": {"totalResults": 3},
            "bookedTrip": [{"id": 3}]
        })))
        .mount(&server)
        .await;

    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    );
    let all = client_for(&server).list_all_bookings(&range, 2).await.unwrap();
    let ids: Vec<i64> = all.iter().filter_map(|b| b["id"].as_i64()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_travel_idea_endpoints_use_microsite_path() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 3600, 1).await;
    Mock::given(method("GET"))
        .and(path("/travelidea/siteone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "travelIdea": [{"id": 77, "title": "Douro"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/travelidea/siteone/info/77"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 77, "title": "Douro", "description": "Wine"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/package/siteone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"package": [{"id": 9}]})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ideas = client.list_travel_ideas(0, 50).await.unwrap();
    assert_eq!(ideas.items.len(), 1);
    let detail = client.get_travel_idea("77").await.unwrap().unwrap();
    assert_eq!(detail["description"], "Wine");
    let packages = client.list_packages(0, 50).await.unwrap();
    assert_eq!(packages.items[0]["id"], 9);
}

#[test]
fn test_debug_output_hides_password() {
    let client = CompositorClient::new(test_config(), "http://localhost").unwrap();
    let printed = format!("{client:?}");
    assert!(printed.contains("siteone"));
    assert!(!printed.contains("s3cret"));
}
