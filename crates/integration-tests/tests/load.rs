//! Signed payload load callback.

use orderman_integration_tests::{APP_URL, CLIENT_SECRET, TestApp, load_payload, sign_payload};
use reqwest::StatusCode;

fn load_url(app: &TestApp, signed: &str) -> String {
    let mut url = url::Url::parse(&app.at("/bigcommerce/load")).expect("valid URL");
    url.query_pairs_mut().append_pair("signed_payload", signed);
    url.into()
}

#[tokio::test]
async fn test_valid_payload_redirects_to_store() {
    let app = TestApp::spawn().await;
    let store = app.seed_store("abc123", "tok").await;
    let signed = sign_payload(&load_payload("abc123"), CLIENT_SECRET);

    let resp = app
        .client
        .get(load_url(&app, &signed))
        .send()
        .await
        .expect("Failed to load");

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some(format!("{APP_URL}/?storeId={}", store.id).as_str())
    );
}

#[tokio::test]
async fn test_tampered_payload_is_rejected_before_lookup() {
    let app = TestApp::spawn().await;
    app.seed_store("abc123", "tok").await;
    let lookups_before = app.stores.lookups();

    let signed = sign_payload(&load_payload("abc123"), CLIENT_SECRET);
    let (_, signature) = signed.split_once('.').expect("signed payload has a dot");
    let forged = sign_payload(&load_payload("zzz999"), CLIENT_SECRET);
    let (forged_data, _) = forged.split_once('.').expect("signed payload has a dot");

    for payload in [
        format!("{forged_data}.{signature}"),
        sign_payload(&load_payload("abc123"), "not-the-client-secret"),
        "garbage".to_string(),
    ] {
        let resp = app
            .client
            .get(load_url(&app, &payload))
            .send()
            .await
            .expect("Failed to load");

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.text().await.expect("Failed to read response"),
            "Payload verification failed!"
        );
    }

    assert_eq!(app.stores.lookups(), lookups_before);
}

#[tokio::test]
async fn test_unknown_store_is_not_found() {
    let app = TestApp::spawn().await;
    let signed = sign_payload(&load_payload("unknown1"), CLIENT_SECRET);

    let resp = app
        .client
        .get(load_url(&app, &signed))
        .send()
        .await
        .expect("Failed to load");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.text().await.expect("Failed to read response"), "Store not found!");
}

#[tokio::test]
async fn test_missing_payload_is_bad_request() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.at("/bigcommerce/load"))
        .send()
        .await
        .expect("Failed to load");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
