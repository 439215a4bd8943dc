use mockito::Matcher;
use tui_pix_app::api::query::RequestParams;
use tui_pix_app::api::{ApiService, FetchError};
use tui_pix_app::config::ApiConfig;

fn config() -> ApiConfig {
    ApiConfig {
        key: "integration-key".to_string(),
        per_page: 3,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_integration_fetch_category_page() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/api/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "integration-key".into()),
            Matcher::UrlEncoded("per_page".into(), "3".into()),
            Matcher::UrlEncoded("safesearch".into(), "true".into()),
            Matcher::UrlEncoded("editors_choice".into(), "true".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("category".into(), "nature".into()),
            Matcher::UrlEncoded("orientation".into(), "vertical".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"total": 3, "totalHits": 3, "hits": [
                {"id": 1001, "tags": "forest", "user": "a", "imageWidth": 1200, "imageHeight": 1800},
                {"id": 1002, "tags": "lake", "user": "b", "imageWidth": 1000, "imageHeight": 1500},
                {"id": 1003, "tags": "leaf", "user": "c", "imageWidth": 800, "imageHeight": 1200}
            ]}"#,
        )
        .create_async()
        .await;

    let service = ApiService::with_endpoint(&config(), format!("{}/api/", server.url()));
    let params = RequestParams::page(2)
        .with_category("nature")
        .with_filter("orientation", "vertical");
    let hits = service
        .fetch_images(&params)
        .await
        .expect("Failed to fetch images");

    let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![1001, 1002, 1003]);
    assert_eq!(hits[1].tags.as_deref(), Some("lake"));
}

#[tokio::test]
async fn test_integration_server_error_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/api/")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("[ERROR 500] internal")
        .create_async()
        .await;

    let service = ApiService::with_endpoint(&config(), format!("{}/api/", server.url()));
    let err = service
        .fetch_images(&RequestParams::page(1))
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::HttpStatus(500));
    assert_eq!(err.to_string(), "HTTP error: status 500");
}
