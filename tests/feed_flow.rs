use std::time::Duration;

use mockito::{Matcher, Mock, ServerGuard};
use tokio::time::Instant;
use tui_pix_app::api::ApiService;
use tui_pix_app::config::ApiConfig;
use tui_pix_app::internal::debounce::Debouncer;
use tui_pix_app::internal::feed::{
    FeedController, FeedEvent, FetchRequest, MergeMode, Merged, ScrollMetrics,
};
use tui_pix_app::internal::models::FetchState;

fn body(ids: std::ops::Range<u64>) -> String {
    let hits: Vec<String> = ids
        .map(|id| format!(r#"{{"id": {}, "imageWidth": 640, "imageHeight": 480}}"#, id))
        .collect();
    format!(r#"{{"total": 500, "totalHits": 500, "hits": [{}]}}"#, hits.join(","))
}

async fn page_mock(
    server: &mut ServerGuard,
    page: &str,
    q: Option<&str>,
    ids: std::ops::Range<u64>,
) -> Mock {
    // Anchored on the tail of the raw query so page 1 with and without `q` never overlap
    let tail = match q {
        Some(q) => format!("&page={}&q={}$", page, q),
        None => format!("&page={}$", page),
    };
    server
        .mock("GET", "/api/")
        .match_query(Matcher::Regex(tail))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body(ids))
        .expect(1)
        .create_async()
        .await
}

async fn run(
    service: &ApiService,
    controller: &mut FeedController,
    request: FetchRequest,
) -> Merged {
    let result = service.fetch_images(&request.params).await;
    controller.apply(request.complete(result))
}

fn service_for(server: &ServerGuard) -> ApiService {
    ApiService::with_endpoint(&ApiConfig::default(), format!("{}/api/", server.url()))
}

const AT_BOTTOM: ScrollMetrics = ScrollMetrics {
    content_height: 25.0,
    viewport_height: 20.0,
    offset: 5.0,
};

#[tokio::test]
async fn test_mount_search_then_load_more() {
    let mut server = mockito::Server::new_async().await;
    let search = page_mock(&mut server, "1", Some("sun"), 100..125).await;
    let more = page_mock(&mut server, "2", Some("sun"), 125..150).await;
    let mount = page_mock(&mut server, "1", None, 0..25).await;

    let service = service_for(&server);
    let mut controller = FeedController::default();
    let mut debouncer = Debouncer::new(Duration::from_millis(400));

    let request = controller.handle(FeedEvent::Mounted).unwrap();
    assert_eq!(run(&service, &mut controller, request).await, Merged::Replaced(25));
    mount.assert_async().await;

    let typed_at = Instant::now();
    debouncer.push("s".to_string(), typed_at);
    debouncer.push("su".to_string(), typed_at + Duration::from_millis(120));
    debouncer.push("sun".to_string(), typed_at + Duration::from_millis(240));
    assert!(debouncer.poll(typed_at + Duration::from_millis(500)).is_none());
    let text = debouncer.poll(typed_at + Duration::from_millis(640)).unwrap();

    let request = controller.handle(FeedEvent::SearchChanged(text)).unwrap();
    assert_eq!(request.mode, MergeMode::Replace);
    assert_eq!(run(&service, &mut controller, request).await, Merged::Replaced(25));
    search.assert_async().await;
    assert_eq!(controller.state().items()[0].id, 100);

    let request = controller.handle(FeedEvent::Scrolled(AT_BOTTOM)).unwrap();
    assert_eq!(request.params.page, 2);
    assert_eq!(run(&service, &mut controller, request).await, Merged::Appended(25));
    more.assert_async().await;

    let ids: Vec<u64> = controller.state().items().iter().map(|h| h.id).collect();
    assert_eq!(ids, (100..150).collect::<Vec<_>>());
    assert_eq!(controller.status(), &FetchState::Loaded);
}

#[tokio::test]
async fn test_late_response_for_superseded_search_is_dropped() {
    let mut server = mockito::Server::new_async().await;
    let _cats = page_mock(&mut server, "1", Some("cats"), 0..25).await;
    let _dogs = page_mock(&mut server, "1", Some("dogs"), 500..510).await;

    let service = service_for(&server);
    let mut controller = FeedController::default();

    let cats = controller
        .handle(FeedEvent::SearchChanged("cats".to_string()))
        .unwrap();
    let dogs = controller
        .handle(FeedEvent::SearchChanged("dogs".to_string()))
        .unwrap();

    // Both in flight; the newer one lands first
    let (cats_result, dogs_result) = tokio::join!(
        service.fetch_images(&cats.params),
        service.fetch_images(&dogs.params)
    );
    assert_eq!(controller.apply(dogs.complete(dogs_result)), Merged::Replaced(10));
    assert_eq!(controller.apply(cats.complete(cats_result)), Merged::Discarded);

    assert_eq!(controller.state().items()[0].id, 500);
    assert_eq!(controller.state().search_text(), "dogs");
}

#[tokio::test]
async fn test_failed_load_more_then_retry() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("GET", "/api/")
        .match_query(Matcher::Regex("&page=2$".into()))
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let _first = page_mock(&mut server, "1", None, 0..25).await;

    let service = service_for(&server);
    let mut controller = FeedController::default();

    let request = controller.handle(FeedEvent::Mounted).unwrap();
    run(&service, &mut controller, request).await;

    let request = controller.handle(FeedEvent::Scrolled(AT_BOTTOM)).unwrap();
    assert_eq!(run(&service, &mut controller, request).await, Merged::Failed);
    failing.assert_async().await;
    assert_eq!(controller.state().page(), 1);
    assert_eq!(controller.state().items().len(), 25);

    failing.remove_async().await;
    let _second = page_mock(&mut server, "2", None, 25..50).await;

    let retry = controller.handle(FeedEvent::Retry).unwrap();
    assert_eq!(retry.params.page, 2);
    assert_eq!(run(&service, &mut controller, retry).await, Merged::Appended(25));
    assert_eq!(controller.state().items().len(), 50);
}
