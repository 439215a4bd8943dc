use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
use tui_pix_app::internal::feed::FeedEvent;
use tui_pix_app::internal::models::ImageHit;
use tui_pix_app::internal::ui::app::{App, InputMode};

fn screen(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut text = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

fn app_with_hits() -> App {
    let mut app = App::default();
    app.notification = None;
    let request = app.feed.handle(FeedEvent::Mounted).unwrap();
    let hits = vec![
        ImageHit {
            id: 7001,
            tags: Some("sunset, beach".to_string()),
            user: Some("marta".to_string()),
            image_width: 1920,
            image_height: 1080,
            likes: Some(42),
            ..Default::default()
        },
        ImageHit {
            id: 7002,
            tags: Some("pine, forest".to_string()),
            user: Some("olek".to_string()),
            image_width: 800,
            image_height: 1200,
            ..Default::default()
        },
    ];
    app.feed.apply(request.complete(Ok(hits)));
    app
}

#[test]
fn test_results_render() {
    let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
    let mut app = app_with_hits();

    terminal.draw(|f| app.ui(f)).unwrap();
    let text = screen(terminal.backend().buffer());

    assert!(text.contains("Pix"));
    assert!(text.contains("page 1 · 2 images"));
    assert!(text.contains("Search for photos..."));
    assert!(text.contains("sunset, beach"));
    assert!(text.contains("pine, forest"));
    assert!(text.contains("by marta"));
    // Results area minus its borders
    assert!(app.viewport_rows > 0);
}

#[test]
fn test_empty_feed_while_loading() {
    let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
    let mut app = App::default();
    app.notification = None;
    app.feed.handle(FeedEvent::Mounted);

    terminal.draw(|f| app.ui(f)).unwrap();
    let text = screen(terminal.backend().buffer());

    assert!(text.contains("Loading images..."));
    assert!(text.contains("Loading page 1..."));
}

#[test]
fn test_filter_chips_and_modal() {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    let mut app = app_with_hits();
    let filters = [("orientation".to_string(), "vertical".to_string())]
        .into_iter()
        .collect();
    let request = app.feed.handle(FeedEvent::FiltersApplied(filters)).unwrap();
    app.feed.apply(request.complete(Ok(vec![ImageHit {
        id: 9,
        tags: Some("tower".to_string()),
        ..Default::default()
    }])));

    app.filter_modal.present(app.feed.state().active_filters());
    app.input_mode = InputMode::Filters;

    terminal.draw(|f| app.ui(f)).unwrap();
    let text = screen(terminal.backend().buffer());

    assert!(text.contains("orientation: vertical"));
    assert!(text.contains("Filters"));
    assert!(text.contains("horizontal"));
}
