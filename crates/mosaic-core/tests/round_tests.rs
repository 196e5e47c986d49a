//! End-to-end round tests over a stub fetcher

use mosaic_core::{MosaicConfig, MosaicError, MosaicSession};
use mosaic_fetch::SearchProvider;
use mosaic_grid::{GridCoordinate, GridDims, GridError};
use mosaic_test_utils::{image_urls, results_page, StubFetcher};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const PAGE: &str = "http://search.test/q=cars";

fn config() -> MosaicConfig {
    MosaicConfig::new()
        .with_start(5, 5)
        .with_capacity(10, 10)
        .with_cell_size(8)
        .with_workers(3)
        .with_fetch_timeout(Duration::from_millis(500))
        .with_provider(SearchProvider::Custom("http://search.test/q={}".into()))
        .with_seed(17)
}

fn page_with(urls: &[String]) -> String {
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    results_page(&refs)
}

fn session(config: MosaicConfig, fetcher: StubFetcher) -> MosaicSession {
    MosaicSession::with_fetcher(config, Arc::new(fetcher)).unwrap()
}

#[tokio::test]
async fn counter_limited_round_fills_every_slot() {
    let urls = image_urls("img.test", 5);
    let mut fetcher = StubFetcher::new().route(PAGE, 200, page_with(&urls));
    for (i, url) in urls.iter().enumerate() {
        fetcher = fetcher.image(url.as_str(), u8::try_from(i * 40).unwrap());
    }

    let mut session = session(config(), fetcher).with_free_slots(5);
    let coords = session.allocate(5).unwrap();
    assert_eq!(coords.len(), 5);
    assert_eq!(session.allocator().free_slots(), 0);

    let report = session.fill_round("cars", &coords).await.unwrap();
    let images = session.images();

    assert_eq!(report.page_url.as_deref(), Some(PAGE));
    assert_eq!(report.urls_found, 5);
    assert_eq!(report.stats.attempted, 5);
    assert_eq!(report.stats.succeeded, 5);
    assert_eq!(report.unused_slots, 0);
    assert_eq!(images.written_count(), 5);

    let written: HashSet<_> = report.populated.iter().copied().collect();
    let expected: HashSet<_> = coords.iter().copied().collect();
    assert_eq!(written, expected);
    for coord in &coords {
        let cell = images.cell(*coord).unwrap();
        assert_eq!(cell.dimensions(), (8, 8));
    }
}

#[tokio::test]
async fn failed_fetch_leaves_its_cell_filler() {
    let urls = image_urls("img.test", 5);
    let fetcher = StubFetcher::new()
        .route(PAGE, 200, page_with(&urls))
        .image(urls[0].as_str(), 10)
        .route(urls[1].as_str(), 404, "not found")
        .route(urls[2].as_str(), 200, "definitely not a png")
        .image(urls[3].as_str(), 30);
    // urls[4] has no route: transport error

    let mut session = session(config(), fetcher).with_free_slots(5);
    let coords = session.allocate(5).unwrap();
    let report = session.fill_round("cars", &coords).await.unwrap();
    let images = session.images();

    assert_eq!(report.stats.succeeded, 2);
    assert_eq!(report.stats.dropped, 3);
    assert_eq!(report.stats.fetch_failures, 2);
    assert_eq!(report.stats.decode_failures, 1);
    assert_eq!(images.written_count(), 2);

    assert!(!images.is_filler(coords[0]));
    assert!(images.is_filler(coords[1]));
    assert!(images.is_filler(coords[2]));
    assert!(!images.is_filler(coords[3]));
    assert!(images.is_filler(coords[4]));

    // Failed cells stay occupied
    for coord in &coords {
        assert!(session.allocator().grid().is_occupied(*coord));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn completion_order_does_not_change_the_result() {
    let urls = image_urls("img.test", 4);
    let delays = [5_u64, 40, 15, 60];

    let build = |reverse: bool| {
        let mut fetcher = StubFetcher::new().route(PAGE, 200, page_with(&urls));
        for (i, url) in urls.iter().enumerate() {
            let delay = if reverse { delays[3 - i] } else { delays[i] };
            fetcher = fetcher.image_delayed(
                url.as_str(),
                u8::try_from(50 + i * 50).unwrap(),
                Duration::from_millis(delay),
            );
        }
        session(config(), fetcher).with_free_slots(4)
    };

    let mut a = build(false);
    let mut b = build(true);
    let coords_a = a.allocate(4).unwrap();
    let coords_b = b.allocate(4).unwrap();
    assert_eq!(coords_a, coords_b);

    let report_a = a.fill_round("cars", &coords_a).await.unwrap();
    let report_b = b.fill_round("cars", &coords_b).await.unwrap();
    assert_eq!(report_a.stats, report_b.stats);
    assert_ne!(report_a.populated, report_b.populated);

    let (grid_a, grid_b) = (a.images(), b.images());
    for coord in GridDims::new(10, 10).coordinates() {
        assert_eq!(*grid_a.cell(coord).unwrap(), *grid_b.cell(coord).unwrap());
    }
}

#[tokio::test]
async fn page_failure_aborts_round_without_writes() {
    let fetcher = StubFetcher::new().route(PAGE, 503, "busy");
    let mut session = session(config(), fetcher).with_free_slots(3);
    let coords = session.allocate(3).unwrap();

    let err = session.fill_round("cars", &coords).await.unwrap_err();
    assert!(err.is_round_fatal());
    assert!(matches!(
        err,
        MosaicError::PageFetch {
            status: Some(503),
            ..
        }
    ));
    assert_eq!(session.images().written_count(), 0);
}

#[tokio::test]
async fn page_timeout_is_round_fatal() {
    let fetcher = StubFetcher::new().route_delayed(PAGE, 200, "<html></html>", Duration::from_secs(5));
    let mut config = config();
    config.page_timeout_ms = 30;
    let session = session(config, fetcher);

    let err = session.fetch_results_page("cars").await.unwrap_err();
    assert!(matches!(err, MosaicError::PageFetch { status: None, .. }));
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn fewer_urls_than_slots_leaves_slots_unused() {
    let urls = image_urls("img.test", 2);
    let fetcher = StubFetcher::new()
        .route(PAGE, 200, page_with(&urls))
        .image(urls[0].as_str(), 1)
        .image(urls[1].as_str(), 2);

    let mut session = session(config(), fetcher).with_free_slots(5);
    let coords = session.allocate(5).unwrap();
    let report = session.fill_round("cars", &coords).await.unwrap();

    assert_eq!(report.slots_allocated, 5);
    assert_eq!(report.stats.attempted, 2);
    assert_eq!(report.unused_slots, 3);
    assert_eq!(session.images().written_count(), 2);
    assert!(session.images().is_filler(coords[4]));
    assert!(session.allocator().grid().is_occupied(coords[4]));
}

#[tokio::test]
async fn extra_urls_are_ignored() {
    let urls = image_urls("img.test", 6);
    let mut fetcher = StubFetcher::new().route(PAGE, 200, page_with(&urls));
    for url in &urls {
        fetcher = fetcher.image(url.as_str(), 9);
    }

    let mut session = session(config(), fetcher).with_free_slots(2);
    let coords = session.allocate(2).unwrap();
    let report = session.fill_round("cars", &coords).await.unwrap();

    assert_eq!(report.urls_found, 6);
    assert_eq!(report.stats.attempted, 2);
    assert_eq!(session.images().written_count(), 2);
}

#[test]
fn saturation_reports_partial_allocation() {
    let config = config().with_start(1, 1).with_capacity(4, 4).with_max_draws(20);
    let mut session = session(config, StubFetcher::new()).with_free_slots(5);

    let err = session.allocate(2).unwrap_err();
    assert!(err.is_round_fatal());
    assert!(matches!(err, MosaicError::Grid(GridError::Saturation { .. })));
    assert_eq!(err.saturation_allocated(), &[GridCoordinate::new(0, 0)]);
}

#[tokio::test]
async fn advance_round_grows_allocates_and_fills() {
    let urls = image_urls("img.test", 3);
    let mut fetcher = StubFetcher::new().route(PAGE, 200, page_with(&urls));
    for url in &urls {
        fetcher = fetcher.image(url.as_str(), 200);
    }

    let config = config().with_start(1, 1);
    let mut session = session(config, fetcher);
    assert_eq!(session.allocator().free_slots(), 1);

    // 1x1 -> 2x2 credits 3: free 4, budget (8 - 4) / 2 = 2
    let report = session.advance_round("cars").await.unwrap();

    assert_eq!(report.round, 1);
    assert_eq!(report.dims, GridDims::new(2, 2));
    assert_eq!(report.slots_allocated, 2);
    assert_eq!(report.stats.succeeded, 2);
    assert_eq!(session.allocator().free_slots(), 2);
    assert_eq!(session.images().written_count(), 2);
    for coord in &report.populated {
        assert!(coord.within(GridDims::new(2, 2)));
    }
}

#[tokio::test]
async fn advance_round_stops_at_capacity() {
    let fetcher = StubFetcher::new().route(PAGE, 200, results_page(&[]));
    let config = config().with_start(1, 1).with_capacity(2, 2);
    let mut session = session(config, fetcher);

    session.advance_round("cars").await.unwrap();
    let err = session.advance_round("cars").await.unwrap_err();

    assert!(matches!(err, MosaicError::Grid(GridError::CapacityExceeded { .. })));
    assert!(!err.is_round_fatal());
}

#[tokio::test]
async fn query_token_is_encoded_into_page_url() {
    let page = "http://search.test/q=red+cars%21";
    let fetcher = Arc::new(StubFetcher::new().route(page, 200, results_page(&[])));
    let session = MosaicSession::with_fetcher(config(), fetcher.clone()).unwrap();

    let (url, _) = session.fetch_results_page("red cars!").await.unwrap();
    assert_eq!(url, page);
    assert_eq!(fetcher.requests(), vec![page.to_string()]);
}
