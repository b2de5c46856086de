//! Pagination behavior end to end: provider paging modes, cursor round
//! trips, has-more exhaustion, and filter-change resets, with the pager
//! driving real providers over canned upstreams.

use modelscout::api::SearchQuery;
use modelscout::pager::{PageMove, SearchFilters, SearchPager};
use modelscout::provider::civitai::CivitaiProvider;
use modelscout::provider::hartsy::HartsyProvider;
use modelscout::provider::huggingface::HuggingFaceProvider;
use modelscout::traits::SearchProvider;
mod common;
use common::mock_support::{
    MockFetcher, MockSession, civitai_model, civitai_page, hartsy_model, hartsy_page, hf_repo,
    service_with,
};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_civitai_mode_follows_query_presence() {
    let browse_body = civitai_page(
        vec![civitai_model(1, "browse hit")],
        json!({ "currentPage": 1, "totalPages": 9 }),
    );
    let query_body = civitai_page(
        vec![civitai_model(2, "flux hit")],
        json!({ "nextCursor": "K9" }),
    );
    let fetcher = MockFetcher::new()
        .with_json("query=flux", &query_body)
        .with_json("/models?", &browse_body);
    let (service, _http, _sink) = service_with(fetcher);
    let session = MockSession::new();

    let browse = service.search(&session, "civitai", &SearchQuery::browse(1)).await;
    let wire = serde_json::to_value(&browse).unwrap();
    assert_eq!(wire["mode"], json!("page"));
    assert_eq!(wire["totalPages"], json!(9));

    let searched = service.search(&session, "civitai", &SearchQuery::text("flux")).await;
    let wire = serde_json::to_value(&searched).unwrap();
    assert_eq!(wire["mode"], json!("cursor"));
    assert_eq!(wire["nextCursor"], json!("K9"));
}

#[tokio::test]
async fn test_page_walk_forward_and_back() {
    let body = civitai_page(vec![civitai_model(1, "walk")], json!({ "totalPages": 5 }));
    let http = Arc::new(MockFetcher::new().with_json("/models?", &body));
    let provider = CivitaiProvider::new(http.clone());
    let session = MockSession::new();

    let mut pager = SearchPager::new();
    let filters = SearchFilters::default();

    let query = pager.request(&provider, &filters, PageMove::First).unwrap();
    pager.complete(&provider.search(&session, &query).await.unwrap());
    assert_eq!(pager.position(), 1);
    assert_eq!(pager.total_pages(), 5);

    let query = pager.request(&provider, &filters, PageMove::Next).unwrap();
    assert_eq!(query.page, 2);
    pager.complete(&provider.search(&session, &query).await.unwrap());
    assert!(http.requests()[1].contains("page=2"));

    let query = pager.request(&provider, &filters, PageMove::Prev).unwrap();
    assert_eq!(query.page, 1);
    pager.complete(&provider.search(&session, &query).await.unwrap());
    assert!(!pager.can_retreat());
}

#[tokio::test]
async fn test_cursor_walk_restores_previous_pages() {
    let page_one = json!([hf_repo("org/one")]).to_string();
    let page_two = json!([hf_repo("org/two")]).to_string();
    let page_three = json!([hf_repo("org/three")]).to_string();
    let next = |cursor: &str| {
        format!("<https://huggingface.co/api/models?cursor={cursor}&limit=24>; rel=\"next\"")
    };
    let http = Arc::new(
        MockFetcher::new()
            .with_linked_json("cursor=c1", &page_two, &next("c2"))
            .with_json("cursor=c2", &page_three)
            .with_linked_json("/api/models?", &page_one, &next("c1")),
    );
    let provider = HuggingFaceProvider::new(http);
    let session = MockSession::new();

    let mut pager = SearchPager::new();
    let filters = SearchFilters {
        query: "stable".to_string(),
        ..SearchFilters::default()
    };

    let mut seen = Vec::new();
    let query = pager.request(&provider, &filters, PageMove::First).unwrap();
    seen.push(query.cursor.clone());
    pager.complete(&provider.search(&session, &query).await.unwrap());

    for _ in 0..2 {
        let query = pager.request(&provider, &filters, PageMove::Next).unwrap();
        seen.push(query.cursor.clone());
        pager.complete(&provider.search(&session, &query).await.unwrap());
    }
    assert_eq!(seen, vec!["", "c1", "c2"]);
    assert_eq!(pager.position(), 3);
    // The last page carried no Link header, so forward stops here.
    assert!(!pager.can_advance());

    for expected in ["c1", ""] {
        let query = pager.request(&provider, &filters, PageMove::Prev).unwrap();
        assert_eq!(query.cursor, expected);
        pager.complete(&provider.search(&session, &query).await.unwrap());
    }
    assert_eq!(pager.position(), 1);
    assert!(!pager.can_retreat());
}

#[tokio::test]
async fn test_hartsy_stops_at_reported_end() {
    let http = Arc::new(
        MockFetcher::new()
            .with_json("page=1", &hartsy_page(vec![hartsy_model(1, "a")], true, 1))
            .with_json("page=2", &hartsy_page(vec![hartsy_model(2, "b")], true, 2))
            .with_json("page=3", &hartsy_page(vec![hartsy_model(3, "c")], false, 3)),
    );
    let provider = HartsyProvider::new(http);
    let session = MockSession::new();

    let mut pager = SearchPager::new();
    let filters = SearchFilters::default();

    let query = pager.request(&provider, &filters, PageMove::First).unwrap();
    pager.complete(&provider.search(&session, &query).await.unwrap());

    for expected_page in [2, 3] {
        let query = pager.request(&provider, &filters, PageMove::Next).unwrap();
        assert_eq!(query.page, expected_page);
        pager.complete(&provider.search(&session, &query).await.unwrap());
    }

    // hasMore=false on page 3 synthesizes totalPages=3 and closes the road.
    assert_eq!(pager.total_pages(), 3);
    assert!(!pager.can_advance());
    assert!(pager.request(&provider, &filters, PageMove::Next).is_none());
    assert!(pager.can_retreat());
}

#[tokio::test]
async fn test_sort_change_resets_to_first_page() {
    let body = civitai_page(vec![civitai_model(1, "sorted")], json!({ "totalPages": 5 }));
    let http = Arc::new(MockFetcher::new().with_json("/models?", &body));
    let provider = CivitaiProvider::new(http.clone());
    let session = MockSession::new();

    let mut pager = SearchPager::new();
    let mut filters = SearchFilters {
        sort: "Most Downloaded".to_string(),
        ..SearchFilters::default()
    };

    let query = pager.request(&provider, &filters, PageMove::First).unwrap();
    pager.complete(&provider.search(&session, &query).await.unwrap());
    for _ in 0..2 {
        let query = pager.request(&provider, &filters, PageMove::Next).unwrap();
        pager.complete(&provider.search(&session, &query).await.unwrap());
    }
    assert_eq!(pager.position(), 3);

    filters.sort = "Newest".to_string();
    let query = pager.request(&provider, &filters, PageMove::Next).unwrap();
    assert_eq!(query.page, 1);
    provider.search(&session, &query).await.unwrap();

    let last = http.requests().last().cloned().unwrap();
    assert!(last.contains("page=1"));
    assert!(last.contains("sort=Newest"));
}
