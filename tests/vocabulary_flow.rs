//! Vocabulary reads and practice-list mutations end to end.

mod common;

use common::{page_json, word_json, MockBackend};
use mockito::Matcher;
use pronounce_client::schema::VocabularySearchParams;
use pronounce_client::services::keys;
use pronounce_client::types::{Difficulty, VocabularyPage};
use serde_json::json;

fn count_of(page: &VocabularyPage, id: &str) -> u32 {
    page.words
        .iter()
        .find(|w| w.id == id)
        .map(|w| w.practice_count)
        .unwrap()
}

#[tokio::test]
async fn concurrent_reads_share_one_request() {
    let mut backend = MockBackend::new().await;
    let words = backend
        .expect_json("GET", "/vocabulary", 200, page_json(vec![word_json("w1", 0)]), 1)
        .await;
    let params = VocabularySearchParams::default();

    let vocabulary = backend.ctx.vocabulary();
    let (a, b) = tokio::join!(vocabulary.words(&params), vocabulary.words(&params));

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(backend.ctx.query().stats().deduplicated, 1);
    words.assert_async().await;
}

#[tokio::test]
async fn each_filter_set_is_its_own_entry() {
    let mut backend = MockBackend::new().await;
    let beginner = backend
        .server
        .mock("GET", "/vocabulary")
        .match_query(Matcher::UrlEncoded("difficulty".into(), "beginner".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_json(vec![word_json("w1", 0)]).to_string())
        .expect(1)
        .create_async()
        .await;
    let food = backend
        .server
        .mock("GET", "/vocabulary")
        .match_query(Matcher::UrlEncoded("category".into(), "food".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_json(vec![word_json("w7", 0), word_json("w8", 0)]).to_string())
        .expect(1)
        .create_async()
        .await;

    let by_level = VocabularySearchParams::new().with_difficulty(Difficulty::Beginner);
    let by_category = VocabularySearchParams::new().with_category("food");
    let first = backend.ctx.vocabulary().words(&by_level).await.unwrap();
    let second = backend.ctx.vocabulary().words(&by_category).await.unwrap();
    // Cached now.
    backend.ctx.vocabulary().words(&by_level).await.unwrap();

    assert_eq!(first.words.len(), 1);
    assert_eq!(second.words.len(), 2);
    assert_eq!(
        backend.ctx.query().cache().keys().iter().filter(|k| k.starts_with(&keys::word_lists())).count(),
        2
    );
    beginner.assert_async().await;
    food.assert_async().await;
}

#[tokio::test]
async fn practice_membership_adjusts_every_cached_list() {
    let mut backend = MockBackend::new().await;
    let _all = backend
        .mock_json(
            "GET",
            "/vocabulary",
            200,
            page_json(vec![word_json("w1", 0), word_json("w2", 2)]),
        )
        .await;
    let _beginner = backend
        .server
        .mock("GET", "/vocabulary")
        .match_query(Matcher::UrlEncoded("difficulty".into(), "beginner".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_json(vec![word_json("w1", 0)]).to_string())
        .create_async()
        .await;
    let practice = backend
        .expect_json("GET", "/vocabulary/practice", 200, json!([]), 3)
        .await;
    let add = backend
        .expect_json("POST", "/vocabulary/w1/practice", 200, json!({}), 1)
        .await;
    let remove = backend
        .expect_json("DELETE", "/vocabulary/w1/practice", 200, json!({}), 2)
        .await;

    let all = VocabularySearchParams::default();
    let beginner = VocabularySearchParams::new().with_difficulty(Difficulty::Beginner);
    backend.ctx.vocabulary().words(&all).await.unwrap();
    backend.ctx.vocabulary().words(&beginner).await.unwrap();
    backend.ctx.vocabulary().practice_words().await.unwrap();

    backend.ctx.vocabulary().add_to_practice("w1").await.unwrap();
    let page: VocabularyPage = backend.ctx.query().get_query_data(&keys::words(&all)).unwrap();
    assert_eq!(count_of(&page, "w1"), 1);
    assert_eq!(count_of(&page, "w2"), 2);
    let page: VocabularyPage = backend
        .ctx
        .query()
        .get_query_data(&keys::words(&beginner))
        .unwrap();
    assert_eq!(count_of(&page, "w1"), 1);
    // Practice list was invalidated and is fetched again.
    backend.ctx.vocabulary().practice_words().await.unwrap();

    backend.ctx.vocabulary().remove_from_practice("w1").await.unwrap();
    backend.ctx.vocabulary().remove_from_practice("w1").await.unwrap();
    let page: VocabularyPage = backend.ctx.query().get_query_data(&keys::words(&all)).unwrap();
    assert_eq!(count_of(&page, "w1"), 0);
    backend.ctx.vocabulary().practice_words().await.unwrap();

    assert!(backend.ctx.vocabulary().remove_from_practice_state().is_success());
    add.assert_async().await;
    remove.assert_async().await;
    practice.assert_async().await;
}

#[tokio::test]
async fn failed_add_changes_nothing() {
    let mut backend = MockBackend::new().await;
    let _all = backend
        .mock_json("GET", "/vocabulary", 200, page_json(vec![word_json("w1", 4)]))
        .await;
    let _add = backend
        .mock_json("POST", "/vocabulary/w1/practice", 409, json!({"message": "Already added"}))
        .await;
    let all = VocabularySearchParams::default();
    backend.ctx.vocabulary().words(&all).await.unwrap();

    let err = backend.ctx.vocabulary().add_to_practice("w1").await.unwrap_err();

    assert_eq!(err.api().unwrap().message, "Already added");
    assert!(backend.ctx.vocabulary().add_to_practice_state().is_error());
    let page: VocabularyPage = backend.ctx.query().get_query_data(&keys::words(&all)).unwrap();
    assert_eq!(count_of(&page, "w1"), 4);
}

#[tokio::test]
async fn search_results_live_in_mutation_state() {
    let mut backend = MockBackend::new().await;
    let search = backend
        .server
        .mock("GET", "/vocabulary/search")
        .match_query(Matcher::UrlEncoded("query".into(), "thought".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_json(vec![word_json("w3", 0)]).to_string())
        .expect(1)
        .create_async()
        .await;

    assert!(backend.ctx.vocabulary().search_results().is_none());
    let page = backend
        .ctx
        .vocabulary()
        .search_words("thought", &VocabularySearchParams::default())
        .await
        .unwrap();

    assert_eq!(page.words[0].id, "w3");
    assert_eq!(backend.ctx.vocabulary().search_results(), Some(page));
    assert!(backend.ctx.query().cache().is_empty());
    search.assert_async().await;
}

#[tokio::test]
async fn oversized_search_never_reaches_the_network() {
    let mut backend = MockBackend::new().await;
    let search = backend
        .expect_get_any_query("/vocabulary/search", page_json(vec![]), 0)
        .await;

    let err = backend
        .ctx
        .vocabulary()
        .search_words(&"a".repeat(101), &VocabularySearchParams::default())
        .await
        .unwrap_err();

    assert!(err.validation().unwrap().has("query"));
    search.assert_async().await;
}

#[tokio::test]
async fn reference_lists_are_cached() {
    let mut backend = MockBackend::new().await;
    let categories = backend
        .expect_json("GET", "/vocabulary/categories", 200, json!(["basics", "food"]), 1)
        .await;
    let tags = backend
        .expect_json("GET", "/vocabulary/tags", 200, json!(["th", "r"]), 1)
        .await;

    for _ in 0..2 {
        assert_eq!(backend.ctx.vocabulary().categories().await.unwrap().len(), 2);
        assert_eq!(backend.ctx.vocabulary().tags().await.unwrap(), vec!["th", "r"]);
    }

    categories.assert_async().await;
    tags.assert_async().await;
}
