use super::*;
use crate::foundation::core::{Resolution, SizeClass};
use crate::seed::mapper::FALLBACK_PARAMS;

fn request(city: &str) -> GenerationRequest {
    GenerationRequest::with_time_bucket(
        "Australia",
        city,
        SizeClass::M,
        None,
        "2024-01-01-00-00".to_string(),
    )
}

fn metadata(file_key: &str) -> GenerationMetadata {
    GenerationMetadata {
        file_key: file_key.to_string(),
        region: "Australia".to_string(),
        city: "Brisbane".to_string(),
        size_class: SizeClass::M,
        resolution: Resolution { width: 2000, height: 1125 },
        params_used: FALLBACK_PARAMS,
        max_iter: 1000,
        generated_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

#[tokio::test]
async fn object_store_put_get_url_delete() {
    let store = MemoryObjectStore::new();
    assert!(store.presigned_get_url("missing.png", Duration::from_secs(60)).await.is_err());

    store.put("a.png", vec![1, 2, 3], "image/png").await.unwrap();
    assert_eq!(store.bytes("a.png"), Some(vec![1, 2, 3]));
    assert_eq!(store.content_type("a.png").as_deref(), Some("image/png"));

    let url = store.presigned_get_url("a.png", Duration::from_secs(60)).await.unwrap();
    assert!(url.contains("a.png"));
    assert!(url.contains("expires_in=60"));

    store.delete("a.png").await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn metadata_store_round_trips() {
    let store = MemoryMetadataStore::new();
    assert!(store.get("x.png").await.unwrap().is_none());
    store.put(metadata("x.png")).await.unwrap();
    let got = store.get("x.png").await.unwrap().unwrap();
    assert_eq!(got.city, "Brisbane");
    assert_eq!(got.params_used, FALLBACK_PARAMS);

    // Re-publishing the same key overwrites, never duplicates.
    store.put(metadata("x.png")).await.unwrap();
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn cache_entries_expire() {
    let cache = MemoryCacheStore::new();
    cache.set("k", Duration::from_millis(20)).await.unwrap();
    assert!(cache.get("k").await.unwrap());
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(!cache.get("k").await.unwrap());
}

#[tokio::test]
async fn set_if_absent_is_an_atomic_claim() {
    let cache = MemoryCacheStore::new();
    assert!(cache.set_if_absent("claim", Duration::from_secs(60)).await.unwrap());
    assert!(!cache.set_if_absent("claim", Duration::from_secs(60)).await.unwrap());
}

#[tokio::test]
async fn expired_claims_are_reclaimable() {
    let cache = MemoryCacheStore::new();
    assert!(cache.set_if_absent("claim", Duration::from_millis(20)).await.unwrap());
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(cache.set_if_absent("claim", Duration::from_millis(20)).await.unwrap());
}

#[tokio::test]
async fn queue_leases_hide_tasks_until_timeout() {
    let queue = MemoryTaskQueue::with_visibility(Duration::from_millis(50));
    queue.send(request("Brisbane")).await.unwrap();
    queue.send(request("Perth")).await.unwrap();

    let batch = queue.receive_batch(10, Duration::ZERO).await.unwrap();
    assert_eq!(batch.len(), 2);

    // Leased tasks are invisible until the timeout lapses.
    assert!(queue.receive_batch(10, Duration::ZERO).await.unwrap().is_empty());

    // Acknowledge one; the other redelivers.
    queue.delete(&batch[0]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(70)).await;
    let redelivered = queue.receive_batch(10, Duration::ZERO).await.unwrap();
    assert_eq!(redelivered.len(), 1);
    assert_eq!(redelivered[0].request.city, "Perth");
}

#[tokio::test]
async fn queue_respects_batch_size() {
    let queue = MemoryTaskQueue::new();
    for city in ["A", "B", "C"] {
        queue.send(request(city)).await.unwrap();
    }
    let batch = queue.receive_batch(2, Duration::ZERO).await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(queue.len().await, 3);
}
