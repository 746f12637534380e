use std::future::Future;

use super::{make_record, names, TestResult};
use crate::record::NO_COMMENTS;
use crate::RecordStore;

pub(super) async fn run_roundtrip_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "roundtrip",
            "empty_store_fetches_empty",
            empty_store_fetches_empty(factory).await,
        ),
        TestResult::from_result(
            "roundtrip",
            "replace_then_fetch_returns_same",
            replace_then_fetch_returns_same(factory).await,
        ),
        TestResult::from_result(
            "roundtrip",
            "replace_all_of_fetch_all_is_noop",
            replace_all_of_fetch_all_is_noop(factory).await,
        ),
        TestResult::from_result(
            "roundtrip",
            "replace_overwrites_instead_of_merging",
            replace_overwrites_instead_of_merging(factory).await,
        ),
        TestResult::from_result(
            "roundtrip",
            "free_text_survives_storage",
            free_text_survives_storage(factory).await,
        ),
    ]
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn empty_store_fetches_empty<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let records = s.fetch_all().await;
    if !records.is_empty() {
        return Err(format!("expected empty collection, got {}", records.len()));
    }
    Ok(())
}

async fn replace_then_fetch_returns_same<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let written = vec![make_record(1, "Asha"), make_record(2, "Bilal")];
    if !s.replace_all(&written).await {
        return Err("replace_all reported failure on a healthy store".into());
    }
    let read = s.fetch_all().await;
    if read != written {
        return Err(format!("read back {:?}, wrote {:?}", names(&read), names(&written)));
    }
    Ok(())
}

/// `replace_all(fetch_all())` must leave the collection exactly as it was.
async fn replace_all_of_fetch_all_is_noop<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let written = vec![
        make_record(3, "Chen"),
        make_record(1, "Asha"),
        make_record(2, "Bilal"),
    ];
    s.replace_all(&written).await;
    let before = s.fetch_all().await;
    s.replace_all(&before).await;
    s.replace_all(&s.fetch_all().await).await;
    let after = s.fetch_all().await;
    if before != after {
        return Err(format!(
            "collection changed: {:?} -> {:?}",
            names(&before),
            names(&after)
        ));
    }
    Ok(())
}

async fn replace_overwrites_instead_of_merging<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_all(&[make_record(1, "Asha"), make_record(2, "Bilal")])
        .await;
    s.replace_all(&[make_record(3, "Chen")]).await;
    let read = s.fetch_all().await;
    if names(&read) != ["Chen"] {
        return Err(format!("expected only Chen, got {:?}", names(&read)));
    }

    s.replace_all(&[]).await;
    let read = s.fetch_all().await;
    if !read.is_empty() {
        return Err(format!("expected empty after clearing, got {:?}", names(&read)));
    }
    Ok(())
}

async fn free_text_survives_storage<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut quoted = make_record(1, "O'Brien, \"Sam\"");
    quoted.additional_comments = "He said \"good\",\nthen left. Ünïcode ✓".to_string();
    let mut blank = make_record(2, "Dana");
    blank.additional_comments = NO_COMMENTS.to_string();
    blank.id = None;

    let written = vec![quoted, blank];
    s.replace_all(&written).await;
    let read = s.fetch_all().await;
    if read != written {
        return Err(format!("free text altered by storage: {:?}", read));
    }
    Ok(())
}
