use std::future::Future;

use super::{make_record, names, TestResult};
use crate::RecordStore;

pub(super) async fn run_append_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "append",
            "append_to_empty_creates_collection",
            append_to_empty_creates_collection(factory).await,
        ),
        TestResult::from_result(
            "append",
            "append_preserves_submission_order",
            append_preserves_submission_order(factory).await,
        ),
        TestResult::from_result(
            "append",
            "append_leaves_earlier_records_untouched",
            append_leaves_earlier_records_untouched(factory).await,
        ),
    ]
}

async fn append_to_empty_creates_collection<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    if !s.append(make_record(1, "Asha")).await {
        return Err("append reported failure on a healthy store".into());
    }
    let read = s.fetch_all().await;
    if names(&read) != ["Asha"] {
        return Err(format!("expected [Asha], got {:?}", names(&read)));
    }
    Ok(())
}

/// Insertion order is submission order, regardless of timestamps or names.
async fn append_preserves_submission_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for (n, name) in [(9, "Zoe"), (2, "Asha"), (5, "Mina")] {
        s.append(make_record(n, name)).await;
    }
    let read = s.fetch_all().await;
    if names(&read) != ["Zoe", "Asha", "Mina"] {
        return Err(format!("order not preserved: {:?}", names(&read)));
    }
    Ok(())
}

async fn append_leaves_earlier_records_untouched<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let first = make_record(1, "Asha");
    s.append(first.clone()).await;
    s.append(make_record(2, "Bilal")).await;
    let read = s.fetch_all().await;
    match read.first() {
        Some(r) if *r == first => Ok(()),
        other => Err(format!("first record changed: {:?}", other)),
    }
}
