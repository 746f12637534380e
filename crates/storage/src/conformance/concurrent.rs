use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use super::{make_record, TestResult};
use crate::RecordStore;

/// Number of concurrent tasks to spawn in each test.
const N: u8 = 16;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![TestResult::from_result(
        "concurrent",
        "concurrent_appends_all_kept",
        concurrent_appends_all_kept(factory).await,
    )]
}

/// N tasks append through one shared store at the same time. Every record
/// must be present afterwards; none may be lost to an interleaved
/// fetch/replace.
async fn concurrent_appends_all_kept<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for n in 0..N {
        let s = store.clone();
        handles.push(tokio::spawn(async move {
            s.append(make_record(n, &format!("student-{}", n))).await
        }));
    }
    for handle in handles {
        handle.await.map_err(|e| format!("append task panicked: {e}"))?;
    }

    let read = store.fetch_all().await;
    let ids: HashSet<_> = read.iter().filter_map(|r| r.id.clone()).collect();
    if read.len() != usize::from(N) || ids.len() != usize::from(N) {
        return Err(format!(
            "expected {} distinct records, got {} ({} distinct)",
            N,
            read.len(),
            ids.len()
        ));
    }
    Ok(())
}
