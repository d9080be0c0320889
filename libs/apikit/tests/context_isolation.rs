#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Correlation scope isolation under concurrent scheduling: parallel worker
//! threads and interleaved suspension points on one runtime.

use std::time::Duration;

use apikit::context::{self, RequestId};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scopes_never_observe_each_other() {
    let mut handles = Vec::new();
    for n in 0..32 {
        handles.push(tokio::spawn(async move {
            let id = RequestId::from(format!("req-{n}"));
            context::scope(Some(id.clone()), async move {
                // Re-check around several suspension points; a yield lets
                // sibling tasks run on this worker in between.
                for _ in 0..10 {
                    assert_eq!(context::get(), Some(id.clone()));
                    tokio::task::yield_now().await;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
                assert_eq!(context::get(), Some(id));
            })
            .await;
        }));
    }
    for handle in handles {
        handle.await.expect("task must not panic");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ensure_is_stable_across_awaits_within_one_scope() {
    let handles: Vec<_> = (0..16)
        .map(|_| {
            tokio::spawn(context::scope(None, async {
                let first = context::ensure();
                tokio::task::yield_now().await;
                let second = context::ensure();
                tokio::time::sleep(Duration::from_millis(1)).await;
                assert_eq!(first, second);
                assert_eq!(context::get(), Some(first.clone()));
                first
            }))
        })
        .collect();

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.expect("task must not panic"));
    }
    // Generated ids are unique per scope.
    let mut deduped = seen.clone();
    deduped.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    deduped.dedup();
    assert_eq!(deduped.len(), seen.len());
}

#[tokio::test]
async fn spawned_work_outside_the_scope_sees_nothing() {
    context::scope(Some(RequestId::from("outer")), async {
        // A task spawned from inside a scope is a new logical task; the slot
        // does not leak into it.
        let observed = tokio::spawn(async { context::get() })
            .await
            .expect("task must not panic");
        assert_eq!(observed, None);
        assert_eq!(context::get(), Some(RequestId::from("outer")));
    })
    .await;
}
