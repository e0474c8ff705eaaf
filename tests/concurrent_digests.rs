//! Concurrent use of a shared generator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use request_digest::{DigestGenerator, GeneratorHandle};

mod common;

use common::{generator_excluding, order_request};

#[test]
fn test_threads_agree_on_digest() {
    let generator = Arc::new(generator_excluding(&["X-Trace"]));
    let expected = generator
        .compute_digest(&order_request("seed", "<a><b>1</b></a>"))
        .unwrap();

    std::thread::scope(|s| {
        for t in 0..8 {
            let generator = generator.clone();
            let expected = expected.clone();
            s.spawn(move || {
                for i in 0..100 {
                    let view = order_request(&format!("trace-{t}-{i}"), "<a><b>1</b></a>");
                    assert_eq!(generator.compute_digest(&view).unwrap(), expected);
                }
            });
        }
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tasks_share_handle_during_reload() {
    let handle = Arc::new(GeneratorHandle::new(generator_excluding(&[])));
    let concurrency = 20;
    let requests_per_task = 50;

    let start = Instant::now();
    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            let mut computed = 0;
            for i in 0..requests_per_task {
                let view = order_request(&i.to_string(), "<a><b>1</b></a>");
                if handle.compute_digest(&view).unwrap().is_some() {
                    computed += 1;
                }
                tokio::task::yield_now().await;
            }
            computed
        }));
    }

    handle.replace(generator_excluding(&["X-Trace"]));

    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }
    let elapsed = start.elapsed();

    assert_eq!(total, concurrency * requests_per_task);
    assert!(elapsed < Duration::from_secs(30), "took {elapsed:?}");

    // after the reload every trace value maps to the same digest
    let a = handle.compute_digest(&order_request("x", "<a/>")).unwrap();
    let b = handle.compute_digest(&order_request("y", "<a/>")).unwrap();
    assert_eq!(a, b);
}
