use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[test]
fn test_pool_size_zero_becomes_one() {
    assert_eq!(WorkerPool::new(0).size(), 1);
    assert_eq!(WorkerPool::new(4).size(), 4);
}

#[tokio::test]
async fn test_empty_input() {
    let (results, err) = run_bounded(Vec::<u32>::new(), 4, |n| async move {
        Ok::<_, String>(n)
    })
    .await;
    assert!(results.is_empty());
    assert!(err.is_none());
}

#[tokio::test]
async fn test_processes_every_item() {
    let items: Vec<u32> = (1..=20).collect();
    let (mut results, err) = run_bounded(items, 3, |n| async move { Ok::<_, String>(n * 2) }).await;
    results.sort();
    assert!(err.is_none());
    assert_eq!(results, (1..=20).map(|n| n * 2).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let (results, _) = {
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        run_bounded((0..12).collect::<Vec<u32>>(), 3, move |n| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, String>(n)
            }
        })
        .await
    };

    assert_eq!(results.len(), 12);
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_errors_do_not_stop_siblings() {
    let attempted = Arc::new(AtomicUsize::new(0));
    let counter = attempted.clone();

    let outcome = WorkerPool::new(2)
        .run((0..10).collect::<Vec<u32>>(), move |n| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if n % 3 == 0 {
                    Err(format!("item {} failed", n))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

    assert_eq!(attempted.load(Ordering::SeqCst), 10);
    assert_eq!(outcome.errors.len(), 4);
    assert_eq!(outcome.results.len(), 6);
}

#[tokio::test]
async fn test_late_error_is_not_dropped() {
    // The only failure completes last; it must still be reported.
    let (results, err) = run_bounded(vec![1u64, 2, 3, 40], 4, |n| async move {
        tokio::time::sleep(Duration::from_millis(n)).await;
        if n == 40 { Err("slow failure") } else { Ok(n) }
    })
    .await;

    assert_eq!(results.len(), 3);
    assert_eq!(err, Some("slow failure"));
}

#[tokio::test]
async fn test_first_error_is_earliest_completion() {
    let (_, err) = run_bounded(vec![30u64, 5], 2, |n| async move {
        tokio::time::sleep(Duration::from_millis(n)).await;
        Err::<(), _>(n)
    })
    .await;
    assert_eq!(err, Some(5));
}
