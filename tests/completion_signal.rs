use std::sync::Arc;
use std::time::Duration;

use querydag::exec::CompletionSignal;
use querydag_test_utils::with_timeout;

#[tokio::test]
async fn late_waiters_return_immediately() {
    let signal = CompletionSignal::new();
    assert!(!signal.is_fired());

    assert!(signal.fire());
    assert!(signal.is_fired());

    with_timeout(signal.wait()).await;
}

#[tokio::test]
async fn firing_twice_is_idempotent() {
    let signal = CompletionSignal::new();

    assert!(signal.fire());
    assert!(!signal.fire());
    assert!(signal.is_fired());
}

#[tokio::test]
async fn every_waiter_is_released() {
    let signal = Arc::new(CompletionSignal::new());

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let signal = Arc::clone(&signal);
            tokio::spawn(async move { signal.wait().await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(20)).await;
    for w in &waiters {
        assert!(!w.is_finished());
    }

    signal.fire();

    for w in waiters {
        with_timeout(w).await.unwrap();
    }
}
