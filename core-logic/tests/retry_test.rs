use core_logic::{retry_until_solved, with_retry, RetryConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_retry_success_first_try() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10).without_jitter();

    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok("success".to_string())
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_success_after_failures() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10).without_jitter();

    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", || async {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if count < 3 {
            Err(anyhow::anyhow!("temporary error"))
        } else {
            Ok("success".to_string())
        }
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_all_failures() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10).without_jitter();

    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("permanent error"))
    })
    .await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_retry_with_delay() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(2, 50).without_jitter();

    let start = tokio::time::Instant::now();
    let _: Result<String, anyhow::Error> = with_retry(config, "test_op", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        if counter.load(Ordering::SeqCst) < 3 {
            Err(anyhow::anyhow!("temp"))
        } else {
            Ok("done".to_string())
        }
    })
    .await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_unbounded_retry_counts_attempts() {
    // A solver that fails N times then succeeds must be submitted N+1 times
    let n = 5;
    let counter = Arc::new(AtomicUsize::new(0));
    let token = CancellationToken::new();

    let result: Result<String, anyhow::Error> =
        retry_until_solved(Duration::from_millis(5), "solve", &token, || async {
            let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if count <= n {
                Err(anyhow::anyhow!("not solved"))
            } else {
                Ok("token".to_string())
            }
        })
        .await;

    assert_eq!(result.unwrap(), "token");
    assert_eq!(counter.load(Ordering::SeqCst), n + 1);
}

#[tokio::test]
async fn test_unbounded_retry_cancellation_aborts() {
    let counter = Arc::new(AtomicUsize::new(0));
    let token = CancellationToken::new();
    let cancel_handle = token.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel_handle.cancel();
    });

    let result: Result<String, anyhow::Error> =
        retry_until_solved(Duration::from_millis(10), "solve", &token, || async {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("never solved"))
        })
        .await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("cancelled"));
    // A few attempts happened before the cancel landed
    assert!(counter.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_unbounded_retry_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();

    let counter = Arc::new(AtomicUsize::new(0));
    let result: Result<String, anyhow::Error> =
        retry_until_solved(Duration::from_millis(1), "solve", &token, || async {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("token".to_string())
        })
        .await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}
