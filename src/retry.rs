//! リトライ・計測ラッパー
//!
//! 任意の非同期処理を包む高階関数。
//! `retry` は全試行が失敗した場合もエラーを返さず `None` を返す。

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

/// 固定間隔リトライ設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大試行回数
    pub count: u32,
    /// 失敗後の待機時間（毎回一定）
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            count: 10,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(count: u32, delay: Duration) -> Self {
        Self { count, delay }
    }
}

/// `policy.count` 回まで `op` を実行する
///
/// 失敗するたびにエラーと待機時間をログ出力して `policy.delay` だけ待つ。
/// 最後の試行の後は待たない。全て失敗した場合は `None`。
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    for attempt in 1..=policy.count {
        match op().await {
            Ok(value) => return Some(value),
            Err(e) => {
                warn!("attempt {}/{} failed: {}", attempt, policy.count, e);
                if attempt < policy.count {
                    warn!("Retrying after {:?}", policy.delay);
                    sleep(policy.delay).await;
                }
            }
        }
    }

    warn!("retries exhausted after {} attempts", policy.count);
    None
}

/// 処理時間を計測してログ出力する。結果はそのまま返す
pub async fn timed<T, Fut>(label: &str, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let start = Instant::now();
    let result = fut.await;
    info!("{}: Time elapsed: {:?}", label, start.elapsed());
    result
}

/// `timed` の同期版
pub fn timed_sync<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    info!("{}: Time elapsed: {:?}", label, start.elapsed());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_exhaustion_returns_none() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(3, Duration::from_millis(20));

        let start = Instant::now();
        let result: Option<()> = retry(&policy, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("boom")
        })
        .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 3回試行 → 待機は2回
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(5, Duration::ZERO);

        let result = retry(&policy, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(format!("failure {}", n))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_first_success_no_delay() {
        let policy = RetryPolicy::new(3, Duration::from_secs(60));
        let start = Instant::now();
        let result = retry(&policy, || async { Ok::<_, String>("ok") }).await;

        assert_eq!(result, Some("ok"));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_timed_passes_result_through() {
        let value = timed("test", async { 42 }).await;
        assert_eq!(value, 42);
        assert_eq!(crate::timed_sync("test", || "done"), "done");
    }
}
