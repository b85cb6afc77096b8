use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries a request that failed before any response arrived.
///
/// # Parameters
/// - `operation`: Closure returning the request future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts, doubled after each failure
///
/// # Returns
/// Either the response or the error of the last attempt. HTTP error statuses
/// are responses and are returned as-is for the caller to inspect.
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    let mut delay = delay_ms;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries || !(err.is_connect() || err.is_timeout()) {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying in {}ms...",
                    attempt, retries, err, delay
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }
        }
    }
}
