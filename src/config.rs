use std::time::Duration;

use crate::error::TrendsError;
use crate::retry::RetryPolicy;

pub const DEFAULT_SERVER: &str = "https://www.googleapis.com";
pub const API_NAME: &str = "trends";
pub const API_VERSION: &str = "v1beta";

/// APIキーを読み込む環境変数
pub const API_KEY_ENV: &str = "HEALTHTRENDS_API_KEY";

#[derive(Debug, Clone)]
pub struct TrendsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// 1リクエストあたりの検索語数上限
    pub batch_size: usize,
    pub retry: RetryPolicy,
    /// 成功したAPI呼び出し後の待機時間
    pub rate_limit_pause: Duration,
    pub timeout: Duration,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_SERVER.to_string(),
            batch_size: 2,
            retry: RetryPolicy::default(),
            rate_limit_pause: Duration::from_millis(1100),
            timeout: Duration::from_secs(60),
        }
    }
}

impl TrendsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// 環境変数 `HEALTHTRENDS_API_KEY` から作成（未設定ならキーなし）
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limit_pause(mut self, pause: Duration) -> Self {
        self.rate_limit_pause = pause;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// APIキーを取り出す。未設定・空文字はエラー
    pub fn require_api_key(&self) -> Result<&str, TrendsError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(TrendsError::Config("API key not set.".into())),
        }
    }

    /// セッション開始前の検証
    pub fn validate(&self) -> Result<(), TrendsError> {
        self.require_api_key()?;
        if self.batch_size == 0 {
            return Err(TrendsError::Config("batch_size must be at least 1".into()));
        }
        if self.retry.count == 0 {
            return Err(TrendsError::Config("retry count must be at least 1".into()));
        }
        Ok(())
    }

    /// timelinesForHealth エンドポイントのURL
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/{}/timelinesForHealth",
            self.base_url.trim_end_matches('/'),
            API_NAME,
            API_VERSION
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrendsConfig::default();
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.retry.count, 10);
        assert_eq!(config.retry.delay, Duration::from_secs(2));
        assert_eq!(config.rate_limit_pause, Duration::from_millis(1100));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = TrendsConfig::new("key")
            .with_batch_size(5)
            .with_base_url("http://localhost:8080/")
            .with_retry(RetryPolicy::new(3, Duration::from_millis(10)))
            .with_rate_limit_pause(Duration::ZERO)
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.retry.count, 3);
        assert_eq!(config.rate_limit_pause, Duration::ZERO);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.endpoint(),
            "http://localhost:8080/trends/v1beta/timelinesForHealth"
        );
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            TrendsConfig::default().validate(),
            Err(TrendsError::Config(_))
        ));
        assert!(matches!(
            TrendsConfig::new("   ").validate(),
            Err(TrendsError::Config(_))
        ));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = TrendsConfig::new("key").with_batch_size(0);
        assert!(matches!(config.validate(), Err(TrendsError::Config(_))));
    }
}
