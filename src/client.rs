//! Health Trends API の HTTP クライアント

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::TrendsConfig;
use crate::error::TrendsError;
use crate::traits::TrendsApi;
use crate::types::{RequestContext, TimelineResponse};

const API_KEY_HEADER: &str = "X-goog-api-key";

/// Google API 形式のエラーレスポンス
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct HttpTrendsApi {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl HttpTrendsApi {
    /// APIキー未設定ならエラー（通信は行わない）
    pub fn new(config: &TrendsConfig) -> Result<Self, TrendsError> {
        let api_key = config.require_api_key()?.to_string();
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint(),
        })
    }

    /// クエリパラメータを組み立てる。地域指定は geo_level に対応する1つだけ
    ///
    /// APIキーはURLに載せず `X-goog-api-key` ヘッダで送る
    pub(crate) fn query_params(
        &self,
        ctx: &RequestContext,
        terms: &[String],
    ) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> =
            terms.iter().map(|t| ("terms", t.clone())).collect();

        params.push(("time.startDate", ctx.start_date.format("%Y-%m-%d").to_string()));
        params.push(("time.endDate", ctx.end_date.format("%Y-%m-%d").to_string()));
        params.push(("timelineResolution", ctx.frequency.to_string()));
        params.push((ctx.geo_level.restriction_param(), ctx.geo_id.clone()));
        params
    }
}

#[async_trait]
impl TrendsApi for HttpTrendsApi {
    async fn get_timelines(
        &self,
        ctx: &RequestContext,
        terms: &[String],
    ) -> Result<TimelineResponse, TrendsError> {
        debug!("GET {} terms={:?}", self.endpoint, terms);

        let response = self
            .client
            .get(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&self.query_params(ctx, terms))
            .send()
            .await
            .map_err(strip_url)?;

        let status = response.status();
        let body = response.text().await.map_err(strip_url)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(TrendsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| TrendsError::Decode(e.to_string()))
    }
}

// reqwest のエラー表示にはリクエストURLが含まれる
fn strip_url(e: reqwest::Error) -> TrendsError {
    TrendsError::Http(e.without_url())
}

impl std::fmt::Debug for HttpTrendsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTrendsApi")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Frequency, GeoLevel};
    use chrono::NaiveDate;

    fn context(geo_level: GeoLevel, geo_id: &str) -> RequestContext {
        RequestContext {
            geo_level,
            geo_id: geo_id.to_string(),
            start_date: NaiveDate::from_ymd_opt(2004, 1, 4).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
            frequency: Frequency::Month,
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = HttpTrendsApi::new(&TrendsConfig::default());
        assert!(matches!(result, Err(TrendsError::Config(_))));
    }

    #[test]
    fn test_query_params_single_geo_restriction() {
        let api = HttpTrendsApi::new(&TrendsConfig::new("secret")).unwrap();
        let terms = vec!["flu".to_string(), "fever".to_string()];

        for (level, id, param) in [
            (GeoLevel::Country, "US", "geoRestriction.country"),
            (GeoLevel::Region, "US-NY", "geoRestriction.region"),
            (GeoLevel::Dma, "501", "geoRestriction.dma"),
        ] {
            let params = api.query_params(&context(level, id), &terms);
            let geo: Vec<_> = params
                .iter()
                .filter(|(k, _)| k.starts_with("geoRestriction."))
                .collect();

            assert_eq!(geo, vec![&(param, id.to_string())]);
        }
    }

    #[test]
    fn test_query_params_contents() {
        let api = HttpTrendsApi::new(&TrendsConfig::new("secret")).unwrap();
        let terms = vec!["flu".to_string(), "fever".to_string()];
        let params = api.query_params(&context(GeoLevel::Country, "US"), &terms);

        assert_eq!(params[0], ("terms", "flu".to_string()));
        assert_eq!(params[1], ("terms", "fever".to_string()));
        assert!(params.contains(&("time.startDate", "2004-01-04".to_string())));
        assert!(params.contains(&("time.endDate", "2020-12-31".to_string())));
        assert!(params.contains(&("timelineResolution", "month".to_string())));
        assert!(params.iter().all(|(k, v)| *k != "key" && v != "secret"));
    }

    #[tokio::test]
    async fn test_transport_error_hides_key() {
        // 接続拒否されるポート
        let config = TrendsConfig::new("SUPERSECRETKEY")
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(std::time::Duration::from_secs(5));
        let api = HttpTrendsApi::new(&config).unwrap();
        let terms = vec!["flu".to_string()];

        let err = api
            .get_timelines(&context(GeoLevel::Country, "US"), &terms)
            .await
            .unwrap_err();

        assert!(matches!(err, TrendsError::Http(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));
        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let api = HttpTrendsApi::new(&TrendsConfig::new("secret")).unwrap();
        let debug = format!("{:?}", api);
        assert!(!debug.contains("secret"));
    }
}
