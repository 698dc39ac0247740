use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::TrendsConfig;
use crate::error::TrendsError;
use crate::session::TrendsSession;
use crate::traits::TrendsApi;
use crate::types::{DenseTable, TrendsRequest};

/// 取得結果
#[derive(Debug, Clone)]
pub struct TrendsResult {
    pub table: DenseTable,
    /// リトライを使い切って欠落したバッチ
    pub failed_batches: Vec<Vec<String>>,
}

impl TrendsResult {
    pub fn is_complete(&self) -> bool {
        self.failed_batches.is_empty()
    }
}

/// tower::Serviceを実装したトレンド取得サービス
#[derive(Clone)]
pub struct TrendsService {
    config: TrendsConfig,
    // None なら呼び出しごとに HTTP クライアントを作る
    api: Option<Arc<dyn TrendsApi>>,
}

impl TrendsService {
    pub fn new(config: TrendsConfig) -> Self {
        Self { config, api: None }
    }

    pub fn with_api(config: TrendsConfig, api: Arc<dyn TrendsApi>) -> Self {
        Self {
            config,
            api: Some(api),
        }
    }
}

impl Service<TrendsRequest> for TrendsService {
    type Response = TrendsResult;
    type Error = TrendsError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: TrendsRequest) -> Self::Future {
        info!(
            "トレンド取得リクエスト受信: terms={}, geo={}:{}",
            req.terms.len(),
            req.geo_level,
            req.geo_id
        );

        let config = self.config.clone();
        let api = self.api.clone();

        Box::pin(async move {
            let mut session = match api {
                Some(api) => TrendsSession::with_api(config, api)?,
                None => TrendsSession::new(config)?,
            };

            session.request(&req).await?;

            let result = TrendsResult {
                table: session.output().clone(),
                failed_batches: session.failed_batches().to_vec(),
            };

            info!(
                "トレンド取得完了: rows={}, failed_batches={}",
                result.table.rows.len(),
                result.failed_batches.len()
            );

            Ok(result)
        })
    }
}
