//! トレンド取得セッション
//!
//! API はレート制限があるため、検索語をバッチに分けて個別に呼び出す。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::client::HttpTrendsApi;
use crate::config::TrendsConfig;
use crate::date::normalize_date;
use crate::error::TrendsError;
use crate::export::{write_csv_file, ExportTarget};
use crate::retry::{retry, timed, timed_sync, RetryPolicy};
use crate::traits::TrendsApi;
use crate::types::{DenseTable, RequestContext, SparseTable, TimelineResponse, TrendsRequest};

pub struct TrendsSession {
    api: Arc<dyn TrendsApi>,
    batch_size: usize,
    retry: RetryPolicy,
    rate_limit_pause: Duration,
    last_context: Option<RequestContext>,
    output: DenseTable,
    failed_batches: Vec<Vec<String>>,
}

impl TrendsSession {
    /// HTTPクライアントでセッションを作成。APIキーが無ければ通信前にエラー
    pub fn new(config: TrendsConfig) -> Result<Self, TrendsError> {
        config.validate()?;
        let api = HttpTrendsApi::new(&config)?;
        Self::with_api(config, Arc::new(api))
    }

    /// 任意の `TrendsApi` 実装でセッションを作成
    pub fn with_api(config: TrendsConfig, api: Arc<dyn TrendsApi>) -> Result<Self, TrendsError> {
        config.validate()?;

        info!("------- Health Trends API session -------");
        info!("{}", Local::now());

        Ok(Self {
            api,
            batch_size: config.batch_size,
            retry: config.retry,
            rate_limit_pause: config.rate_limit_pause,
            last_context: None,
            output: DenseTable::default(),
            failed_batches: Vec::new(),
        })
    }

    /// 直近のリクエスト結果
    pub fn output(&self) -> &DenseTable {
        &self.output
    }

    /// 直近のリクエストでリトライを使い切って欠落したバッチ
    pub fn failed_batches(&self) -> &[Vec<String>] {
        &self.failed_batches
    }

    pub fn last_context(&self) -> Option<&RequestContext> {
        self.last_context.as_ref()
    }

    /// 全検索語を取得して結果表を更新する
    pub async fn request(&mut self, req: &TrendsRequest) -> Result<(), TrendsError> {
        timed("request", self.request_inner(req)).await
    }

    async fn request_inner(&mut self, req: &TrendsRequest) -> Result<(), TrendsError> {
        let ctx = req.context()?;

        info!("Starting download:");
        info!(
            "geo_level: {}, geo_id: {}, {}..{} ({})",
            ctx.geo_level, ctx.geo_id, ctx.start_date, ctx.end_date, ctx.frequency
        );

        let mut data = SparseTable::new();
        let mut failed = Vec::new();
        let this = &*self;
        let ctx_ref = &ctx;

        for (i, batch) in batches(&req.terms, this.batch_size).enumerate() {
            info!("batch {}: {:?}", i + 1, batch);

            match retry(&this.retry, move || this.batch_request(ctx_ref, batch)).await {
                Some(entries) => data.extend(entries),
                None => {
                    warn!("batch {} dropped after retries: {:?}", i + 1, batch);
                    failed.push(batch.to_vec());
                }
            }
        }

        self.output = DenseTable::from_sparse(&data, &req.terms);
        self.failed_batches = failed;
        self.last_context = Some(ctx);

        info!(
            "Download completed: {} rows, {} failed batches",
            self.output.rows.len(),
            self.failed_batches.len()
        );
        Ok(())
    }

    /// 1バッチ分を取得して (検索語, 日付) → 値 に変換
    async fn batch_request(
        &self,
        ctx: &RequestContext,
        batch: &[String],
    ) -> Result<SparseTable, TrendsError> {
        let response = self.api.get_timelines(ctx, batch).await?;

        // レート制限回避
        sleep(self.rate_limit_pause).await;

        flatten_response(&response)
    }

    /// 結果表をCSVで保存し、書き込んだパスを返す
    pub fn export(&self, target: &ExportTarget) -> Result<PathBuf, TrendsError> {
        let geo_id = self.last_context.as_ref().map(|ctx| ctx.geo_id.as_str());
        let path = target.resolve(geo_id)?;

        timed_sync("export", || write_csv_file(&path, &self.output))?;

        info!("CSV保存完了: {:?}", path);
        Ok(path)
    }
}

/// 検索語を `size` 件ずつの連続したバッチに分割
pub fn batches(terms: &[String], size: usize) -> std::slice::Chunks<'_, String> {
    terms.chunks(size.max(1))
}

fn flatten_response(response: &TimelineResponse) -> Result<SparseTable, TrendsError> {
    let mut table = SparseTable::new();
    for line in &response.lines {
        for point in &line.points {
            table.insert(
                (line.term.clone(), normalize_date(&point.date)?),
                point.value,
            );
        }
    }
    Ok(table)
}
