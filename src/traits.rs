use async_trait::async_trait;

use crate::error::TrendsError;
use crate::types::{RequestContext, TimelineResponse};

#[async_trait]
pub trait TrendsApi: Send + Sync {
    /// 検索語1バッチ分の時系列を取得
    async fn get_timelines(
        &self,
        ctx: &RequestContext,
        terms: &[String],
    ) -> Result<TimelineResponse, TrendsError>;
}
