//! Health Trends API 取得ライブラリ
//!
//! - 検索語をバッチに分割して timelinesForHealth を呼び出す（レート制限対策）
//! - 失敗したバッチは固定間隔でリトライ
//! - 結果を日付×検索語の表にまとめてCSV出力
//!
//! # 使用例
//!
//! ```rust,ignore
//! use healthtrends::{ExportTarget, GeoLevel, TrendsConfig, TrendsRequest, TrendsSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), healthtrends::TrendsError> {
//!     let mut session = TrendsSession::new(TrendsConfig::from_env())?;
//!
//!     let request = TrendsRequest::new(["flu", "fever"], GeoLevel::Region, "US-NY");
//!     session.request(&request).await?;
//!
//!     let path = session.export(&ExportTarget::directory("./data"))?;
//!     println!("CSV saved: {:?}", path);
//!     Ok(())
//! }
//! ```
//!
//! # tower::Service として使う
//!
//! ```rust,ignore
//! use healthtrends::{GeoLevel, TrendsConfig, TrendsRequest, TrendsService};
//! use tower::Service;
//!
//! let mut service = TrendsService::new(TrendsConfig::from_env());
//! let result = service
//!     .call(TrendsRequest::new(["flu"], GeoLevel::Country, "US"))
//!     .await?;
//! println!("rows: {}, complete: {}", result.table.rows.len(), result.is_complete());
//! ```

pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod export;
pub mod retry;
pub mod service;
pub mod session;
pub mod traits;
pub mod types;

// 主要な型をリエクスポート
pub use client::HttpTrendsApi;
pub use config::TrendsConfig;
pub use date::normalize_date;
pub use error::TrendsError;
pub use export::ExportTarget;
pub use retry::{retry, timed, timed_sync, RetryPolicy};
pub use service::{TrendsResult, TrendsService};
pub use session::TrendsSession;
pub use traits::TrendsApi;
pub use types::{DenseRow, DenseTable, Frequency, GeoLevel, RequestContext, TrendsRequest};
