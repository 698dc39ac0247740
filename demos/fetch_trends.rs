//! Health Trends 取得テスト
//!
//! 実行方法:
//! ```
//! HEALTHTRENDS_API_KEY=... TRENDS_TERMS=flu,fever TRENDS_GEO=region:US-NY \
//!     cargo run --example fetch_trends
//! ```

use healthtrends::date::parse_iso_date;
use healthtrends::{ExportTarget, Frequency, GeoLevel, TrendsConfig, TrendsRequest, TrendsSession};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let terms: Vec<String> = std::env::var("TRENDS_TERMS")
        .unwrap_or_else(|_| "flu,fever".to_string())
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    // "country:US" / "region:US-NY" / "dma:501"
    let geo = std::env::var("TRENDS_GEO").unwrap_or_else(|_| "country:US".to_string());
    let (level, geo_id) = geo.split_once(':').ok_or("TRENDS_GEO must be <level>:<id>")?;
    let geo_level: GeoLevel = level.parse()?;

    let mut request = TrendsRequest::new(terms, geo_level, geo_id);
    if let Ok(start) = std::env::var("TRENDS_START") {
        request = request.with_start_date(parse_iso_date(&start)?);
    }
    if let Ok(end) = std::env::var("TRENDS_END") {
        request = request.with_end_date(parse_iso_date(&end)?);
    }
    if let Ok(freq) = std::env::var("TRENDS_FREQ") {
        request = request.with_frequency(freq.parse::<Frequency>()?);
    }

    println!("=== Health Trends Fetch ===");
    println!("Terms: {:?}", request.terms);
    println!("Geo: {} {}", request.geo_level, request.geo_id);

    let mut session = TrendsSession::new(TrendsConfig::from_env())?;
    session.request(&request).await?;

    if !session.failed_batches().is_empty() {
        eprintln!("欠落したバッチ: {:?}", session.failed_batches());
    }

    let out_dir = std::env::var("TRENDS_OUT_DIR").unwrap_or_else(|_| "./data".to_string());
    std::fs::create_dir_all(&out_dir)?;
    let path = session.export(&ExportTarget::directory(out_dir))?;

    println!("Rows: {}", session.output().rows.len());
    println!("CSV保存先: {:?}", path);
    Ok(())
}
