//! 日付ラベルの正規化
//!
//! APIは `"Jul 11 2004"`, `"Jul 2004"`, `"2004"` のような日付を返すので、
//! `YYYY-MM-DD` に揃える。月・日が無い場合は1月・1日とする。

use chrono::NaiveDate;

use crate::error::TrendsError;

/// 集計開始日のデフォルト
pub const GLOBAL_START: &str = "2004-01-04";

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// APIの日付ラベルを `YYYY-MM-DD` に変換
///
/// 前後の空白は受け付けない。区切りの空白は1文字以上
pub fn normalize_date(label: &str) -> Result<String, TrendsError> {
    let date = if label.trim() != label {
        None
    } else {
        parse_month_day_year(label)
            .or_else(|| parse_month_year(label))
            .or_else(|| parse_year(label))
    }
    .ok_or_else(|| TrendsError::DateFormat(label.to_string()))?;

    Ok(date.format("%Y-%m-%d").to_string())
}

/// `YYYY-MM-DD` 形式の日付をパース
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, TrendsError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| TrendsError::InvalidArgument(format!("invalid date {:?}: {}", s, e)))
}

/// デフォルトの開始日 (2004-01-04)
pub fn global_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2004, 1, 4).unwrap_or_default()
}

/// `"Jul 11 2004"`
fn parse_month_day_year(label: &str) -> Option<NaiveDate> {
    let [month, day, year] = fields::<3>(label)?;
    if !is_month_abbrev(month) || day.len() > 2 || !is_year(year) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{} {} {}", month, day, year), "%b %d %Y").ok()
}

/// `"Jul 2004"`
fn parse_month_year(label: &str) -> Option<NaiveDate> {
    let [month, year] = fields::<2>(label)?;
    if !is_month_abbrev(month) || !is_year(year) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{} 01 {}", month, year), "%b %d %Y").ok()
}

/// `"2004"`
fn parse_year(label: &str) -> Option<NaiveDate> {
    if !is_year(label) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{}-01-01", label), "%Y-%m-%d").ok()
}

/// 空白区切りでちょうど N 個に分割
fn fields<const N: usize>(label: &str) -> Option<[&str; N]> {
    let parts: Vec<&str> = label.split_whitespace().collect();
    parts.try_into().ok()
}

// chrono の %b は "July" も受け付けるので3文字略称に限定する
fn is_month_abbrev(name: &str) -> bool {
    MONTHS.iter().any(|m| m.eq_ignore_ascii_case(name))
}

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}
