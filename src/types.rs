//! リクエスト・レスポンス関連の型定義

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date::global_start;
use crate::error::TrendsError;

/// 地域の粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoLevel {
    /// ISO-3166-1 (2文字), 例: "US"
    Country,
    /// ISO-3166-2, 例: "US-NY"
    Region,
    /// DMAコード, 例: "501"
    Dma,
}

impl GeoLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoLevel::Country => "country",
            GeoLevel::Region => "region",
            GeoLevel::Dma => "dma",
        }
    }

    /// APIのクエリパラメータ名
    pub fn restriction_param(&self) -> &'static str {
        match self {
            GeoLevel::Country => "geoRestriction.country",
            GeoLevel::Region => "geoRestriction.region",
            GeoLevel::Dma => "geoRestriction.dma",
        }
    }
}

impl fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeoLevel {
    type Err = TrendsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "country" => Ok(GeoLevel::Country),
            "region" => Ok(GeoLevel::Region),
            "dma" => Ok(GeoLevel::Dma),
            other => Err(TrendsError::InvalidArgument(format!(
                "geo_level must be one of 'country', 'region' or 'dma', got {:?}",
                other
            ))),
        }
    }
}

/// 時系列の解像度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Day => "day",
            Frequency::Week => "week",
            Frequency::Month => "month",
            Frequency::Year => "year",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = TrendsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Frequency::Day),
            "week" => Ok(Frequency::Week),
            "month" => Ok(Frequency::Month),
            "year" => Ok(Frequency::Year),
            other => Err(TrendsError::InvalidArgument(format!(
                "freq must be one of 'day', 'week', 'month', 'year', got {:?}",
                other
            ))),
        }
    }
}

/// トレンド取得リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct TrendsRequest {
    pub terms: Vec<String>,
    pub geo_level: GeoLevel,
    /// 例: "US" (country), "US-NY" (region), "501" (dma)
    pub geo_id: String,
    /// 未指定なら 2004-01-04
    pub start_date: Option<NaiveDate>,
    /// 未指定なら呼び出し時点の今日
    pub end_date: Option<NaiveDate>,
    pub frequency: Frequency,
}

impl TrendsRequest {
    pub fn new<I, S>(terms: I, geo_level: GeoLevel, geo_id: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            geo_level,
            geo_id: geo_id.into(),
            start_date: None,
            end_date: None,
            frequency: Frequency::default(),
        }
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// デフォルト値を埋めて不変のコンテキストを作る
    pub fn context(&self) -> Result<RequestContext, TrendsError> {
        if self.terms.is_empty() {
            return Err(TrendsError::InvalidArgument("term list is empty".into()));
        }
        if self.geo_id.trim().is_empty() {
            return Err(TrendsError::InvalidArgument("geo_id is empty".into()));
        }

        let start_date = self.start_date.unwrap_or_else(global_start);
        let end_date = self.end_date.unwrap_or_else(|| Local::now().date_naive());
        if start_date > end_date {
            return Err(TrendsError::InvalidArgument(format!(
                "start_date {} is after end_date {}",
                start_date, end_date
            )));
        }

        Ok(RequestContext {
            geo_level: self.geo_level,
            geo_id: self.geo_id.clone(),
            start_date,
            end_date,
            frequency: self.frequency,
        })
    }
}

/// 1リクエスト中に全バッチで共有する条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub geo_level: GeoLevel,
    pub geo_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub frequency: Frequency,
}

/// timelinesForHealth のレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineResponse {
    #[serde(default)]
    pub lines: Vec<TimelineLine>,
}

/// 検索語1件分の時系列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineLine {
    pub term: String,
    #[serde(default)]
    pub points: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// "Jul 11 2004" / "Jul 2004" / "2004"
    pub date: String,
    pub value: f64,
}

/// (検索語, 正規化済み日付) → 値
pub type SparseTable = HashMap<(String, String), f64>;

/// 日付×検索語の密な表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DenseTable {
    pub terms: Vec<String>,
    pub rows: Vec<DenseRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseRow {
    pub date: String,
    pub values: Vec<f64>,
}

impl DenseTable {
    /// 疎な表を日付昇順の密な表に変換する。欠損は0
    pub fn from_sparse(sparse: &SparseTable, terms: &[String]) -> Self {
        let dates: BTreeSet<&str> = sparse.keys().map(|(_, date)| date.as_str()).collect();

        let rows = dates
            .into_iter()
            .map(|date| DenseRow {
                date: date.to_string(),
                values: terms
                    .iter()
                    .map(|term| {
                        sparse
                            .get(&(term.clone(), date.to_string()))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect(),
            })
            .collect();

        Self {
            terms: terms.to_vec(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> Vec<String> {
        std::iter::once("date".to_string())
            .chain(self.terms.iter().cloned())
            .collect()
    }

    /// ヘッダ行を先頭に含む文字列の行リスト
    pub fn records(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header())
            .chain(self.rows.iter().map(|row| {
                std::iter::once(row.date.clone())
                    .chain(row.values.iter().map(|v| v.to_string()))
                    .collect()
            }))
            .collect()
    }
}
