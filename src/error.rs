use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendsError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("引数エラー: {0}")]
    InvalidArgument(String),

    #[error("日付形式エラー: {0:?} は '%b %d %Y', '%b %Y', '%Y' のいずれにも一致しません")]
    DateFormat(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("APIエラー (status={status}): {message}")]
    Status { status: u16, message: String },

    #[error("レスポンス解析エラー: {0}")]
    Decode(String),
}
