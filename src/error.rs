//! 错误类型

use thiserror::Error;

/// 识别服务调用失败
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("extraction request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("extraction service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("extraction response is not a JSON array of objects: {0}")]
    Decode(String),
}

/// 匹配服务调用失败
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("match request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("match service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("match response could not be decoded: {0}")]
    Decode(String),
}

/// 订单存储失败
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage operation timed out")]
    Timeout,
}

/// 订单提交失败
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("failed to store order: {0}")]
    Store(#[from] StoreError),
}

/// 审核编辑失败
#[derive(Error, Debug, PartialEq)]
pub enum ReviewError {
    #[error("row {index} out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("unknown line item field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("review session {0} not found")]
    SessionNotFound(u64),
}

/// 对账流水线失败 (只有识别失败是致命的)
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

/// 配置加载失败
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}
