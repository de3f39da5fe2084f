//! 后端错误分类
//!
//! 把 HTTP 状态码和 PostgREST 错误体归类为三种情况：
//! 普通服务错误、"预期内的缺失"（查无数据）、以及表结构未初始化（需要先建表）。

use thiserror::Error;

/// PostgREST: 单行查询没有匹配到任何行
pub const CODE_NO_ROWS: &str = "PGRST116";
/// PostgREST: 找不到关联关系（通常是表不存在）
pub const CODE_MISSING_RELATIONSHIP: &str = "PGRST200";
/// Postgres: undefined_table
pub const CODE_UNDEFINED_TABLE: &str = "42P01";
/// Postgres: undefined_column
pub const CODE_UNDEFINED_COLUMN: &str = "42703";

/// 后端（REST / 对象存储）返回的错误
#[derive(Debug, Error)]
pub enum BackendError {
    /// 网络层失败（连接、超时、读取 body 等）
    #[error("transport error: {0}")]
    Transport(String),

    /// 服务端返回的一般错误
    #[error("service error {status} [{code}]: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// 查无数据（调用方通常视为空结果）
    #[error("no rows found")]
    NotFound,

    /// 依赖的表或字段尚未创建
    #[error("schema missing for `{table}`: {message}")]
    SchemaMissing { table: String, message: String },

    /// 返回的数据无法通过类型校验
    #[error("decode error: {0}")]
    Decode(String),
}

impl BackendError {
    /// 根据 HTTP 状态、错误码和错误信息归类
    pub fn classify(status: u16, table: &str, code: &str, message: &str) -> Self {
        if code == CODE_NO_ROWS {
            return BackendError::NotFound;
        }
        let relation_missing = message.contains("relation \"") && message.contains("does not exist");
        if code == CODE_MISSING_RELATIONSHIP
            || code == CODE_UNDEFINED_TABLE
            || code == CODE_UNDEFINED_COLUMN
            || relation_missing
        {
            return BackendError::SchemaMissing {
                table: table.to_string(),
                message: message.to_string(),
            };
        }
        BackendError::Service {
            status,
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound)
    }

    pub fn is_schema_missing(&self) -> bool {
        matches!(self, BackendError::SchemaMissing { .. })
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e.to_string())
    }
}

/// 错误链中是否包含"需要初始化表结构"的后端错误
pub fn is_setup_required(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<BackendError>())
        .any(BackendError::is_schema_missing)
}

/// 错误链中是否包含"查无数据"的后端错误
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<BackendError>())
        .any(BackendError::is_not_found)
}

/// 给界面层展示的固定提示文案
pub fn user_message(err: &anyhow::Error) -> &'static str {
    if is_setup_required(err) {
        "Database setup required. Please run the database schema first."
    } else if is_not_found(err) {
        "Not found."
    } else {
        "Something went wrong. Please try again."
    }
}
