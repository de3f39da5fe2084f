use crate::social::error::BackendError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

/// PostgREST / Storage 的统一错误体
/// 字段都可能缺失，缺失时使用默认值
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ErrorBody {
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}

/// 通用 HTTP 响应处理：成功时返回 body bytes，失败时按错误体归类
///
/// `table` 只用于错误归类（表不存在时的提示）
pub async fn handle_http_response(
    response: reqwest::Response,
    operation_name: &str,
    table: &str,
) -> Result<(reqwest::header::HeaderMap, Vec<u8>), BackendError> {
    let status = response.status();
    let headers = response.headers().clone();

    // 读取 body bytes（只能读取一次）
    let body_bytes = response.bytes().await?.to_vec();
    let body_str = String::from_utf8_lossy(&body_bytes);
    debug!("[HTTP] {}响应 Body: {}", operation_name, body_str);

    if !status.is_success() {
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        let body: ErrorBody = serde_json::from_slice(&body_bytes).unwrap_or_default();
        return Err(BackendError::classify(
            status.as_u16(),
            table,
            body.code.as_deref().unwrap_or_default(),
            body.text().unwrap_or(&body_str),
        ));
    }
    debug!("[HTTP] {}请求成功，HTTP状态: {}", operation_name, status);

    Ok((headers, body_bytes))
}

/// 把服务端返回的行逐条校验为强类型记录，无法通过校验的行记录日志后跳过
pub fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("[Decode] {} 行校验失败，已跳过: {}，原始数据: {}", table, e, row);
                None
            }
        })
        .collect();
    if decoded.len() != total {
        warn!("[Decode] {} 共 {} 行，有效 {} 行", table, total, decoded.len());
    }
    decoded
}

/// 单行校验，失败时返回 `BackendError::Decode`
pub fn decode_row<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, BackendError> {
    serde_json::from_value(row)
        .map_err(|e| BackendError::Decode(format!("{}: {}", table, e)))
}

/// 解析数组响应，body 为 `null` 或为空时按空数组处理
pub fn parse_array<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, BackendError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = serde_json::from_slice(body)?;
    Ok(items.unwrap_or_default())
}

/// 从 `Content-Range: 0-9/42` 或 `*/42` 中解析总数
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}
