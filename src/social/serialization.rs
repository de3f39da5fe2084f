use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// 服务端的 id 可能是字符串也可能是数字，统一转成字符串
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Uint(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Uint(n) => n.to_string(),
        }
    }
}

/// 反序列化 id 字段（字符串或数字）
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawId::deserialize(deserializer)?;
    let id: String = raw.into();
    if id.is_empty() {
        return Err(serde::de::Error::custom("empty id"));
    }
    Ok(id)
}

/// 反序列化可为 null 的 id 字段
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(String::from).filter(|s| !s.is_empty()))
}

/// 反序列化可为 null 的字符串字段，null 按空字符串处理
pub fn deserialize_string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// 反序列化嵌入的关联记录
///
/// 嵌入记录为 null 或无法通过校验时按缺失处理，不影响所在的行
pub fn deserialize_embedded<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match serde_json::from_value::<T>(value) {
            Ok(embedded) => Ok(Some(embedded)),
            Err(e) => {
                warn!("[Decode] 嵌入记录校验失败，按缺失处理: {}", e);
                Ok(None)
            }
        },
    }
}

/// 解析时间戳：优先 RFC3339，不带时区的按 UTC 处理
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// 反序列化时间戳字段
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s)))
}

/// 反序列化可缺失的时间戳字段
pub fn deserialize_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
    }
}

/// 生成上传视频的存储路径：`{user_id}-{毫秒时间戳}.mp4`
pub fn generate_storage_key(user_id: &str) -> String {
    format!("{}-{}.mp4", user_id, chrono::Utc::now().timestamp_millis())
}
