use crate::social::serialization::{
    deserialize_embedded, deserialize_id, deserialize_opt_id, deserialize_string_or_null,
    deserialize_timestamp,
};
use crate::social::user::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 视频元数据（`Video` 表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// 对象存储中的路径，缺失时为空
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub uri: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub album_id: Option<String>,
    /// `select=*, User(*)` 时嵌入的作者信息
    #[serde(default, rename = "User", deserialize_with = "deserialize_embedded")]
    pub author: Option<User>,
}

/// 带播放地址的视频
///
/// `signed_url` 只在内存中存在，不会回写到服务端
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub video: Video,
    pub signed_url: Option<String>,
}

impl FeedItem {
    /// 没有签名地址的条目应展示占位状态
    pub fn is_playable(&self) -> bool {
        self.signed_url.is_some()
    }

    pub fn id(&self) -> &str {
        &self.video.id
    }
}
