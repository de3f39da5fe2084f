use crate::social::serialization::{deserialize_id, deserialize_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 点赞边（`Like` 表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeEdge {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub video_id: String,
    /// 视频作者
    #[serde(deserialize_with = "deserialize_id")]
    pub video_user_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}
