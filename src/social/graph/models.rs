use crate::social::serialization::{deserialize_id, deserialize_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 关注边（`Follower` 表）
///
/// 字段名沿用服务端表结构：`user_id` 是发起关注的人，
/// `follower_user_id` 是被关注的人。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowEdge {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub follower_user_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl FollowEdge {
    /// 关注者
    pub fn source(&self) -> &str {
        &self.user_id
    }

    /// 被关注者
    pub fn target(&self) -> &str {
        &self.follower_user_id
    }
}
