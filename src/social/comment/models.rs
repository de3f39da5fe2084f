use crate::social::serialization::{deserialize_embedded, deserialize_id, deserialize_timestamp};
use crate::social::user::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 评论（`Comment` 表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub text: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub video_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, rename = "User", deserialize_with = "deserialize_embedded")]
    pub author: Option<User>,
}

/// 相对时间文案：just now / Nm ago / Nh ago / Nd ago
pub fn format_time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created_at).num_seconds();
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86400)
    }
}
