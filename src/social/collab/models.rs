use crate::social::album::models::Album;
use crate::social::feed::models::Video;
use crate::social::serialization::{deserialize_embedded, deserialize_id, deserialize_timestamp};
use crate::social::user::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// 列表方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDirection {
    /// 别人申请收录我的视频
    Received,
    /// 我发出的申请
    Sent,
}

impl RequestDirection {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            RequestDirection::Received => "video_owner_id",
            RequestDirection::Sent => "requester_id",
        }
    }
}

/// 合作申请（`CollaborationRequest` 表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRequest {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub album_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub video_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub requester_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub album_owner_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub video_owner_id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// 以下为列表查询时嵌入的关联记录，缺失或校验失败时为 `None`
    #[serde(default, rename = "Album", deserialize_with = "deserialize_embedded")]
    pub album: Option<Album>,
    #[serde(default, rename = "Video", deserialize_with = "deserialize_embedded")]
    pub video: Option<Video>,
    #[serde(default, rename = "Requester", deserialize_with = "deserialize_embedded")]
    pub requester: Option<User>,
    #[serde(default, rename = "AlbumOwner", deserialize_with = "deserialize_embedded")]
    pub album_owner: Option<User>,
    #[serde(default, rename = "VideoOwner", deserialize_with = "deserialize_embedded")]
    pub video_owner: Option<User>,
}

/// 新建申请参数
#[derive(Debug, Clone)]
pub struct NewCollaborationRequest {
    pub album_id: String,
    pub video_id: String,
    pub video_owner_id: String,
    pub message: Option<String>,
}
