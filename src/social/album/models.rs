use crate::social::feed::models::FeedItem;
use crate::social::serialization::{deserialize_embedded, deserialize_id, deserialize_timestamp};
use crate::social::user::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 专辑类型，未知取值归为 `Custom`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumType {
    EpPreview,
    StudioFreestyle,
    FanCollab,
    BehindScenes,
    Covers,
    Originals,
    #[default]
    #[serde(other)]
    Custom,
}

impl AlbumType {
    pub const ALL: [AlbumType; 7] = [
        AlbumType::EpPreview,
        AlbumType::StudioFreestyle,
        AlbumType::FanCollab,
        AlbumType::BehindScenes,
        AlbumType::Covers,
        AlbumType::Originals,
        AlbumType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumType::EpPreview => "ep_preview",
            AlbumType::StudioFreestyle => "studio_freestyle",
            AlbumType::FanCollab => "fan_collab",
            AlbumType::BehindScenes => "behind_scenes",
            AlbumType::Covers => "covers",
            AlbumType::Originals => "originals",
            AlbumType::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlbumType::EpPreview => "EP Preview",
            AlbumType::StudioFreestyle => "Studio Freestyle",
            AlbumType::FanCollab => "Fan Collab",
            AlbumType::BehindScenes => "Behind the Scenes",
            AlbumType::Covers => "Covers",
            AlbumType::Originals => "Originals",
            AlbumType::Custom => "Custom",
        }
    }
}

/// 专辑（`Album` 表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub album_type: AlbumType,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// 派生字段，列表接口单独统计
    #[serde(default)]
    pub video_count: u64,
    #[serde(default, rename = "User", deserialize_with = "deserialize_embedded")]
    pub owner: Option<User>,
}

fn default_public() -> bool {
    true
}

/// 新建专辑参数
#[derive(Debug, Clone)]
pub struct NewAlbum {
    pub title: String,
    pub description: Option<String>,
    pub album_type: AlbumType,
}

/// 专辑详情：专辑 + 已签名的视频
#[derive(Debug, Clone)]
pub struct AlbumDetails {
    pub album: Album,
    pub videos: Vec<FeedItem>,
}
