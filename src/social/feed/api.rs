//! 视频元数据 HTTP API

use crate::social::error::BackendError;
use crate::social::feed::models::Video;
use crate::social::rest::{Query, RestBackend};
use crate::social::types::{decode_row, decode_rows};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) const VIDEO_TABLE: &str = "Video";

/// 带作者信息的查询列
const WITH_AUTHOR: &str = "*, User(*)";

pub struct VideoApi {
    backend: Arc<dyn RestBackend>,
}

impl VideoApi {
    pub fn new(backend: Arc<dyn RestBackend>) -> Self {
        Self { backend }
    }

    async fn list(&self, query: Query, what: &str) -> Result<Vec<Video>> {
        let rows = self
            .backend
            .select(VIDEO_TABLE, &query)
            .await
            .context(format!("拉取{}失败", what))?;
        let videos: Vec<Video> = decode_rows(VIDEO_TABLE, rows);
        debug!("[VideoAPI] {}共 {} 条", what, videos.len());
        Ok(videos)
    }

    /// 全部视频，按发布时间倒序
    pub async fn list_all(&self) -> Result<Vec<Video>> {
        let query = Query::new()
            .select(WITH_AUTHOR)
            .order("created_at", false);
        self.list(query, "推荐视频").await
    }

    /// 作者在白名单内的视频，按发布时间倒序
    pub async fn list_by_authors(&self, author_ids: &[String]) -> Result<Vec<Video>> {
        let query = Query::new()
            .select(WITH_AUTHOR)
            .in_list("user_id", author_ids)
            .order("created_at", false);
        self.list(query, "好友视频").await
    }

    /// 某个用户发布的视频
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Video>> {
        let query = Query::new()
            .eq("user_id", user_id)
            .order("created_at", false);
        self.list(query, "用户视频").await
    }

    /// 专辑中的视频
    pub async fn list_by_album(&self, album_id: &str) -> Result<Vec<Video>> {
        let query = Query::new()
            .select(WITH_AUTHOR)
            .eq("album_id", album_id)
            .order("created_at", false);
        self.list(query, "专辑视频").await
    }

    /// 查询单个视频，不存在时返回 `None`
    pub async fn get_video(&self, video_id: &str) -> Result<Option<Video>> {
        let query = Query::new().select(WITH_AUTHOR).eq("id", video_id);
        match self.backend.select_single(VIDEO_TABLE, &query).await {
            Ok(row) => Ok(Some(decode_row(VIDEO_TABLE, row)?)),
            Err(BackendError::NotFound) => Ok(None),
            Err(e) => Err(e).context(format!("查询视频失败: {}", video_id)),
        }
    }

    /// 专辑内视频数量
    pub async fn count_by_album(&self, album_id: &str) -> Result<u64> {
        let query = Query::new().eq("album_id", album_id);
        self.backend
            .count(VIDEO_TABLE, &query)
            .await
            .context("统计专辑视频数失败")
    }

    /// 新增视频记录
    pub async fn insert_video(&self, user_id: &str, uri: &str, title: &str) -> Result<()> {
        info!("[VideoAPI] 🎬 新增视频记录: {} ({})", uri, title);
        self.backend
            .insert(
                VIDEO_TABLE,
                serde_json::json!({
                    "title": title,
                    "uri": uri,
                    "user_id": user_id,
                }),
            )
            .await
            .context("新增视频记录失败")?;
        Ok(())
    }

    /// 把 `user_id` 自己的一批视频归入专辑，别人的视频不受影响
    pub async fn assign_album(
        &self,
        user_id: &str,
        video_ids: &[String],
        album_id: &str,
    ) -> Result<()> {
        if video_ids.is_empty() {
            return Ok(());
        }
        info!(
            "[VideoAPI] 📁 {} 个视频归入专辑 {}",
            video_ids.len(),
            album_id
        );
        let query = Query::new()
            .in_list("id", video_ids)
            .eq("user_id", user_id);
        self.backend
            .update(
                VIDEO_TABLE,
                &query,
                serde_json::json!({ "album_id": album_id }),
            )
            .await
            .context("视频归入专辑失败")?;
        Ok(())
    }
}
