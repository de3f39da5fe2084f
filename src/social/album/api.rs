//! 专辑 HTTP API

use crate::social::album::models::{Album, AlbumType, NewAlbum};
use crate::social::error::{is_setup_required, BackendError};
use crate::social::feed::api::VIDEO_TABLE;
use crate::social::rest::{Query, RestBackend};
use crate::social::types::{decode_row, decode_rows};
use anyhow::{bail, Context, Result};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) const ALBUM_TABLE: &str = "Album";

pub struct AlbumApi {
    backend: Arc<dyn RestBackend>,
}

impl AlbumApi {
    pub fn new(backend: Arc<dyn RestBackend>) -> Self {
        Self { backend }
    }

    async fn select_albums(&self, query: Query) -> Result<Vec<Album>> {
        match self.backend.select(ALBUM_TABLE, &query).await {
            Ok(rows) => Ok(decode_rows(ALBUM_TABLE, rows)),
            Err(e @ BackendError::SchemaMissing { .. }) => {
                warn!("[AlbumAPI] Album 表不存在，请先执行数据库建表脚本: {}", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e).context("拉取专辑失败"),
        }
    }

    /// 用户自己的专辑（最新在前），附带每个专辑的视频数
    ///
    /// 表不存在时返回空列表；单个专辑计数失败时记为 0
    pub async fn list_albums(&self, user_id: &str) -> Result<Vec<Album>> {
        let query = Query::new()
            .eq("user_id", user_id)
            .order("created_at", false);
        let albums = self.select_albums(query).await?;

        let counts = join_all(albums.iter().map(|album| {
            let query = Query::new().eq("album_id", album.id.clone());
            let backend = self.backend.clone();
            async move { backend.count(VIDEO_TABLE, &query).await }
        }))
        .await;

        Ok(albums
            .into_iter()
            .zip(counts)
            .map(|(mut album, count)| {
                album.video_count = count.unwrap_or_else(|e| {
                    warn!("[AlbumAPI] 统计专辑 {} 视频数失败: {}", album.id, e);
                    0
                });
                album
            })
            .collect())
    }

    /// 某用户公开的粉丝合作专辑
    pub async fn list_fan_collab_albums(&self, user_id: &str) -> Result<Vec<Album>> {
        let query = Query::new()
            .select("*, User(*)")
            .eq("user_id", user_id)
            .eq("album_type", AlbumType::FanCollab.as_str())
            .eq("is_public", "true")
            .order("created_at", false);
        self.select_albums(query).await
    }

    /// 查询单个专辑
    pub async fn get_album(&self, album_id: &str) -> Result<Option<Album>> {
        let query = Query::new().select("*, User(*)").eq("id", album_id);
        match self.backend.select_single(ALBUM_TABLE, &query).await {
            Ok(row) => Ok(Some(decode_row(ALBUM_TABLE, row)?)),
            Err(BackendError::NotFound) => Ok(None),
            Err(e) => Err(e).context(format!("查询专辑失败: {}", album_id)),
        }
    }

    /// 新建公开专辑；表不存在时返回"需要建表"的错误
    pub async fn create_album(&self, user_id: &str, album: &NewAlbum) -> Result<()> {
        let title = album.title.trim();
        if title.is_empty() {
            bail!("专辑标题不能为空");
        }
        let description = album
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        info!("[AlbumAPI] 📁 新建专辑 \"{}\" ({})", title, album.album_type.as_str());
        let result = self
            .backend
            .insert(
                ALBUM_TABLE,
                serde_json::json!({
                    "title": title,
                    "description": description,
                    "album_type": album.album_type.as_str(),
                    "user_id": user_id,
                    "is_public": true,
                }),
            )
            .await
            .context("新建专辑失败");
        if let Err(e) = &result {
            if is_setup_required(e) {
                warn!("[AlbumAPI] 新建专辑失败：Album 表尚未创建");
            }
        }
        result
    }
}
