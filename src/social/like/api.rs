//! 点赞 HTTP API

use crate::social::like::models::LikeEdge;
use crate::social::rest::{Query, RestBackend};
use crate::social::types::decode_rows;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) const LIKE_TABLE: &str = "Like";

pub struct LikeApi {
    backend: Arc<dyn RestBackend>,
}

impl LikeApi {
    pub fn new(backend: Arc<dyn RestBackend>) -> Self {
        Self { backend }
    }

    /// 拉取用户的全部点赞
    pub async fn get_likes(&self, user_id: &str) -> Result<Vec<LikeEdge>> {
        let query = Query::new().eq("user_id", user_id);
        let rows = self
            .backend
            .select(LIKE_TABLE, &query)
            .await
            .context("拉取点赞列表失败")?;
        let likes: Vec<LikeEdge> = decode_rows(LIKE_TABLE, rows);
        debug!("[LikeAPI] 用户 {} 共 {} 个点赞", user_id, likes.len());
        Ok(likes)
    }

    pub async fn like(&self, user_id: &str, video_id: &str, video_user_id: &str) -> Result<()> {
        info!("[LikeAPI] ❤️ {} 点赞视频 {}", user_id, video_id);
        self.backend
            .insert(
                LIKE_TABLE,
                serde_json::json!({
                    "user_id": user_id,
                    "video_id": video_id,
                    "video_user_id": video_user_id,
                }),
            )
            .await
            .context("点赞失败")?;
        Ok(())
    }

    pub async fn unlike(&self, user_id: &str, video_id: &str) -> Result<()> {
        info!("[LikeAPI] 💔 {} 取消点赞视频 {}", user_id, video_id);
        let query = Query::new()
            .eq("user_id", user_id)
            .eq("video_id", video_id);
        self.backend
            .delete(LIKE_TABLE, &query)
            .await
            .context("取消点赞失败")?;
        Ok(())
    }
}
