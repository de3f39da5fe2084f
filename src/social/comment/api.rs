//! 评论 HTTP API

use crate::social::comment::models::Comment;
use crate::social::rest::{Query, RestBackend};
use crate::social::types::decode_rows;
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::info;

pub(crate) const COMMENT_TABLE: &str = "Comment";

pub struct CommentApi {
    backend: Arc<dyn RestBackend>,
}

impl CommentApi {
    pub fn new(backend: Arc<dyn RestBackend>) -> Self {
        Self { backend }
    }

    /// 视频下的评论，最新的在前
    pub async fn list_comments(&self, video_id: &str) -> Result<Vec<Comment>> {
        let query = Query::new()
            .select("*, User(*)")
            .eq("video_id", video_id)
            .order("created_at", false);
        let rows = self
            .backend
            .select(COMMENT_TABLE, &query)
            .await
            .context("拉取评论失败")?;
        Ok(decode_rows(COMMENT_TABLE, rows))
    }

    /// 发表评论后重新拉取评论列表
    pub async fn add_comment(
        &self,
        user_id: &str,
        video_id: &str,
        text: &str,
    ) -> Result<Vec<Comment>> {
        let text = text.trim();
        if text.is_empty() {
            bail!("评论内容不能为空");
        }
        info!("[CommentAPI] 💬 {} 评论视频 {}", user_id, video_id);
        self.backend
            .insert(
                COMMENT_TABLE,
                serde_json::json!({
                    "user_id": user_id,
                    "video_id": video_id,
                    "text": text,
                }),
            )
            .await
            .context("发表评论失败")?;
        self.list_comments(video_id).await
    }
}
