//! 关注关系 HTTP API

use crate::social::graph::models::FollowEdge;
use crate::social::rest::{Query, RestBackend};
use crate::social::types::decode_rows;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) const FOLLOWER_TABLE: &str = "Follower";

/// 关注关系 API
pub struct FollowerApi {
    backend: Arc<dyn RestBackend>,
}

impl FollowerApi {
    pub fn new(backend: Arc<dyn RestBackend>) -> Self {
        Self { backend }
    }

    /// 拉取 `user_id` 关注的人
    pub async fn get_following(&self, user_id: &str) -> Result<Vec<FollowEdge>> {
        let query = Query::new().eq("user_id", user_id);
        let rows = self
            .backend
            .select(FOLLOWER_TABLE, &query)
            .await
            .context("拉取关注列表失败")?;
        let edges: Vec<FollowEdge> = decode_rows(FOLLOWER_TABLE, rows);
        debug!("[GraphAPI] 用户 {} 关注 {} 人", user_id, edges.len());
        Ok(edges)
    }

    /// 拉取关注 `user_id` 的人
    pub async fn get_followers(&self, user_id: &str) -> Result<Vec<FollowEdge>> {
        let query = Query::new().eq("follower_user_id", user_id);
        let rows = self
            .backend
            .select(FOLLOWER_TABLE, &query)
            .await
            .context("拉取粉丝列表失败")?;
        let edges: Vec<FollowEdge> = decode_rows(FOLLOWER_TABLE, rows);
        debug!("[GraphAPI] 用户 {} 有 {} 个粉丝", user_id, edges.len());
        Ok(edges)
    }

    /// 新增关注边
    pub async fn follow(&self, user_id: &str, target_user_id: &str) -> Result<()> {
        info!("[GraphAPI] ➕ {} 关注 {}", user_id, target_user_id);
        self.backend
            .insert(
                FOLLOWER_TABLE,
                serde_json::json!({
                    "user_id": user_id,
                    "follower_user_id": target_user_id,
                }),
            )
            .await
            .context("关注失败")?;
        Ok(())
    }

    /// 删除关注边
    pub async fn unfollow(&self, user_id: &str, target_user_id: &str) -> Result<()> {
        info!("[GraphAPI] ➖ {} 取消关注 {}", user_id, target_user_id);
        let query = Query::new()
            .eq("user_id", user_id)
            .eq("follower_user_id", target_user_id);
        self.backend
            .delete(FOLLOWER_TABLE, &query)
            .await
            .context("取消关注失败")?;
        Ok(())
    }
}
