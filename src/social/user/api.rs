//! 用户资料 API

use crate::social::error::BackendError;
use crate::social::rest::{Query, RestBackend};
use crate::social::types::{decode_row, decode_rows};
use crate::social::user::models::User;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) const USER_TABLE: &str = "User";

pub struct UserApi {
    backend: Arc<dyn RestBackend>,
}

impl UserApi {
    pub fn new(backend: Arc<dyn RestBackend>) -> Self {
        Self { backend }
    }

    /// 按 id 查询用户资料，不存在时返回 `None`
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        debug!("[UserAPI] 查询用户资料: {}", user_id);
        let query = Query::new().eq("id", user_id);
        match self.backend.select_single(USER_TABLE, &query).await {
            Ok(row) => Ok(Some(decode_row(USER_TABLE, row)?)),
            Err(BackendError::NotFound) => {
                info!("[UserAPI] 用户 {} 不存在（新注册用户可能尚未建档）", user_id);
                Ok(None)
            }
            Err(e) => Err(e).context(format!("查询用户资料失败: {}", user_id)),
        }
    }

    /// 按用户名模糊搜索（不区分大小写）
    pub async fn search_users(&self, text: &str, limit: usize) -> Result<Vec<User>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new().ilike("username", text).limit(limit);
        let rows = self
            .backend
            .select(USER_TABLE, &query)
            .await
            .context("搜索用户失败")?;
        let users: Vec<User> = decode_rows(USER_TABLE, rows);
        debug!("[UserAPI] 搜索 \"{}\" 命中 {} 个用户", text, users.len());
        Ok(users)
    }

    /// 更新头像
    pub async fn update_avatar(&self, user_id: &str, avatar_url: &str) -> Result<()> {
        let query = Query::new().eq("id", user_id);
        self.backend
            .update(
                USER_TABLE,
                &query,
                serde_json::json!({ "avatar_url": avatar_url }),
            )
            .await
            .context("更新头像失败")?;
        Ok(())
    }
}
