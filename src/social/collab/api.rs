//! 合作申请 HTTP API

use crate::social::collab::models::{
    CollaborationRequest, NewCollaborationRequest, RequestDirection, RequestStatus,
};
use crate::social::error::BackendError;
use crate::social::rest::{Query, RestBackend};
use crate::social::types::decode_rows;
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) const COLLAB_TABLE: &str = "CollaborationRequest";

/// 列表查询附带专辑、视频和三方用户
const WITH_RELATED: &str = "*, Album(*), Video(*), \
    Requester:requester_id(id, username), \
    AlbumOwner:album_owner_id(id, username), \
    VideoOwner:video_owner_id(id, username)";

pub struct CollaborationApi {
    backend: Arc<dyn RestBackend>,
}

impl CollaborationApi {
    pub fn new(backend: Arc<dyn RestBackend>) -> Self {
        Self { backend }
    }

    /// 收到或发出的申请（最新在前），附带关联记录；表、字段或关联关系缺失时返回空列表
    pub async fn list_requests(
        &self,
        user_id: &str,
        direction: RequestDirection,
    ) -> Result<Vec<CollaborationRequest>> {
        let query = Query::new()
            .select(WITH_RELATED)
            .eq(direction.column(), user_id)
            .order("created_at", false);
        match self.backend.select(COLLAB_TABLE, &query).await {
            Ok(rows) => Ok(decode_rows(COLLAB_TABLE, rows)),
            Err(e @ BackendError::SchemaMissing { .. }) => {
                warn!("[CollabAPI] 合作申请表结构未就绪: {}", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e).context("拉取合作申请失败"),
        }
    }

    /// 发起申请：同一专辑 + 视频已有申请时拒绝
    pub async fn create_request(
        &self,
        requester_id: &str,
        request: &NewCollaborationRequest,
    ) -> Result<()> {
        let query = Query::new()
            .eq("album_id", request.album_id.clone())
            .eq("video_id", request.video_id.clone())
            .limit(1);
        match self.backend.select(COLLAB_TABLE, &query).await {
            Ok(rows) if !rows.is_empty() => bail!("已经申请过把该视频加入这个专辑"),
            Ok(_) => {}
            Err(e @ BackendError::SchemaMissing { .. }) => {
                return Err(e).context("检查已有合作申请失败");
            }
            // 其他检查错误只记录日志，继续尝试创建
            Err(e) => warn!("[CollabAPI] 检查已有申请失败: {}", e),
        }

        let message = request
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());
        info!(
            "[CollabAPI] 🤝 {} 申请把视频 {} 加入专辑 {}",
            requester_id, request.video_id, request.album_id
        );
        self.backend
            .insert(
                COLLAB_TABLE,
                serde_json::json!({
                    "album_id": request.album_id,
                    "video_id": request.video_id,
                    "requester_id": requester_id,
                    "album_owner_id": requester_id,
                    "video_owner_id": request.video_owner_id,
                    "message": message,
                    "status": RequestStatus::Pending.as_str(),
                }),
            )
            .await
            .context("发起合作申请失败")?;
        Ok(())
    }

    /// 审批申请
    pub async fn set_status(&self, request_id: &str, status: RequestStatus) -> Result<()> {
        info!("[CollabAPI] 申请 {} -> {}", request_id, status.as_str());
        let query = Query::new().eq("id", request_id);
        self.backend
            .update(
                COLLAB_TABLE,
                &query,
                serde_json::json!({ "status": status.as_str() }),
            )
            .await
            .context("更新合作申请状态失败")?;
        Ok(())
    }
}
