//! 合作申请模块
//!
//! 专辑拥有者申请把别人的视频加入自己的专辑，视频作者审批

pub mod api;
pub mod models;

pub use api::CollaborationApi;
pub use models::{CollaborationRequest, NewCollaborationRequest, RequestDirection, RequestStatus};
