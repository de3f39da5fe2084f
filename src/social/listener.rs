//! 社交状态监听器回调接口

use crate::social::graph::models::FollowEdge;
use crate::social::like::models::LikeEdge;
use crate::social::user::models::User;
use async_trait::async_trait;
use std::collections::HashSet;

/// 状态变更回调，只在结果实际提交到状态仓库后触发
#[async_trait]
pub trait SocialListener: Send + Sync {
    /// 身份变化（登录、切换用户、退出），退出时为 `None`
    async fn on_identity_changed(&self, user_id: Option<String>, user: Option<User>);

    /// 关注列表变化
    async fn on_following_changed(&self, following: Vec<FollowEdge>);

    /// 粉丝列表变化
    async fn on_followers_changed(&self, followers: Vec<FollowEdge>);

    /// 互关好友集合重新计算
    async fn on_friends_changed(&self, friends: HashSet<String>);

    /// 点赞账本变化
    async fn on_likes_changed(&self, likes: Vec<LikeEdge>);
}

/// 默认空实现（无操作）
pub struct EmptySocialListener;

#[async_trait]
impl SocialListener for EmptySocialListener {
    async fn on_identity_changed(&self, _user_id: Option<String>, _user: Option<User>) {}
    async fn on_following_changed(&self, _following: Vec<FollowEdge>) {}
    async fn on_followers_changed(&self, _followers: Vec<FollowEdge>) {}
    async fn on_friends_changed(&self, _friends: HashSet<String>) {}
    async fn on_likes_changed(&self, _likes: Vec<LikeEdge>) {}
}
