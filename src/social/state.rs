//! 应用状态
//!
//! 当前用户、关注/粉丝边、点赞账本和互关好友集合保存在不可变快照中，
//! 每次更新生成新的快照。缓存的每类关系在发起拉取前先领取一个世代号，
//! 只有比已提交世代更新、且身份未变化的结果才能提交。

use crate::social::graph::derive::derive_friends;
use crate::social::graph::models::FollowEdge;
use crate::social::like::models::LikeEdge;
use crate::social::user::models::User;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// 不可变状态快照
#[derive(Debug, Clone, Default)]
pub struct AppSnapshot {
    /// 身份世代，每次切换身份递增
    pub epoch: u64,
    /// 当前会话的用户 id
    pub user_id: Option<String>,
    /// 当前用户资料（资料不存在时为空，但会话仍然有效）
    pub user: Option<User>,
    pub following: Arc<Vec<FollowEdge>>,
    pub followers: Arc<Vec<FollowEdge>>,
    pub likes: Arc<Vec<LikeEdge>>,
    pub friends: Arc<HashSet<String>>,
}

impl AppSnapshot {
    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// 是否已关注 `target_user_id`
    pub fn is_following(&self, target_user_id: &str) -> bool {
        self.following.iter().any(|e| e.target() == target_user_id)
    }

    /// 是否已点赞 `video_id`
    pub fn has_liked(&self, video_id: &str) -> bool {
        self.likes.iter().any(|l| l.video_id == video_id)
    }

    /// 点赞账本中作者为 `author_id` 的点赞数
    pub fn likes_for_author(&self, author_id: &str) -> usize {
        self.likes
            .iter()
            .filter(|l| l.video_user_id == author_id)
            .count()
    }

    pub fn is_friend(&self, user_id: &str) -> bool {
        self.friends.contains(user_id)
    }

    /// 排序后的好友 id 列表
    pub fn friend_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.friends.iter().cloned().collect();
        ids.sort();
        ids
    }

    fn with_following(&self, edges: Vec<FollowEdge>) -> Self {
        let friends = derive_friends(&edges, &self.followers);
        Self {
            following: Arc::new(edges),
            friends: Arc::new(friends),
            ..self.clone()
        }
    }

    fn with_followers(&self, edges: Vec<FollowEdge>) -> Self {
        let friends = derive_friends(&self.following, &edges);
        Self {
            followers: Arc::new(edges),
            friends: Arc::new(friends),
            ..self.clone()
        }
    }

    fn with_likes(&self, likes: Vec<LikeEdge>) -> Self {
        Self {
            likes: Arc::new(likes),
            ..self.clone()
        }
    }
}

/// 缓存的关系类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Following,
    Followers,
    Likes,
}

impl Relation {
    fn slot(self) -> usize {
        match self {
            Relation::Following => 0,
            Relation::Followers => 1,
            Relation::Likes => 2,
        }
    }
}

/// 拉取前领取的世代票据
#[derive(Debug, Clone)]
pub struct Ticket {
    pub relation: Relation,
    pub epoch: u64,
    pub generation: u64,
    pub user_id: String,
}

/// 一次提交的数据
pub enum RelationData {
    Edges(Vec<FollowEdge>),
    Likes(Vec<LikeEdge>),
}

/// 一次成功提交：被替换的快照和新快照
#[derive(Debug, Clone)]
pub struct Committed {
    pub previous: Arc<AppSnapshot>,
    pub current: Arc<AppSnapshot>,
}

struct StoreInner {
    snapshot: Arc<AppSnapshot>,
    issued: [u64; 3],
    committed: [u64; 3],
}

/// 状态仓库，由客户端持有并注入到各个功能
pub struct StateStore {
    inner: RwLock<StoreInner>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                snapshot: Arc::new(AppSnapshot::default()),
                issued: [0; 3],
                committed: [0; 3],
            }),
        }
    }

    /// 当前快照
    pub fn snapshot(&self) -> Arc<AppSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    /// 切换到新身份：清空所有缓存并递增世代，之前发出的票据全部失效
    pub fn begin_session(&self, user_id: &str) -> Arc<AppSnapshot> {
        self.reset(Some(user_id.to_string()))
    }

    /// 退出登录：清空所有缓存
    pub fn clear(&self) -> Arc<AppSnapshot> {
        self.reset(None)
    }

    fn reset(&self, user_id: Option<String>) -> Arc<AppSnapshot> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(AppSnapshot {
            epoch: inner.snapshot.epoch + 1,
            user_id,
            ..AppSnapshot::default()
        });
        inner.snapshot = next.clone();
        inner.committed = inner.issued;
        debug!("[State] 身份切换，世代: {}", next.epoch);
        next
    }

    /// 写入当前用户资料，身份已变化时丢弃
    pub fn set_user(&self, epoch: u64, user: Option<User>) -> Option<Arc<AppSnapshot>> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.snapshot.epoch != epoch {
            debug!("[State] 丢弃过期的用户资料，世代 {} != {}", epoch, inner.snapshot.epoch);
            return None;
        }
        let next = Arc::new(AppSnapshot {
            user,
            ..(*inner.snapshot).clone()
        });
        inner.snapshot = next.clone();
        Some(next)
    }

    /// 为一次拉取领取票据；没有会话时返回 `None`
    pub fn ticket(&self, relation: Relation) -> Option<Ticket> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let user_id = inner.snapshot.user_id.clone()?;
        let slot = relation.slot();
        inner.issued[slot] += 1;
        Some(Ticket {
            relation,
            epoch: inner.snapshot.epoch,
            generation: inner.issued[slot],
            user_id,
        })
    }

    /// 提交拉取结果
    ///
    /// 票据所属身份已失效，或同类关系已有更新的结果提交时，丢弃并返回 `None`。
    /// 成功时同时返回在同一把锁内被替换的快照
    pub fn commit(&self, ticket: &Ticket, data: RelationData) -> Option<Committed> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = ticket.relation.slot();
        if ticket.epoch != inner.snapshot.epoch {
            debug!(
                "[State] 丢弃 {:?} 结果：身份已切换（票据世代 {}，当前 {}）",
                ticket.relation, ticket.epoch, inner.snapshot.epoch
            );
            return None;
        }
        if ticket.generation <= inner.committed[slot] {
            debug!(
                "[State] 丢弃 {:?} 结果：票据 {} 已被 {} 取代",
                ticket.relation, ticket.generation, inner.committed[slot]
            );
            return None;
        }

        let current = inner.snapshot.clone();
        let next = match (ticket.relation, data) {
            (Relation::Following, RelationData::Edges(edges)) => current.with_following(edges),
            (Relation::Followers, RelationData::Edges(edges)) => current.with_followers(edges),
            (Relation::Likes, RelationData::Likes(likes)) => current.with_likes(likes),
            (relation, _) => {
                debug!("[State] {:?} 提交的数据类型不匹配，已忽略", relation);
                return None;
            }
        };
        let next = Arc::new(next);
        inner.committed[slot] = ticket.generation;
        inner.snapshot = next.clone();
        Some(Committed {
            previous: current,
            current: next,
        })
    }
}
