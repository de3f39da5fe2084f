use crate::social::graph::models::FollowEdge;
use std::collections::HashSet;

/// 推导互关好友
///
/// `following` 是当前用户关注的边，`followers` 是关注当前用户的边。
/// 结果为 `following` 中被关注者与 `followers` 中关注者的交集。
/// 参数不可互换。每次都全量计算。
pub fn derive_friends(following: &[FollowEdge], followers: &[FollowEdge]) -> HashSet<String> {
    if following.is_empty() || followers.is_empty() {
        return HashSet::new();
    }
    let follower_sources: HashSet<&str> = followers.iter().map(FollowEdge::source).collect();
    following
        .iter()
        .map(FollowEdge::target)
        .filter(|id| follower_sources.contains(id))
        .map(str::to_string)
        .collect()
}
