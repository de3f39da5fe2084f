//! 社交视频客户端核心实现
//!
//! 持有状态仓库和各功能 API，负责把身份变化、关注/点赞切换和视频流组装串起来。

use crate::social::album::{Album, AlbumApi, AlbumDetails, NewAlbum};
use crate::social::collab::{
    CollaborationApi, CollaborationRequest, NewCollaborationRequest, RequestDirection,
    RequestStatus,
};
use crate::social::comment::{Comment, CommentApi};
use crate::social::feed::{FeedComposer, FeedItem, Video, VideoApi, VisibilityTracker};
use crate::social::graph::FollowerApi;
use crate::social::like::LikeApi;
use crate::social::listener::{EmptySocialListener, SocialListener};
use crate::social::rest::{PostgrestClient, RestBackend};
use crate::social::serialization::generate_storage_key;
use crate::social::state::{AppSnapshot, Committed, Relation, RelationData, StateStore};
use crate::social::storage::{ObjectStorage, StorageClient};
use crate::social::user::{ProfileSummary, User, UserApi};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 视频流签名有效期：7 天
pub const FEED_URL_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);
/// 单视频签名有效期：1 小时
pub const SINGLE_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// 托管后端项目地址，例如 `https://xyz.supabase.co`
    pub project_url: String,
    /// 项目公开 key（`apikey` 头）
    pub anon_key: String,
    /// 登录后拿到的访问 token
    pub access_token: String,
    /// 视频所在的存储桶
    pub video_bucket: String,
    pub feed_url_ttl: Duration,
    pub single_url_ttl: Duration,
    /// 判定条目可见的最小比例
    pub visibility_threshold: f32,
    /// 用户搜索返回条数上限
    pub search_limit: usize,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new(project_url: String, anon_key: String, access_token: String) -> Self {
        Self {
            project_url,
            anon_key,
            access_token,
            video_bucket: "videos".to_string(),
            feed_url_ttl: FEED_URL_TTL,
            single_url_ttl: SINGLE_URL_TTL,
            visibility_threshold: 0.5,
            search_limit: 20,
        }
    }
}

/// 社交视频客户端
pub struct SocialClient {
    pub(crate) config: ClientConfig,
    state: Arc<StateStore>,
    listener: Arc<dyn SocialListener>,
    storage: Arc<dyn ObjectStorage>,
    users: UserApi,
    graph: FollowerApi,
    likes: LikeApi,
    videos: VideoApi,
    comments: CommentApi,
    albums: AlbumApi,
    collabs: CollaborationApi,
    composer: FeedComposer,
}

impl SocialClient {
    /// 使用 HTTP 后端创建客户端
    pub fn new(config: ClientConfig) -> Result<Self> {
        // 创建带认证头的 HTTP 客户端（apikey 和 Bearer token 通过 default_headers 自动添加）
        let http_client = reqwest::ClientBuilder::new()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::HeaderName::from_static("apikey"),
                    reqwest::header::HeaderValue::from_str(&config.anon_key)
                        .context("无效的 apikey")?,
                );
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    reqwest::header::HeaderValue::from_str(&format!(
                        "Bearer {}",
                        config.access_token
                    ))
                    .context("无效的 token")?,
                );
                headers
            })
            .build()
            .context("创建 HTTP 客户端失败")?;

        let rest = Arc::new(PostgrestClient::new(http_client.clone(), &config.project_url));
        let storage = Arc::new(StorageClient::new(http_client, &config.project_url));
        info!("[Client] 创建客户端，后端地址: {}", config.project_url);
        Ok(Self::with_backend(config, rest, storage))
    }

    /// 使用指定的后端实现创建客户端
    pub fn with_backend(
        config: ClientConfig,
        rest: Arc<dyn RestBackend>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let composer = FeedComposer::new(
            storage.clone(),
            config.video_bucket.clone(),
            config.feed_url_ttl,
            config.single_url_ttl,
        );
        Self {
            state: Arc::new(StateStore::new()),
            listener: Arc::new(EmptySocialListener),
            storage,
            users: UserApi::new(rest.clone()),
            graph: FollowerApi::new(rest.clone()),
            likes: LikeApi::new(rest.clone()),
            videos: VideoApi::new(rest.clone()),
            comments: CommentApi::new(rest.clone()),
            albums: AlbumApi::new(rest.clone()),
            collabs: CollaborationApi::new(rest),
            composer,
            config,
        }
    }

    /// 注册监听器
    pub fn set_listener(&mut self, listener: Arc<dyn SocialListener>) {
        self.listener = listener;
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> Arc<AppSnapshot> {
        self.state.snapshot()
    }

    /// 共享的状态仓库，供界面层注入
    pub fn state(&self) -> Arc<StateStore> {
        self.state.clone()
    }

    fn require_user_id(&self) -> Result<String> {
        self.state
            .snapshot()
            .user_id
            .clone()
            .ok_or_else(|| anyhow!("当前没有登录用户"))
    }

    // ========== 身份 ==========

    /// 切换到 `user_id` 的会话：拉取资料，然后并行刷新关注、粉丝和点赞
    ///
    /// 资料或任一列表拉取失败只记录日志，对应缓存保持为空
    pub async fn set_session(&self, user_id: &str) -> Arc<AppSnapshot> {
        info!("[Client] 🔐 切换会话，用户ID: {}", user_id);
        let started = self.state.begin_session(user_id);

        let user = match self.users.get_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                error!("[Client] 拉取用户资料失败，继续初始化: {:?}", e);
                None
            }
        };
        if self.state.set_user(started.epoch, user.clone()).is_some() {
            self.listener
                .on_identity_changed(Some(user_id.to_string()), user)
                .await;
        }

        self.refresh_social().await;
        self.state.snapshot()
    }

    /// 退出会话，清空所有缓存
    pub async fn clear_session(&self) {
        info!("[Client] 👋 退出会话");
        self.state.clear();
        self.listener.on_identity_changed(None, None).await;
        self.listener.on_following_changed(Vec::new()).await;
        self.listener.on_followers_changed(Vec::new()).await;
        self.listener.on_friends_changed(Default::default()).await;
        self.listener.on_likes_changed(Vec::new()).await;
    }

    /// 并行刷新关注、粉丝和点赞，失败只记录日志
    pub async fn refresh_social(&self) {
        let (following, followers, likes) = tokio::join!(
            self.refresh_following(),
            self.refresh_followers(),
            self.refresh_likes()
        );
        for (what, result) in [
            ("关注列表", following.map(|_| ())),
            ("粉丝列表", followers.map(|_| ())),
            ("点赞列表", likes.map(|_| ())),
        ] {
            if let Err(e) = result {
                error!("[Client] 刷新{}失败: {:?}", what, e);
            }
        }
    }

    /// 重新拉取当前用户资料
    pub async fn refresh_user(&self) -> Result<Arc<AppSnapshot>> {
        let snapshot = self.state.snapshot();
        let user_id = snapshot
            .user_id
            .clone()
            .ok_or_else(|| anyhow!("当前没有登录用户"))?;
        let user = self.users.get_user(&user_id).await?;
        match self.state.set_user(snapshot.epoch, user.clone()) {
            Some(next) => {
                self.listener.on_identity_changed(Some(user_id), user).await;
                Ok(next)
            }
            None => Ok(self.state.snapshot()),
        }
    }

    // ========== 关注关系 ==========

    /// 拉取并提交关注列表；被更新的拉取取代时返回当前快照
    pub async fn refresh_following(&self) -> Result<Arc<AppSnapshot>> {
        let ticket = self
            .state
            .ticket(Relation::Following)
            .ok_or_else(|| anyhow!("当前没有登录用户"))?;
        let edges = self.graph.get_following(&ticket.user_id).await?;
        match self.state.commit(&ticket, RelationData::Edges(edges)) {
            Some(Committed { previous, current }) => {
                self.listener
                    .on_following_changed(current.following.as_ref().clone())
                    .await;
                self.notify_friends_if_changed(&previous, &current).await;
                Ok(current)
            }
            None => Ok(self.state.snapshot()),
        }
    }

    /// 拉取并提交粉丝列表
    pub async fn refresh_followers(&self) -> Result<Arc<AppSnapshot>> {
        let ticket = self
            .state
            .ticket(Relation::Followers)
            .ok_or_else(|| anyhow!("当前没有登录用户"))?;
        let edges = self.graph.get_followers(&ticket.user_id).await?;
        match self.state.commit(&ticket, RelationData::Edges(edges)) {
            Some(Committed { previous, current }) => {
                self.listener
                    .on_followers_changed(current.followers.as_ref().clone())
                    .await;
                self.notify_friends_if_changed(&previous, &current).await;
                Ok(current)
            }
            None => Ok(self.state.snapshot()),
        }
    }

    async fn notify_friends_if_changed(&self, before: &AppSnapshot, after: &AppSnapshot) {
        if before.friends != after.friends {
            debug!(
                "[Client] 好友集合变化: {} -> {}",
                before.friends.len(),
                after.friends.len()
            );
            self.listener
                .on_friends_changed(after.friends.as_ref().clone())
                .await;
        }
    }

    /// 关注或取消关注，然后重新拉取关注列表
    ///
    /// 请求失败时记录日志并返回错误，本地缓存保持不变
    pub async fn set_follow(&self, target_user_id: &str, follow: bool) -> Result<Arc<AppSnapshot>> {
        let user_id = self.require_user_id()?;
        let result = if follow {
            self.graph.follow(&user_id, target_user_id).await
        } else {
            self.graph.unfollow(&user_id, target_user_id).await
        };
        if let Err(e) = result {
            error!(
                "[Client] {}失败，缓存保持不变: {:?}",
                if follow { "关注" } else { "取消关注" },
                e
            );
            return Err(e);
        }
        self.refresh_following().await
    }

    /// 按当前缓存状态切换关注
    pub async fn toggle_follow(&self, target_user_id: &str) -> Result<Arc<AppSnapshot>> {
        let following = self.state.snapshot().is_following(target_user_id);
        self.set_follow(target_user_id, !following).await
    }

    // ========== 点赞 ==========

    /// 拉取并提交点赞列表
    pub async fn refresh_likes(&self) -> Result<Arc<AppSnapshot>> {
        let ticket = self
            .state
            .ticket(Relation::Likes)
            .ok_or_else(|| anyhow!("当前没有登录用户"))?;
        let likes = self.likes.get_likes(&ticket.user_id).await?;
        match self.state.commit(&ticket, RelationData::Likes(likes)) {
            Some(Committed { current, .. }) => {
                self.listener
                    .on_likes_changed(current.likes.as_ref().clone())
                    .await;
                Ok(current)
            }
            None => Ok(self.state.snapshot()),
        }
    }

    /// 点赞或取消点赞，然后重新拉取点赞列表
    ///
    /// 请求失败时记录日志并返回错误，本地缓存保持不变
    pub async fn set_like(&self, video: &Video, liked: bool) -> Result<Arc<AppSnapshot>> {
        let user_id = self.require_user_id()?;
        let result = if liked {
            self.likes.like(&user_id, &video.id, &video.user_id).await
        } else {
            self.likes.unlike(&user_id, &video.id).await
        };
        if let Err(e) = result {
            error!(
                "[Client] {}失败，缓存保持不变: {:?}",
                if liked { "点赞" } else { "取消点赞" },
                e
            );
            return Err(e);
        }
        self.refresh_likes().await
    }

    /// 按当前缓存状态切换点赞
    pub async fn toggle_like(&self, video: &Video) -> Result<Arc<AppSnapshot>> {
        let liked = self.state.snapshot().has_liked(&video.id);
        self.set_like(video, !liked).await
    }

    // ========== 视频流 ==========

    /// 推荐流：全部视频，最新在前
    pub async fn for_you_feed(&self) -> Result<Vec<FeedItem>> {
        let videos = self.videos.list_all().await?;
        self.composer.compose(videos).await
    }

    /// 好友流：只包含互关好友发布的视频；没有好友时不发起查询
    pub async fn friends_feed(&self) -> Result<Vec<FeedItem>> {
        let friends = self.state.snapshot().friend_ids();
        if friends.is_empty() {
            debug!("[Client] 没有互关好友，好友流为空");
            return Ok(Vec::new());
        }
        let videos = self.videos.list_by_authors(&friends).await?;
        self.composer.compose(videos).await
    }

    /// 单个视频（1 小时有效的播放地址），不存在时返回 `None`
    pub async fn video(&self, video_id: &str) -> Result<Option<FeedItem>> {
        match self.videos.get_video(video_id).await? {
            Some(video) => Ok(Some(self.composer.resolve_single(video).await)),
            None => Ok(None),
        }
    }

    /// 按配置的阈值创建可见条目跟踪器
    pub fn visibility_tracker(&self) -> VisibilityTracker {
        VisibilityTracker::new(self.config.visibility_threshold)
    }

    /// 上传视频文件并创建视频记录，返回存储路径
    pub async fn upload_video(&self, bytes: Vec<u8>, title: Option<&str>) -> Result<String> {
        let user_id = self.require_user_id()?;
        let key = generate_storage_key(&user_id);
        self.storage
            .upload(&self.config.video_bucket, &key, bytes, "video/mp4")
            .await
            .context("上传视频失败")?;
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("New Video");
        self.videos.insert_video(&user_id, &key, title).await?;
        info!("[Client] ✅ 视频上传完成: {}", key);
        Ok(key)
    }

    // ========== 用户 ==========

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.users.get_user(user_id).await
    }

    pub async fn search_users(&self, text: &str) -> Result<Vec<User>> {
        self.users.search_users(text, self.config.search_limit).await
    }

    /// 更新当前用户头像并刷新资料
    pub async fn update_avatar(&self, avatar_url: &str) -> Result<Arc<AppSnapshot>> {
        let user_id = self.require_user_id()?;
        self.users.update_avatar(&user_id, avatar_url).await?;
        self.refresh_user().await
    }

    /// 个人主页：资料、关注/粉丝、已签名的视频；用户不存在时返回 `None`
    pub async fn profile(&self, user_id: &str) -> Result<Option<ProfileSummary>> {
        let user = match self.users.get_user(user_id).await? {
            Some(user) => user,
            None => return Ok(None),
        };
        let (following, followers, videos) = tokio::join!(
            self.graph.get_following(user_id),
            self.graph.get_followers(user_id),
            self.videos.list_by_user(user_id)
        );
        let following = following.unwrap_or_else(|e| {
            warn!("[Client] 主页关注列表拉取失败: {:?}", e);
            Vec::new()
        });
        let followers = followers.unwrap_or_else(|e| {
            warn!("[Client] 主页粉丝列表拉取失败: {:?}", e);
            Vec::new()
        });
        let videos = self.composer.compose(videos?).await?;

        let snapshot = self.state.snapshot();
        let likes_received = (snapshot.user_id.as_deref() == Some(user_id))
            .then(|| snapshot.likes_for_author(user_id));

        Ok(Some(ProfileSummary {
            user,
            following,
            followers,
            videos,
            likes_received,
        }))
    }

    // ========== 评论 ==========

    pub async fn comments(&self, video_id: &str) -> Result<Vec<Comment>> {
        self.comments.list_comments(video_id).await
    }

    /// 发表评论，返回刷新后的评论列表
    pub async fn add_comment(&self, video_id: &str, text: &str) -> Result<Vec<Comment>> {
        let user_id = self.require_user_id()?;
        self.comments.add_comment(&user_id, video_id, text).await
    }

    // ========== 专辑 ==========

    /// 当前用户的专辑
    pub async fn albums(&self) -> Result<Vec<Album>> {
        let user_id = self.require_user_id()?;
        self.albums.list_albums(&user_id).await
    }

    /// 新建专辑，返回刷新后的专辑列表
    pub async fn create_album(&self, album: &NewAlbum) -> Result<Vec<Album>> {
        let user_id = self.require_user_id()?;
        self.albums.create_album(&user_id, album).await?;
        self.albums.list_albums(&user_id).await
    }

    /// 专辑详情；专辑不存在或表未创建时返回 `None`
    pub async fn album_details(&self, album_id: &str) -> Result<Option<AlbumDetails>> {
        let album = match self.albums.get_album(album_id).await {
            Ok(Some(album)) => album,
            Ok(None) => return Ok(None),
            Err(e) if crate::social::error::is_setup_required(&e) => {
                warn!("[Client] Album 表未创建: {:?}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let videos = match self.videos.list_by_album(album_id).await {
            Ok(videos) => videos,
            // 旧表结构没有 album_id 字段时按空专辑处理
            Err(e) if crate::social::error::is_setup_required(&e) => Vec::new(),
            Err(e) => return Err(e),
        };
        let videos = self.composer.compose(videos).await?;
        Ok(Some(AlbumDetails { album, videos }))
    }

    /// 把当前用户的视频归入专辑
    pub async fn add_videos_to_album(&self, album_id: &str, video_ids: &[String]) -> Result<()> {
        let user_id = self.require_user_id()?;
        self.videos.assign_album(&user_id, video_ids, album_id).await
    }

    /// 某用户公开的粉丝合作专辑
    pub async fn fan_collab_albums(&self, user_id: &str) -> Result<Vec<Album>> {
        self.albums.list_fan_collab_albums(user_id).await
    }

    // ========== 合作申请 ==========

    pub async fn collaboration_requests(
        &self,
        direction: RequestDirection,
    ) -> Result<Vec<CollaborationRequest>> {
        let user_id = self.require_user_id()?;
        self.collabs.list_requests(&user_id, direction).await
    }

    /// 申请把别人的视频加入自己的专辑
    pub async fn request_collaboration(&self, request: &NewCollaborationRequest) -> Result<()> {
        let user_id = self.require_user_id()?;
        self.collabs.create_request(&user_id, request).await
    }

    /// 审批收到的申请，返回刷新后的"收到的申请"列表
    pub async fn respond_collaboration(
        &self,
        request_id: &str,
        approve: bool,
    ) -> Result<Vec<CollaborationRequest>> {
        let user_id = self.require_user_id()?;
        let status = if approve {
            RequestStatus::Approved
        } else {
            RequestStatus::Rejected
        };
        self.collabs.set_status(request_id, status).await?;
        self.collabs
            .list_requests(&user_id, RequestDirection::Received)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::album::AlbumType;
    use crate::social::error::is_setup_required;
    use crate::social::graph::FollowEdge;
    use crate::social::like::LikeEdge;
    use crate::social::mock::{user_row, video_row, MemoryBackend};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::{Mutex, Once};

    static INIT_LOGGER: Once = Once::new();

    fn init_test_logger() {
        INIT_LOGGER.call_once(|| {
            use tracing_subscriber::prelude::*;
            use tracing_subscriber::EnvFilter;

            let filter_layer = EnvFilter::new("info,clipshare_sdk_core_rust=debug");
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_test_writer();

            let _ = tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt_layer)
                .try_init();
        });
    }

    fn follow_row(id: &str, from: &str, to: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "user_id": from,
            "follower_user_id": to,
            "created_at": "2024-02-01T00:00:00+00:00",
        })
    }

    fn client(backend: &Arc<MemoryBackend>) -> SocialClient {
        init_test_logger();
        let config = ClientConfig::new(
            "http://localhost:54321".to_string(),
            "anon".to_string(),
            "token".to_string(),
        );
        SocialClient::with_backend(config, backend.clone(), backend.clone())
    }

    /// me 关注 A/B/C，B/C/D 关注 me
    fn seeded_backend() -> Arc<MemoryBackend> {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            "User",
            vec![
                user_row("me", "me"),
                user_row("A", "alice"),
                user_row("B", "bob"),
                user_row("C", "carol"),
                user_row("D", "dave"),
            ],
        );
        backend.seed(
            "Follower",
            vec![
                follow_row("f1", "me", "A"),
                follow_row("f2", "me", "B"),
                follow_row("f3", "me", "C"),
                follow_row("f4", "B", "me"),
                follow_row("f5", "C", "me"),
                follow_row("f6", "D", "me"),
            ],
        );
        backend.seed(
            "Video",
            vec![
                video_row("1", "A", "a.mp4"),
                video_row("2", "B", "b.mp4"),
                video_row("3", "C", "c-missing.mp4"),
                video_row("4", "D", "d.mp4"),
                video_row("5", "me", "me.mp4"),
            ],
        );
        for key in ["a.mp4", "b.mp4", "d.mp4", "me.mp4"] {
            backend.put_object("videos", key);
        }
        backend
    }

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<String>>,
        friends: Mutex<Option<HashSet<String>>>,
    }

    #[async_trait]
    impl SocialListener for RecordingListener {
        async fn on_identity_changed(&self, user_id: Option<String>, _user: Option<User>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("identity:{:?}", user_id));
        }
        async fn on_following_changed(&self, following: Vec<FollowEdge>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("following:{}", following.len()));
        }
        async fn on_followers_changed(&self, followers: Vec<FollowEdge>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("followers:{}", followers.len()));
        }
        async fn on_friends_changed(&self, friends: HashSet<String>) {
            *self.friends.lock().unwrap() = Some(friends);
        }
        async fn on_likes_changed(&self, likes: Vec<LikeEdge>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("likes:{}", likes.len()));
        }
    }

    #[tokio::test]
    async fn session_populates_graph_and_friends() {
        let backend = seeded_backend();
        let mut client = client(&backend);
        let listener = Arc::new(RecordingListener::default());
        client.set_listener(listener.clone());

        let snap = client.set_session("me").await;
        assert_eq!(snap.user.as_ref().map(|u| u.username.as_str()), Some("me"));
        assert_eq!(snap.following.len(), 3);
        assert_eq!(snap.followers.len(), 3);
        assert_eq!(snap.friend_ids(), vec!["B".to_string(), "C".to_string()]);

        let friends = listener.friends.lock().unwrap().clone().unwrap();
        assert_eq!(friends.len(), 2);
        let events = listener.events.lock().unwrap().clone();
        assert!(events.contains(&"identity:Some(\"me\")".to_string()));
        assert!(events.contains(&"likes:0".to_string()));
    }

    #[tokio::test]
    async fn missing_profile_keeps_session() {
        let backend = seeded_backend();
        let client = client(&backend);
        let snap = client.set_session("ghost").await;
        assert!(snap.is_signed_in());
        assert!(snap.user.is_none());
        assert!(snap.friends.is_empty());
    }

    #[tokio::test]
    async fn like_toggle_round_trip() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("me").await;
        let video = client.video("2").await.unwrap().unwrap().video;

        let snap = client.toggle_like(&video).await.unwrap();
        assert!(snap.has_liked("2"));
        assert_eq!(client.refresh_likes().await.unwrap().likes.len(), 1);
        assert_eq!(snap.likes[0].video_user_id, "B");

        let snap = client.toggle_like(&video).await.unwrap();
        assert!(!snap.has_liked("2"));
        assert!(client.refresh_likes().await.unwrap().likes.is_empty());

        let calls = backend.calls();
        let insert = calls.iter().position(|c| c == "insert Like").unwrap();
        let refetch = calls[insert..].iter().position(|c| c == "select Like");
        assert!(refetch.is_some(), "点赞后必须重新拉取: {:?}", calls);
    }

    #[tokio::test]
    async fn follow_toggle_recomputes_friends() {
        let backend = seeded_backend();
        let mut client = client(&backend);
        let listener = Arc::new(RecordingListener::default());
        client.set_listener(listener.clone());
        client.set_session("me").await;

        let snap = client.set_follow("D", true).await.unwrap();
        assert!(snap.is_friend("D"));
        assert_eq!(snap.friends.len(), 3);
        let notified = listener.friends.lock().unwrap().clone().unwrap();
        assert_eq!(notified.len(), 3);

        let snap = client.toggle_follow("B").await.unwrap();
        assert!(!snap.is_following("B"));
        assert_eq!(snap.friend_ids(), vec!["C".to_string(), "D".to_string()]);
        let notified = listener.friends.lock().unwrap().clone().unwrap();
        assert!(!notified.contains("B"));
    }

    #[tokio::test]
    async fn failed_toggle_leaves_cache_unchanged() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("me").await;
        let before = client.snapshot();

        backend.fail_table("Like", true);
        let video = client.video("1").await.unwrap().unwrap().video;
        assert!(client.set_like(&video, true).await.is_err());
        let after = client.snapshot();
        assert!(Arc::ptr_eq(&before.likes, &after.likes));
        assert!(!after.has_liked("1"));
    }

    #[tokio::test]
    async fn toggles_require_session() {
        let backend = seeded_backend();
        let client = client(&backend);
        assert!(client.set_follow("A", true).await.is_err());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn friends_feed_filters_and_resolves() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("me").await;

        let feed = client.friends_feed().await.unwrap();
        let ids: Vec<&str> = feed.iter().map(FeedItem::id).collect();
        assert_eq!(ids, vec!["3", "2"]);
        assert!(!feed[0].is_playable());
        assert!(feed[1].is_playable());
        assert_eq!(feed[1].video.author.as_ref().unwrap().username, "bob");
        assert_eq!(backend.last_sign_ttl(), Some(FEED_URL_TTL));
    }

    #[tokio::test]
    async fn friends_feed_without_friends_issues_no_query() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("D").await;
        assert!(client.snapshot().friends.is_empty());

        let feed = client.friends_feed().await.unwrap();
        assert!(feed.is_empty());
        assert!(!backend.calls().iter().any(|c| c == "select Video"));
        assert_eq!(backend.sign_batch_calls(), 0);
    }

    #[tokio::test]
    async fn for_you_feed_is_newest_first() {
        let backend = seeded_backend();
        let client = client(&backend);
        let feed = client.for_you_feed().await.unwrap();
        let ids: Vec<&str> = feed.iter().map(FeedItem::id).collect();
        assert_eq!(ids, vec!["5", "4", "3", "2", "1"]);
        assert_eq!(feed.iter().filter(|i| i.is_playable()).count(), 4);
        assert_eq!(backend.sign_batch_calls(), 1);
    }

    #[tokio::test]
    async fn feed_keeps_rows_without_key_or_valid_author() {
        let backend = seeded_backend();
        backend.seed(
            "User",
            vec![serde_json::json!({"id": "E", "username": null, "email": null})],
        );
        backend.seed(
            "Video",
            vec![
                serde_json::json!({
                    "id": "6",
                    "uri": null,
                    "user_id": "A",
                    "created_at": "2024-01-01T00:00:06+00:00",
                }),
                video_row("7", "E", "e.mp4"),
            ],
        );
        backend.put_object("videos", "e.mp4");
        let client = client(&backend);

        let feed = client.for_you_feed().await.unwrap();
        let ids: Vec<&str> = feed.iter().map(FeedItem::id).collect();
        assert_eq!(ids, vec!["7", "6", "5", "4", "3", "2", "1"]);

        // 作者记录无效：保留视频，作者按缺失处理
        assert!(feed[0].video.author.is_none());
        assert!(feed[0].is_playable());
        // 没有存储路径：保留为占位条目
        assert!(feed[1].video.uri.is_empty());
        assert!(!feed[1].is_playable());
        assert_eq!(feed[1].video.author.as_ref().unwrap().username, "alice");
        assert_eq!(backend.sign_batch_calls(), 1);

        let single = client.video("6").await.unwrap().unwrap();
        assert!(!single.is_playable());
    }

    #[tokio::test]
    async fn single_video_uses_short_ttl() {
        let backend = seeded_backend();
        let client = client(&backend);
        let item = client.video("4").await.unwrap().unwrap();
        assert!(item.is_playable());
        assert_eq!(backend.last_sign_ttl(), Some(SINGLE_URL_TTL));
        assert!(client.video("404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_summary_counts() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("me").await;
        let own = client.video("5").await.unwrap().unwrap().video;
        let other = client.video("1").await.unwrap().unwrap().video;
        client.set_like(&own, true).await.unwrap();
        client.set_like(&other, true).await.unwrap();

        let profile = client.profile("me").await.unwrap().unwrap();
        assert_eq!(profile.following_count(), 3);
        assert_eq!(profile.followers_count(), 3);
        assert_eq!(profile.videos.len(), 1);
        assert_eq!(profile.likes_received, Some(1));

        let other = client.profile("A").await.unwrap().unwrap();
        assert_eq!(other.likes_received, None);
        assert!(client.profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upload_creates_object_and_row() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("me").await;
        let key = client.upload_video(vec![0u8; 16], None).await.unwrap();
        assert!(backend.has_object("videos", &key));
        let row = backend
            .rows("Video")
            .into_iter()
            .find(|r| r["uri"] == key.as_str())
            .unwrap();
        assert_eq!(row["title"], "New Video");
        assert_eq!(row["user_id"], "me");
    }

    #[tokio::test]
    async fn comments_round_trip() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("me").await;
        assert!(client.add_comment("1", "   ").await.is_err());
        client.add_comment("1", " first ").await.unwrap();
        let comments = client.add_comment("1", "second").await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "second");
        assert_eq!(comments[1].text, "first");
        assert_eq!(comments[0].author.as_ref().unwrap().username, "me");
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_skips_blank() {
        let backend = seeded_backend();
        let client = client(&backend);
        let users = client.search_users("BO").await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "B");
        let before = backend.calls().len();
        assert!(client.search_users("  ").await.unwrap().is_empty());
        assert_eq!(backend.calls().len(), before);
    }

    #[tokio::test]
    async fn albums_with_counts_and_details() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("me").await;

        let albums = client
            .create_album(&NewAlbum {
                title: "  Tour  ".to_string(),
                description: Some("  ".to_string()),
                album_type: AlbumType::BehindScenes,
            })
            .await
            .unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].title, "Tour");
        assert_eq!(albums[0].description, None);
        assert_eq!(albums[0].video_count, 0);

        let album_id = albums[0].id.clone();
        client
            .add_videos_to_album(&album_id, &["5".to_string(), "1".to_string()])
            .await
            .unwrap();
        // 视频 1 属于 A，不会被归入当前用户的专辑
        let albums = client.albums().await.unwrap();
        assert_eq!(albums[0].video_count, 1);
        let others = backend.rows("Video");
        let foreign = others.iter().find(|r| r["id"] == "1").unwrap();
        assert!(foreign.get("album_id").is_none());

        let details = client.album_details(&album_id).await.unwrap().unwrap();
        assert_eq!(details.videos.len(), 1);
        assert_eq!(details.videos[0].id(), "5");
        assert!(details.videos[0].is_playable());
    }

    #[tokio::test]
    async fn missing_album_table_means_setup_required() {
        let backend = seeded_backend();
        backend.drop_table("Album");
        let client = client(&backend);
        client.set_session("me").await;

        assert!(client.albums().await.unwrap().is_empty());
        let err = client
            .create_album(&NewAlbum {
                title: "x".to_string(),
                description: None,
                album_type: AlbumType::Custom,
            })
            .await
            .unwrap_err();
        assert!(is_setup_required(&err));
        assert!(client.album_details("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collaboration_request_lifecycle() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("me").await;

        let albums = client
            .create_album(&NewAlbum {
                title: "Fans".to_string(),
                description: None,
                album_type: AlbumType::FanCollab,
            })
            .await
            .unwrap();
        let album_id = albums[0].id.clone();

        let request = NewCollaborationRequest {
            album_id: album_id.clone(),
            video_id: "2".to_string(),
            video_owner_id: "B".to_string(),
            message: Some("  join?  ".to_string()),
        };
        client.request_collaboration(&request).await.unwrap();
        assert!(client.request_collaboration(&request).await.is_err());

        let sent = client
            .collaboration_requests(RequestDirection::Sent)
            .await
            .unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].status, RequestStatus::Pending);
        assert_eq!(sent[0].message.as_deref(), Some("join?"));
        assert_eq!(sent[0].album_owner_id, "me");
        assert_eq!(sent[0].album.as_ref().unwrap().id, album_id);
        assert_eq!(sent[0].video.as_ref().unwrap().id, "2");
        assert_eq!(sent[0].requester.as_ref().unwrap().username, "me");
        assert_eq!(sent[0].album_owner.as_ref().unwrap().username, "me");
        assert_eq!(sent[0].video_owner.as_ref().unwrap().username, "bob");

        client.set_session("B").await;
        let received = client
            .respond_collaboration(&sent[0].id, true)
            .await
            .unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn missing_collab_table_lists_empty() {
        let backend = seeded_backend();
        backend.drop_table("CollaborationRequest");
        let client = client(&backend);
        client.set_session("me").await;
        assert!(client
            .collaboration_requests(RequestDirection::Received)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn missing_collab_relationship_lists_empty() {
        let backend = seeded_backend();
        backend.drop_relationships("CollaborationRequest");
        let client = client(&backend);
        client.set_session("me").await;

        // 插入不依赖关联关系
        client
            .request_collaboration(&NewCollaborationRequest {
                album_id: "9".to_string(),
                video_id: "2".to_string(),
                video_owner_id: "B".to_string(),
                message: None,
            })
            .await
            .unwrap();
        assert_eq!(backend.rows("CollaborationRequest").len(), 1);
        assert!(client
            .collaboration_requests(RequestDirection::Sent)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn clear_session_empties_caches() {
        let backend = seeded_backend();
        let client = client(&backend);
        client.set_session("me").await;
        client.clear_session().await;
        let snap = client.snapshot();
        assert!(!snap.is_signed_in());
        assert!(snap.following.is_empty());
        assert!(snap.friends.is_empty());
        assert!(client.refresh_likes().await.is_err());
    }
}
