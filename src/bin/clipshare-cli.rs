//! ClipShare CLI 客户端（测试版）
//!
//! 非交互式 CLI，用于测试和展示社交视频功能
//! 启动时通过命令行参数指定用户，自动拉取关注关系和视频流，只展示结果和状态变化

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clipshare_sdk_core_rust::social::error::user_message;
use clipshare_sdk_core_rust::{
    ClientConfig, FeedItem, FollowEdge, LikeEdge, SocialClient, SocialListener, User,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FeedKind {
    /// 全部视频
    ForYou,
    /// 只看互关好友
    Friends,
}

/// ClipShare CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "clipshare-cli")]
#[command(about = "ClipShare CLI 客户端 - 用于测试和展示社交视频功能", long_about = None)]
struct Args {
    /// 后端项目地址
    #[arg(long, env = "CLIPSHARE_URL")]
    project_url: String,

    /// 项目公开 key
    #[arg(long, env = "CLIPSHARE_ANON_KEY")]
    anon_key: String,

    /// 访问 token（默认使用公开 key）
    #[arg(long, env = "CLIPSHARE_TOKEN")]
    token: Option<String>,

    /// 当前用户 id
    #[arg(short, long)]
    user_id: String,

    /// 展示哪个视频流
    #[arg(short, long, value_enum, default_value = "for-you")]
    feed: FeedKind,

    /// 可选：按用户名搜索
    #[arg(short, long)]
    search: Option<String>,

    /// 运行时长（秒），0 表示只展示一次后退出
    #[arg(short, long, default_value = "0")]
    duration: u64,

    /// 刷新间隔（秒）
    #[arg(long, default_value = "30")]
    interval: u64,

    /// 日志级别（默认: info,clipshare_sdk_core_rust=debug）
    #[arg(long, default_value = "info,clipshare_sdk_core_rust=debug")]
    log_level: String,
}

/// 初始化日志（同时输出到 stdout 和文件）
fn init_logger(log_level: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .context("无法创建日志文件 debug.log")?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    // 文件不需要颜色
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("[CLI] 📝 日志已同时输出到控制台和文件: debug.log");
    Ok(())
}

/// 输出所有状态变化
struct CliSocialListener;

#[async_trait::async_trait]
impl SocialListener for CliSocialListener {
    async fn on_identity_changed(&self, user_id: Option<String>, user: Option<User>) {
        match (user_id, user) {
            (Some(id), Some(user)) => info!("[CLI/State] 🔐 当前用户: {} ({})", user.username, id),
            (Some(id), None) => info!("[CLI/State] 🔐 当前用户: {}（资料不存在）", id),
            _ => info!("[CLI/State] 👋 已退出"),
        }
    }

    async fn on_following_changed(&self, following: Vec<FollowEdge>) {
        info!("[CLI/State] ➡️ 关注 {} 人", following.len());
    }

    async fn on_followers_changed(&self, followers: Vec<FollowEdge>) {
        info!("[CLI/State] ⬅️ 粉丝 {} 人", followers.len());
    }

    async fn on_friends_changed(&self, friends: HashSet<String>) {
        info!("[CLI/State] 👥 互关好友 {} 人", friends.len());
    }

    async fn on_likes_changed(&self, likes: Vec<LikeEdge>) {
        info!("[CLI/State] ❤️ 点赞 {} 个视频", likes.len());
    }
}

fn print_feed(kind: FeedKind, feed: &[FeedItem]) {
    info!("[CLI] 🎞️ {:?} 视频流（共 {} 个）:", kind, feed.len());
    for item in feed.iter().take(10) {
        let author = item
            .video
            .author
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or("?");
        info!(
            "[CLI]   - {} | @{} | {} | {}",
            item.id(),
            author,
            item.video.title.as_deref().unwrap_or("(无标题)"),
            if item.is_playable() { "可播放" } else { "无播放地址" }
        );
    }
}

async fn show(client: &SocialClient, kind: FeedKind) {
    let feed = match kind {
        FeedKind::ForYou => client.for_you_feed().await,
        FeedKind::Friends => client.friends_feed().await,
    };
    match feed {
        Ok(feed) => print_feed(kind, &feed),
        Err(e) => error!("[CLI] ❌ 拉取视频流失败: {} ({:?})", user_message(&e), e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(&args.log_level)?;

    info!("[CLI] 🚀 ClipShare CLI 客户端（测试模式）");
    info!("[CLI] 👤 用户ID: {}", args.user_id);
    info!("[CLI] ⏱️  运行时长: {} 秒（0=展示一次）", args.duration);

    let token = args.token.clone().unwrap_or_else(|| args.anon_key.clone());
    let config = ClientConfig::new(args.project_url.clone(), args.anon_key.clone(), token);
    let mut client = SocialClient::new(config)?;
    client.set_listener(Arc::new(CliSocialListener));

    let snapshot = client.set_session(&args.user_id).await;
    info!(
        "[CLI] ✅ 会话就绪：关注 {} / 粉丝 {} / 好友 {}",
        snapshot.following.len(),
        snapshot.followers.len(),
        snapshot.friends.len()
    );

    if let Some(text) = &args.search {
        match client.search_users(text).await {
            Ok(users) => {
                info!("[CLI] 🔍 搜索 \"{}\"（共 {} 个）:", text, users.len());
                for user in users {
                    info!("[CLI]   - {} ({})", user.username, user.id);
                }
            }
            Err(e) => error!("[CLI] ❌ 搜索失败: {}", user_message(&e)),
        }
    }

    show(&client, args.feed).await;

    if args.duration > 0 {
        info!("[CLI] ⏰ 每 {} 秒刷新一次，{} 秒后自动退出", args.interval, args.duration);
        let deadline = tokio::time::Instant::now() + Duration::from_secs(args.duration);
        let interval = Duration::from_secs(args.interval.max(1));
        while tokio::time::Instant::now() + interval <= deadline {
            sleep(interval).await;
            client.refresh_social().await;
            show(&client, args.feed).await;
        }
    }

    client.clear_session().await;
    info!("[CLI] 👋 程序退出");
    Ok(())
}
