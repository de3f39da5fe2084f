//! 视频流组装：元数据 + 批量签名播放地址

use crate::social::feed::models::{FeedItem, Video};
use crate::social::storage::ObjectStorage;
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct FeedComposer {
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
    /// 视频流签名有效期
    feed_url_ttl: Duration,
    /// 单视频签名有效期
    single_url_ttl: Duration,
}

impl FeedComposer {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        bucket: String,
        feed_url_ttl: Duration,
        single_url_ttl: Duration,
    ) -> Self {
        Self {
            storage,
            bucket,
            feed_url_ttl,
            single_url_ttl,
        }
    }

    /// 为一批视频签发播放地址，并按存储路径合并回元数据
    ///
    /// 输出与输入等长且顺序一致；没有匹配到签名的条目 `signed_url` 为 `None`。
    /// 空输入或没有任何存储路径时不发起签名请求。
    pub async fn compose(&self, videos: Vec<Video>) -> Result<Vec<FeedItem>> {
        if videos.is_empty() {
            debug!("[FeedComposer] 视频列表为空，跳过签名");
            return Ok(Vec::new());
        }

        let keys: Vec<String> = {
            let mut seen = HashSet::new();
            videos
                .iter()
                .map(|v| v.uri.as_str())
                .filter(|uri| !uri.is_empty() && seen.insert(*uri))
                .map(str::to_string)
                .collect()
        };

        let mut urls: HashMap<String, String> = HashMap::new();
        if !keys.is_empty() {
            info!(
                "[FeedComposer] 📡 批量签名 {} 个存储路径（{} 条视频）",
                keys.len(),
                videos.len()
            );
            let signed = self
                .storage
                .create_signed_urls(&self.bucket, &keys, self.feed_url_ttl)
                .await
                .context("批量签名播放地址失败")?;
            for item in signed {
                match (item.path, item.signed_url, item.error) {
                    (Some(path), Some(url), None) => {
                        urls.insert(path, url);
                    }
                    (path, _, err) => {
                        warn!(
                            "[FeedComposer] 存储路径 {:?} 签名失败: {:?}",
                            path, err
                        );
                    }
                }
            }
        } else {
            warn!("[FeedComposer] {} 条视频都没有存储路径", videos.len());
        }

        let items: Vec<FeedItem> = videos
            .into_iter()
            .map(|video| {
                let signed_url = urls.get(&video.uri).cloned();
                FeedItem { video, signed_url }
            })
            .collect();

        let unresolved = items.iter().filter(|i| !i.is_playable()).count();
        if unresolved > 0 {
            warn!(
                "[FeedComposer] {} / {} 条视频没有可用的播放地址",
                unresolved,
                items.len()
            );
        }
        Ok(items)
    }

    /// 单个视频签名，签名失败时返回不可播放的条目
    pub async fn resolve_single(&self, video: Video) -> FeedItem {
        if video.uri.is_empty() {
            return FeedItem {
                video,
                signed_url: None,
            };
        }
        let signed_url = match self
            .storage
            .create_signed_url(&self.bucket, &video.uri, self.single_url_ttl)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("[FeedComposer] 视频 {} 签名失败: {}", video.id, e);
                None
            }
        };
        FeedItem { video, signed_url }
    }
}
