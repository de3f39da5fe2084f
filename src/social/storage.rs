//! 对象存储接口：上传、批量签名 URL、单个签名 URL

use crate::social::error::BackendError;
use crate::social::types::{handle_http_response, parse_array};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// 批量签名结果中的一项
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignedUrl {
    /// 对应的存储路径
    #[serde(default)]
    pub path: Option<String>,
    /// 签名后的 URL（出错时为空）
    #[serde(default, rename = "signedURL")]
    pub signed_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 对象存储服务
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 上传对象
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError>;

    /// 一次请求为多个路径签发临时 URL
    async fn create_signed_urls(
        &self,
        bucket: &str,
        paths: &[String],
        expires_in: Duration,
    ) -> Result<Vec<SignedUrl>, BackendError>;

    /// 为单个路径签发临时 URL
    async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String, BackendError>;
}

/// 基于 reqwest 的存储客户端
pub struct StorageClient {
    client: reqwest::Client,
    storage_url: String,
}

impl StorageClient {
    pub fn new(client: reqwest::Client, project_url: &str) -> Self {
        Self {
            client,
            storage_url: format!("{}/storage/v1", project_url.trim_end_matches('/')),
        }
    }

    /// 服务端返回的是相对路径，这里补全为绝对 URL
    fn absolute(&self, signed: &str) -> String {
        if signed.starts_with("http://") || signed.starts_with("https://") {
            signed.to_string()
        } else {
            format!("{}/{}", self.storage_url, signed.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl ObjectStorage for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let url = format!("{}/object/{}/{}", self.storage_url, bucket, path);
        info!("[Storage] 📤 上传 {}/{}，大小: {} 字节", bucket, path, bytes.len());
        let response = self
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        handle_http_response(response, "上传对象", bucket).await?;
        Ok(())
    }

    async fn create_signed_urls(
        &self,
        bucket: &str,
        paths: &[String],
        expires_in: Duration,
    ) -> Result<Vec<SignedUrl>, BackendError> {
        let url = format!("{}/object/sign/{}", self.storage_url, bucket);
        debug!("[Storage] 批量签名 {} 个路径，有效期 {:?}", paths.len(), expires_in);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "expiresIn": expires_in.as_secs(),
                "paths": paths,
            }))
            .send()
            .await?;
        let (_, body) = handle_http_response(response, "批量签名", bucket).await?;
        let items: Vec<SignedUrl> = parse_array(&body)?;
        Ok(items
            .into_iter()
            .map(|mut item| {
                item.signed_url = item.signed_url.map(|s| self.absolute(&s));
                item
            })
            .collect())
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String, BackendError> {
        #[derive(Deserialize)]
        struct SingleSigned {
            #[serde(rename = "signedURL")]
            signed_url: String,
        }

        let url = format!("{}/object/sign/{}/{}", self.storage_url, bucket, path);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "expiresIn": expires_in.as_secs() }))
            .send()
            .await?;
        let (_, body) = handle_http_response(response, "单个签名", bucket).await?;
        let signed: SingleSigned = serde_json::from_slice(&body)?;
        Ok(self.absolute(&signed.signed_url))
    }
}
