//! 关系型 REST 接口（PostgREST 方言）
//!
//! `RestBackend` 是 SDK 与托管后端之间的边界，业务层只依赖这个 trait；
//! `PostgrestClient` 是基于 reqwest 的实现。

use crate::social::error::BackendError;
use crate::social::types::{handle_http_response, parse_array, parse_content_range_total};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

/// 行过滤条件
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `col = value`
    Eq(String, String),
    /// `col in (values)`
    In(String, Vec<String>),
    /// 不区分大小写的子串匹配
    ILike(String, String),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::In(c, _) | Filter::ILike(c, _) => c,
        }
    }

    /// 渲染为 PostgREST 查询参数的值部分
    fn render(&self) -> String {
        match self {
            Filter::Eq(_, v) => format!("eq.{}", v),
            Filter::In(_, vs) => {
                let quoted: Vec<String> = vs.iter().map(|v| quote_list_item(v)).collect();
                format!("in.({})", quoted.join(","))
            }
            Filter::ILike(_, v) => format!("ilike.*{}*", v),
        }
    }
}

/// `in.(...)` 列表中含有保留字符的值需要加双引号
fn quote_list_item(v: &str) -> String {
    if v.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", v.replace('"', "\\\""))
    } else {
        v.to_string()
    }
}

/// 查询描述：select 列、过滤条件、排序和条数限制
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub select: String,
    pub filters: Vec<Filter>,
    /// (列名, 是否升序)
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            select: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns.to_string();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn in_list(mut self, column: &str, values: &[String]) -> Self {
        self.filters.push(Filter::In(column.to_string(), values.to_vec()));
        self
    }

    pub fn ilike(mut self, column: &str, needle: impl Into<String>) -> Self {
        self.filters
            .push(Filter::ILike(column.to_string(), needle.into()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// 转换为 URL 查询参数
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.clone())];
        for f in &self.filters {
            params.push((f.column().to_string(), f.render()));
        }
        if let Some((col, asc)) = &self.order {
            let dir = if *asc { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", col, dir)));
        }
        if let Some(n) = self.limit {
            params.push(("limit".to_string(), n.to_string()));
        }
        params
    }
}

/// 托管后端的行级增删改查接口
#[async_trait]
pub trait RestBackend: Send + Sync {
    /// 查询多行
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;

    /// 查询单行，不存在时返回 `BackendError::NotFound`
    async fn select_single(&self, table: &str, query: &Query) -> Result<Value, BackendError>;

    /// 精确计数
    async fn count(&self, table: &str, query: &Query) -> Result<u64, BackendError>;

    /// 插入一行
    async fn insert(&self, table: &str, row: Value) -> Result<(), BackendError>;

    /// 按过滤条件更新
    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<(), BackendError>;

    /// 按过滤条件删除
    async fn delete(&self, table: &str, query: &Query) -> Result<(), BackendError>;
}

/// 基于 reqwest 的 PostgREST 客户端
pub struct PostgrestClient {
    client: reqwest::Client,
    rest_url: String,
}

impl PostgrestClient {
    /// `client` 应该已经通过 default_headers 配置好 apikey 和 Authorization
    pub fn new(client: reqwest::Client, project_url: &str) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn request(
        &self,
        method: reqwest::Method,
        table: &str,
        query: Option<&Query>,
    ) -> (reqwest::RequestBuilder, String) {
        let operation_id = Uuid::new_v4().to_string();
        let url = self.table_url(table);
        debug!(
            "[REST] {} {} 操作ID: {}, 查询: {:?}",
            method, url, operation_id, query
        );
        let mut builder = self
            .client
            .request(method, &url)
            .header("x-operation-id", &operation_id);
        if let Some(q) = query {
            builder = builder.query(&q.to_params());
        }
        (builder, operation_id)
    }
}

#[async_trait]
impl RestBackend for PostgrestClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let (builder, _) = self.request(reqwest::Method::GET, table, Some(query));
        let response = builder.send().await?;
        let (_, body) = handle_http_response(response, &format!("查询{}", table), table).await?;
        let rows: Vec<Value> = parse_array(&body)?;
        debug!("[REST] 📥 {} 返回 {} 行", table, rows.len());
        Ok(rows)
    }

    async fn select_single(&self, table: &str, query: &Query) -> Result<Value, BackendError> {
        let (builder, _) = self.request(reqwest::Method::GET, table, Some(query));
        let response = builder
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await?;
        let (_, body) =
            handle_http_response(response, &format!("查询单行{}", table), table).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64, BackendError> {
        let (builder, _) = self.request(reqwest::Method::HEAD, table, Some(query));
        let response = builder.header("Prefer", "count=exact").send().await?;
        let (headers, _) = handle_http_response(response, &format!("计数{}", table), table).await?;
        let total = headers
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| BackendError::Decode("缺少 Content-Range 总数".to_string()))?;
        Ok(total)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), BackendError> {
        let (builder, operation_id) = self.request(reqwest::Method::POST, table, None);
        let response = builder
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        handle_http_response(response, &format!("插入{}", table), table).await?;
        info!("[REST] ✅ 插入 {} 成功，操作ID: {}", table, operation_id);
        Ok(())
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<(), BackendError> {
        let (builder, operation_id) = self.request(reqwest::Method::PATCH, table, Some(query));
        let response = builder
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await?;
        handle_http_response(response, &format!("更新{}", table), table).await?;
        info!("[REST] ✅ 更新 {} 成功，操作ID: {}", table, operation_id);
        Ok(())
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), BackendError> {
        let (builder, operation_id) = self.request(reqwest::Method::DELETE, table, Some(query));
        let response = builder.header("Prefer", "return=minimal").send().await?;
        handle_http_response(response, &format!("删除{}", table), table).await?;
        info!("[REST] ✅ 删除 {} 成功，操作ID: {}", table, operation_id);
        Ok(())
    }
}
