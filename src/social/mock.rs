//! 测试用的内存后端，同时实现 REST 和对象存储两个接口

use crate::social::error::BackendError;
use crate::social::rest::{Filter, Query, RestBackend};
use crate::social::storage::{ObjectStorage, SignedUrl};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    missing_tables: HashSet<String>,
    missing_relationships: HashSet<String>,
    failing_tables: HashSet<String>,
    objects: HashSet<(String, String)>,
    next_id: u64,
    sign_batch_calls: usize,
    last_sign_ttl: Option<Duration>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

pub fn user_row(id: &str, username: &str) -> Value {
    serde_json::json!({
        "id": id,
        "username": username,
        "email": format!("{}@example.com", username),
        "avatar_url": null,
        "created_at": "2024-01-01T00:00:00+00:00",
    })
}

pub fn video_row(id: &str, user_id: &str, uri: &str) -> Value {
    serde_json::json!({
        "id": id,
        "uri": uri,
        "user_id": user_id,
        "title": format!("video {}", id),
        "created_at": format!(
            "2024-01-01T00:00:{:02}+00:00",
            id.parse::<u32>().unwrap_or(0) % 60
        ),
    })
}

fn cell(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 解析 select 中的嵌入项，返回 (键名, 外键列, 目标表)
///
/// `Album(*)` 按 `album_id` 关联 `Album` 表；`Requester:requester_id(...)` 按该列关联 `User` 表
fn embeds(select: &str) -> Vec<(String, String, String)> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in select.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&select[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&select[start..]);

    parts
        .into_iter()
        .filter(|part| part.contains('('))
        .filter_map(|part| {
            let name = part.trim().split('(').next()?.trim();
            Some(match name.split_once(':') {
                Some((alias, column)) => (alias.to_string(), column.to_string(), "User".to_string()),
                None => (
                    name.to_string(),
                    format!("{}_id", name.to_lowercase()),
                    name.to_string(),
                ),
            })
        })
        .collect()
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let value = cell(row, filter.column());
    match (filter, value) {
        (Filter::Eq(_, expected), Some(v)) => &v == expected,
        (Filter::In(_, list), Some(v)) => list.contains(&v),
        (Filter::ILike(_, needle), Some(v)) => v.to_lowercase().contains(&needle.to_lowercase()),
        (_, None) => false,
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let inner = self.inner.lock().unwrap();
        inner.tables.get(table).cloned().unwrap_or_default()
    }

    /// 模拟表尚未创建
    pub fn drop_table(&self, table: &str) {
        self.inner
            .lock()
            .unwrap()
            .missing_tables
            .insert(table.to_string());
    }

    /// 模拟表存在但关联关系缺失：带嵌入的查询返回 PGRST200
    pub fn drop_relationships(&self, table: &str) {
        self.inner
            .lock()
            .unwrap()
            .missing_relationships
            .insert(table.to_string());
    }

    /// 模拟某张表的所有操作都失败
    pub fn fail_table(&self, table: &str, failing: bool) {
        let mut inner = self.inner.lock().unwrap();
        if failing {
            inner.failing_tables.insert(table.to_string());
        } else {
            inner.failing_tables.remove(table);
        }
    }

    pub fn put_object(&self, bucket: &str, path: &str) {
        self.inner
            .lock()
            .unwrap()
            .objects
            .insert((bucket.to_string(), path.to_string()));
    }

    pub fn has_object(&self, bucket: &str, path: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .objects
            .contains(&(bucket.to_string(), path.to_string()))
    }

    pub fn sign_batch_calls(&self) -> usize {
        self.inner.lock().unwrap().sign_batch_calls
    }

    pub fn last_sign_ttl(&self) -> Option<Duration> {
        self.inner.lock().unwrap().last_sign_ttl
    }

    /// 按顺序记录的调用，如 `select Video`、`insert Like`
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn check(inner: &mut Inner, op: &str, table: &str) -> Result<(), BackendError> {
        inner.calls.push(format!("{} {}", op, table));
        if inner.missing_tables.contains(table) {
            return Err(BackendError::classify(
                404,
                table,
                "42P01",
                &format!("relation \"public.{}\" does not exist", table),
            ));
        }
        if inner.failing_tables.contains(table) {
            return Err(BackendError::classify(500, table, "XX000", "injected failure"));
        }
        Ok(())
    }

    fn check_embeds(inner: &Inner, table: &str, query: &Query) -> Result<(), BackendError> {
        if inner.missing_relationships.contains(table) && query.select.contains('(') {
            return Err(BackendError::classify(
                400,
                table,
                "PGRST200",
                &format!("Could not find a relationship for '{}' in the schema cache", table),
            ));
        }
        Ok(())
    }

    fn filtered(inner: &Inner, table: &str, query: &Query) -> Vec<Value> {
        let mut rows: Vec<Value> = inner
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((column, ascending)) = &query.order {
            rows.sort_by(|a, b| {
                let ord = cell(a, column).cmp(&cell(b, column));
                if *ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        if let Some(n) = query.limit {
            rows.truncate(n);
        }
        for (key, column, target) in embeds(&query.select) {
            let related = inner.tables.get(&target).cloned().unwrap_or_default();
            for row in rows.iter_mut() {
                let fk = cell(row, &column);
                let found = related
                    .iter()
                    .find(|r| fk.is_some() && cell(r, "id") == fk)
                    .cloned()
                    .unwrap_or(Value::Null);
                if let Value::Object(map) = row {
                    map.insert(key.clone(), found);
                }
            }
        }
        rows
    }
}

#[async_trait]
impl RestBackend for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&mut inner, "select", table)?;
        Self::check_embeds(&inner, table, query)?;
        Ok(Self::filtered(&inner, table, query))
    }

    async fn select_single(&self, table: &str, query: &Query) -> Result<Value, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&mut inner, "select_single", table)?;
        Self::check_embeds(&inner, table, query)?;
        let mut rows = Self::filtered(&inner, table, query);
        if rows.len() == 1 {
            Ok(rows.remove(0))
        } else {
            Err(BackendError::classify(
                406,
                table,
                "PGRST116",
                "JSON object requested, multiple (or no) rows returned",
            ))
        }
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&mut inner, "count", table)?;
        Ok(Self::filtered(&inner, table, query).len() as u64)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&mut inner, "insert", table)?;
        inner.next_id += 1;
        let id = inner.next_id;
        let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
            + ChronoDuration::seconds(id as i64);
        let mut row = row;
        if let Value::Object(map) = &mut row {
            map.entry("id").or_insert(Value::String(format!("row-{}", id)));
            map.entry("created_at")
                .or_insert(Value::String(created_at.to_rfc3339()));
        }
        inner.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&mut inner, "update", table)?;
        if let (Some(rows), Value::Object(patch)) = (inner.tables.get_mut(table), patch) {
            for row in rows
                .iter_mut()
                .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            {
                if let Value::Object(map) = row {
                    for (k, v) in patch.iter() {
                        map.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&mut inner, "delete", table)?;
        if let Some(rows) = inner.tables.get_mut(table) {
            rows.retain(|row| !query.filters.iter().all(|f| matches(row, f)));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&mut inner, "upload", bucket)?;
        inner.objects.insert((bucket.to_string(), path.to_string()));
        Ok(())
    }

    async fn create_signed_urls(
        &self,
        bucket: &str,
        paths: &[String],
        expires_in: Duration,
    ) -> Result<Vec<SignedUrl>, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&mut inner, "sign_batch", bucket)?;
        inner.sign_batch_calls += 1;
        inner.last_sign_ttl = Some(expires_in);
        Ok(paths
            .iter()
            .map(|p| {
                if inner.objects.contains(&(bucket.to_string(), p.clone())) {
                    SignedUrl {
                        path: Some(p.clone()),
                        signed_url: Some(format!("https://mock/{}/{}?token=t", bucket, p)),
                        error: None,
                    }
                } else {
                    SignedUrl {
                        path: Some(p.clone()),
                        signed_url: None,
                        error: Some("Object not found".to_string()),
                    }
                }
            })
            .collect())
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&mut inner, "sign", bucket)?;
        inner.last_sign_ttl = Some(expires_in);
        if inner.objects.contains(&(bucket.to_string(), path.to_string())) {
            Ok(format!("https://mock/{}/{}?token=t", bucket, path))
        } else {
            Err(BackendError::classify(400, bucket, "", "Object not found"))
        }
    }
}
