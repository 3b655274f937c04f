/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! Elasticsearch REST APIクライアント
//!

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};

use super::{BulkDocument, SearchEngine};

///
/// Elasticsearchクライアント
///
pub(crate) struct EsClient {
    /// HTTPクライアント
    client: Client,

    /// 接続先のベースURL(末尾の'/'は除去済み)
    base_url: String,
}

impl EsClient {
    ///
    /// クライアントの生成
    ///
    /// # 引数
    /// * `base_url` - 接続先のURL
    /// * `timeout` - リクエストのタイムアウト
    ///
    /// # 戻り値
    /// 生成したクライアントを返す。
    ///
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    ///
    /// リクエストURLの生成
    ///
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl SearchEngine for EsClient {
    fn create_index(&self, name: &str, body: &Value) -> Result<()> {
        let resp = self.client
            .put(self.url(name))
            .json(body)
            .send()
            .with_context(|| format!("create index {}", name))?;

        let status = resp.status();
        if status.is_success() {
            info!("index created: {}", name);
            return Ok(());
        }

        let text = resp.text().unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && is_already_exists(&text) {
            warn!("index already exists: {}", name);
            return Ok(());
        }

        Err(anyhow!("create index {} failed: {} {}", name, status, text))
    }

    fn delete_index(&self, name: &str) -> Result<()> {
        let resp = self.client
            .delete(self.url(name))
            .send()
            .with_context(|| format!("delete index {}", name))?;

        match resp.status() {
            status if status.is_success() => {
                info!("index deleted: {}", name);
                Ok(())
            }

            StatusCode::NOT_FOUND => {
                info!("index not found: {}", name);
                Ok(())
            }

            status => {
                let text = resp.text().unwrap_or_default();
                Err(anyhow!("delete index {} failed: {} {}", name, status, text))
            }
        }
    }

    fn clear_index(&self, name: &str) -> Result<()> {
        let path = format!(
            "{}/_delete_by_query?refresh=true&conflicts=proceed",
            name
        );
        let resp = self.client
            .post(self.url(&path))
            .json(&json!({ "query": { "match_all": {} } }))
            .send()
            .with_context(|| format!("clear index {}", name))?;

        match resp.status() {
            StatusCode::NOT_FOUND => {
                debug!("clear skipped, index not found: {}", name);
                Ok(())
            }

            _ => {
                let body = check_status(resp, "clear index")?;
                info!(
                    "index cleared: {} ({} documents)",
                    name,
                    body["deleted"].as_u64().unwrap_or(0)
                );
                Ok(())
            }
        }
    }

    fn bulk_index(&self, name: &str, docs: &[BulkDocument]) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }

        let resp = self.client
            .post(self.url("_bulk"))
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(bulk_payload(name, docs)?)
            .send()
            .with_context(|| format!("bulk index {}", name))?;

        let body = check_status(resp, "bulk index")?;
        if let Some(reason) = bulk_failure(&body) {
            return Err(anyhow!("bulk index {} failed: {}", name, reason));
        }

        Ok(docs.len())
    }

    fn search(&self, name: &str, body: &Value) -> Result<Value> {
        let resp = self.client
            .post(self.url(&format!("{}/_search", name)))
            .json(body)
            .send()
            .with_context(|| format!("search {}", name))?;

        check_status(resp, "search")
    }
}

///
/// レスポンスステータスの確認とボディの取得
///
/// # 引数
/// * `resp` - レスポンス
/// * `what` - エラーメッセージに使用する処理名
///
/// # 戻り値
/// 成功ステータスの場合はJSONとして解釈したボディを返す。
///
fn check_status(resp: Response, what: &str) -> Result<Value> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().unwrap_or_default();
        return Err(anyhow!("{} failed: {} {}", what, status, text));
    }

    resp.json::<Value>()
        .with_context(|| format!("{}: invalid response body", what))
}

///
/// エラーレスポンスが既存インデックスによるものか否かの判定
///
fn is_already_exists(text: &str) -> bool {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| {
            value["error"]["type"].as_str().map(|kind| {
                kind == "resource_already_exists_exception"
                    || kind == "index_already_exists_exception"
            })
        })
        .unwrap_or(false)
}

///
/// bulk APIに送信するNDJSONの生成
///
/// # 引数
/// * `name` - 登録先インデックス名
/// * `docs` - 登録する文書
///
/// # 戻り値
/// 行区切りのJSON文字列(末尾改行付き)
///
pub(crate) fn bulk_payload(name: &str, docs: &[BulkDocument]) -> Result<String> {
    let mut payload = String::new();

    for doc in docs {
        let action = match doc.id() {
            Some(id) => json!({ "index": { "_index": name, "_id": id } }),
            None => json!({ "index": { "_index": name } }),
        };

        payload.push_str(&serde_json::to_string(&action)?);
        payload.push('\n');
        payload.push_str(&serde_json::to_string(doc.source())?);
        payload.push('\n');
    }

    Ok(payload)
}

///
/// bulk APIのレスポンスから失敗理由を抽出する
///
/// # 戻り値
/// 失敗した項目がある場合は件数と最初の理由を`Some()`で返す。
///
pub(crate) fn bulk_failure(body: &Value) -> Option<String> {
    if !body["errors"].as_bool().unwrap_or(false) {
        return None;
    }

    let items = body["items"].as_array().cloned().unwrap_or_default();
    let failed: Vec<&Value> = items
        .iter()
        .filter_map(|item| item.as_object().and_then(|obj| obj.values().next()))
        .filter(|result| !result["error"].is_null())
        .collect();

    let reason = failed
        .first()
        .map(|result| {
            result["error"]["reason"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| result["error"].to_string())
        })
        .unwrap_or_else(|| "unknown error".to_string());

    Some(format!("{} items failed, first error: {}", failed.len(), reason))
}
