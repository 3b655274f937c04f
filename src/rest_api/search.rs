/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 検索APIの実装をまとめたモジュール
//!

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use log::warn;
use serde::Deserialize;
use serde_json::json;

use crate::engine::query::SearchQuery;
use crate::http_server::app_state::AppState;
use esadmin::paging::{
    total_hits, PageRequest, PagingError, PagingFilter, PagingParams,
};
use super::{resp_error_json, resp_json};

///
/// 検索APIのクエリパラメータ
///
#[derive(Deserialize)]
struct SearchParams {
    /// 検索式(未指定時は全件)
    q: Option<String>,

    /// ページング関連のパラメータ
    #[serde(flatten)]
    paging: PagingParams,
}

///
/// GET /api/search?q={expression}&page={n} の実体
///
/// # 概要
/// 検索インデックスに対して検索を行い、ヒットした文書とページ情報を返す。
///
/// # 引数
/// * `req` - HTTPリクエスト
/// * `state` - 共有状態
///
/// # APIレスポンスの種別
/// application/json
///
/// # 戻り値
/// actix-webのレスポンスオブジェクト
///
pub async fn get(
    req: HttpRequest,
    state: web::Data<AppState>,
)
    -> actix_web::Result<HttpResponse>
{
    /*
     * クエリ取得と検証
     */
    let params = match web::Query::<SearchParams>::from_query(
        req.query_string()
    ) {
        Ok(params) => params.into_inner(),
        Err(_) => {
            return Ok(resp_error_json(
                StatusCode::BAD_REQUEST,
                "invalid query parameter",
            ));
        }
    };

    let request = match PageRequest::from_params(&params.paging) {
        Ok(request) => request,
        Err(err) => {
            return Ok(resp_error_json(StatusCode::BAD_REQUEST, err));
        }
    };

    /*
     * クエリの構築
     */
    let filter = PagingFilter::new(state.paging_config(), request);
    let mut query = match params.q.as_deref().map(str::trim) {
        Some(expr) if !expr.is_empty() => SearchQuery::query_string(expr),
        _ => SearchQuery::match_all(),
    };
    filter.append_dsl(&mut query);

    /*
     * 検索の実行
     */
    let engine = state.engine();
    let index = state.search_index();
    let body = query.to_body();

    let results = match web::block(move || engine.search(&index, &body)).await {
        Ok(Ok(results)) => results,
        Ok(Err(err)) => {
            warn!("search failed: {}", err);
            return Ok(resp_error_json(StatusCode::BAD_GATEWAY, "search failed"));
        }
        Err(err) => {
            warn!("search task failed: {}", err);
            return Ok(resp_error_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                "search failed",
            ));
        }
    };

    /*
     * ページ情報の生成とレスポンス生成
     */
    let paginator = match filter.post_search_hook(&results) {
        Ok(value) => value,
        Err(PagingError::MissingTotal) => {
            return Ok(resp_error_json(
                StatusCode::BAD_GATEWAY,
                PagingError::MissingTotal,
            ));
        }
        Err(err) => {
            return Ok(resp_error_json(StatusCode::BAD_REQUEST, err));
        }
    };

    let total = total_hits(&results).unwrap_or(0);
    let hits = results["hits"]["hits"].clone();

    Ok(resp_json(&json!({
        "results": if hits.is_array() { hits } else { json!([]) },
        "total_results": total,
        "paginator": paginator["paginator"],
    })))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use actix_web::{test, App};
    use anyhow::{anyhow, Result};
    use serde_json::Value;

    use super::*;
    use crate::engine::{BulkDocument, EngineConfig, SearchEngine};
    use esadmin::paging::PagingConfig;

    ///
    /// 固定の総件数を返すテスト用エンジン
    ///
    struct FakeEngine {
        total: Option<u64>,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl SearchEngine for FakeEngine {
        fn create_index(&self, _name: &str, _body: &Value) -> Result<()> {
            Ok(())
        }

        fn delete_index(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        fn clear_index(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        fn bulk_index(&self, _name: &str, docs: &[BulkDocument])
            -> Result<usize>
        {
            Ok(docs.len())
        }

        fn search(&self, name: &str, body: &Value) -> Result<Value> {
            self.requests
                .lock()
                .expect("lock")
                .push((name.to_string(), body.clone()));

            match self.total {
                Some(total) => Ok(json!({
                    "hits": {
                        "total": { "value": total, "relation": "eq" },
                        "hits": [{ "_id": "r1" }]
                    }
                })),
                None => Err(anyhow!("connection refused")),
            }
        }
    }

    fn state(engine: Arc<FakeEngine>) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            engine,
            EngineConfig::new(
                "http://localhost:9200".to_string(),
                "arches".to_string(),
                Duration::from_secs(30),
                None,
                Vec::new(),
            ),
            PagingConfig::new(10, 500),
        ))
    }

    fn engine(total: Option<u64>) -> Arc<FakeEngine> {
        Arc::new(FakeEngine { total, requests: Mutex::new(Vec::new()) })
    }

    async fn call(engine: Arc<FakeEngine>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(state(engine))
                .route("/api/search", web::get().to(get))
        ).await;

        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;

        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[actix_web::test]
    async fn search_returns_paginator_for_last_page() {
        let engine = engine(Some(95));
        let (status, body) = call(engine.clone(), "/api/search?q=castle&page=10")
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_results"], 95);
        assert_eq!(body["results"][0]["_id"], "r1");
        assert_eq!(body["paginator"]["current_page"], 10);
        assert_eq!(body["paginator"]["has_next"], false);
        assert_eq!(body["paginator"]["has_previous"], true);
        assert_eq!(body["paginator"]["start_index"], 91);
        assert_eq!(body["paginator"]["end_index"], 95);

        let requests = engine.requests.lock().expect("lock");
        assert_eq!(requests[0].0, "arches_resources");
        assert_eq!(requests[0].1["from"], 90);
        assert_eq!(requests[0].1["size"], 10);
    }

    #[actix_web::test]
    async fn export_uses_export_page_size() {
        let engine = engine(Some(3));
        let (status, _) = call(engine.clone(), "/api/search?export=true").await;

        assert_eq!(status, StatusCode::OK);
        let requests = engine.requests.lock().expect("lock");
        assert_eq!(requests[0].1["from"], 0);
        assert_eq!(requests[0].1["size"], 500);
        assert!(requests[0].1["query"]["match_all"].is_object());
    }

    #[actix_web::test]
    async fn invalid_limit_is_bad_request() {
        let (status, body) = call(engine(Some(3)), "/api/search?limit=abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["reason"].as_str().unwrap_or("").contains("limit"));
    }

    #[actix_web::test]
    async fn page_beyond_last_is_bad_request() {
        let (status, _) = call(engine(Some(5)), "/api/search?page=4").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn engine_failure_is_bad_gateway() {
        let (status, body) = call(engine(None), "/api/search").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["reason"], "search failed");
    }
}
