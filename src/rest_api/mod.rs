/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! REST APIの実装を集約するモジュール
//!

mod hello;
mod search;

use actix_web::dev::HttpServiceFactory;
use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, HttpResponseBuilder, web};
use serde_json::{json, Value};

/// キャッシュを禁止させる場合のCache-Controlヘッダのテンプレート
const NO_CACHE_TEMPLATE: &str = concat!(
    "no-store, ",
    "no-cache, ",
    "must-revalidate, ",
    "max-age=0",
);

///
/// キャッシュ禁止ヘッダ付きのレスポンスビルダーを生成
///
fn no_cache(status: StatusCode) -> HttpResponseBuilder {
    let mut builder = HttpResponse::build(status);
    builder.insert_header((header::CACHE_CONTROL, NO_CACHE_TEMPLATE));
    builder
}

///
/// テキストボディでSuccess (200)を返す場合のレスポンスビルド関数
///
fn resp_200<S>(body: S) -> HttpResponse
where
    S: ToString,
{
    no_cache(StatusCode::OK)
        .content_type("text/plain")
        .body(body.to_string())
}

///
/// JSONボディでSuccess (200)を返す場合のレスポンスビルド関数
///
/// # 引数
/// * `body` - レスポンスのボディに設定するJSON値
///
fn resp_json(body: &Value) -> HttpResponse {
    resp_with_status(StatusCode::OK, body)
}

///
/// JSON形式のエラーレスポンスを返す場合のレスポンスビルド関数
///
/// # 引数
/// * `status` - ステータスコード
/// * `reason` - エラー理由(`{"reason": ...}`として返す)
///
fn resp_error_json<S>(status: StatusCode, reason: S) -> HttpResponse
where
    S: ToString,
{
    resp_with_status(status, &json!({ "reason": reason.to_string() }))
}

///
/// 任意のステータスでJSONボディを返す
///
fn resp_with_status(status: StatusCode, body: &Value) -> HttpResponse {
    no_cache(status)
        .content_type("application/json")
        .body(body.to_string())
}

///
/// REST APIエンドポイントの生成
///
pub(crate) fn create_api_scope() -> impl HttpServiceFactory {
    web::scope("/api")
        .route("/hello", web::get().to(hello::get))
        .route("/search", web::get().to(search::get))
}
