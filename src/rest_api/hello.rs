/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! API HELLOの実装を行うモジュール
//!

use actix_web::HttpResponse;

use super::resp_200;

///
/// GET /api/hello の実体
///
/// # 概要
/// 動作確認用APIとして、単純に文字列"hello"を返す
///
/// # APIレスポンスの種別
/// text/plain
///
pub async fn get() -> actix_web::Result<HttpResponse> {
    Ok(resp_200("hello"))
}
