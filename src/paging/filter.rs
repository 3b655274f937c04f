/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 検索処理に組み込むページングフィルタ
//!

use serde_json::{json, Value};

use super::paginator::build_page_descriptor;
use super::{PageRequest, PagingConfig, PagingError};

///
/// 取得範囲を受け取るクエリオブジェクトが実装するトレイト
///
pub trait PagedQuery {
    ///
    /// 取得開始位置の設定
    ///
    fn set_start(&mut self, start: u64);

    ///
    /// 取得件数の設定
    ///
    fn set_limit(&mut self, limit: u32);
}

///
/// ページングフィルタ
///
/// # 概要
/// 検索前にクエリへ取得範囲を設定し、検索後に結果からページ記述子を生成す
/// る。
///
#[derive(Clone, Copy, Debug)]
pub struct PagingFilter {
    config: PagingConfig,
    request: PageRequest,
}

impl PagingFilter {
    ///
    /// フィルタの生成
    ///
    /// # 引数
    /// * `config` - ページ件数の設定
    /// * `request` - ページング要求
    ///
    /// # 戻り値
    /// 生成したフィルタ
    ///
    pub fn new(config: PagingConfig, request: PageRequest) -> Self {
        Self { config, request }
    }

    ///
    /// クエリへの取得範囲の設定
    ///
    /// # 引数
    /// * `query` - 設定対象のクエリオブジェクト
    ///
    pub fn append_dsl<Q>(&self, query: &mut Q)
    where
        Q: PagedQuery + ?Sized,
    {
        let window = self.request.window(&self.config);
        query.set_start(window.offset());
        query.set_limit(window.limit());
    }

    ///
    /// 検索後処理
    ///
    /// # 概要
    /// 検索結果の`hits.total`を読み取り、`{"paginator": {...}}`形式のページ
    /// 情報を生成する。ページサイズには通常検索時の件数を用いる。
    ///
    /// # 引数
    /// * `results` - 検索エンジンが返した検索結果
    ///
    /// # 戻り値
    /// ページ情報を格納したJSON値
    ///
    pub fn post_search_hook(&self, results: &Value) -> Result<Value, PagingError> {
        let total = total_hits(results)?;
        let descriptor = build_page_descriptor(
            total,
            self.request.page(),
            self.config.items_per_page(),
        )?;

        Ok(json!({ "paginator": descriptor }))
    }
}

///
/// 検索結果からヒット総数を取り出す
///
/// # 概要
/// `hits.total`が数値の場合と`{"value": n}`形式の場合の両方を受け付ける。
///
/// # 引数
/// * `results` - 検索結果
///
/// # 戻り値
/// ヒット総数
///
pub fn total_hits(results: &Value) -> Result<u64, PagingError> {
    let total = &results["hits"]["total"];

    total.as_u64()
        .or_else(|| total["value"].as_u64())
        .ok_or(PagingError::MissingTotal)
}
