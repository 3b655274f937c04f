/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 検索エンジンへ送るクエリオブジェクト
//!

use esadmin::paging::PagedQuery;
use serde_json::{json, Value};

///
/// 検索クエリ
///
#[derive(Clone, Debug)]
pub(crate) struct SearchQuery {
    /// 取得開始位置
    start: u64,

    /// 取得件数
    limit: u32,

    /// query句
    query: Value,
}

impl SearchQuery {
    ///
    /// 全件一致クエリの生成
    ///
    pub(crate) fn match_all() -> Self {
        Self::with_query(json!({ "match_all": {} }))
    }

    ///
    /// 検索式によるクエリの生成
    ///
    /// # 引数
    /// * `expression` - query_string形式の検索式
    ///
    pub(crate) fn query_string(expression: &str) -> Self {
        Self::with_query(json!({
            "query_string": { "query": expression }
        }))
    }

    fn with_query(query: Value) -> Self {
        Self { start: 0, limit: 0, query }
    }

    ///
    /// リクエストボディの生成
    ///
    pub(crate) fn to_body(&self) -> Value {
        json!({
            "from": self.start,
            "size": self.limit,
            "query": self.query,
            "track_total_hits": true,
        })
    }
}

// PagedQueryトレイトの実装
impl PagedQuery for SearchQuery {
    fn set_start(&mut self, start: u64) {
        self.start = start;
    }

    fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }
}
