/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! HTTPサーバが共有する状態をまとめたモジュール
//!

use std::sync::Arc;

use crate::engine::{EngineConfig, IndexKind, SearchEngine};
use esadmin::paging::PagingConfig;

///
/// HTTPサーバの共有状態
///
pub(crate) struct AppState {
    /// 検索エンジン
    engine: Arc<dyn SearchEngine>,

    /// 検索エンジン接続設定
    engine_config: EngineConfig,

    /// ページング設定
    paging_config: PagingConfig,
}

impl AppState {
    ///
    /// 共有状態オブジェクトの生成
    ///
    /// # 引数
    /// * `engine` - 検索エンジン
    /// * `engine_config` - 接続設定(インデックス名の解決に使用)
    /// * `paging_config` - ページング設定
    ///
    /// # 戻り値
    /// 生成したオブジェクトを返す。
    ///
    pub(crate) fn new(
        engine: Arc<dyn SearchEngine>,
        engine_config: EngineConfig,
        paging_config: PagingConfig,
    ) -> Self {
        Self { engine, engine_config, paging_config }
    }

    ///
    /// 検索エンジンへのアクセサ
    ///
    /// # 戻り値
    /// ブロッキングスレッドへ渡せるよう共有参照を複製して返す。
    ///
    pub(crate) fn engine(&self) -> Arc<dyn SearchEngine> {
        self.engine.clone()
    }

    ///
    /// ページング設定へのアクセサ
    ///
    pub(crate) fn paging_config(&self) -> PagingConfig {
        self.paging_config
    }

    ///
    /// 検索対象インデックスの物理名
    ///
    pub(crate) fn search_index(&self) -> String {
        self.engine_config.index_name(IndexKind::Search.base_name())
    }
}
