/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 検索エンジンとのやり取りを集約するモジュール
//!

pub(crate) mod client;
pub(crate) mod installer;
pub(crate) mod mappings;
pub(crate) mod query;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

/// 検索エンジンのデフォルトURL
pub(crate) const DEFAULT_ENGINE_URL: &str = "http://localhost:9200";

/// インデックス名のデフォルトプレフィクス
pub(crate) const DEFAULT_INDEX_PREFIX: &str = "arches";

/// 検索エンジンのデフォルトHTTPポート
pub(crate) const DEFAULT_HTTP_PORT: u16 = 9200;

/// 検索エンジン呼び出しのデフォルトタイムアウト(秒)
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// インデックス名で禁止する文字
const FORBIDDEN_INDEX_NAME_CHARS: &[char] = &[
    '\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':',
];

///
/// システムが必要とする固定インデックスの種別
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum IndexKind {
    /// 用語インデックス
    Terms,

    /// 概念インデックス
    Concepts,

    /// リソース間関連インデックス
    ResourceRelations,

    /// リソース検索インデックス
    Search,
}

impl IndexKind {
    ///
    /// プレフィクスを含まないインデックス名
    ///
    pub(crate) fn base_name(&self) -> &'static str {
        match self {
            Self::Terms => "terms",
            Self::Concepts => "concepts",
            Self::ResourceRelations => "resource_relations",
            Self::Search => "resources",
        }
    }
}

///
/// 一括登録する1件分の文書
///
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BulkDocument {
    /// 文書ID(未指定時はエンジン側で採番)
    id: Option<String>,

    /// 文書本体
    source: Value,
}

impl BulkDocument {
    ///
    /// 文書の生成
    ///
    pub(crate) fn new(id: Option<String>, source: Value) -> Self {
        Self { id, source }
    }

    ///
    /// 文書IDへのアクセサ
    ///
    pub(crate) fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    ///
    /// 文書本体へのアクセサ
    ///
    pub(crate) fn source(&self) -> &Value {
        &self.source
    }
}

///
/// 検索エンジンの操作を抽象化するトレイト
///
/// # 注記
/// 引数のインデックス名はプレフィクス適用済みの物理名とする。
///
pub(crate) trait SearchEngine: Send + Sync {
    ///
    /// インデックスの作成
    ///
    fn create_index(&self, name: &str, body: &Value) -> Result<()>;

    ///
    /// インデックスの削除
    ///
    fn delete_index(&self, name: &str) -> Result<()>;

    ///
    /// インデックス内の全文書の削除
    ///
    fn clear_index(&self, name: &str) -> Result<()>;

    ///
    /// 文書の一括登録
    ///
    /// # 戻り値
    /// 登録した件数を返す。
    ///
    fn bulk_index(&self, name: &str, docs: &[BulkDocument]) -> Result<usize>;

    ///
    /// 検索の実行
    ///
    /// # 戻り値
    /// 検索エンジンが返したレスポンスボディを返す。
    ///
    fn search(&self, name: &str, body: &Value) -> Result<Value>;
}

///
/// 検索エンジン接続に関する設定情報
///
#[derive(Clone, Debug)]
pub(crate) struct EngineConfig {
    /// 検索エンジンのURL
    url: String,

    /// インデックス名のプレフィクス
    index_prefix: String,

    /// リクエストのタイムアウト
    timeout: Duration,

    /// マッピング定義ファイルの格納ディレクトリ
    mappings_dir: Option<PathBuf>,

    /// 設定で宣言されたカスタムインデックス名の一覧
    custom_indexes: Vec<String>,
}

impl EngineConfig {
    ///
    /// 設定情報の生成
    ///
    pub(crate) fn new(
        url: String,
        index_prefix: String,
        timeout: Duration,
        mappings_dir: Option<PathBuf>,
        custom_indexes: Vec<String>,
    ) -> Self {
        Self {
            url,
            index_prefix,
            timeout,
            mappings_dir,
            custom_indexes,
        }
    }

    ///
    /// 検索エンジンのURLへのアクセサ
    ///
    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    ///
    /// タイムアウトへのアクセサ
    ///
    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    ///
    /// マッピング定義ディレクトリへのアクセサ
    ///
    pub(crate) fn mappings_dir(&self) -> Option<&PathBuf> {
        self.mappings_dir.as_ref()
    }

    ///
    /// カスタムインデックス名一覧へのアクセサ
    ///
    pub(crate) fn custom_indexes(&self) -> &[String] {
        &self.custom_indexes
    }

    ///
    /// プレフィクスを適用した物理インデックス名の生成
    ///
    /// # 引数
    /// * `base` - プレフィクスを含まないインデックス名
    ///
    /// # 戻り値
    /// `{prefix}_{base}`形式のインデックス名。プレフィクスが空の場合は`base`
    /// をそのまま返す。
    ///
    pub(crate) fn index_name(&self, base: &str) -> String {
        if self.index_prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}_{}", self.index_prefix, base)
        }
    }
}

///
/// 検索エンジンクライアントの生成
///
/// # 引数
/// * `config` - 接続設定
///
/// # 戻り値
/// 生成したクライアントを返す。
///
pub(crate) fn connect(config: &EngineConfig) -> Result<client::EsClient> {
    client::EsClient::new(config.url(), config.timeout())
}

///
/// インデックス名の妥当性チェック
///
/// # 引数
/// * `name` - 対象のインデックス名
///
/// # 戻り値
/// 検証に成功した場合は`Ok(())`を返す。
///
pub(crate) fn validate_index_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("index name is empty");
    }

    if name == "." || name == ".." {
        return Err("index name must not be '.' or '..'");
    }

    if name.starts_with(['-', '_', '+']) {
        return Err("index name must not start with '-', '_' or '+'");
    }

    if name.chars().any(|ch| ch.is_uppercase()) {
        return Err("index name must be lowercase");
    }

    if name.chars().any(|ch| FORBIDDEN_INDEX_NAME_CHARS.contains(&ch)) {
        return Err("index name contains invalid character");
    }

    Ok(())
}
