/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 検索インデックスへの一括登録処理
//!

pub(crate) mod source;

use anyhow::{Result, anyhow};
use log::info;
use serde_json::Value;

use crate::engine::{BulkDocument, EngineConfig, IndexKind, SearchEngine};
use source::RecordSource;

/// 一括登録のデフォルトバッチサイズ
pub(crate) const DEFAULT_BATCH_SIZE: usize = 2000;

///
/// 一括登録対象のレコード種別
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntityKind {
    /// 概念
    Concepts,

    /// リソース
    Resources,

    /// リソース間関連
    ResourceRelations,
}

impl EntityKind {
    ///
    /// 登録先の固定インデックス
    ///
    pub(crate) fn index_kind(&self) -> IndexKind {
        match self {
            Self::Concepts => IndexKind::Concepts,
            Self::Resources => IndexKind::Search,
            Self::ResourceRelations => IndexKind::ResourceRelations,
        }
    }

    ///
    /// 文書IDとして使用するフィールド名
    ///
    pub(crate) fn id_field(&self) -> &'static str {
        match self {
            Self::Concepts => "conceptid",
            Self::Resources => "resourceinstanceid",
            Self::ResourceRelations => "resourcexid",
        }
    }

    ///
    /// 元データファイルのファイル名(拡張子なし)
    ///
    pub(crate) fn file_stem(&self) -> &'static str {
        match self {
            Self::Concepts => "concepts",
            Self::Resources => "resources",
            Self::ResourceRelations => "resource_relations",
        }
    }
}

///
/// 一括登録のオプション
///
#[derive(Clone, Copy, Debug)]
pub(crate) struct BulkOptions {
    /// 1回のリクエストで送信するレコード数
    batch_size: usize,

    /// 登録前にインデックスを空にするか否か
    clear_index: bool,
}

impl BulkOptions {
    ///
    /// オプションの生成
    ///
    /// # 引数
    /// * `batch_size` - バッチサイズ(1以上)
    /// * `clear_index` - 登録前にインデックスを空にするか否か
    ///
    pub(crate) fn new(batch_size: usize, clear_index: bool) -> Result<Self> {
        if batch_size == 0 {
            return Err(anyhow!("batch size must be greater than 0"));
        }

        Ok(Self { batch_size, clear_index })
    }

    pub(crate) fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub(crate) fn clear_index(&self) -> bool {
        self.clear_index
    }
}

///
/// 一括登録処理
///
pub(crate) struct BulkIndexer<'a> {
    engine: &'a dyn SearchEngine,
    source: &'a dyn RecordSource,
    config: &'a EngineConfig,
    options: BulkOptions,
}

impl<'a> BulkIndexer<'a> {
    ///
    /// 処理オブジェクトの生成
    ///
    /// # 引数
    /// * `engine` - 登録先の検索エンジン
    /// * `source` - 元データ
    /// * `config` - 接続設定(インデックス名の解決に使用)
    /// * `options` - 一括登録オプション
    ///
    pub(crate) fn new(
        engine: &'a dyn SearchEngine,
        source: &'a dyn RecordSource,
        config: &'a EngineConfig,
        options: BulkOptions,
    ) -> Self {
        Self { engine, source, config, options }
    }

    ///
    /// 全データの登録
    ///
    /// # 概要
    /// 概念、リソース、リソース間関連の順に登録する。
    ///
    /// # 戻り値
    /// 登録した総件数を返す。
    ///
    pub(crate) fn index_db(&self) -> Result<usize> {
        let mut total = 0;

        total += self.index_concepts()?;
        total += self.index_resources(None)?;
        total += self.index_resource_relations()?;

        info!("database indexed: {} documents", total);
        Ok(total)
    }

    ///
    /// 概念データの登録
    ///
    pub(crate) fn index_concepts(&self) -> Result<usize> {
        self.index_entity(EntityKind::Concepts, None)
    }

    ///
    /// リソースデータの登録
    ///
    /// # 引数
    /// * `index_name` - 登録先のカスタムインデックス名。`None`の場合は検索
    ///   インデックスに登録する。
    ///
    pub(crate) fn index_resources(&self, index_name: Option<&str>)
        -> Result<usize>
    {
        self.index_entity(EntityKind::Resources, index_name)
    }

    ///
    /// リソース間関連データの登録
    ///
    pub(crate) fn index_resource_relations(&self) -> Result<usize> {
        self.index_entity(EntityKind::ResourceRelations, None)
    }

    ///
    /// 種別毎の登録処理(共通処理)
    ///
    fn index_entity(&self, entity: EntityKind, index_name: Option<&str>)
        -> Result<usize>
    {
        let base = index_name.unwrap_or(entity.index_kind().base_name());
        let target = self.config.index_name(base);

        /*
         * 元データの読み込み
         */
        let records = self.source.records(entity)?;

        /*
         * 既存文書の削除
         */
        if self.options.clear_index() {
            self.engine.clear_index(&target)?;
        }

        /*
         * バッチ単位での送信
         */
        let total = records.len();
        let mut indexed = 0;

        for chunk in records.chunks(self.options.batch_size()) {
            let docs: Vec<BulkDocument> = chunk
                .iter()
                .map(|record| to_document(entity, record))
                .collect();

            indexed += self.engine.bulk_index(&target, &docs)?;
            info!("{}: {}/{} indexed", target, indexed, total);
        }

        info!("{} indexed into {}: {} documents", entity.file_stem(), target, indexed);
        Ok(indexed)
    }
}

///
/// レコードから登録用文書への変換
///
/// # 注記
/// ID用フィールドが文字列または数値の場合のみ文書IDとして採用する。
///
fn to_document(entity: EntityKind, record: &Value) -> BulkDocument {
    let id = match &record[entity.id_field()] {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    };

    BulkDocument::new(id, record.clone())
}
