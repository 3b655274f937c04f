/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"index_database"の実装
//!

use anyhow::Result;

use crate::cmd_args::{NamedIndexOpts, Options};
use crate::engine::client::EsClient;
use crate::engine::{connect, EngineConfig};
use crate::indexing::source::JsonLinesSource;
use crate::indexing::{BulkIndexer, BulkOptions};
use super::CommandContext;

///
/// "index_database"サブコマンドのコンテキスト情報をパックした構造体
///
struct IndexDatabaseCommandContext {
    client: EsClient,
    config: EngineConfig,

    /// 元データ
    source: JsonLinesSource,

    /// 一括登録オプション
    options: BulkOptions,

    /// 登録先のカスタムインデックス名
    name: Option<String>,
}

impl IndexDatabaseCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options, sub_opts: &NamedIndexOpts) -> Result<Self> {
        let config = opts.engine_config();

        Ok(Self {
            client: connect(&config)?,
            config,
            source: JsonLinesSource::new(opts.data_dir()),
            options: sub_opts.bulk().bulk_options()?,
            name: sub_opts.name(),
        })
    }
}

// トレイトCommandContextの実装
impl CommandContext for IndexDatabaseCommandContext {
    fn exec(&self) -> Result<()> {
        let indexer = BulkIndexer::new(
            &self.client,
            &self.source,
            &self.config,
            self.options,
        );

        // インデックス名が指定された場合はリソースのみをそのインデックスへ
        // 登録する
        let count = match self.name.as_deref() {
            Some(name) => indexer.index_resources(Some(name))?,
            None => indexer.index_db()?,
        };

        println!("{} documents indexed", count);
        Ok(())
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &NamedIndexOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(IndexDatabaseCommandContext::new(opts, sub_opts)?))
}
