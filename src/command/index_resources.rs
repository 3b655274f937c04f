/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"index_resources"の実装
//!

use anyhow::Result;

use crate::cmd_args::{NamedIndexOpts, Options};
use crate::engine::client::EsClient;
use crate::engine::{connect, EngineConfig};
use crate::indexing::source::JsonLinesSource;
use crate::indexing::{BulkIndexer, BulkOptions};
use super::CommandContext;

///
/// "index_resources"サブコマンドのコンテキスト情報をパックした構造体
///
struct IndexResourcesCommandContext {
    client: EsClient,
    config: EngineConfig,
    source: JsonLinesSource,
    options: BulkOptions,

    /// 登録先のカスタムインデックス名(未指定時は検索インデックス)
    name: Option<String>,
}

impl IndexResourcesCommandContext {
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
impl CommandContext for IndexResourcesCommandContext {
    fn exec(&self) -> Result<()> {
        let count = BulkIndexer::new(
            &self.client,
            &self.source,
            &self.config,
            self.options,
        ).index_resources(self.name.as_deref())?;

        println!("{} resources indexed", count);
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
    Ok(Box::new(IndexResourcesCommandContext::new(opts, sub_opts)?))
}
