/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"index_resource_relations"の実装
//!

use anyhow::Result;

use crate::cmd_args::{IndexOpts, Options};
use crate::engine::client::EsClient;
use crate::engine::{connect, EngineConfig};
use crate::indexing::source::JsonLinesSource;
use crate::indexing::{BulkIndexer, BulkOptions};
use super::CommandContext;

///
/// "index_resource_relations"サブコマンドのコンテキスト情報
///
struct IndexResourceRelationsCommandContext {
    client: EsClient,
    config: EngineConfig,
    source: JsonLinesSource,
    options: BulkOptions,
}

impl IndexResourceRelationsCommandContext {
    fn new(opts: &Options, sub_opts: &IndexOpts) -> Result<Self> {
        let config = opts.engine_config();

        Ok(Self {
            client: connect(&config)?,
            config,
            source: JsonLinesSource::new(opts.data_dir()),
            options: sub_opts.bulk_options()?,
        })
    }
}

// トレイトCommandContextの実装
impl CommandContext for IndexResourceRelationsCommandContext {
    fn exec(&self) -> Result<()> {
        let count = BulkIndexer::new(
            &self.client,
            &self.source,
            &self.config,
            self.options,
        ).index_resource_relations()?;

        println!("{} resource relations indexed", count);
        Ok(())
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &IndexOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(IndexResourceRelationsCommandContext::new(opts, sub_opts)?))
}
