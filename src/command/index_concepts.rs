/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"index_concepts"の実装
//!

use anyhow::Result;

use crate::cmd_args::{IndexOpts, Options};
use crate::engine::client::EsClient;
use crate::engine::{connect, EngineConfig};
use crate::indexing::source::JsonLinesSource;
use crate::indexing::{BulkIndexer, BulkOptions};
use super::CommandContext;

///
/// "index_concepts"サブコマンドのコンテキスト情報をパックした構造体
///
struct IndexConceptsCommandContext {
    client: EsClient,
    config: EngineConfig,
    source: JsonLinesSource,
    options: BulkOptions,
}

impl IndexConceptsCommandContext {
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
impl CommandContext for IndexConceptsCommandContext {
    fn exec(&self) -> Result<()> {
        let count = BulkIndexer::new(
            &self.client,
            &self.source,
            &self.config,
            self.options,
        ).index_concepts()?;

        println!("{} concepts indexed", count);
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
    Ok(Box::new(IndexConceptsCommandContext::new(opts, sub_opts)?))
}
