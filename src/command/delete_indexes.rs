/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"delete_indexes"の実装
//!

use anyhow::Result;

use crate::cmd_args::Options;
use crate::engine::client::EsClient;
use crate::engine::mappings::IndexMappings;
use crate::engine::{connect, EngineConfig};
use super::CommandContext;

///
/// "delete_indexes"サブコマンドのコンテキスト情報をパックした構造体
///
struct DeleteIndexesCommandContext {
    client: EsClient,
    config: EngineConfig,
}

impl DeleteIndexesCommandContext {
    fn new(opts: &Options) -> Result<Self> {
        let config = opts.engine_config();

        Ok(Self {
            client: connect(&config)?,
            config,
        })
    }
}

// トレイトCommandContextの実装
impl CommandContext for DeleteIndexesCommandContext {
    fn exec(&self) -> Result<()> {
        IndexMappings::new(&self.client, &self.config).delete_indexes()
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(opts: &Options)
    -> Result<Box<dyn CommandContext>>
{
    Ok(Box::new(DeleteIndexesCommandContext::new(opts)?))
}
