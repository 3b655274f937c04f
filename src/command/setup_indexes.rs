/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"setup_indexes"の実装
//!

use anyhow::Result;

use crate::cmd_args::Options;
use crate::engine::client::EsClient;
use crate::engine::mappings::IndexMappings;
use crate::engine::{connect, EngineConfig};
use super::CommandContext;

///
/// "setup_indexes"サブコマンドのコンテキスト情報をパックした構造体
///
struct SetupIndexesCommandContext {
    client: EsClient,
    config: EngineConfig,
}

impl SetupIndexesCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options) -> Result<Self> {
        let config = opts.engine_config();

        Ok(Self {
            client: connect(&config)?,
            config,
        })
    }
}

// トレイトCommandContextの実装
impl CommandContext for SetupIndexesCommandContext {
    fn exec(&self) -> Result<()> {
        IndexMappings::new(&self.client, &self.config).setup_indexes()
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(opts: &Options)
    -> Result<Box<dyn CommandContext>>
{
    Ok(Box::new(SetupIndexesCommandContext::new(opts)?))
}
