/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"delete_index"の実装
//!

use anyhow::Result;

use crate::cmd_args::{IndexNameOpts, Options};
use crate::engine::client::EsClient;
use crate::engine::mappings::IndexMappings;
use crate::engine::{connect, EngineConfig};
use super::CommandContext;

///
/// "delete_index"サブコマンドのコンテキスト情報をパックした構造体
///
struct DeleteIndexCommandContext {
    client: EsClient,
    config: EngineConfig,
    name: String,
}

impl DeleteIndexCommandContext {
    fn new(opts: &Options, sub_opts: &IndexNameOpts) -> Result<Self> {
        let config = opts.engine_config();

        Ok(Self {
            client: connect(&config)?,
            config,
            name: sub_opts.name(),
        })
    }
}

// トレイトCommandContextの実装
impl CommandContext for DeleteIndexCommandContext {
    fn exec(&self) -> Result<()> {
        IndexMappings::new(&self.client, &self.config)
            .remove_index(&self.name)
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &IndexNameOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(DeleteIndexCommandContext::new(opts, sub_opts)?))
}
