/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"install"の実装
//!

use anyhow::Result;

use crate::cmd_args::{InstallOpts, Options};
use crate::engine::installer::{self, InstallConfig};
use super::CommandContext;

///
/// "install"サブコマンドのコンテキスト情報をパックした構造体
///
struct InstallCommandContext {
    /// インストール設定
    config: InstallConfig,
}

impl InstallCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(_opts: &Options, sub_opts: &InstallOpts) -> Result<Self> {
        Ok(Self {
            config: sub_opts.install_config(),
        })
    }
}

// トレイトCommandContextの実装
impl CommandContext for InstallCommandContext {
    fn exec(&self) -> Result<()> {
        let home = installer::install(&self.config)?;
        println!("Elasticsearch installed at {}", home.display());
        Ok(())
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    opts: &Options,
    sub_opts: &InstallOpts,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(InstallCommandContext::new(opts, sub_opts)?))
}
