/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンドrunの実装
//!

use std::sync::Arc;

use anyhow::Result;

use crate::cmd_args::{Options, RunOpts};
use crate::engine::{connect, EngineConfig};
use crate::http_server;
use crate::http_server::app_state::AppState;
use esadmin::paging::PagingConfig;
use super::CommandContext;

///
/// runサブコマンドのコンテキスト情報をパックした構造体
///
struct RunCommandContext {
    /// バインド先のアドレス
    bind_addr: String,

    /// バインド先のポート番号
    bind_port: u16,

    /// 検索エンジン接続設定
    engine_config: EngineConfig,

    /// ページング設定
    paging_config: PagingConfig,
}

impl RunCommandContext {
    ///
    /// オブジェクトの生成
    ///
    fn new(opts: &Options, sub_opts: &RunOpts) -> Result<Self> {
        Ok(Self {
            bind_addr: sub_opts.bind_addr(),
            bind_port: sub_opts.bind_port(),
            engine_config: opts.engine_config(),
            paging_config: opts.paging_config(),
        })
    }
}

// トレイトCommandContextの実装
impl CommandContext for RunCommandContext {
    fn exec(&self) -> Result<()> {
        /*
         * 検索エンジンクライアントの生成
         */
        let client = connect(&self.engine_config)?;

        /*
         * 共有状態の構築
         */
        let state = AppState::new(
            Arc::new(client),
            self.engine_config.clone(),
            self.paging_config,
        );

        /*
         * HTTPサーバの起動
         */
        http_server::run(self.bind_addr.clone(), self.bind_port, state)
    }
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(opts: &Options, sub_opts: &RunOpts)
    -> Result<Box<dyn CommandContext>>
{
    Ok(Box::new(RunCommandContext::new(opts, sub_opts)?))
}
