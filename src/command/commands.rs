/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンド"commands"の実装
//!

use anyhow::Result;
use clap::CommandFactory;

use crate::cmd_args::Options;
use super::CommandContext;

///
/// "commands"サブコマンドのコンテキスト情報をパックした構造体
///
struct CommandsCommandContext;

// CommandContextの実装
impl CommandContext for CommandsCommandContext {
    fn exec(&self) -> Result<()> {
        for (name, description) in command_list(&Options::command()) {
            println!("{:<26} {}", name, description);
        }

        Ok(())
    }
}

///
/// サブコマンド名と説明の一覧を取得する
///
/// # 引数
/// * `root` - ルートコマンドの定義
///
/// # 戻り値
/// 定義順に並べたサブコマンド名と説明の組
///
fn command_list(root: &clap::Command) -> Vec<(String, String)> {
    root.get_subcommands()
        .filter(|sub| sub.get_name() != "help")
        .map(|sub| {
            let description = sub
                .get_about()
                .map(|value| value.to_string())
                .unwrap_or_default();

            (sub.get_name().to_string(), description)
        })
        .collect()
}

///
/// コマンドコンテキストの生成
///
pub(crate) fn build_context(
    _opts: &Options,
) -> Result<Box<dyn CommandContext>> {
    Ok(Box::new(CommandsCommandContext))
}
