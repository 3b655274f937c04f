/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! サブコマンドの処理を提供するモジュール
//!

pub(crate) mod add_index;
pub(crate) mod commands;
pub(crate) mod delete_index;
pub(crate) mod delete_indexes;
pub(crate) mod index_concepts;
pub(crate) mod index_database;
pub(crate) mod index_resource_relations;
pub(crate) mod index_resources;
pub(crate) mod install;
pub(crate) mod run;
pub(crate) mod setup_indexes;

use anyhow::Result;

///
/// コマンドコンテキスト集約するトレイト
///
pub(crate) trait CommandContext {
    ///
    /// サブコマンドの実行
    ///
    fn exec(&self) -> Result<()>;
}
