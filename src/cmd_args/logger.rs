/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ログ機能の初期化処理
//!

use std::sync::OnceLock;

use anyhow::{Context, Result};
use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming,
    detailed_format,
};

use super::{LogLevel, Options};

/// ログファイルのローテーションサイズ(4MiB)
const ROTATE_SIZE: u64 = 4 * 1024 * 1024;

/// 保持するローテーション済みログファイル数
const KEEP_LOG_FILES: usize = 5;

/// ロガーのハンドル(プロセス終了まで保持する)
static LOGGER_HANDLE: OnceLock<LoggerHandle> = OnceLock::new();

///
/// ログ機能の初期化
///
/// # 引数
/// * `opts` - オプション情報
///
/// # 戻り値
/// 初期化に成功した場合は`Ok(())`を返す。
///
/// # 注記
/// ログレベルに`NONE`が指定されている場合はロガーを起動しない。
///
pub(super) fn init(opts: &Options) -> Result<()> {
    let level = opts.log_level();

    if level == LogLevel::None {
        log::set_max_level(level.into());
        return Ok(());
    }

    /*
     * 出力先の準備
     */
    let dir = opts.log_output();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;

    /*
     * ロガーの起動
     */
    let duplicate = if opts.log_tee() {
        Duplicate::All
    } else {
        Duplicate::None
    };

    let handle = Logger::try_with_str(level.as_ref())?
        .log_to_file(
            FileSpec::default()
                .directory(&dir)
                .basename(env!("CARGO_PKG_NAME"))
                .suppress_timestamp()
        )
        .rotate(
            Criterion::Size(ROTATE_SIZE),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .append()
        .duplicate_to_stderr(duplicate)
        .format(detailed_format)
        .start()
        .context("start logger")?;

    let _ = LOGGER_HANDLE.set(handle);

    Ok(())
}
