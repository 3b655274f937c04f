/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 一括登録する元データの読み出し
//!

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde_json::Value;

use super::EntityKind;

///
/// 一括登録の元データを提供するトレイト
///
pub(crate) trait RecordSource {
    ///
    /// 指定種別のレコードを全件読み出す
    ///
    /// # 引数
    /// * `entity` - 読み出すレコードの種別
    ///
    /// # 戻り値
    /// 読み出したレコードのリスト
    ///
    fn records(&self, entity: EntityKind) -> Result<Vec<Value>>;
}

///
/// JSON Lines形式のファイルからレコードを読み出すソース
///
/// # 注記
/// `<data_dir>/<entity>.jsonl`を1行1レコードとして読み込む。空行は読み飛ば
/// す。
///
pub(crate) struct JsonLinesSource {
    data_dir: PathBuf,
}

impl JsonLinesSource {
    pub(crate) fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    ///
    /// 種別に対応するファイルのパス
    ///
    pub(crate) fn file_path(&self, entity: EntityKind) -> PathBuf {
        self.data_dir.join(format!("{}.jsonl", entity.file_stem()))
    }
}

// RecordSourceトレイトの実装
impl RecordSource for JsonLinesSource {
    fn records(&self, entity: EntityKind) -> Result<Vec<Value>> {
        let path = self.file_path(entity);
        debug!("read records: {}", path.display());

        let file = File::open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        let mut records = Vec::new();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line
                .with_context(|| format!("read {}", path.display()))?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(line).map_err(|err| {
                anyhow!("{}:{}: {}", path.display(), index + 1, err)
            })?;
            records.push(value);
        }

        Ok(records)
    }
}
