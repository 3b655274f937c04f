/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! インデックスマッピングの作成・削除を行うモジュール
//!

use std::fs;

use anyhow::{Context, Result};
use log::{debug, info};
use serde_json::{json, Value};

use super::{EngineConfig, IndexKind, SearchEngine};

/// setup_indexesで作成する固定インデックス(作成順)
const SETUP_ORDER: [IndexKind; 4] = [
    IndexKind::Terms,
    IndexKind::Concepts,
    IndexKind::ResourceRelations,
    IndexKind::Search,
];

/// delete_indexesで削除する固定インデックス(削除順)
const DELETE_ORDER: [IndexKind; 4] = [
    IndexKind::Terms,
    IndexKind::Concepts,
    IndexKind::Search,
    IndexKind::ResourceRelations,
];

///
/// インデックスマッピング操作
///
pub(crate) struct IndexMappings<'a> {
    engine: &'a dyn SearchEngine,
    config: &'a EngineConfig,
}

impl<'a> IndexMappings<'a> {
    ///
    /// 操作オブジェクトの生成
    ///
    /// # 引数
    /// * `engine` - 検索エンジン
    /// * `config` - 接続設定
    ///
    /// # 戻り値
    /// 生成したオブジェクト
    ///
    pub(crate) fn new(
        engine: &'a dyn SearchEngine,
        config: &'a EngineConfig,
    ) -> Self {
        Self { engine, config }
    }

    ///
    /// 固定インデックスの作成
    ///
    pub(crate) fn prepare_index(&self, kind: IndexKind) -> Result<()> {
        self.create(kind.base_name())
    }

    ///
    /// 固定インデックスの削除
    ///
    pub(crate) fn delete_index(&self, kind: IndexKind) -> Result<()> {
        self.engine.delete_index(&self.config.index_name(kind.base_name()))
    }

    ///
    /// カスタムインデックスの登録
    ///
    /// # 引数
    /// * `name` - カスタムインデックス名(プレフィクスなし)
    ///
    pub(crate) fn register_index(&self, name: &str) -> Result<()> {
        self.create(name)
    }

    ///
    /// カスタムインデックスの削除
    ///
    /// # 引数
    /// * `name` - カスタムインデックス名(プレフィクスなし)
    ///
    pub(crate) fn remove_index(&self, name: &str) -> Result<()> {
        self.engine.delete_index(&self.config.index_name(name))
    }

    ///
    /// システムが必要とする全インデックスの作成
    ///
    /// # 概要
    /// 固定インデックス4種を作成した後、設定で宣言されたカスタムインデックス
    /// を宣言順に登録する。途中で失敗した場合はその時点でエラーを返す。
    ///
    pub(crate) fn setup_indexes(&self) -> Result<()> {
        for kind in SETUP_ORDER {
            self.prepare_index(kind)?;
        }

        for name in self.config.custom_indexes() {
            self.register_index(name)?;
        }

        Ok(())
    }

    ///
    /// システムが必要とする全インデックスの削除
    ///
    pub(crate) fn delete_indexes(&self) -> Result<()> {
        for kind in DELETE_ORDER {
            self.delete_index(kind)?;
        }

        for name in self.config.custom_indexes() {
            self.remove_index(name)?;
        }

        Ok(())
    }

    ///
    /// インデックスの作成(共通処理)
    ///
    fn create(&self, base: &str) -> Result<()> {
        let body = self.mapping_body(base)?;
        let name = self.config.index_name(base);
        info!("prepare index: {}", name);
        self.engine.create_index(&name, &body)
    }

    ///
    /// マッピング定義の読み込み
    ///
    /// # 概要
    /// マッピング定義ディレクトリに`<base>.json`が存在すればその内容を、存在
    /// しなければ空のオブジェクトを返す。
    ///
    fn mapping_body(&self, base: &str) -> Result<Value> {
        let dir = match self.config.mappings_dir() {
            Some(dir) => dir,
            None => return Ok(json!({})),
        };

        let path = dir.join(format!("{}.json", base));
        if !path.is_file() {
            debug!("mapping file not found: {}", path.display());
            return Ok(json!({}));
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parse {}", path.display()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use anyhow::anyhow;
    use tempfile::TempDir;

    use super::*;
    use crate::engine::BulkDocument;

    ///
    /// 呼び出しを記録するテスト用エンジン
    ///
    #[derive(Default)]
    pub(crate) struct RecordingEngine {
        pub(crate) calls: Mutex<Vec<String>>,
        pub(crate) bodies: Mutex<Vec<Value>>,
        pub(crate) bulk: Mutex<Vec<(String, Vec<BulkDocument>)>>,
        pub(crate) fail_on: Option<String>,
    }

    impl RecordingEngine {
        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }

        fn record(&self, call: String) -> Result<()> {
            let failed = self.fail_on.as_deref() == Some(call.as_str());
            self.calls.lock().expect("lock").push(call);
            if failed {
                return Err(anyhow!("injected failure"));
            }
            Ok(())
        }
    }

    impl SearchEngine for RecordingEngine {
        fn create_index(&self, name: &str, body: &Value) -> Result<()> {
            self.bodies.lock().expect("lock").push(body.clone());
            self.record(format!("create {}", name))
        }

        fn delete_index(&self, name: &str) -> Result<()> {
            self.record(format!("delete {}", name))
        }

        fn clear_index(&self, name: &str) -> Result<()> {
            self.record(format!("clear {}", name))
        }

        fn bulk_index(&self, name: &str, docs: &[BulkDocument])
            -> Result<usize>
        {
            self.record(format!("bulk {} {}", name, docs.len()))?;
            self.bulk
                .lock()
                .expect("lock")
                .push((name.to_string(), docs.to_vec()));
            Ok(docs.len())
        }

        fn search(&self, name: &str, _body: &Value) -> Result<Value> {
            self.record(format!("search {}", name))?;
            Ok(json!({ "hits": { "total": 0, "hits": [] } }))
        }
    }

    pub(crate) fn engine_config(custom: &[&str]) -> EngineConfig {
        EngineConfig::new(
            "http://localhost:9200".to_string(),
            "arches".to_string(),
            Duration::from_secs(30),
            None,
            custom.iter().map(|name| name.to_string()).collect(),
        )
    }

    #[test]
    fn setup_creates_each_fixed_index_once_then_custom() {
        let engine = RecordingEngine::default();
        let config = engine_config(&["alpha", "beta"]);
        IndexMappings::new(&engine, &config)
            .setup_indexes()
            .expect("setup failed");

        assert_eq!(
            engine.calls(),
            vec![
                "create arches_terms",
                "create arches_concepts",
                "create arches_resource_relations",
                "create arches_resources",
                "create arches_alpha",
                "create arches_beta",
            ]
        );
    }

    #[test]
    fn delete_removes_fixed_then_custom() {
        let engine = RecordingEngine::default();
        let config = engine_config(&["alpha"]);
        IndexMappings::new(&engine, &config)
            .delete_indexes()
            .expect("delete failed");

        assert_eq!(
            engine.calls(),
            vec![
                "delete arches_terms",
                "delete arches_concepts",
                "delete arches_resources",
                "delete arches_resource_relations",
                "delete arches_alpha",
            ]
        );
    }

    #[test]
    fn setup_stops_at_first_failure() {
        let engine = RecordingEngine {
            fail_on: Some("create arches_concepts".to_string()),
            ..Default::default()
        };
        let config = engine_config(&["alpha"]);
        let result = IndexMappings::new(&engine, &config).setup_indexes();

        assert!(result.is_err());
        assert_eq!(
            engine.calls(),
            vec!["create arches_terms", "create arches_concepts"]
        );
    }

    #[test]
    fn mapping_body_is_read_from_mappings_dir() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(
            dir.path().join("terms.json"),
            r#"{"mappings":{"properties":{"value":{"type":"text"}}}}"#,
        )
        .expect("write failed");

        let config = EngineConfig::new(
            "http://localhost:9200".to_string(),
            "arches".to_string(),
            Duration::from_secs(30),
            Some(dir.path().to_path_buf()),
            Vec::new(),
        );
        let engine = RecordingEngine::default();
        let mappings = IndexMappings::new(&engine, &config);
        mappings.prepare_index(IndexKind::Terms).expect("terms failed");
        mappings.prepare_index(IndexKind::Concepts).expect("concepts failed");

        let bodies = engine.bodies.lock().expect("lock").clone();
        assert_eq!(
            bodies[0]["mappings"]["properties"]["value"]["type"],
            "text"
        );
        assert_eq!(bodies[1], json!({}));
    }
}
