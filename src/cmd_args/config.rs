/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! コンフィギュレーション情報の定義
//!

use std::default::Default;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::{default_cache_path, default_log_path, LogLevel};
use crate::engine::installer::DEFAULT_DOWNLOAD_URL;
use crate::engine::{
    DEFAULT_ENGINE_URL, DEFAULT_HTTP_PORT, DEFAULT_INDEX_PREFIX,
    DEFAULT_TIMEOUT_SECS,
};
use crate::indexing::DEFAULT_BATCH_SIZE;
use esadmin::paging::{DEFAULT_EXPORT_ITEMS_PER_PAGE, DEFAULT_ITEMS_PER_PAGE};

///
/// コンフィギュレーションデータを集約する構造体
///
#[derive(Debug, Deserialize, Serialize)]
pub(super) struct Config {
    #[serde(skip)]
    config_path: Option<PathBuf>,

    /// グローバルオプションに対する情報
    global: Option<GlobalInfo>,

    /// 検索エンジン接続の設定
    engine: Option<EngineInfo>,

    /// installサブコマンド用の設定
    install: Option<InstallInfo>,

    /// index_*サブコマンド用の設定
    indexing: Option<IndexingInfo>,

    /// 検索結果のページング設定
    search: Option<SearchInfo>,

    /// runサブコマンド用の設定
    run: Option<RunInfo>,
}

impl Config {
    ///
    /// グローバル設定のログレベルを更新
    ///
    pub(super) fn set_log_level(&mut self, level: LogLevel) {
        self.ensure_global().log_level = Some(level);
    }

    ///
    /// グローバル設定のログ出力先を更新
    ///
    pub(super) fn set_log_output(&mut self, path: PathBuf) {
        self.ensure_global().log_output = Some(path);
    }

    ///
    /// 検索エンジンのURLを更新
    ///
    pub(super) fn set_engine_url(&mut self, url: String) {
        self.ensure_engine().url = Some(url);
    }

    ///
    /// インデックス名プレフィクスを更新
    ///
    pub(super) fn set_index_prefix(&mut self, prefix: String) {
        self.ensure_engine().index_prefix = Some(prefix);
    }

    ///
    /// installサブコマンドのインストール先を更新
    ///
    pub(super) fn set_install_dest_dir(&mut self, path: PathBuf) {
        self.ensure_install().dest_dir = Some(path);
    }

    ///
    /// installサブコマンドのHTTPポートを更新
    ///
    pub(super) fn set_install_port(&mut self, port: u16) {
        self.ensure_install().port = Some(port);
    }

    ///
    /// installサブコマンドの開発モード指定を更新
    ///
    pub(super) fn set_install_dev_mode(&mut self, dev_mode: bool) {
        self.ensure_install().dev_mode = Some(dev_mode);
    }

    ///
    /// 一括登録のバッチサイズを更新
    ///
    pub(super) fn set_indexing_batch_size(&mut self, size: usize) {
        self.ensure_indexing().batch_size = Some(size);
    }

    ///
    /// 一括登録前のインデックス消去指定を更新
    ///
    pub(super) fn set_indexing_clear_index(&mut self, clear: bool) {
        self.ensure_indexing().clear_index = Some(clear);
    }

    ///
    /// runサブコマンドのバインドアドレスを更新
    ///
    pub(super) fn set_run_bind_addr(&mut self, addr: String) {
        self.ensure_run().bind_addr = Some(addr);
    }

    ///
    /// runサブコマンドのバインドポートを更新
    ///
    pub(super) fn set_run_bind_port(&mut self, port: u16) {
        self.ensure_run().bind_port = Some(port);
    }

    ///
    /// ログレベルへのアクセサ
    ///
    pub(super) fn log_level(&self) -> Option<LogLevel> {
        self.global
            .as_ref()
            .and_then(|global| global.log_level)
    }

    ///
    /// ログ出力先へのアクセサ
    ///
    pub(super) fn log_output(&self) -> Option<PathBuf> {
        self.global
            .as_ref()
            .and_then(|global| global.log_output.as_ref())
            .map(|path| self.resolve_path(path))
    }

    ///
    /// 検索エンジンのURLへのアクセサ
    ///
    pub(super) fn engine_url(&self) -> Option<String> {
        self.engine
            .as_ref()
            .and_then(|engine| engine.url.clone())
    }

    ///
    /// インデックス名プレフィクスへのアクセサ
    ///
    pub(super) fn index_prefix(&self) -> Option<String> {
        self.engine
            .as_ref()
            .and_then(|engine| engine.index_prefix.clone())
    }

    ///
    /// 検索エンジン呼び出しのタイムアウト(秒)へのアクセサ
    ///
    pub(super) fn engine_timeout(&self) -> Option<u64> {
        self.engine
            .as_ref()
            .and_then(|engine| engine.timeout)
    }

    ///
    /// マッピング定義ディレクトリへのアクセサ
    ///
    pub(super) fn mappings_dir(&self) -> Option<PathBuf> {
        self.engine
            .as_ref()
            .and_then(|engine| engine.mappings_dir.as_ref())
            .map(|path| self.resolve_path(path))
    }

    ///
    /// カスタムインデックス名一覧へのアクセサ
    ///
    /// # 戻り値
    /// 設定ファイルでの宣言順にインデックス名を返す。
    ///
    pub(super) fn custom_indexes(&self) -> Vec<String> {
        self.engine
            .as_ref()
            .and_then(|engine| engine.custom_indexes.as_ref())
            .map(|list| list.iter().map(|index| index.name.clone()).collect())
            .unwrap_or_default()
    }

    ///
    /// 配布物ダウンロードURLへのアクセサ
    ///
    pub(super) fn install_download_url(&self) -> Option<String> {
        self.install
            .as_ref()
            .and_then(|install| install.download_url.clone())
    }

    ///
    /// 配布物保存ディレクトリへのアクセサ
    ///
    pub(super) fn install_cache_dir(&self) -> Option<PathBuf> {
        self.install
            .as_ref()
            .and_then(|install| install.cache_dir.as_ref())
            .map(|path| self.resolve_path(path))
    }

    ///
    /// インストール先ディレクトリへのアクセサ
    ///
    pub(super) fn install_dest_dir(&self) -> Option<PathBuf> {
        self.install
            .as_ref()
            .and_then(|install| install.dest_dir.as_ref())
            .map(|path| self.resolve_path(path))
    }

    ///
    /// インストールする検索エンジンのHTTPポートへのアクセサ
    ///
    pub(super) fn install_port(&self) -> Option<u16> {
        self.install
            .as_ref()
            .and_then(|install| install.port)
    }

    ///
    /// 開発モード指定へのアクセサ
    ///
    pub(super) fn install_dev_mode(&self) -> Option<bool> {
        self.install
            .as_ref()
            .and_then(|install| install.dev_mode)
    }

    ///
    /// 一括登録元データディレクトリへのアクセサ
    ///
    pub(super) fn indexing_data_dir(&self) -> Option<PathBuf> {
        self.indexing
            .as_ref()
            .and_then(|indexing| indexing.data_dir.as_ref())
            .map(|path| self.resolve_path(path))
    }

    ///
    /// 一括登録のバッチサイズへのアクセサ
    ///
    pub(super) fn indexing_batch_size(&self) -> Option<usize> {
        self.indexing
            .as_ref()
            .and_then(|indexing| indexing.batch_size)
    }

    ///
    /// 一括登録前のインデックス消去指定へのアクセサ
    ///
    pub(super) fn indexing_clear_index(&self) -> Option<bool> {
        self.indexing
            .as_ref()
            .and_then(|indexing| indexing.clear_index)
    }

    ///
    /// 1ページあたりの表示件数へのアクセサ
    ///
    pub(super) fn items_per_page(&self) -> Option<u32> {
        self.search
            .as_ref()
            .and_then(|search| search.items_per_page)
    }

    ///
    /// エクスポート時の取得件数へのアクセサ
    ///
    pub(super) fn export_items_per_page(&self) -> Option<u32> {
        self.search
            .as_ref()
            .and_then(|search| search.export_items_per_page)
    }

    ///
    /// サブコマンドrunのバインドアドレスへのアクセサ
    ///
    pub(super) fn run_bind_addr(&self) -> Option<String> {
        self.run
            .as_ref()
            .and_then(|run| run.bind_addr.clone())
    }

    ///
    /// サブコマンドrunのバインドポートへのアクセサ
    ///
    pub(super) fn run_bind_port(&self) -> Option<u16> {
        self.run
            .as_ref()
            .and_then(|run| run.bind_port)
    }

    ///
    /// コンフィギュレーション情報の保存
    ///
    /// # 戻り値
    /// 保存に成功した場合は`Ok(())`を返す。失敗した場合はエラー情報を`Err()`で
    /// ラップして返す。
    ///
    pub(super) fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>
    {
        if let Err(err) = std::fs::write(path, &toml::to_string(self)?) {
            Err(anyhow!("write config error: {}", err))
        } else {
            Ok(())
        }
    }

    ///
    /// 設定ファイルからの相対パスを解決する
    ///
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }

        if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                return Self::normalize_path(parent.join(path));
            }
        }

        path.to_path_buf()
    }

    ///
    /// パス中の`.`と`..`を取り除く
    ///
    fn normalize_path(path: PathBuf) -> PathBuf {
        let mut result = PathBuf::new();
        let mut segments: Vec<OsString> = Vec::new();
        let mut prefix: Option<std::path::PrefixComponent<'_>> = None;
        let mut has_root = false;

        for component in path.components() {
            match component {
                Component::Prefix(value) => prefix = Some(value),
                Component::RootDir => has_root = true,
                Component::CurDir => {}
                Component::ParentDir => {
                    if segments.pop().is_none() && !has_root {
                        segments.push(OsString::from(".."));
                    }
                }
                Component::Normal(value) => segments.push(value.to_os_string()),
            }
        }

        if let Some(value) = prefix {
            result.push(value.as_os_str());
        }

        if has_root {
            result.push(Path::new("/"));
        }

        for segment in segments {
            result.push(segment);
        }

        result
    }

    fn ensure_global(&mut self) -> &mut GlobalInfo {
        self.global.get_or_insert_with(|| GlobalInfo {
            log_level: None,
            log_output: None,
        })
    }

    fn ensure_engine(&mut self) -> &mut EngineInfo {
        self.engine.get_or_insert_with(|| EngineInfo {
            url: None,
            index_prefix: None,
            timeout: None,
            mappings_dir: None,
            custom_indexes: None,
        })
    }

    fn ensure_install(&mut self) -> &mut InstallInfo {
        self.install.get_or_insert_with(|| InstallInfo {
            download_url: None,
            cache_dir: None,
            dest_dir: None,
            port: None,
            dev_mode: None,
        })
    }

    fn ensure_indexing(&mut self) -> &mut IndexingInfo {
        self.indexing.get_or_insert_with(|| IndexingInfo {
            data_dir: None,
            batch_size: None,
            clear_index: None,
        })
    }

    fn ensure_run(&mut self) -> &mut RunInfo {
        self.run.get_or_insert_with(|| RunInfo {
            bind_addr: None,
            bind_port: None,
        })
    }
}

// Defaultトレイトの実装
impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            global: Some(GlobalInfo {
                log_level: Some(LogLevel::Info),
                log_output: Some(default_log_path()),
            }),

            engine: Some(EngineInfo {
                url: Some(DEFAULT_ENGINE_URL.to_string()),
                index_prefix: Some(DEFAULT_INDEX_PREFIX.to_string()),
                timeout: Some(DEFAULT_TIMEOUT_SECS),
                mappings_dir: None,
                custom_indexes: None,
            }),

            install: Some(InstallInfo {
                download_url: Some(DEFAULT_DOWNLOAD_URL.to_string()),
                cache_dir: Some(default_cache_path()),
                dest_dir: None,
                port: Some(DEFAULT_HTTP_PORT),
                dev_mode: Some(false),
            }),

            indexing: Some(IndexingInfo {
                data_dir: None,
                batch_size: Some(DEFAULT_BATCH_SIZE),
                clear_index: Some(true),
            }),

            search: Some(SearchInfo {
                items_per_page: Some(DEFAULT_ITEMS_PER_PAGE),
                export_items_per_page: Some(DEFAULT_EXPORT_ITEMS_PER_PAGE),
            }),

            run: Some(RunInfo {
                bind_addr: Some("0.0.0.0".to_string()),
                bind_port: Some(8080),
            }),
        }
    }
}

///
/// グローバル設定を格納する構造体
///
#[derive(Debug, Deserialize, Serialize)]
struct GlobalInfo {
    /// ログレベル
    log_level: Option<LogLevel>,

    /// ログの出力先
    log_output: Option<PathBuf>,
}

///
/// 検索エンジン接続の設定情報
///
#[derive(Debug, Deserialize, Serialize)]
struct EngineInfo {
    /// 検索エンジンのURL
    url: Option<String>,

    /// インデックス名のプレフィクス
    index_prefix: Option<String>,

    /// リクエストのタイムアウト(秒)
    timeout: Option<u64>,

    /// マッピング定義ファイルの格納ディレクトリ
    mappings_dir: Option<PathBuf>,

    /// カスタムインデックスの宣言
    custom_indexes: Option<Vec<CustomIndexInfo>>,
}

///
/// カスタムインデックスの宣言
///
#[derive(Debug, Deserialize, Serialize)]
struct CustomIndexInfo {
    /// インデックス名(プレフィクスなし)
    name: String,
}

///
/// installサブコマンドの設定情報
///
#[derive(Debug, Deserialize, Serialize)]
struct InstallInfo {
    /// 配布物のダウンロードURL
    download_url: Option<String>,

    /// ダウンロードした配布物の保存先
    cache_dir: Option<PathBuf>,

    /// インストール先ディレクトリ
    dest_dir: Option<PathBuf>,

    /// 検索エンジンのHTTPポート
    port: Option<u16>,

    /// 開発用設定を書き込むか否か
    dev_mode: Option<bool>,
}

///
/// 一括登録の設定情報
///
#[derive(Debug, Deserialize, Serialize)]
struct IndexingInfo {
    /// 元データ(JSON Lines)の格納ディレクトリ
    data_dir: Option<PathBuf>,

    /// バッチサイズ
    batch_size: Option<usize>,

    /// 登録前にインデックスを空にするか否か
    clear_index: Option<bool>,
}

///
/// 検索結果ページングの設定情報
///
#[derive(Debug, Deserialize, Serialize)]
struct SearchInfo {
    /// 1ページあたりの表示件数
    items_per_page: Option<u32>,

    /// エクスポート時の取得件数
    export_items_per_page: Option<u32>,
}

///
/// runサブコマンドの設定情報
///
#[derive(Debug, Deserialize, Serialize)]
struct RunInfo {
    /// バインドアドレス
    bind_addr: Option<String>,

    /// バインドポート
    bind_port: Option<u16>,
}

///
/// コンフィギュレーション情報の読み込み
///
pub(super) fn load<P>(path: P) -> Result<Config>
where
    P: AsRef<Path>
{
    let path = path.as_ref();
    let mut config: Config = toml::from_str(&std::fs::read_to_string(path)?)?;
    config.config_path = Some(path.to_path_buf());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_engine_section_from_toml() {
        let toml_str = r#"
            [engine]
            url = "http://search.local:9201"
            index_prefix = "heritage"

            [[engine.custom_indexes]]
            name = "alpha"

            [[engine.custom_indexes]]
            name = "beta"
        "#;

        let config: Config = toml::from_str(toml_str).expect("parse failed");
        assert_eq!(
            config.engine_url(),
            Some("http://search.local:9201".to_string())
        );
        assert_eq!(config.index_prefix(), Some("heritage".to_string()));
        assert_eq!(config.custom_indexes(), vec!["alpha", "beta"]);
        assert_eq!(config.engine_timeout(), None);
    }

    #[test]
    fn default_values_are_present() {
        let config = Config::default();
        assert_eq!(config.install_port(), Some(9200));
        assert_eq!(config.install_dev_mode(), Some(false));
        assert_eq!(config.indexing_batch_size(), Some(2000));
        assert_eq!(config.indexing_clear_index(), Some(true));
        assert_eq!(config.items_per_page(), Some(5));
        assert_eq!(config.export_items_per_page(), Some(100000));
        assert!(config.custom_indexes().is_empty());
    }

    #[test]
    fn serialize_uses_nested_sections() {
        let mut config = Config::default();
        config.set_indexing_batch_size(500);
        let output = toml::to_string(&config).expect("serialize failed");

        assert!(output.contains("[indexing]"));
        assert!(output.contains("batch_size = 500"));
        assert!(output.contains("[search]"));
    }

    #[test]
    fn resolve_relative_paths_with_config_dir() {
        let toml_str = r#"
            [global]
            log_output = "log"

            [engine]
            mappings_dir = "./mappings"

            [indexing]
            data_dir = "../data"
        "#;

        let mut config: Config = toml::from_str(toml_str).expect("parse failed");
        config.config_path = Some(PathBuf::from("/tmp/config/config.toml"));

        assert_eq!(
            config.log_output(),
            Some(PathBuf::from("/tmp/config/log"))
        );
        assert_eq!(
            config.mappings_dir(),
            Some(PathBuf::from("/tmp/config/mappings"))
        );
        assert_eq!(
            config.indexing_data_dir(),
            Some(PathBuf::from("/tmp/data"))
        );
    }

    #[test]
    fn preserve_absolute_paths() {
        let toml_str = r#"
            [install]
            dest_dir = "/opt/search"
            cache_dir = "/var/cache/search"
        "#;

        let mut config: Config = toml::from_str(toml_str).expect("parse failed");
        config.config_path = Some(PathBuf::from("/tmp/config/config.toml"));

        assert_eq!(
            config.install_dest_dir(),
            Some(PathBuf::from("/opt/search"))
        );
        assert_eq!(
            config.install_cache_dir(),
            Some(PathBuf::from("/var/cache/search"))
        );
    }

    #[test]
    fn keep_relative_paths_when_config_path_is_missing() {
        let toml_str = r#"
            [indexing]
            data_dir = "data"
        "#;

        let config: Config = toml::from_str(toml_str).expect("parse failed");
        assert_eq!(config.indexing_data_dir(), Some(PathBuf::from("data")));
    }
}
