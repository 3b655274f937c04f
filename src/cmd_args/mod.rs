/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! コマンドライン引数を取り扱うモジュール
//!

mod config;
mod logger;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use directories::BaseDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::command::{
    CommandContext, add_index, commands, delete_index, delete_indexes,
    index_concepts, index_database, index_resource_relations,
    index_resources, install, run, setup_indexes,
};
use crate::engine::installer::{InstallConfig, DEFAULT_DOWNLOAD_URL};
use crate::engine::{
    validate_index_name, EngineConfig, DEFAULT_ENGINE_URL, DEFAULT_HTTP_PORT,
    DEFAULT_INDEX_PREFIX, DEFAULT_TIMEOUT_SECS,
};
use crate::indexing::{BulkOptions, DEFAULT_BATCH_SIZE};
use config::Config;
use esadmin::paging::{
    PagingConfig, DEFAULT_EXPORT_ITEMS_PER_PAGE, DEFAULT_ITEMS_PER_PAGE,
};

/// デフォルトのコンフィギュレーションパス
static DEFAULT_CONFIG_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    BaseDirs::new()
        .unwrap()
        .config_local_dir()
        .join(env!("CARGO_PKG_NAME"))
        .to_path_buf()
});

/// デフォルトのデータパス
static DEFAULT_DATA_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    BaseDirs::new()
        .unwrap()
        .data_local_dir()
        .join(env!("CARGO_PKG_NAME"))
        .to_path_buf()
});

///
/// デフォルトのコンフィグレーションファイルのパス情報を生成
///
/// # 戻り値
/// コンフィギュレーションファイルのパス情報
///
fn default_config_path() -> PathBuf {
    DEFAULT_CONFIG_PATH.join("config.toml")
}

///
/// デフォルトのログ出力先のパスを生成
///
/// # 戻り値
/// ログ出力先ディレクトリのパス情報
///
fn default_log_path() -> PathBuf {
    DEFAULT_DATA_PATH.join("log")
}

///
/// デフォルトの配布物保存ディレクトリのパスを生成
///
fn default_cache_path() -> PathBuf {
    DEFAULT_DATA_PATH.join("install")
}

///
/// デフォルトの一括登録元データディレクトリのパスを生成
///
fn default_data_dir() -> PathBuf {
    DEFAULT_DATA_PATH.join("data")
}

///
/// show_options()実装を要求するトレイト
///
trait ShowOptions {
    ///
    /// オプション設定内容の表示
    ///
    fn show_options(&self);
}

///
/// validate()実装を要求するトレイト
///
trait Validate {
    ///
    /// オプション設定内容の検証
    ///
    fn validate(&mut self) -> Result<()>;
}

///
/// apply_config()実装を要求するトレイト
///
trait ApplyConfig {
    ///
    /// オプション設定へのコンフィギュレーションの反映
    ///
    fn apply_config(&mut self, config: &Config);
}

///
/// ログレベルを指し示す列挙子
///
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum, Deserialize, Serialize)]
#[clap(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "UPPERCASE")]
enum LogLevel {
    /// ログを記録しない
    #[serde(alias = "off", alias = "OFF")]
    #[value(alias = "off")]
    None,

    /// エラー情報以上のレベルを記録
    Error,

    /// 警告情報以上のレベルを記録
    Warn,

    /// 一般情報以上のレベルを記録
    Info,

    /// デバッグ情報以上のレベルを記録
    Debug,

    /// トレース情報以上のレベルを記録
    Trace,
}

// Intoトレイトの実装
impl Into<log::LevelFilter> for LogLevel {
    fn into(self) -> log::LevelFilter {
        match self {
            Self::None => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

// AsRefトレイトの実装
impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            Self::None => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

///
/// グローバルオプション情報を格納する構造体
///
#[derive(Parser, Debug, Clone)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    about = "検索インデックス管理ツール",
    version,
    long_about = None,
    subcommand_required = false,
    arg_required_else_help = true,
)]
pub struct Options {
    /// config.tomlを使用する場合のパス
    #[arg(short = 'c', long = "config-path")]
    config_path: Option<PathBuf>,

    /// 記録するログレベルの指定
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL",
        ignore_case = true)]
    log_level: Option<LogLevel>,

    /// ログの出力先の指定
    #[arg(short = 'L', long = "log-output", value_name = "PATH")]
    log_output: Option<PathBuf>,

    /// ログを標準エラー出力にも同時出力するか否か
    #[arg(long = "log-tee")]
    log_tee: bool,

    /// 検索エンジンのURL
    #[arg(short = 'u', long = "es-url", value_name = "URL")]
    es_url: Option<String>,

    /// インデックス名のプレフィクス
    #[arg(long = "index-prefix", value_name = "PREFIX")]
    index_prefix: Option<String>,

    /// 設定情報の表示
    #[arg(long = "show-options")]
    show_options: bool,

    /// 設定情報の保存
    #[arg(long = "save-config")]
    save_config: bool,

    /// 検索エンジン呼び出しのタイムアウト(秒)
    #[arg(skip)]
    engine_timeout: Option<u64>,

    /// マッピング定義ディレクトリ
    #[arg(skip)]
    mappings_dir: Option<PathBuf>,

    /// 設定ファイルで宣言されたカスタムインデックス
    #[arg(skip)]
    custom_indexes: Vec<String>,

    /// 一括登録元データのディレクトリ
    #[arg(skip)]
    data_dir: Option<PathBuf>,

    /// 1ページあたりの表示件数
    #[arg(skip)]
    items_per_page: Option<u32>,

    /// エクスポート時の取得件数
    #[arg(skip)]
    export_items_per_page: Option<u32>,

    /// 実行するサブコマンド
    #[command(subcommand)]
    command: Option<Command>,
}

impl Options {
    ///
    /// ログレベルへのアクセサ
    ///
    /// # 戻り値
    /// 設定されたログレベルを返す
    fn log_level(&self) -> LogLevel {
        if let Some(level) = self.log_level {
            level
        } else {
            LogLevel::Info
        }
    }

    ///
    /// ログの出力先へのアクセサ
    ///
    /// # 戻り値
    /// ログの出力先として設定されたパス情報を返す。未設定の場合はデフォルトの
    /// パスを返す。
    ///
    fn log_output(&self) -> PathBuf {
        if let Some(path) = &self.log_output {
            path.clone()
        } else {
            default_log_path()
        }
    }

    ///
    /// ログの標準エラー出力同時出力フラグへのアクセサ
    ///
    fn log_tee(&self) -> bool {
        self.log_tee
    }

    ///
    /// 検索エンジンのURLへのアクセサ
    ///
    pub(crate) fn es_url(&self) -> String {
        if let Some(url) = &self.es_url {
            url.clone()
        } else {
            DEFAULT_ENGINE_URL.to_string()
        }
    }

    ///
    /// インデックス名プレフィクスへのアクセサ
    ///
    pub(crate) fn index_prefix(&self) -> String {
        if let Some(prefix) = &self.index_prefix {
            prefix.clone()
        } else {
            DEFAULT_INDEX_PREFIX.to_string()
        }
    }

    ///
    /// 一括登録元データディレクトリへのアクセサ
    ///
    pub(crate) fn data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            path.clone()
        } else {
            default_data_dir()
        }
    }

    ///
    /// 検索エンジン接続設定の生成
    ///
    /// # 戻り値
    /// コマンドライン及び設定ファイルの内容を反映した接続設定を返す。
    ///
    pub(crate) fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(
            self.es_url(),
            self.index_prefix(),
            Duration::from_secs(
                self.engine_timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)
            ),
            self.mappings_dir.clone(),
            self.custom_indexes.clone(),
        )
    }

    ///
    /// ページング設定の生成
    ///
    pub(crate) fn paging_config(&self) -> PagingConfig {
        PagingConfig::new(
            self.items_per_page.unwrap_or(DEFAULT_ITEMS_PER_PAGE),
            self.export_items_per_page
                .unwrap_or(DEFAULT_EXPORT_ITEMS_PER_PAGE),
        )
    }

    ///
    /// コンフィギュレーションファイルの適用
    ///
    /// # 戻り値
    /// 処理に成功した場合は`Ok(())`を返す。
    ///
    /// # 注記
    /// config.tomlを読み込みオプション情報に反映する。
    ///
    fn apply_config(&mut self) -> Result<()> {
        let path = if let Some(path) = &self.config_path {
            // オプションでコンフィギュレーションファイルのパスが指定されて
            // いる場合、そのパスに何もなければエラー
            if !path.exists() {
                return Err(anyhow!("{} is not exists", path.display()));
            }

            path.clone()

        } else {
            default_config_path()
        };

        // この時点でパスに何も無い場合はそのまま何もせず正常終了
        if !path.exists() {
            return Ok(());
        }

        // 指定されたパスにあるのがファイルでなければエラー
        if !path.is_file() {
            return Err(anyhow!("{} is not file", path.display()));
        }

        let config = match config::load(&path) {
            Ok(config) => config,
            Err(err) => return Err(anyhow!("{}", err)),
        };

        if self.log_level.is_none() {
            self.log_level = config.log_level();
        }

        if self.log_output.is_none() {
            self.log_output = config.log_output();
        }

        if self.es_url.is_none() {
            self.es_url = config.engine_url();
        }

        if self.index_prefix.is_none() {
            self.index_prefix = config.index_prefix();
        }

        self.engine_timeout = config.engine_timeout();
        self.mappings_dir = config.mappings_dir();
        self.custom_indexes = config.custom_indexes();
        self.data_dir = config.indexing_data_dir();
        self.items_per_page = config.items_per_page();
        self.export_items_per_page = config.export_items_per_page();

        // コマンド毎のオプション情報へもコンフィギュレーションの内容を反映す
        // る。
        let opts: Option<&mut dyn ApplyConfig> = match &mut self.command {
            Some(Command::Install(opts)) => Some(opts),
            Some(Command::IndexDatabase(opts)) => Some(opts),
            Some(Command::IndexConcepts(opts)) => Some(opts),
            Some(Command::IndexResources(opts)) => Some(opts),
            Some(Command::IndexResourceRelations(opts)) => Some(opts),
            Some(Command::Run(opts)) => Some(opts),
            _ => None,
        };

        if let Some(opts) = opts {
            opts.apply_config(&config);
        }

        Ok(())
    }

    ///
    /// オプション情報のバリデート
    ///
    /// # 戻り値
    /// オプション情報に矛盾が無い場合は`Ok(())`を返す。
    ///
    fn validate(&mut self) -> Result<()> {
        if self.show_options && self.save_config {
            return Err(anyhow!(
                "--show-options and --save-config can't be specified mutually"
            ));
        }

        let url = self.es_url();
        if let Err(err) = Url::parse(&url) {
            return Err(anyhow!("invalid engine url {}: {}", url, err));
        }

        let prefix = self.index_prefix();
        if !prefix.is_empty() {
            if let Err(reason) = validate_index_name(&prefix) {
                return Err(anyhow!("invalid index prefix {}: {}", prefix, reason));
            }
        }

        if self.items_per_page == Some(0) || self.export_items_per_page == Some(0) {
            return Err(anyhow!("page size must be greater than 0"));
        }

        for name in &self.custom_indexes {
            if let Err(reason) = validate_index_name(name) {
                return Err(anyhow!("invalid custom index {}: {}", name, reason));
            }
        }

        if let Some(command) = &mut self.command {
            let opts: Option<&mut dyn Validate> = match command {
                Command::Install(opts) => Some(opts),
                Command::IndexDatabase(opts) => Some(opts),
                Command::IndexConcepts(opts) => Some(opts),
                Command::IndexResources(opts) => Some(opts),
                Command::IndexResourceRelations(opts) => Some(opts),
                Command::AddIndex(opts) => Some(opts),
                Command::DeleteIndex(opts) => Some(opts),
                Command::Run(opts) => Some(opts),
                _ => None,
            };

            if let Some(opts) = opts {
                opts.validate()?;
            }
        }

        Ok(())
    }

    ///
    /// オプション設定内容の表示
    ///
    fn show_options(&self) {
        let config_path = if let Some(path) = &self.config_path {
            path.display().to_string()
        } else {
            let path = default_config_path();

            if path.exists() {
                path.display().to_string()
            } else {
                "(none)".to_string()
            }
        };

        let paging = self.paging_config();

        println!("global options");
        println!("   config path:      {}", config_path);
        println!("   log level:        {}", self.log_level().as_ref());
        println!("   log output:       {}", self.log_output().display());
        println!("   log tee:          {}", self.log_tee());
        println!("   engine url:       {}", self.es_url());
        println!("   index prefix:     {}", self.index_prefix());
        println!(
            "   custom indexes:   {}",
            if self.custom_indexes.is_empty() {
                "(none)".to_string()
            } else {
                self.custom_indexes.join(", ")
            }
        );
        println!(
            "   mappings dir:     {}",
            self.mappings_dir
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        );
        println!("   data dir:         {}", self.data_dir().display());
        println!("   items per page:   {}", paging.items_per_page());
        println!("   export per page:  {}", paging.export_items_per_page());

        // サブコマンドが指定されており、そのサブコマンドがオプションを持つなら
        // そのオプションも表示する。
        if let Some(command) = &self.command {
            let opts: Option<&dyn ShowOptions> = match command {
                Command::Install(opts) => Some(opts),
                Command::IndexDatabase(opts) => Some(opts),
                Command::IndexConcepts(opts) => Some(opts),
                Command::IndexResources(opts) => Some(opts),
                Command::IndexResourceRelations(opts) => Some(opts),
                Command::AddIndex(opts) => Some(opts),
                Command::DeleteIndex(opts) => Some(opts),
                Command::Run(opts) => Some(opts),
                _ => None,
            };

            if let Some(opts) = opts {
                println!("");
                opts.show_options();
            }
        }
    }

    ///
    /// サブコマンドのコマンドコンテキストの生成
    ///
    pub(crate) fn build_context(&self) -> Result<Box<dyn CommandContext>> {
        match &self.command {
            Some(Command::Install(opts)) => install::build_context(self, opts),
            Some(Command::SetupIndexes) => setup_indexes::build_context(self),
            Some(Command::DeleteIndexes) => delete_indexes::build_context(self),
            Some(Command::IndexDatabase(opts)) => {
                index_database::build_context(self, opts)
            }
            Some(Command::IndexConcepts(opts)) => {
                index_concepts::build_context(self, opts)
            }
            Some(Command::IndexResources(opts)) => {
                index_resources::build_context(self, opts)
            }
            Some(Command::IndexResourceRelations(opts)) => {
                index_resource_relations::build_context(self, opts)
            }
            Some(Command::AddIndex(opts)) => add_index::build_context(self, opts),
            Some(Command::DeleteIndex(opts)) => {
                delete_index::build_context(self, opts)
            }
            Some(Command::Run(opts)) => run::build_context(self, opts),
            Some(Command::Commands) => commands::build_context(self),
            None => Err(anyhow!("command not specified")),
        }
    }
}

///
/// サブコマンドの定義
///
#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// 検索エンジンのインストール
    #[command(name = "install")]
    Install(InstallOpts),

    /// システムが必要とするインデックスの作成
    #[command(name = "setup_indexes")]
    SetupIndexes,

    /// システムが必要とするインデックスの削除
    #[command(name = "delete_indexes")]
    DeleteIndexes,

    /// 全データ(概念、リソース、リソース間関連)の登録
    #[command(name = "index_database")]
    IndexDatabase(NamedIndexOpts),

    /// 概念データの登録
    #[command(name = "index_concepts")]
    IndexConcepts(IndexOpts),

    /// リソースデータの登録
    #[command(name = "index_resources")]
    IndexResources(NamedIndexOpts),

    /// リソース間関連データの登録
    #[command(name = "index_resource_relations")]
    IndexResourceRelations(IndexOpts),

    /// カスタムインデックスの登録
    #[command(name = "add_index")]
    AddIndex(IndexNameOpts),

    /// カスタムインデックスの削除
    #[command(name = "delete_index")]
    DeleteIndex(IndexNameOpts),

    /// 検索APIサーバの起動
    #[command(name = "run", alias = "r")]
    Run(RunOpts),

    /// サブコマンド一覧の表示
    #[command(name = "commands")]
    Commands,
}

///
/// サブコマンドinstallのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct InstallOpts {
    /// インストール先ディレクトリ
    #[arg(short = 'd', long = "dest_dir", alias = "dest-dir",
        value_name = "DIR")]
    dest_dir: Option<PathBuf>,

    /// 検索エンジンのHTTPポート
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    port: Option<u16>,

    /// CORSを全許可する開発用設定を書き込む(`--dev-mode false`で解除)
    #[arg(long = "dev-mode", value_name = "BOOL", num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new())]
    dev_mode: Option<bool>,

    /// 配布物のダウンロードURL
    #[arg(skip)]
    download_url: Option<String>,

    /// 配布物の保存ディレクトリ
    #[arg(skip)]
    cache_dir: Option<PathBuf>,
}

impl InstallOpts {
    ///
    /// インストール先ディレクトリへのアクセサ
    ///
    /// # 戻り値
    /// 未指定の場合はカレントディレクトリを返す。
    ///
    pub(crate) fn dest_dir(&self) -> PathBuf {
        if let Some(path) = &self.dest_dir {
            path.clone()
        } else {
            PathBuf::from(".")
        }
    }

    ///
    /// HTTPポートへのアクセサ
    ///
    pub(crate) fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_HTTP_PORT)
    }

    ///
    /// 開発モード指定へのアクセサ
    ///
    pub(crate) fn dev_mode(&self) -> bool {
        self.dev_mode.unwrap_or(false)
    }

    ///
    /// 配布物のダウンロードURLへのアクセサ
    ///
    pub(crate) fn download_url(&self) -> String {
        if let Some(url) = &self.download_url {
            url.clone()
        } else {
            DEFAULT_DOWNLOAD_URL.to_string()
        }
    }

    ///
    /// 配布物保存ディレクトリへのアクセサ
    ///
    pub(crate) fn cache_dir(&self) -> PathBuf {
        if let Some(path) = &self.cache_dir {
            path.clone()
        } else {
            default_cache_path()
        }
    }

    ///
    /// インストール設定の生成
    ///
    pub(crate) fn install_config(&self) -> InstallConfig {
        InstallConfig::new(
            self.download_url(),
            self.cache_dir(),
            self.dest_dir(),
            self.port(),
            self.dev_mode(),
        )
    }
}

// Validateトレイトの実装
impl Validate for InstallOpts {
    fn validate(&mut self) -> Result<()> {
        if self.port == Some(0) {
            return Err(anyhow!("port must be greater than 0"));
        }

        let url = self.download_url();
        if let Err(err) = Url::parse(&url) {
            return Err(anyhow!("invalid download url {}: {}", url, err));
        }

        Ok(())
    }
}

// ApplyConfigトレイトの実装
impl ApplyConfig for InstallOpts {
    fn apply_config(&mut self, config: &Config) {
        if self.dest_dir.is_none() {
            self.dest_dir = config.install_dest_dir();
        }

        if self.port.is_none() {
            self.port = config.install_port();
        }

        if self.dev_mode.is_none() {
            self.dev_mode = config.install_dev_mode();
        }

        if self.download_url.is_none() {
            self.download_url = config.install_download_url();
        }

        if self.cache_dir.is_none() {
            self.cache_dir = config.install_cache_dir();
        }
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for InstallOpts {
    fn show_options(&self) {
        println!("install command options");
        println!("   dest dir:      {}", self.dest_dir().display());
        println!("   port:          {}", self.port());
        println!("   dev mode:      {}", self.dev_mode());
        println!("   download url:  {}", self.download_url());
        println!("   cache dir:     {}", self.cache_dir().display());
    }
}

///
/// 一括登録系サブコマンドの共通オプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct IndexOpts {
    /// 1回のリクエストで送信するレコード数
    #[arg(short = 'b', long = "batch_size", alias = "batch-size",
        value_name = "N")]
    batch_size: Option<usize>,

    /// 登録前にインデックスを空にするか否か
    #[arg(short = 'c', long = "clear_index", alias = "clear-index",
        value_name = "BOOL", value_parser = BoolishValueParser::new())]
    clear_index: Option<bool>,
}

impl IndexOpts {
    ///
    /// バッチサイズへのアクセサ
    ///
    pub(crate) fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    ///
    /// インデックス消去指定へのアクセサ
    ///
    pub(crate) fn clear_index(&self) -> bool {
        self.clear_index.unwrap_or(true)
    }

    ///
    /// 一括登録オプションの生成
    ///
    pub(crate) fn bulk_options(&self) -> Result<BulkOptions> {
        BulkOptions::new(self.batch_size(), self.clear_index())
    }
}

// Validateトレイトの実装
impl Validate for IndexOpts {
    fn validate(&mut self) -> Result<()> {
        if self.batch_size == Some(0) {
            return Err(anyhow!("batch size must be greater than 0"));
        }

        Ok(())
    }
}

// ApplyConfigトレイトの実装
impl ApplyConfig for IndexOpts {
    fn apply_config(&mut self, config: &Config) {
        if self.batch_size.is_none() {
            self.batch_size = config.indexing_batch_size();
        }

        if self.clear_index.is_none() {
            self.clear_index = config.indexing_clear_index();
        }
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for IndexOpts {
    fn show_options(&self) {
        println!("index command options");
        println!("   batch size:   {}", self.batch_size());
        println!("   clear index:  {}", self.clear_index());
    }
}

///
/// 登録先インデックスを指定可能な一括登録系サブコマンドのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct NamedIndexOpts {
    #[command(flatten)]
    bulk: IndexOpts,

    /// 登録先のカスタムインデックス名
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    name: Option<String>,
}

impl NamedIndexOpts {
    ///
    /// 共通オプションへのアクセサ
    ///
    pub(crate) fn bulk(&self) -> &IndexOpts {
        &self.bulk
    }

    ///
    /// カスタムインデックス名へのアクセサ
    ///
    pub(crate) fn name(&self) -> Option<String> {
        self.name.clone()
    }
}

// Validateトレイトの実装
impl Validate for NamedIndexOpts {
    fn validate(&mut self) -> Result<()> {
        self.bulk.validate()?;

        if let Some(name) = &self.name {
            if let Err(reason) = validate_index_name(name) {
                return Err(anyhow!("invalid index name {}: {}", name, reason));
            }
        }

        Ok(())
    }
}

// ApplyConfigトレイトの実装
impl ApplyConfig for NamedIndexOpts {
    fn apply_config(&mut self, config: &Config) {
        self.bulk.apply_config(config);
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for NamedIndexOpts {
    fn show_options(&self) {
        self.bulk.show_options();
        println!(
            "   index name:   {}",
            self.name.as_deref().unwrap_or("(none)")
        );
    }
}

///
/// サブコマンドadd_index/delete_indexのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct IndexNameOpts {
    /// 対象のカスタムインデックス名
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    name: String,
}

impl IndexNameOpts {
    ///
    /// カスタムインデックス名へのアクセサ
    ///
    pub(crate) fn name(&self) -> String {
        self.name.clone()
    }
}

// Validateトレイトの実装
impl Validate for IndexNameOpts {
    fn validate(&mut self) -> Result<()> {
        if let Err(reason) = validate_index_name(&self.name) {
            return Err(anyhow!("invalid index name {}: {}", self.name, reason));
        }

        Ok(())
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for IndexNameOpts {
    fn show_options(&self) {
        println!("index name options");
        println!("   name:  {}", self.name);
    }
}

///
/// サブコマンドrunのオプション
///
#[derive(Clone, Args, Debug)]
pub(crate) struct RunOpts {
    /// サーバのバインド先
    #[arg(value_name = "ADDR[:PORT]")]
    bind_addr: Option<String>,

    /// サーバのバインド先ポート
    #[arg(skip)]
    bind_port: Option<u16>,
}

impl RunOpts {
    ///
    /// バインド先のアドレスへのアクセサ
    ///
    pub(crate) fn bind_addr(&self) -> String {
        if let Some(addr) = &self.bind_addr {
            addr.clone()
        } else {
            "0.0.0.0".to_string()
        }
    }

    ///
    /// バインド先のポート番号へのアクセサ
    ///
    pub(crate) fn bind_port(&self) -> u16 {
        if let Some(port) = self.bind_port {
            port
        } else {
            8080
        }
    }
}

// Validateトレイトの実装
impl Validate for RunOpts {
    fn validate(&mut self) -> Result<()> {
        if let Some(value) = &self.bind_addr {
            let (addr, port) = parse_bind_value(value)?;

            if let Some(current_port) = self.bind_port {
                if let Some(parsed_port) = port {
                    if current_port != parsed_port {
                        return Err(anyhow!(
                            "bind port is inconsistent: {} vs {}",
                            current_port,
                            parsed_port
                        ));
                    }
                }
            }

            self.bind_addr = Some(addr);
            if self.bind_port.is_none() {
                self.bind_port = port;
            }
        }

        Ok(())
    }
}

// ApplyConfigトレイトの実装
impl ApplyConfig for RunOpts {
    fn apply_config(&mut self, config: &Config) {
        if let Some(value) = &self.bind_addr {
            if self.bind_port.is_none() {
                if let Ok((addr, port)) = parse_bind_value(value) {
                    self.bind_addr = Some(addr);
                    self.bind_port = port;
                }
            }
        } else if let Some(addr) = config.run_bind_addr() {
            self.bind_addr = Some(addr);
        }

        if self.bind_port.is_none() {
            if let Some(port) = config.run_bind_port() {
                self.bind_port = Some(port);
            }
        }
    }
}

// ShowOptionsトレイトの実装
impl ShowOptions for RunOpts {
    fn show_options(&self) {
        println!("run command options");
        println!("   bind:  {}:{}", self.bind_addr(), self.bind_port());
    }
}

///
/// バインド指定文字列の解析
///
/// # 引数
/// * `value` - `ADDR`、`ADDR:PORT`、`[IPv6]:PORT`形式の文字列
///
/// # 戻り値
/// アドレスとポート(指定時のみ)の組を返す。
///
fn parse_bind_value(value: &str) -> Result<(String, Option<u16>)> {
    /*
     * 入力の事前チェック
     */
    if value.is_empty() {
        return Err(anyhow!("bind address is empty"));
    }

    /*
     * IPv6角括弧形式の解析
     */
    if let Some(rest) = value.strip_prefix('[') {
        let close_pos = rest.find(']')
            .ok_or_else(|| anyhow!("invalid bind address: {}", value))?;
        let addr = &rest[..close_pos];
        if addr.is_empty() {
            return Err(anyhow!("bind address is empty"));
        }

        let tail = &rest[close_pos + 1..];
        if tail.is_empty() {
            return Ok((addr.to_string(), None));
        }

        if let Some(port_str) = tail.strip_prefix(':') {
            if port_str.is_empty() {
                return Err(anyhow!("bind port is empty"));
            }

            return Ok((addr.to_string(), Some(port_str.parse()?)));
        }

        return Err(anyhow!("invalid bind address: {}", value));
    }

    /*
     * IPv4/ホスト名形式の解析
     */
    let colon_count = value.matches(':').count();
    if colon_count == 0 {
        return Ok((value.to_string(), None));
    }

    if colon_count == 1 {
        let mut iter = value.splitn(2, ':');
        let addr = iter.next().unwrap_or_default();
        let port_str = iter.next().unwrap_or_default();

        if addr.is_empty() {
            return Err(anyhow!("bind address is empty"));
        }
        if port_str.is_empty() {
            return Err(anyhow!("bind port is empty"));
        }

        return Ok((addr.to_string(), Some(port_str.parse()?)));
    }

    /*
     * IPv6リテラル形式の解析
     */
    Ok((value.to_string(), None))
}

///
/// コマンドライン引数のパース処理
///
/// # 戻り値
/// オプション情報をまとめたオブジェクトを返す。
///
pub(crate) fn parse() -> Result<Arc<Options>> {
    let mut opts = Options::parse();

    /*
     * デフォルトデータパスの作成
     */
    std::fs::create_dir_all(DEFAULT_DATA_PATH.clone())?;

    /*
     * コンフィギュレーションファイルの適用
     */
    opts.apply_config()?;

    /*
     * 設定情報のバリデーション
     */
    opts.validate()?;

    /*
     * ログ機能の初期化
     */
    logger::init(&opts)?;

    /*
     * 設定情報の表示
     */
    if opts.show_options {
        opts.show_options();
        std::process::exit(0);
    }

    /*
     * 設定の保存
     */
    if opts.save_config {
        save_config(&opts)?;
        std::process::exit(0);
    }

    /*
     * 設定情報の返却
     */
    Ok(Arc::new(opts))
}

///
/// 設定保存が必要であればconfig.tomlへ書き込みを行う
///
/// # 概要
/// 既存の設定ファイルがある場合は読み込み、現在の設定内容で更新した上で保存
/// する。設定ファイルが存在しない場合はデフォルト設定を基準に更新して保存す
/// る。
///
/// # 引数
/// * `opts` - コマンドラインとコンフィグ適用後の設定情報
///
/// # 戻り値
/// 保存処理に成功した場合は`Ok(())`を返す。
///
fn save_config(opts: &Options) -> Result<()> {
    /*
     * 保存先パスの決定
     */
    let path = if let Some(path) = &opts.config_path {
        path.clone()
    } else {
        default_config_path()
    };

    /*
     * 既存ファイルの上書き確認
     */
    if path.exists() {
        if !confirm_overwrite(&path)? {
            return Ok(());
        }
    }

    /*
     * 保存先ディレクトリの作成
     */
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    /*
     * 現在の設定内容を反映
     */
    let mut config = if path.exists() {
        config::load(&path)?
    } else {
        Config::default()
    };

    config.set_log_level(opts.log_level());
    config.set_log_output(opts.log_output());
    config.set_engine_url(opts.es_url());
    config.set_index_prefix(opts.index_prefix());

    match &opts.command {
        Some(Command::Install(opts)) => {
            config.set_install_dest_dir(opts.dest_dir());
            config.set_install_port(opts.port());
            config.set_install_dev_mode(opts.dev_mode());
        }

        Some(Command::IndexConcepts(opts))
            | Some(Command::IndexResourceRelations(opts)) =>
        {
            config.set_indexing_batch_size(opts.batch_size());
            config.set_indexing_clear_index(opts.clear_index());
        }

        Some(Command::IndexDatabase(opts))
            | Some(Command::IndexResources(opts)) =>
        {
            config.set_indexing_batch_size(opts.bulk().batch_size());
            config.set_indexing_clear_index(opts.bulk().clear_index());
        }

        Some(Command::Run(opts)) => {
            config.set_run_bind_addr(opts.bind_addr());
            config.set_run_bind_port(opts.bind_port());
        }

        _ => {}
    }

    /*
     * 保存処理の実行
     */
    config.save(&path)?;

    Ok(())
}

///
/// config.tomlの上書き可否を標準入出力で問い合わせる
///
/// # 引数
/// * `path` - 対象となるパス
///
/// # 戻り値
/// 上書きを許可する場合は`true`、拒否された場合は`false`を返す。
///
fn confirm_overwrite(path: &Path) -> Result<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();

    let mut input = stdin.lock();
    let mut output = stdout.lock();

    confirm_overwrite_with_io(path, &mut input, &mut output)
}

///
/// 任意の入出力を使ってconfig.tomlの上書き可否を問い合わせる
///
/// # 引数
/// * `path` - 対象となるパス
/// * `input` - 入力ストリーム（質問への回答を受け取る）
/// * `output` - 出力ストリーム（質問を表示する）
///
/// # 戻り値
/// 上書きを許可する場合は`true`、拒否された場合は`false`を返す。
///
fn confirm_overwrite_with_io<R, W>(path: &Path, input: &mut R, output: &mut W,)
    -> Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(
        output,
        "{} は既に存在します。上書きしますか？ [y/N]: ",
        path.display()
    )?;
    output.flush()?;

    let mut buf = String::new();
    input.read_line(&mut buf)?;

    let ans = buf.trim().to_lowercase();
    Ok(ans == "y" || ans == "yes")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse_args(args: &[&str]) -> Options {
        Options::try_parse_from(args).expect("parse failed")
    }

    #[test]
    fn parse_index_database_options() {
        let opts = parse_args(&[
            "esadmin", "index_database", "-b", "500", "-c", "False", "-n", "local",
        ]);

        let named = match opts.command {
            Some(Command::IndexDatabase(named)) => named,
            _ => panic!("index_database options missing"),
        };
        assert_eq!(named.bulk().batch_size(), 500);
        assert!(!named.bulk().clear_index());
        assert_eq!(named.name(), Some("local".to_string()));
    }

    #[test]
    fn index_defaults_apply_without_options() {
        let opts = parse_args(&["esadmin", "index_concepts"]);

        let bulk = match opts.command {
            Some(Command::IndexConcepts(bulk)) => bulk,
            _ => panic!("index_concepts options missing"),
        };
        assert_eq!(bulk.batch_size(), 2000);
        assert!(bulk.clear_index());
    }

    #[test]
    fn install_options_fall_back_to_defaults() {
        let opts = parse_args(&["esadmin", "install", "-d", "/opt/search"]);

        let install = match opts.command {
            Some(Command::Install(install)) => install,
            _ => panic!("install options missing"),
        };
        assert_eq!(install.dest_dir(), PathBuf::from("/opt/search"));
        assert_eq!(install.port(), 9200);
        assert!(!install.dev_mode());
        assert_eq!(install.download_url(), DEFAULT_DOWNLOAD_URL);
    }

    #[test]
    fn add_index_requires_valid_name() {
        assert!(Options::try_parse_from(["esadmin", "add_index"]).is_err());

        let mut opts = parse_args(&["esadmin", "add_index", "-n", "Bad Name"]);
        assert!(opts.validate().is_err());

        let mut opts = parse_args(&["esadmin", "add_index", "-n", "good_name"]);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut opts = parse_args(&["esadmin", "index_resources", "-b", "0"]);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn invalid_engine_url_is_rejected() {
        let mut opts = parse_args(&["esadmin", "-u", "not a url", "setup_indexes"]);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn run_bind_value_is_split() {
        let mut opts = parse_args(&["esadmin", "run", "127.0.0.1:9000"]);
        opts.validate().expect("validate failed");

        let run = match opts.command {
            Some(Command::Run(run)) => run,
            _ => panic!("run options missing"),
        };
        assert_eq!(run.bind_addr(), "127.0.0.1");
        assert_eq!(run.bind_port(), 9000);
    }

    #[test]
    fn parse_bind_value_forms() {
        assert_eq!(
            parse_bind_value("[::1]:8081").expect("parse"),
            ("::1".to_string(), Some(8081))
        );
        assert_eq!(
            parse_bind_value("localhost").expect("parse"),
            ("localhost".to_string(), None)
        );
        assert!(parse_bind_value("host:").is_err());
        assert!(parse_bind_value("").is_err());
    }

    #[test]
    fn config_file_values_apply_when_options_missing() {
        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
                [engine]
                url = "http://search.local:9201"
                index_prefix = "heritage"

                [[engine.custom_indexes]]
                name = "alpha"

                [indexing]
                batch_size = 100
                clear_index = false

                [search]
                items_per_page = 20
            "#,
        )
        .expect("write config");

        let config_arg = config_path.to_string_lossy().to_string();
        let mut opts = parse_args(&[
            "esadmin", "-c", &config_arg, "index_resources", "-b", "7",
        ]);
        opts.apply_config().expect("apply failed");

        let engine = opts.engine_config();
        assert_eq!(engine.url(), "http://search.local:9201");
        assert_eq!(engine.index_name("resources"), "heritage_resources");
        assert_eq!(engine.custom_indexes(), ["alpha".to_string()]);
        assert_eq!(opts.paging_config().items_per_page(), 20);
        assert_eq!(opts.paging_config().export_items_per_page(), 100000);

        let named = match &opts.command {
            Some(Command::IndexResources(named)) => named,
            _ => panic!("index_resources options missing"),
        };
        assert_eq!(named.bulk().batch_size(), 7);
        assert!(!named.bulk().clear_index());
    }

    #[test]
    fn save_config_writes_install_settings() {
        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        let config_arg = config_path.to_string_lossy().to_string();
        let dest = dir.path().join("engine");
        let dest_arg = dest.to_string_lossy().to_string();

        let opts = parse_args(&[
            "esadmin",
            "--config-path",
            &config_arg,
            "install",
            "-d",
            &dest_arg,
            "-p",
            "9301",
            "--dev-mode",
        ]);
        save_config(&opts).expect("save failed");

        let config = config::load(&config_path).expect("load failed");
        assert_eq!(config.install_dest_dir(), Some(dest));
        assert_eq!(config.install_port(), Some(9301));
        assert_eq!(config.install_dev_mode(), Some(true));
        assert_eq!(config.index_prefix(), Some("arches".to_string()));
    }

    #[test]
    fn dev_mode_option_overrides_config_both_ways() {
        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[install]\ndev_mode = true\n")
            .expect("write config");
        let config_arg = config_path.to_string_lossy().to_string();

        let dev_mode = |args: &[&str]| {
            let mut argv = vec!["esadmin", "-c", config_arg.as_str(), "install"];
            argv.extend_from_slice(args);

            let mut opts = parse_args(&argv);
            opts.apply_config().expect("apply failed");
            match &opts.command {
                Some(Command::Install(install)) => install.dev_mode(),
                _ => panic!("install options missing"),
            }
        };

        assert!(dev_mode(&[]));
        assert!(dev_mode(&["--dev-mode"]));
        assert!(!dev_mode(&["--dev-mode", "false"]));
        assert!(!dev_mode(&["--dev-mode=off", "-p", "9301"]));
    }

    #[test]
    fn confirm_overwrite_accepts_yes_only() {
        let path = Path::new("/tmp/config.toml");
        let mut output = Vec::new();

        let mut input = Cursor::new("yes\n");
        assert!(confirm_overwrite_with_io(path, &mut input, &mut output)
            .expect("confirm failed"));

        let mut input = Cursor::new("\n");
        assert!(!confirm_overwrite_with_io(path, &mut input, &mut output)
            .expect("confirm failed"));
    }
}
