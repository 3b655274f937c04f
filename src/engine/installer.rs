/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 検索エンジン配布物のインストール処理
//!

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use reqwest::blocking::Client;
use walkdir::WalkDir;
use zip::ZipArchive;

/// 配布物のデフォルトダウンロードURL
pub(crate) const DEFAULT_DOWNLOAD_URL: &str =
    "https://artifacts.elastic.co/downloads/elasticsearch/elasticsearch-6.7.0.zip";

/// 実行権限として設定するモード
const EXEC_MODE: u32 = 0o755;

/// 設定ファイル冒頭に書き込む注意書き
const REVIEW_BANNER: &str = concat!(
    "# - THESE SETTINGS SHOULD BE REVIEWED FOR PRODUCTION -\n",
    "# -https://www.elastic.co/guide/en/elasticsearch/reference/6.7/",
    "important-settings.html - \n",
);

///
/// インストール処理の設定情報
///
#[derive(Clone, Debug)]
pub(crate) struct InstallConfig {
    /// 配布物のダウンロードURL
    download_url: String,

    /// ダウンロードした配布物の保存ディレクトリ
    cache_dir: PathBuf,

    /// インストール先ディレクトリ
    dest_dir: PathBuf,

    /// 検索エンジンのHTTPポート
    port: u16,

    /// 開発用設定(CORS全許可)を書き込むか否か
    dev_mode: bool,
}

impl InstallConfig {
    ///
    /// 設定情報の生成
    ///
    pub(crate) fn new(
        download_url: String,
        cache_dir: PathBuf,
        dest_dir: PathBuf,
        port: u16,
        dev_mode: bool,
    ) -> Self {
        Self {
            download_url,
            cache_dir,
            dest_dir,
            port,
            dev_mode,
        }
    }
}

///
/// 検索エンジンのインストール
///
/// # 概要
/// 配布物をダウンロード(保存済みの場合は再利用)して展開し、設定ファイル
/// の書き換えと実行権限の付与を行う。
///
/// # 引数
/// * `config` - インストール設定
///
/// # 戻り値
/// インストールした検索エンジンのホームディレクトリを返す。
///
pub(crate) fn install(config: &InstallConfig) -> Result<PathBuf> {
    /*
     * インストール先の準備
     */
    let dest_dir = std::path::absolute(&config.dest_dir)
        .with_context(|| format!("resolve {}", config.dest_dir.display()))?;
    fs::create_dir_all(&dest_dir)
        .with_context(|| format!("create {}", dest_dir.display()))?;

    /*
     * 配布物の取得
     */
    let file_name = archive_file_name(&config.download_url)?;
    let stem = archive_stem(&file_name);
    let archive = config.cache_dir.join(&file_name);

    if archive.is_file() {
        info!("use cached archive: {}", archive.display());
    } else {
        fs::create_dir_all(&config.cache_dir)
            .with_context(|| format!("create {}", config.cache_dir.display()))?;
        download(&config.download_url, &archive)?;
    }

    /*
     * 配布物の展開
     */
    unzip(&archive, &dest_dir)?;
    let home = dest_dir.join(stem);

    /*
     * 既存設定ファイルの退避
     */
    let config_dir = home.join("config");
    let config_file = config_dir.join("elasticsearch.yml");
    if let Err(err) = fs::rename(&config_file, config_dir.join("elasticsearch.yml.orig")) {
        debug!("keep original config skipped: {}", err);
    }

    /*
     * 実行権限の付与
     */
    set_mode(&home.join("bin").join("elasticsearch"), EXEC_MODE)?;
    change_permissions_recursive(
        &home.join("modules").join("x-pack-ml").join("platform"),
        EXEC_MODE,
    )?;

    /*
     * 設定ファイルの書き込み
     */
    fs::write(&config_file, engine_config_text(config.port, config.dev_mode))
        .with_context(|| format!("write {}", config_file.display()))?;

    info!("engine installed: {}", home.display());
    Ok(home)
}

///
/// ダウンロードURLから配布物のファイル名を取り出す
///
pub(crate) fn archive_file_name(url: &str) -> Result<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);

    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(anyhow!("download url has no file name: {}", url)),
    }
}

///
/// 配布物のファイル名から展開後のディレクトリ名を求める
///
pub(crate) fn archive_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string())
}

///
/// 検索エンジン設定ファイルの内容を生成する
///
/// # 引数
/// * `port` - HTTPポート
/// * `dev_mode` - CORSを全許可する開発用設定を含めるか否か
///
/// # 戻り値
/// 設定ファイルの内容
///
pub(crate) fn engine_config_text(port: u16, dev_mode: bool) -> String {
    let mut text = String::new();

    if dev_mode {
        text.push_str("# ----------------- FOR TESTING ONLY -----------------\n");
    }
    text.push_str(REVIEW_BANNER);
    text.push_str(&format!("http.port: {}\n", port));

    if dev_mode {
        text.push_str("\n# for the elasticsearch-head plugin\n");
        text.push_str("http.cors.enabled: true\n");
        text.push_str("http.cors.allow-origin: \"*\"\n");
    }

    text
}

///
/// 配布物のダウンロード
///
/// # 概要
/// 一時ファイルに書き込んだ後でリネームし、中断時に不完全なファイルが残ら
/// ないようにする。
///
fn download(url: &str, path: &Path) -> Result<()> {
    info!("download {}", url);

    let client = Client::builder()
        .timeout(None)
        .build()
        .context("build http client")?;
    let mut resp = client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .with_context(|| format!("download {}", url))?;

    save_atomically(path, |file| {
        resp.copy_to(file)
            .with_context(|| format!("download {}", url))?;
        Ok(())
    })
}

///
/// 一時ファイル経由でのファイル保存
///
/// # 概要
/// `<path>.part`へ書き込んだ後でリネームする。書き込みに失敗した場合は一時
/// ファイルを削除してエラーを返す。
///
/// # 引数
/// * `path` - 保存先のパス
/// * `write` - 一時ファイルへの書き込み処理
///
fn save_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let mut part = OsString::from(path.as_os_str());
    part.push(".part");
    let part = PathBuf::from(part);

    let mut file = File::create(&part)
        .with_context(|| format!("create {}", part.display()))?;

    let result = write(&mut file).and_then(|_| {
        file.sync_all()
            .with_context(|| format!("sync {}", part.display()))
    });
    drop(file);

    if let Err(err) = result {
        if let Err(remove_err) = fs::remove_file(&part) {
            debug!("remove {} failed: {}", part.display(), remove_err);
        }
        return Err(err);
    }

    fs::rename(&part, path)
        .with_context(|| format!("rename {}", part.display()))?;
    Ok(())
}

///
/// zipアーカイブの展開
///
fn unzip(archive: &Path, dest_dir: &Path) -> Result<()> {
    info!("extract {} to {}", archive.display(), dest_dir.display());

    let file = File::open(archive)
        .with_context(|| format!("open {}", archive.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("read archive {}", archive.display()))?;
    zip.extract(dest_dir)
        .with_context(|| format!("extract {}", archive.display()))?;

    Ok(())
}

///
/// ディレクトリ配下の権限を再帰的に変更する
///
/// # 概要
/// 配下のディレクトリ全てと、`bin`ディレクトリ配下のファイルの権限を変更す
/// る。シンボリックリンクは辿らず、リンク自体も変更しない。起点が存在しない
/// 場合は何もしない。
///
/// # 引数
/// * `root` - 起点ディレクトリ
/// * `mode` - 設定する権限
///
pub(crate) fn change_permissions_recursive(root: &Path, mode: u32) -> Result<()> {
    if !root.is_dir() {
        debug!("permission target not found: {}", root.display());
        return Ok(());
    }

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry
            .with_context(|| format!("walk {}", root.display()))?;

        if entry.path_is_symlink() {
            continue;
        }

        if entry.file_type().is_dir() || in_bin_dir(root, entry.path()) {
            set_mode(entry.path(), mode)?;
        }
    }

    Ok(())
}

///
/// 起点からの相対パスに`bin`ディレクトリが含まれるか否か
///
fn in_bin_dir(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);

    match relative.parent() {
        Some(parent) => parent
            .components()
            .any(|component| component.as_os_str() == "bin"),
        None => false,
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: u32) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("{} is not exists", path.display()));
    }

    Ok(())
}
