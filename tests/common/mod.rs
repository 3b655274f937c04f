/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 結合テスト用の共通ヘルパー
//!

#![allow(dead_code)]

use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::sync::atomic::Ordering;
use std::sync::{mpsc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use actix_web::dev::ServerHandle;
use actix_web::rt::System;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use reqwest::blocking::Client;
use serde_json::{json, Value};

///
/// テスト用ディレクトリを準備する
///
/// # 戻り値
/// ベースディレクトリ(絶対パス)
///
pub fn prepare_test_dirs() -> PathBuf {
    let base = Path::new("tests").join("tmp").join(unique_suffix());
    fs::create_dir_all(&base).expect("create base dir failed");
    fs::canonicalize(&base).expect("canonicalize base dir failed")
}

///
/// 一意なサフィックス文字列を生成する
///
/// # 戻り値
/// サフィックス文字列
///
pub fn unique_suffix() -> String {
    use std::sync::atomic::AtomicU64;

    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let pid = std::process::id();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time failed")
        .as_nanos();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", pid, now, seq)
}

///
/// ローカル空きポートを確保する
///
/// # 戻り値
/// ポート番号
///
pub fn reserve_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("bind failed");
    listener.local_addr().expect("addr failed").port()
}

///
/// 設定ファイルを書き込む
///
/// # 引数
/// * `base_dir` - ベースディレクトリ
/// * `text` - 設定ファイルの内容
///
/// # 戻り値
/// 書き込んだ設定ファイルのパス
///
pub fn write_config(base_dir: &Path, text: &str) -> PathBuf {
    let path = base_dir.join("config.toml");
    fs::write(&path, text).expect("write config failed");
    path
}

///
/// CLIを実行して終了を待つ
///
/// # 引数
/// * `base_dir` - ベースディレクトリ(XDGディレクトリとして使用)
/// * `config_path` - 設定ファイルのパス
/// * `args` - サブコマンド以降の引数
///
/// # 戻り値
/// 実行結果
///
pub fn run_cli(base_dir: &Path, config_path: &Path, args: &[&str]) -> Output {
    Command::new(test_binary_path())
        .env("XDG_CONFIG_HOME", base_dir)
        .env("XDG_DATA_HOME", base_dir)
        .arg("--config-path")
        .arg(config_path)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("spawn cli failed")
}

///
/// モックサーバが受け付けたリクエスト
///
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

///
/// モックサーバの応答内容
///
enum Reply {
    /// Elasticsearchを模した応答(検索時のヒット総数)
    Engine { total: u64 },

    /// 配布物のダウンロード応答
    Archive(web::Bytes),
}

///
/// モックサーバの共有状態
///
struct MockState {
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
}

///
/// テスト用のHTTPサーバ
///
/// # 概要
/// 受け付けたリクエストを記録し、パスに応じた固定レスポンスを返す。
///
pub struct MockServer {
    port: u16,
    state: web::Data<MockState>,
    server: ServerHandle,
    thread: Option<JoinHandle<()>>,
}

impl MockServer {
    ///
    /// Elasticsearchを模したサーバを起動する
    ///
    /// # 引数
    /// * `total` - 検索時に返すヒット総数
    ///
    pub fn engine(total: u64) -> Self {
        Self::start(Reply::Engine { total })
    }

    ///
    /// 配布物を返すサーバを起動する
    ///
    /// # 引数
    /// * `archive` - 返却する配布物の内容
    ///
    pub fn archive(archive: Vec<u8>) -> Self {
        Self::start(Reply::Archive(web::Bytes::from(archive)))
    }

    fn start(reply: Reply) -> Self {
        let state = web::Data::new(MockState {
            reply,
            requests: Mutex::new(Vec::new()),
        });
        let (tx, rx) = mpsc::channel();

        let thread = {
            let state = state.clone();

            thread::spawn(move || {
                System::new().block_on(async move {
                    let server = HttpServer::new(move || {
                        App::new()
                            .app_data(state.clone())
                            .default_service(web::to(record_and_reply))
                    })
                    .workers(1)
                    .disable_signals()
                    .bind(("127.0.0.1", 0))
                    .expect("bind mock failed");

                    let port = server.addrs()[0].port();
                    let server = server.run();
                    tx.send((port, server.handle())).expect("send failed");

                    let _ = server.await;
                });
            })
        };

        let (port, server) = rx.recv().expect("mock did not start");
        Self { port, state, server, thread: Some(thread) }
    }

    ///
    /// 接続先URL
    ///
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    ///
    /// 記録済みリクエストの取得
    ///
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("lock failed").clone()
    }

    ///
    /// 指定メソッドのリクエストパス一覧
    ///
    pub fn paths(&self, method: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|req| req.method == method)
            .map(|req| req.path)
            .collect()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        System::new().block_on(self.server.stop(true));
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

///
/// 全リクエスト共通のハンドラ
///
async fn record_and_reply(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<MockState>,
) -> HttpResponse {
    let path = req
        .uri()
        .path_and_query()
        .map(|v| v.as_str())
        .unwrap_or_else(|| req.path())
        .to_string();

    state.requests.lock().expect("lock failed").push(RecordedRequest {
        method: req.method().to_string(),
        path: path.clone(),
        body: String::from_utf8_lossy(&body).to_string(),
    });

    match &state.reply {
        Reply::Engine { total } => {
            HttpResponse::Ok().json(engine_response(&path, *total))
        }

        Reply::Archive(archive) => {
            HttpResponse::Ok()
                .content_type("application/zip")
                .body(archive.clone())
        }
    }
}

///
/// パスに応じたレスポンスボディ
///
fn engine_response(path: &str, total: u64) -> Value {
    if path.contains("_bulk") {
        json!({ "took": 1, "errors": false, "items": [] })
    } else if path.contains("_search") {
        json!({
            "hits": {
                "total": total,
                "hits": [{ "_id": "r1", "_source": { "name": "castle" } }]
            }
        })
    } else if path.contains("_delete_by_query") {
        json!({ "deleted": 0 })
    } else {
        json!({ "acknowledged": true })
    }
}

///
/// APIサーバの起動を管理するガード
///
pub struct ServerGuard {
    child: Child,
}

impl ServerGuard {
    ///
    /// APIサーバを起動する
    ///
    /// # 引数
    /// * `base_dir` - ベースディレクトリ
    /// * `config_path` - 設定ファイルのパス
    /// * `port` - 待受ポート
    ///
    /// # 戻り値
    /// ServerGuard
    ///
    pub fn start(base_dir: &Path, config_path: &Path, port: u16) -> Self {
        let child = Command::new(test_binary_path())
            .env("XDG_CONFIG_HOME", base_dir)
            .env("XDG_DATA_HOME", base_dir)
            .arg("--config-path")
            .arg(config_path)
            .arg("run")
            .arg(format!("127.0.0.1:{}", port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn server failed");

        Self { child }
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

///
/// サーバの起動完了を待機する
///
/// # 引数
/// * `url` - ヘルスチェックURL
///
pub fn wait_for_server(url: &str) {
    let client = build_client();

    for _ in 0..50 {
        if let Ok(resp) = client.get(url).send() {
            if resp.status().as_u16() == 200 {
                return;
            }
        }

        thread::sleep(Duration::from_millis(100));
    }

    panic!("server did not start");
}

///
/// HTTPクライアントを生成する
///
/// # 戻り値
/// HTTPクライアント
///
pub fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_millis(7000))
        .build()
        .expect("client build failed")
}

///
/// テスト実行バイナリを取得する
///
/// # 戻り値
/// 実行バイナリのパス
///
pub fn test_binary_path() -> PathBuf {
    if let Some(exe) = std::env::var_os("CARGO_BIN_EXE_esadmin") {
        return PathBuf::from(exe);
    }

    let mut path = std::env::current_exe().expect("current exe missing");
    path.pop(); // deps
    path.pop(); // debug
    path.push("esadmin");
    if cfg!(windows) {
        path.set_extension("exe");
    }

    if !path.exists() {
        panic!("esadmin binary not found: {}", path.display());
    }

    path
}
