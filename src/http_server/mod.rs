/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! HTTPサーバに関する処理を集約するモジュール
//!

pub(crate) mod app_state;
pub(crate) mod logger;

use anyhow::{Context, Result};
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use log::info;
use tokio::runtime::Builder;

use crate::rest_api;

use self::app_state::AppState;
use self::logger::AccessLogger;

///
/// HTTPサーバの起動
///
/// # 引数
/// * `addr` - サーバーをバインドさせるアドレス
/// * `port` - サーバーをバインドさせるポート番号
/// * `state` - 共有状態
///
/// # 戻り値
/// サーバが正常に終了した場合は`Ok(())`を返す。
///
pub(crate) fn run(addr: String, port: u16, state: AppState) -> Result<()> {
    /*
     * Tokioランタイムの構築
     */
    let rt = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    /*
     * サーバインスタンスの生成
     */
    let state = web::Data::new(state);
    let server = create_server(&addr, port, state.clone())?;

    /*
     * Tokioランタイムでのサーバの起動
     */
    info!("HTTP server start: {}:{}", addr, port);

    match rt.block_on(async {server.await}) {
        Ok(()) => {
            info!("HTTP server exit");
            Ok(())
        }

        Err(err) => {
            info!("HTTP server failed");
            Err(err.into())
        }
    }
}

///
/// HTTPサーバーの生成
///
/// # 引数
/// * `addr` - サーバーをバインドさせるアドレス
/// * `port` - サーバーをバインドさせるポート番号
/// * `state` - 共有状態
///
fn create_server(
    addr: &str,
    port: u16,
    state: web::Data<AppState>,
) -> Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            // ロガーの設定
            .wrap(AccessLogger::new())

            // REST APIエンドポイント設定
            .app_data(state.clone())
            .service(rest_api::create_api_scope())
    })
    .bind(format!("{}:{}", addr, port))
    .with_context(|| format!("bind {}:{}", addr, port))?;

    Ok(server.run())
}
