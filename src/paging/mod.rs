/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 検索結果のページングを取り扱うモジュール
//!
//! # 概要
//! リクエストのページ番号・件数指定をクエリ用のオフセット/件数に変換し、
//! 検索後はヒット総数からページ情報(ページ記述子)を生成する。
//!

mod filter;
mod paginator;

use serde::Deserialize;
use thiserror::Error as ThisError;

pub use filter::{total_hits, PagedQuery, PagingFilter};
pub use paginator::{build_page_descriptor, PageDescriptor, Paginator};

/// 通常検索時の1ページあたりの件数のデフォルト値
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 5;

/// エクスポート時の1ページあたりの件数のデフォルト値
pub const DEFAULT_EXPORT_ITEMS_PER_PAGE: u32 = 100_000;

///
/// ページング処理で発生するエラー
///
#[derive(Debug, PartialEq, ThisError)]
pub enum PagingError {
    /// ページ番号が1未満
    #[error("that page number is less than 1")]
    InvalidPage,

    /// ページ番号が総ページ数を超えている
    #[error("page {page} contains no results (total pages: {num_pages})")]
    EmptyPage { page: u32, num_pages: u32 },

    /// ページサイズが0
    #[error("page size must be greater than 0")]
    InvalidPageSize,

    /// limitパラメータが正の整数でない
    #[error("invalid query parameter: limit ({0})")]
    InvalidLimit(String),

    /// mobiledownload指定時にresourcecountが無い
    #[error("query parameter resourcecount is required for mobile download")]
    MissingResourceCount,

    /// resourcecountパラメータが正の整数でない
    #[error("invalid query parameter: resourcecount ({0})")]
    InvalidResourceCount(String),

    /// 検索結果にヒット総数が含まれていない
    #[error("search result has no hits.total")]
    MissingTotal,
}

///
/// ページ件数の設定情報
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PagingConfig {
    /// 通常検索時の1ページあたりの件数
    items_per_page: u32,

    /// エクスポート時の1ページあたりの件数
    export_items_per_page: u32,
}

impl PagingConfig {
    ///
    /// 設定情報の生成
    ///
    /// # 引数
    /// * `items_per_page` - 通常検索時の1ページあたりの件数
    /// * `export_items_per_page` - エクスポート時の1ページあたりの件数
    ///
    /// # 戻り値
    /// 生成した設定情報
    ///
    pub fn new(items_per_page: u32, export_items_per_page: u32) -> Self {
        Self { items_per_page, export_items_per_page }
    }

    ///
    /// 通常検索時の1ページあたりの件数へのアクセサ
    ///
    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    ///
    /// エクスポート時の1ページあたりの件数へのアクセサ
    ///
    pub fn export_items_per_page(&self) -> u32 {
        self.export_items_per_page
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE, DEFAULT_EXPORT_ITEMS_PER_PAGE)
    }
}

///
/// リクエストのモードを表す列挙子
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PageMode {
    /// エクスポート(エクスポート用のページサイズを使用)
    Export,

    /// モバイル向けダウンロード(呼び出し側が件数を指定)
    MobileDownload {
        resource_count: u32,
    },

    /// 通常の検索
    Default,
}

///
/// クエリに適用する取得範囲
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchWindow {
    /// 取得開始位置(0起点)
    offset: u64,

    /// 取得件数
    limit: u32,
}

impl SearchWindow {
    ///
    /// 取得開始位置へのアクセサ
    ///
    pub fn offset(&self) -> u64 {
        self.offset
    }

    ///
    /// 取得件数へのアクセサ
    ///
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

///
/// ページ番号と件数指定から取得範囲を算出する
///
/// # 概要
/// 件数は明示指定 > エクスポート > モバイルダウンロード > デフォルト の順で
/// 決定する。オフセットは`limit × (page − 1)`で、ページ番号が1以下の場合は0
/// となる。
///
/// # 引数
/// * `page` - ページ番号(1起点)
/// * `mode` - リクエストのモード
/// * `explicit_limit` - 明示指定された件数
/// * `config` - ページ件数の設定
///
/// # 戻り値
/// 算出した取得範囲
///
pub fn compute_window(
    page: u32,
    mode: PageMode,
    explicit_limit: Option<u32>,
    config: &PagingConfig,
) -> SearchWindow {
    let limit = match explicit_limit {
        Some(limit) => limit,
        None => match mode {
            PageMode::Export => config.export_items_per_page(),
            PageMode::MobileDownload { resource_count } => resource_count,
            PageMode::Default => config.items_per_page(),
        },
    };

    let offset = (limit as u64) * (page.saturating_sub(1) as u64);

    SearchWindow { offset, limit }
}

///
/// リクエストのクエリパラメータ(未加工)
///
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PagingParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub export: Option<String>,
    pub mobiledownload: Option<String>,
    pub resourcecount: Option<String>,
}

///
/// 型付けされたページング要求
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageRequest {
    page: u32,
    mode: PageMode,
    explicit_limit: Option<u32>,
}

impl PageRequest {
    ///
    /// ページング要求の生成
    ///
    /// # 引数
    /// * `page` - ページ番号(1未満は1に丸める)
    /// * `mode` - リクエストのモード
    /// * `explicit_limit` - 明示指定された件数
    ///
    /// # 戻り値
    /// 生成したページング要求
    ///
    pub fn new(page: u32, mode: PageMode, explicit_limit: Option<u32>) -> Self {
        Self { page: page.max(1), mode, explicit_limit }
    }

    ///
    /// クエリパラメータからページング要求を生成する
    ///
    /// # 概要
    /// `export`が存在すればエクスポート、`mobiledownload`が存在すればモバイル
    /// ダウンロードとして扱う(値の内容は問わない)。
    ///
    /// # 引数
    /// * `params` - クエリパラメータ
    ///
    /// # 戻り値
    /// 解析に成功した場合はページング要求を`Ok()`でラップして返す。
    ///
    pub fn from_params(params: &PagingParams) -> Result<Self, PagingError> {
        let page = parse_page(params.page.as_deref());

        let mode = if params.export.is_some() {
            PageMode::Export
        } else if params.mobiledownload.is_some() {
            let raw = params.resourcecount
                .as_deref()
                .ok_or(PagingError::MissingResourceCount)?;
            let resource_count = parse_positive(raw)
                .ok_or_else(|| {
                    PagingError::InvalidResourceCount(raw.to_string())
                })?;
            PageMode::MobileDownload { resource_count }
        } else {
            PageMode::Default
        };

        let explicit_limit = match params.limit.as_deref() {
            Some(raw) => Some(
                parse_positive(raw)
                    .ok_or_else(|| PagingError::InvalidLimit(raw.to_string()))?
            ),
            None => None,
        };

        Ok(Self::new(page, mode, explicit_limit))
    }

    ///
    /// ページ番号へのアクセサ
    ///
    pub fn page(&self) -> u32 {
        self.page
    }

    ///
    /// モードへのアクセサ
    ///
    pub fn mode(&self) -> PageMode {
        self.mode
    }

    ///
    /// 明示指定された件数へのアクセサ
    ///
    pub fn explicit_limit(&self) -> Option<u32> {
        self.explicit_limit
    }

    ///
    /// 取得範囲の算出
    ///
    pub fn window(&self, config: &PagingConfig) -> SearchWindow {
        compute_window(self.page, self.mode, self.explicit_limit, config)
    }
}

///
/// ページ番号文字列の解析
///
/// # 概要
/// 未指定・空文字列・数値以外は1として扱い、1未満の値は1に丸める。
///
/// # 引数
/// * `raw` - ページ番号の文字列
///
/// # 戻り値
/// ページ番号
///
pub fn parse_page(raw: Option<&str>) -> u32 {
    match raw.map(str::trim).and_then(|value| value.parse::<i64>().ok()) {
        Some(page) if page > u32::MAX as i64 => u32::MAX,
        Some(page) if page >= 1 => page as u32,
        _ => 1,
    }
}

///
/// 正の整数文字列の解析
///
fn parse_positive(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(value) => Some(value),
    }
}
