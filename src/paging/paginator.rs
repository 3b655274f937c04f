/*
 * Search paging and index administration tool
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ヒット総数とページサイズからページ情報を算出するモジュール
//!

use serde::Serialize;

use super::PagingError;

///
/// ヒット総数をページに分割するページネータ
///
#[derive(Clone, Copy, Debug)]
pub struct Paginator {
    /// ヒット総数
    count: u64,

    /// 1ページあたりの件数
    per_page: u32,
}

impl Paginator {
    ///
    /// ページネータの生成
    ///
    /// # 引数
    /// * `count` - ヒット総数
    /// * `per_page` - 1ページあたりの件数
    ///
    /// # 戻り値
    /// ページサイズが0の場合はエラーを返す。
    ///
    pub fn new(count: u64, per_page: u32) -> Result<Self, PagingError> {
        if per_page == 0 {
            return Err(PagingError::InvalidPageSize);
        }

        Ok(Self { count, per_page })
    }

    ///
    /// 総ページ数
    ///
    /// # 戻り値
    /// ヒットが0件の場合も空の1ページ目が存在するものとして1を返す。
    ///
    pub fn num_pages(&self) -> u32 {
        if self.count == 0 {
            return 1;
        }

        let pages = self.count.div_ceil(self.per_page as u64);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    ///
    /// ページ番号の検証
    ///
    /// # 引数
    /// * `page` - ページ番号
    ///
    /// # 戻り値
    /// 範囲内であればページ番号をそのまま返す。
    ///
    pub fn validate(&self, page: u32) -> Result<u32, PagingError> {
        if page < 1 {
            return Err(PagingError::InvalidPage);
        }

        let num_pages = self.num_pages();
        if page > num_pages {
            return Err(PagingError::EmptyPage { page, num_pages });
        }

        Ok(page)
    }

    ///
    /// 指定ページのページ記述子を生成する
    ///
    /// # 引数
    /// * `page` - ページ番号
    ///
    /// # 戻り値
    /// 生成したページ記述子を`Ok()`でラップして返す。ページ番号が範囲外の場合
    /// はエラーを返す。
    ///
    pub fn page(&self, page: u32) -> Result<PageDescriptor, PagingError> {
        let page = self.validate(page)?;
        let num_pages = self.num_pages();
        let per_page = self.per_page as u64;

        let has_next = page < num_pages;
        let has_previous = page > 1;

        let start_index = if self.count == 0 {
            0
        } else {
            (page as u64 - 1) * per_page + 1
        };

        let end_index = if page == num_pages {
            self.count
        } else {
            page as u64 * per_page
        };

        Ok(PageDescriptor {
            current_page: page,
            has_next,
            has_previous,
            has_other_pages: has_next || has_previous,
            next_page_number: has_next.then(|| page + 1),
            previous_page_number: has_previous.then(|| page - 1),
            start_index,
            end_index,
            total_pages: num_pages,
            pages: page_links(page, num_pages),
        })
    }
}

///
/// ページ記述子
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageDescriptor {
    pub current_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
    pub has_other_pages: bool,
    pub next_page_number: Option<u32>,
    pub previous_page_number: Option<u32>,
    pub start_index: u64,
    pub end_index: u64,
    pub total_pages: u32,

    /// ページャ表示用のページ番号一覧(`None`は省略箇所)
    pub pages: Vec<Option<u32>>,
}

///
/// ヒット総数・ページ番号・ページサイズからページ記述子を生成する
///
/// # 引数
/// * `total_hits` - ヒット総数
/// * `page` - ページ番号
/// * `page_size` - 1ページあたりの件数
///
/// # 戻り値
/// 生成したページ記述子
///
pub fn build_page_descriptor(total_hits: u64, page: u32, page_size: u32)
    -> Result<PageDescriptor, PagingError>
{
    Paginator::new(total_hits, page_size)?.page(page)
}

///
/// ページャ表示用のページ番号一覧を生成する
///
/// # 概要
/// 先頭・前・現在・次・末尾のページ番号を並べ、連続しない箇所には`None`を
/// 挟む。
///
fn page_links(page: u32, num_pages: u32) -> Vec<Option<u32>> {
    let low = page.saturating_sub(1).max(1);
    let high = page.saturating_add(1).min(num_pages);
    let mut links = Vec::new();

    if low > 1 {
        links.push(Some(1));
        if low > 2 {
            links.push(None);
        }
    }

    for number in low..=high {
        links.push(Some(number));
    }

    if high < num_pages {
        if high < num_pages - 1 {
            links.push(None);
        }
        links.push(Some(num_pages));
    }

    links
}
