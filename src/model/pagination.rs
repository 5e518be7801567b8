//! 分页控制器：页码从 1 开始，越界页码在渲染前钳制，永远不报错

/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// 总页数，至少为 1
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    count.div_ceil(size).max(1)
}

/// 取第 `page` 页的切片；越界时返回空切片
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
    total_pages: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_pages: 1,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// 最近一次渲染时计算出的总页数
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// 请求翻页：只保证不小于 1，上界留给下一次渲染时钳制
    pub fn change_page(&mut self, delta: i64) {
        let next = self.page as i64 + delta;
        self.page = next.max(1) as usize;
    }

    /// 按新的条目数重新计算总页数并钳制当前页
    pub fn clamp(&mut self, count: usize) -> usize {
        self.total_pages = total_pages(count, self.page_size);
        self.page = self.page.clamp(1, self.total_pages);
        self.total_pages
    }

    /// 钳制后返回当前页的条目
    pub fn current<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        self.clamp(items.len());
        paginate(items, self.page, self.page_size)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 25), 1);
        assert_eq!(total_pages(25, 25), 1);
        assert_eq!(total_pages(26, 25), 2);
        assert_eq!(total_pages(30, 25), 2);
    }

    #[test]
    fn test_paginate_out_of_range_is_empty() {
        let items: Vec<u32> = (0..30).collect();
        assert_eq!(paginate(&items, 1, 25).len(), 25);
        assert_eq!(paginate(&items, 2, 25), &items[25..]);
        assert!(paginate(&items, 3, 25).is_empty());
    }

    #[test]
    fn test_clamped_page_is_never_empty() {
        for n in 1..80usize {
            let items: Vec<usize> = (0..n).collect();
            for requested in 1..10usize {
                let total = total_pages(n, 25);
                let page = requested.min(total);
                assert!(!paginate(&items, page, 25).is_empty(), "n={} page={}", n, requested);
            }
        }
    }

    #[test]
    fn test_change_page_is_bounded_below_and_clamped_on_render() {
        let items: Vec<u32> = (0..30).collect();
        let mut pager = Pager::default();
        assert_eq!(pager.current(&items).len(), 25);
        assert_eq!((pager.page(), pager.total_pages()), (1, 2));

        pager.change_page(1);
        assert_eq!(pager.current(&items).len(), 5);
        assert_eq!((pager.page(), pager.total_pages()), (2, 2));

        pager.change_page(1);
        assert_eq!(pager.page(), 3, "请求阶段不钳制上界");
        assert_eq!(pager.current(&items).len(), 5);
        assert_eq!((pager.page(), pager.total_pages()), (2, 2));

        pager.change_page(-10);
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn test_shrinking_set_clamps_page() {
        let mut pager = Pager::new(10);
        let many: Vec<u32> = (0..50).collect();
        pager.current(&many);
        pager.change_page(4);
        assert_eq!(pager.current(&many).len(), 10);
        assert_eq!((pager.page(), pager.total_pages()), (5, 5));

        let few: Vec<u32> = (0..12).collect();
        assert_eq!(pager.current(&few).len(), 2);
        assert_eq!((pager.page(), pager.total_pages()), (2, 2));

        let none: Vec<u32> = Vec::new();
        assert!(pager.current(&none).is_empty());
        assert_eq!((pager.page(), pager.total_pages()), (1, 1));
    }
}
