use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: i64 = 10;

/// `?page=` as sent by the browser. Anything that is not a number means page one.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn requested(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|page| page.trim().parse::<i64>().ok())
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    pub per_page: i64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            per_page: PAGE_SIZE,
        }
    }
}

/// The slice of rows a page covers once the requested number is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Paginator {
    pub fn num_pages(&self, count: i64) -> i64 {
        if count <= 0 {
            1
        } else {
            (count + self.per_page - 1) / self.per_page
        }
    }

    pub fn window(&self, requested: i64, count: i64) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = requested.clamp(1, num_pages);
        PageWindow {
            number,
            num_pages,
            count,
            limit: self.per_page,
            offset: (number - 1) * self.per_page,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Page {
            items,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
