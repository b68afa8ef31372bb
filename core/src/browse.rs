//! Client-side filtering and pagination of country lists.
//!
//! The full list is downloaded once; a filter swaps in the list returned by
//! the matching lookup, and pages are plain slices of whichever list is
//! current. Changing filters always goes back to page 1.

use tracing::debug;

use crate::countries::CountryService;
use crate::transport::Transport;
use crate::types::Country;

pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Filter presets offered to the user.
pub const REGIONS: [&str; 5] = ["Africa", "Americas", "Asia", "Europe", "Oceania"];
pub const LANGUAGES: [&str; 8] = [
    "English", "Spanish", "French", "Arabic", "Chinese", "Russian", "Portuguese", "German",
];
pub const CURRENCIES: [&str; 9] = ["USD", "EUR", "GBP", "JPY", "CNY", "INR", "AUD", "CAD", "LKR"];

/// `ceil(len / page_size)`; zero for an empty list.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Items `[(page-1)*size, page*size)` clipped to the list. Page numbers
/// start at 1; anything out of range yields an empty slice.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Current filter inputs. Nothing here stops several from being set at once;
/// the constructors build the single-filter values a UI normally wants, and
/// `active` resolves overlaps as search > region > language > currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub search: String,
    pub region: String,
    pub language: String,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter<'a> {
    None,
    Search(&'a str),
    Region(&'a str),
    Language(&'a str),
    Currency(&'a str),
}

impl Filters {
    pub fn search(term: &str) -> Self {
        Self {
            search: term.to_string(),
            ..Self::default()
        }
    }

    pub fn region(region: &str) -> Self {
        Self {
            region: region.to_string(),
            ..Self::default()
        }
    }

    pub fn language(language: &str) -> Self {
        Self {
            language: language.to_string(),
            ..Self::default()
        }
    }

    pub fn currency(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            ..Self::default()
        }
    }

    pub fn active(&self) -> ActiveFilter<'_> {
        let set = |s: &str| !s.trim().is_empty();
        if set(&self.search) {
            ActiveFilter::Search(self.search.trim())
        } else if set(&self.region) {
            ActiveFilter::Region(self.region.trim())
        } else if set(&self.language) {
            ActiveFilter::Language(self.language.trim())
        } else if set(&self.currency) {
            ActiveFilter::Currency(self.currency.trim())
        } else {
            ActiveFilter::None
        }
    }
}

/// List view state: the full list, the filtered list, and the page cursor.
#[derive(Debug, Clone)]
pub struct CountryBrowser {
    all: Vec<Country>,
    filtered: Vec<Country>,
    filters: Filters,
    page: usize,
    page_size: usize,
}

impl CountryBrowser {
    pub fn new(page_size: usize) -> Self {
        Self {
            all: Vec::new(),
            filtered: Vec::new(),
            filters: Filters::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Download the full list and show it unfiltered.
    pub fn load<T: Transport>(&mut self, service: &CountryService<T>) -> usize {
        self.all = service.get_all();
        self.filters = Filters::default();
        self.filtered = self.all.clone();
        self.page = 1;
        debug!(count = self.all.len(), "country list loaded");
        self.all.len()
    }

    /// Replace the filters, refetch the matching list, and return to page 1.
    /// Region, language, and currency values are lower-cased for the API.
    pub fn apply<T: Transport>(&mut self, filters: Filters, service: &CountryService<T>) -> usize {
        self.filtered = match filters.active() {
            ActiveFilter::Search(term) => service.search_by_name(term),
            ActiveFilter::Region(region) => service.filter_by_region(&region.to_lowercase()),
            ActiveFilter::Language(language) => service.filter_by_language(&language.to_lowercase()),
            ActiveFilter::Currency(currency) => service.filter_by_currency(&currency.to_lowercase()),
            ActiveFilter::None => self.all.clone(),
        };
        self.filters = filters;
        self.page = 1;
        debug!(filters = ?self.filters, count = self.filtered.len(), "filters applied");
        self.filtered.len()
    }

    pub fn clear_filters(&mut self) {
        self.filters = Filters::default();
        self.filtered = self.all.clone();
        self.page = 1;
    }

    /// Move to `page` if it exists. Returns whether the cursor moved.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.total_pages() {
            return false;
        }
        self.page = page;
        true
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.page_size)
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn all(&self) -> &[Country] {
        &self.all
    }

    pub fn countries(&self) -> &[Country] {
        &self.filtered
    }

    pub fn current_page(&self) -> &[Country] {
        page_slice(&self.filtered, self.page, self.page_size)
    }
}
