//! Listing filters and their query-string encoding.

/// Filters accepted by `GET /item/all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sub_category: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

impl ItemFilters {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }

    pub fn price_range(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Encode as ordered query pairs.
    ///
    /// Order is `page, limit, subCategory, minPrice, maxPrice`. A zero page
    /// or limit and an empty sub-category are treated as unset; a price of
    /// zero is a real bound and is kept.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(sub) = self.sub_category.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("subCategory", sub.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.to_string()));
        }

        pairs
    }
}
