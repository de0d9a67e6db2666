//! Data grid descriptors.
//!
//! List screens describe their columns and filters here; the shared
//! `components/_table_head.html` and `components/_filters.html` partials render
//! them. Rows are rendered by each screen's own template.

use boutique_core::OrderStatus;

/// Column definition for a data table.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub key: &'static str,
    pub label: &'static str,
    /// Right-aligned numeric column.
    pub numeric: bool,
}

impl TableColumn {
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            numeric: false,
        }
    }

    #[must_use]
    pub const fn numeric(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            numeric: true,
        }
    }
}

/// Filter input kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Text,
    Select,
    Date,
}

/// Filter definition for a data table.
#[derive(Debug, Clone)]
pub struct TableFilter {
    /// Query parameter name.
    pub key: &'static str,
    pub label: &'static str,
    pub filter_type: FilterType,
    pub placeholder: Option<&'static str>,
    pub options: Vec<FilterOption>,
    /// Current value from the query string.
    pub value: String,
}

/// Option for select filters.
#[derive(Debug, Clone)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl TableFilter {
    #[must_use]
    pub const fn text(key: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            key,
            label,
            filter_type: FilterType::Text,
            placeholder: Some(placeholder),
            options: Vec::new(),
            value: String::new(),
        }
    }

    #[must_use]
    pub const fn select(key: &'static str, label: &'static str, options: Vec<FilterOption>) -> Self {
        Self {
            key,
            label,
            filter_type: FilterType::Select,
            placeholder: None,
            options,
            value: String::new(),
        }
    }

    #[must_use]
    pub const fn date(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            filter_type: FilterType::Date,
            placeholder: None,
            options: Vec::new(),
            value: String::new(),
        }
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.filter_type, FilterType::Text)
    }

    #[must_use]
    pub const fn is_select(&self) -> bool {
        matches!(self.filter_type, FilterType::Select)
    }

    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self.filter_type, FilterType::Date)
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone)]
pub struct DataTableConfig {
    pub table_id: &'static str,
    pub columns: Vec<TableColumn>,
    pub filters: Vec<TableFilter>,
    pub empty_title: &'static str,
}

impl DataTableConfig {
    #[must_use]
    pub const fn new(table_id: &'static str) -> Self {
        Self {
            table_id,
            columns: Vec::new(),
            filters: Vec::new(),
            empty_title: "No items found",
        }
    }

    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub const fn empty_state(mut self, title: &'static str) -> Self {
        self.empty_title = title;
        self
    }

    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Fill the filter inputs from the request's query parameters.
    #[must_use]
    pub fn with_values(mut self, params: &[(&str, String)]) -> Self {
        for filter in &mut self.filters {
            if let Some((_, value)) = params.iter().find(|(k, _)| *k == filter.key) {
                filter.value.clone_from(value);
            }
        }
        self
    }
}

/// Previous/next links for a paginated list.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u32,
    pub total: u64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pagination {
    /// Build links for `path`, carrying the other query parameters along.
    #[must_use]
    pub fn new(path: &str, params: &[(&str, String)], page: u32, total: u64, has_next: bool) -> Self {
        let link = |p: u32| {
            let mut query: Vec<String> = params
                .iter()
                .filter(|(k, v)| *k != "page" && !v.is_empty())
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect();
            if p > 1 {
                query.push(format!("page={p}"));
            }
            if query.is_empty() {
                path.to_string()
            } else {
                format!("{path}?{}", query.join("&"))
            }
        };

        Self {
            page,
            total,
            prev_url: (page > 1).then(|| link(page - 1)),
            next_url: has_next.then(|| link(page + 1)),
        }
    }
}

/// Products grid.
#[must_use]
pub fn products_table_config(categories: Vec<FilterOption>) -> DataTableConfig {
    DataTableConfig::new("products")
        .column(TableColumn::new("image", ""))
        .column(TableColumn::new("name", "Product"))
        .column(TableColumn::new("categories", "Categories"))
        .column(TableColumn::numeric("price", "Price"))
        .column(TableColumn::numeric("sale_price", "Sale price"))
        .column(TableColumn::numeric("stock", "Stock"))
        .column(TableColumn::new("published", "Published"))
        .filter(TableFilter::text("search", "Search", "Search products by name..."))
        .filter(TableFilter::select("category", "Category", categories))
        .empty_state("No products found")
}

/// Orders grid. The status filter takes status codes; the handler maps them
/// to backend ids.
#[must_use]
pub fn orders_table_config() -> DataTableConfig {
    let statuses = OrderStatus::ALL
        .iter()
        .map(|s| FilterOption::new(s.code(), s.label()))
        .collect();

    DataTableConfig::new("orders")
        .column(TableColumn::new("code", "Order"))
        .column(TableColumn::new("customer", "Customer"))
        .column(TableColumn::new("date", "Date"))
        .column(TableColumn::new("payment", "Payment"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::numeric("total", "Total"))
        .filter(TableFilter::text(
            "search",
            "Search",
            "Search by customer name or order code...",
        ))
        .filter(TableFilter::select("status", "Status", statuses))
        .filter(TableFilter::date("start_date", "From"))
        .filter(TableFilter::date("end_date", "To"))
        .empty_state("No orders found")
}

/// Users grid.
#[must_use]
pub fn users_table_config() -> DataTableConfig {
    DataTableConfig::new("users")
        .column(TableColumn::new("name", "Name"))
        .column(TableColumn::new("email", "Email"))
        .column(TableColumn::new("phone", "Phone"))
        .column(TableColumn::new("roles", "Roles"))
        .column(TableColumn::new("joined", "Joined"))
        .column(TableColumn::new("active", "Active"))
        .filter(TableFilter::text("search", "Search", "Search by name or email..."))
        .empty_state("No users found")
}

/// Coupons grid.
#[must_use]
pub fn coupons_table_config() -> DataTableConfig {
    DataTableConfig::new("coupons")
        .column(TableColumn::new("code", "Code"))
        .column(TableColumn::new("type", "Type"))
        .column(TableColumn::numeric("value", "Value"))
        .column(TableColumn::new("window", "Valid"))
        .column(TableColumn::numeric("usage", "Used"))
        .column(TableColumn::new("active", "Active"))
        .filter(TableFilter::text("search", "Search", "Search coupon codes..."))
        .filter(TableFilter::select(
            "is_active",
            "Active",
            vec![FilterOption::new("true", "Yes"), FilterOption::new("false", "No")],
        ))
        .empty_state("No coupons yet")
}

/// Sales grid.
#[must_use]
pub fn sales_table_config() -> DataTableConfig {
    DataTableConfig::new("sales")
        .column(TableColumn::new("name", "Name"))
        .column(TableColumn::new("type", "Type"))
        .column(TableColumn::numeric("value", "Value"))
        .column(TableColumn::new("window", "Runs"))
        .column(TableColumn::numeric("priority", "Priority"))
        .column(TableColumn::new("targets", "Applies to"))
        .column(TableColumn::new("active", "Active"))
        .empty_state("No sales yet")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_links_keep_filters() {
        let params = vec![
            ("status", "PENDING".to_string()),
            ("search", "áo thun".to_string()),
            ("page", "2".to_string()),
        ];
        let pages = Pagination::new("/orders", &params, 2, 45, true);
        assert_eq!(
            pages.prev_url.as_deref(),
            Some("/orders?status=PENDING&search=%C3%A1o%20thun")
        );
        assert_eq!(
            pages.next_url.as_deref(),
            Some("/orders?status=PENDING&search=%C3%A1o%20thun&page=3")
        );
    }

    #[test]
    fn test_first_page_has_no_prev() {
        let pages = Pagination::new("/users", &[], 1, 3, false);
        assert!(pages.prev_url.is_none());
        assert!(pages.next_url.is_none());
    }

    #[test]
    fn test_filter_values_come_from_query() {
        let table = users_table_config().with_values(&[("search", "lan".to_string())]);
        assert_eq!(table.filters.first().map(|f| f.value.as_str()), Some("lan"));
    }

    #[test]
    fn test_orders_table_lists_every_status() {
        let table = orders_table_config();
        let status = table.filters.iter().find(|f| f.key == "status");
        assert_eq!(status.map(|f| f.options.len()), Some(OrderStatus::ALL.len()));
    }

    #[test]
    fn test_orders_table_has_search_box() {
        let table = orders_table_config().with_values(&[("search", "ORD-0007".to_string())]);
        let search = table.filters.iter().find(|f| f.key == "search");
        assert_eq!(search.map(|f| f.value.as_str()), Some("ORD-0007"));
    }
}
