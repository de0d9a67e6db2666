//! Catalog resources: suppliers, categories, products and their variants.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    CatalogSort, CategoryId, ColorId, ProductId, SizeId, SupplierId, SupplierStatus, VariantId,
    Vnd,
};

/// A product supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub company_name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub status: SupplierStatus,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<FixedOffset>>,
}

/// Body of `POST /suppliers/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewSupplier {
    pub company_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub tax_id: String,
    pub status: SupplierStatus,
    pub website: String,
}

/// A product category. Categories nest through `parent`/`subcategories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub parent: Option<CategoryId>,
    #[serde(default)]
    pub subcategories: Vec<Category>,
}

impl Category {
    /// Depth-first walk yielding each category with its nesting depth.
    #[must_use]
    pub fn flatten(categories: &[Self]) -> Vec<(usize, &Self)> {
        fn walk<'a>(items: &'a [Category], depth: usize, out: &mut Vec<(usize, &'a Category)>) {
            for item in items {
                out.push((depth, item));
                walk(&item.subcategories, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        walk(categories, 0, &mut out);
        out
    }

    /// Find a category anywhere in a tree.
    #[must_use]
    pub fn find(categories: &[Self], id: CategoryId) -> Option<&Self> {
        Self::flatten(categories)
            .into_iter()
            .map(|(_, c)| c)
            .find(|c| c.id == id)
    }
}

/// Body of `POST /categories/` and `PUT /categories/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CategoryId>,
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cost_price: Vnd,
    #[serde(default)]
    pub price: Vnd,
    #[serde(default)]
    pub sale_price: Vnd,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub publish_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub supplier_details: Option<Supplier>,
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Sum of the variants' stock, computed by the backend.
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl Product {
    /// Price the customer pays: the sale price when one is set below the list price.
    #[must_use]
    pub fn effective_price(&self) -> Vnd {
        if self.sale_price > Vnd::ZERO && self.sale_price < self.price {
            self.sale_price
        } else {
            self.price
        }
    }

    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.effective_price() < self.price
    }

    /// Whole-percent discount of the sale price against the list price.
    #[must_use]
    pub fn discount_percent(&self) -> i64 {
        if !self.is_on_sale() || self.price.amount() == 0 {
            return 0;
        }
        (self.price.amount() - self.sale_price.amount()) * 100 / self.price.amount()
    }
}

/// Variant size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Size {
    pub id: SizeId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Variant color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    pub name: String,
    #[serde(default)]
    pub hex_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A sellable size/color combination of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product: ProductId,
    #[serde(default)]
    pub product_details: Option<Product>,
    #[serde(default)]
    pub size: Option<SizeId>,
    #[serde(default)]
    pub size_details: Option<Size>,
    #[serde(default)]
    pub color: Option<ColorId>,
    #[serde(default)]
    pub color_details: Option<Color>,
    pub sku: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub weight_grams: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Variant {
    /// `"M / Black"`, or whichever half is present.
    #[must_use]
    pub fn label(&self) -> String {
        let size = self.size_details.as_ref().map(|s| s.name.as_str());
        let color = self.color_details.as_ref().map(|c| c.name.as_str());
        match (size, color) {
            (Some(s), Some(c)) => format!("{s} / {c}"),
            (Some(one), None) | (None, Some(one)) => one.to_string(),
            (None, None) => self.sku.clone(),
        }
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.is_active && self.stock > 0
    }

    /// Unit price of the owning product, when the backend nested it.
    #[must_use]
    pub fn unit_price(&self) -> Option<Vnd> {
        self.product_details.as_ref().map(Product::effective_price)
    }
}

/// Text fields of a product create/update form, sent as multipart.
///
/// Blank name and prices are left out of the parts, so a partial update
/// keeps the stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub cost_price: Option<i64>,
    pub price: Option<i64>,
    pub sale_price: Option<i64>,
    pub supplier: Option<SupplierId>,
    pub category_id: Option<CategoryId>,
    pub publish_at: Option<NaiveDate>,
}

impl ProductInput {
    /// Multipart text parts in the commerce API's field names.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        let name = self.name.trim();
        if !name.is_empty() {
            fields.push(("name", name.to_string()));
        }
        fields.push(("description", self.description.clone()));
        if let Some(cost) = self.cost_price {
            fields.push(("cost_price", cost.to_string()));
        }
        if let Some(price) = self.price {
            fields.push(("price", price.to_string()));
        }
        if let Some(sale) = self.sale_price {
            fields.push(("sale_price", sale.to_string()));
        }
        if let Some(supplier) = self.supplier {
            fields.push(("supplier", supplier.to_string()));
        }
        if let Some(category) = self.category_id {
            fields.push(("category_id", category.to_string()));
        }
        if let Some(date) = self.publish_at {
            fields.push(("publish_at", date.format("%Y-%m-%d").to_string()));
        }
        fields
    }
}

/// Text fields of a variant form, sent as multipart to
/// `POST /products/{id}/variants/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInput {
    pub product: ProductId,
    pub size: Option<SizeId>,
    pub color: Option<ColorId>,
    pub sku: String,
    pub stock: i64,
    pub weight_grams: Option<Decimal>,
    pub is_active: bool,
}

impl VariantInput {
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("product", self.product.to_string()),
            ("sku", self.sku.trim().to_string()),
            ("stock", self.stock.to_string()),
            ("is_active", self.is_active.to_string()),
        ];
        if let Some(size) = self.size {
            fields.push(("size", size.to_string()));
        }
        if let Some(color) = self.color {
            fields.push(("color", color.to_string()));
        }
        if let Some(weight) = self.weight_grams {
            fields.push(("weight_grams", weight.to_string()));
        }
        fields
    }
}

const fn default_true() -> bool {
    true
}

/// Query parameters of `GET /products/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub sort: Option<CatalogSort>,
    /// Newest first, as used for the "new arrivals" shelf.
    pub latest: bool,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ProductFilter {
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(sort) = self.sort {
            let (by, value) = sort.api_params();
            pairs.push(("sort_by", by.to_string()));
            pairs.push(("sort_value", value.to_string()));
        }
        if self.latest {
            pairs.push(("latest", "true".to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page.filter(|p| *p > 1) {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tree_flatten() {
        let json = r#"[
            {"id": 1, "name": "Men", "subcategories": [
                {"id": 3, "name": "Shirts", "parent": 1, "subcategories": []}
            ]},
            {"id": 2, "name": "Women"}
        ]"#;
        let tree: Vec<Category> = serde_json::from_str(json).unwrap();
        let flat = Category::flatten(&tree);
        let names: Vec<_> = flat.iter().map(|(d, c)| (*d, c.name.as_str())).collect();
        assert_eq!(names, vec![(0, "Men"), (1, "Shirts"), (0, "Women")]);
        assert_eq!(
            Category::find(&tree, CategoryId::new(3)).map(|c| c.name.as_str()),
            Some("Shirts")
        );
    }

    #[test]
    fn test_product_effective_price() {
        let json = r#"{"id": 7, "name": "Linen shirt", "slug": "linen-shirt",
            "price": 400000, "sale_price": "300000.00", "stock": 12}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.effective_price(), Vnd::new(300_000));
        assert!(product.is_on_sale());
        assert_eq!(product.discount_percent(), 25);
    }

    #[test]
    fn test_product_without_sale_price() {
        let json = r#"{"id": 7, "name": "Tee", "slug": "tee", "price": 150000, "sale_price": 0}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.effective_price(), Vnd::new(150_000));
        assert_eq!(product.discount_percent(), 0);
    }

    #[test]
    fn test_variant_label() {
        let json = r##"{"id": 1, "product": 7, "sku": "TEE-M-BLK", "stock": 3,
            "size_details": {"id": 2, "name": "M"},
            "color_details": {"id": 5, "name": "Black", "hex_code": "#000000"},
            "weight_grams": "250.00"}"##;
        let variant: Variant = serde_json::from_str(json).unwrap();
        assert_eq!(variant.label(), "M / Black");
        assert!(variant.in_stock());
        assert_eq!(variant.weight_grams, Some(Decimal::new(25000, 2)));
    }

    #[test]
    fn test_product_input_form_fields() {
        let input = ProductInput {
            name: " Linen shirt ".into(),
            description: String::new(),
            cost_price: Some(200_000),
            price: Some(400_000),
            sale_price: None,
            supplier: Some(SupplierId::new(3)),
            category_id: Some(CategoryId::new(8)),
            publish_at: NaiveDate::from_ymd_opt(2025, 3, 5),
        };
        let fields = input.form_fields();
        assert!(fields.contains(&("name", "Linen shirt".to_string())));
        assert!(fields.contains(&("price", "400000".to_string())));
        assert!(fields.contains(&("supplier", "3".to_string())));
        assert!(fields.contains(&("category_id", "8".to_string())));
        assert!(fields.contains(&("publish_at", "2025-03-05".to_string())));
        assert!(!fields.iter().any(|(k, _)| *k == "sale_price"));
    }

    #[test]
    fn test_blank_product_fields_are_left_out() {
        let input = ProductInput {
            name: "  ".into(),
            sale_price: Some(299_000),
            ..ProductInput::default()
        };
        let keys: Vec<&str> = input.form_fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["description", "sale_price"]);
    }

    #[test]
    fn test_product_filter_query() {
        let filter = ProductFilter {
            search: Some("  linen ".into()),
            category: Some(CategoryId::new(4)),
            sort: Some(CatalogSort::PriceDesc),
            page: Some(1),
            ..ProductFilter::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("search", "linen".to_string()),
                ("category", "4".to_string()),
                ("sort_by", "price".to_string()),
                ("sort_value", "desc".to_string()),
            ]
        );
    }
}
