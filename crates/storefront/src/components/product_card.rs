//! Product tile used by the home shelves and search results.

use boutique_core::Product;

/// One product tile.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub slug: String,
    pub name: String,
    pub image_url: String,
    pub price: String,
    /// List price, shown struck through when the product is on sale.
    pub list_price: Option<String>,
    pub discount_percent: i64,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            image_url: product.image_url.clone().unwrap_or_default(),
            price: product.effective_price().format(),
            list_price: product.is_on_sale().then(|| product.price.format()),
            discount_percent: product.discount_percent(),
        }
    }
}

impl ProductCard {
    #[must_use]
    pub fn many(products: &[Product]) -> Vec<Self> {
        products.iter().map(Self::from).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boutique_core::Vnd;

    use super::*;

    #[test]
    fn test_sale_card_shows_list_price() {
        let product: Product = serde_json::from_str(
            r#"{"id": 3, "name": "Linen shirt", "slug": "linen-shirt",
                "price": 400000, "sale_price": 300000, "stock": 4}"#,
        )
        .unwrap();
        let card = ProductCard::from(&product);
        assert_eq!(card.price, Vnd::new(300_000).format());
        assert_eq!(card.list_price, Some(Vnd::new(400_000).format()));
        assert_eq!(card.discount_percent, 25);
    }
}
