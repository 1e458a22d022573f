//! # Product Catalog Types
//!
//! Products, categories and collections, plus the query types used to
//! browse them.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CommerceError;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Unique product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Cow<'static, str>);

impl ProductId {
    /// Creates a new product ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Creates a product ID from a static string slice (zero-copy).
    #[must_use]
    pub fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Generates a new unique product ID.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(format!("prod-{}", uuid::Uuid::new_v4()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub Cow<'static, str>);

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl CategoryId {
    /// Creates a new category ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Generates a new unique category ID.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(format!("cat-{}", uuid::Uuid::new_v4()))
    }
}

/// Collection identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionId(pub Cow<'static, str>);

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl CollectionId {
    /// Creates a new collection ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Generates a new unique collection ID.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(format!("col-{}", uuid::Uuid::new_v4()))
    }
}

/// Product status in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Product is a draft (not published).
    #[default]
    Draft,
    /// Product is active and available.
    Active,
    /// Product is out of stock.
    OutOfStock,
}

impl ProductStatus {
    /// Whether the product is visible to customers.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Active | Self::OutOfStock)
    }

    /// Whether the product can be purchased.
    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Lower-cases a name and joins its alphanumeric runs with `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ============================================================================
// CATEGORY & COLLECTION
// ============================================================================

/// Product category. Categories form a two-level tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id:        CategoryId,
    /// Category name.
    pub name:      String,
    /// URL slug, unique across categories.
    pub slug:      String,
    /// Parent category (if not root).
    pub parent_id: Option<CategoryId>,
    /// Category image URL.
    pub image:     Option<String>,
}

impl Category {
    /// Creates a new root category.
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { id, name, slug, parent_id: None, image: None }
    }

    /// Sets the parent category.
    #[must_use]
    pub fn with_parent(mut self, parent_id: CategoryId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Overrides the derived slug.
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }
}

/// Curated group of products, many-to-many with [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id:          CollectionId,
    /// Collection name.
    pub name:        String,
    /// URL slug, unique across collections.
    pub slug:        String,
    /// Description.
    pub description: String,
    /// Image URL.
    pub image:       Option<String>,
    /// Member products, in display order.
    pub product_ids: Vec<ProductId>,
}

impl Collection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new(id: CollectionId, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { id, name, slug, description: String::new(), image: None, product_ids: Vec::new() }
    }
}

// ============================================================================
// PRODUCT
// ============================================================================

/// Complete product definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id:               ProductId,
    /// Product name.
    pub name:             String,
    /// URL slug.
    pub slug:             String,
    /// Product description.
    pub description:      String,
    /// Base price in the smallest currency unit.
    pub price:            u64,
    /// Promotional price; never above `price`.
    pub discounted_price: Option<u64>,
    /// Weight in grams.
    pub weight_grams:     u32,
    /// Ingredient list.
    pub ingredients:      String,
    /// Benefits, in display order.
    pub benefits:         Vec<String>,
    /// Usage instructions.
    pub how_to_use:       String,
    /// Units in stock.
    pub stock:            u32,
    /// Product status.
    pub status:           ProductStatus,
    /// Image URLs, first one is the primary image.
    pub images:           Vec<String>,
    /// Owning category.
    pub category_id:      Option<CategoryId>,
    /// Collections this product belongs to.
    pub collection_ids:   Vec<CollectionId>,
    /// Whether product is featured.
    pub is_featured:      bool,
    /// Creation timestamp.
    pub created_at:       DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at:       DateTime<Utc>,
}

impl Product {
    /// Creates a new draft product.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: u64) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        let now = Utc::now();

        Self {
            id,
            name,
            slug,
            description: String::new(),
            price,
            discounted_price: None,
            weight_grams: 0,
            ingredients: String::new(),
            benefits: Vec::new(),
            how_to_use: String::new(),
            stock: 0,
            status: ProductStatus::Draft,
            images: Vec::new(),
            category_id: None,
            collection_ids: Vec::new(),
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the effective price (discounted price if available).
    #[must_use]
    pub fn effective_price(&self) -> u64 {
        self.discounted_price.unwrap_or(self.price)
    }

    /// Checks if product is on sale.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.discounted_price.is_some_and(|p| p < self.price)
    }

    /// Checks if product is in stock.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Gets the primary image.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Checks the record before it is written.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::ValidationError("product name is required".to_string()));
        }
        if self.slug.is_empty() {
            return Err(CommerceError::ValidationError("product slug is required".to_string()));
        }
        if let Some(discounted) = self.discounted_price {
            if discounted > self.price {
                return Err(CommerceError::ValidationError(format!(
                    "discounted price {} exceeds price {}",
                    discounted, self.price
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SEARCH & FILTERING
// ============================================================================

/// Search filters for product queries.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Filter by category.
    pub category_id:   Option<CategoryId>,
    /// Filter by collection.
    pub collection_id: Option<CollectionId>,
    /// Filter by status.
    pub status:        Option<ProductStatus>,
    /// Minimum effective price.
    pub min_price:     Option<u64>,
    /// Maximum effective price.
    pub max_price:     Option<u64>,
    /// Only featured products.
    pub featured_only: bool,
    /// Only in-stock products.
    pub in_stock_only: bool,
    /// Only products on sale.
    pub on_sale_only:  bool,
    /// Text search over name, description and ingredients.
    pub search_query:  Option<String>,
}

impl ProductFilter {
    /// Creates a new empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by category.
    #[must_use]
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Filters by status.
    #[must_use]
    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by price range.
    #[must_use]
    pub fn with_price_range(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Filters by free-text query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    /// Only in-stock products.
    #[must_use]
    pub fn in_stock_only(mut self) -> Self {
        self.in_stock_only = true;
        self
    }
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default)]
pub enum ProductSortOrder {
    /// Sort by creation date, newest first.
    #[default]
    Newest,
    /// Sort by price, lowest first.
    PriceAsc,
    /// Sort by price, highest first.
    PriceDesc,
    /// Sort by name alphabetically.
    NameAsc,
    /// Featured products first.
    Featured,
}

/// Paginated results.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedProducts {
    /// Products in this page.
    pub products:    Vec<Product>,
    /// Total count of matching products.
    pub total_count: usize,
    /// Current page number (0-indexed).
    pub page:        usize,
    /// Items per page.
    pub page_size:   usize,
    /// Whether there are more pages.
    pub has_next:    bool,
}

impl PaginatedProducts {
    /// Total number of pages.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }
}
