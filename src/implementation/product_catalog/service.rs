//! # Product Catalog Service
//!
//! Products, categories and collections held in per-collection maps.
//! Locks are always taken in the order products, categories, collections.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    errors::CommerceError,
    implementation::uploads::BlobStore,
    types::{
        context::RequestContext,
        product_catalog::{
            Category, CategoryId, Collection, CollectionId, PaginatedProducts, Product,
            ProductFilter, ProductId, ProductSortOrder, ProductStatus,
        },
    },
};

/// One line of a stock reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLine {
    /// Product to take stock from.
    pub product_id: ProductId,
    /// Units to take.
    pub quantity:   u32,
}

// ============================================================================
// PRODUCT CATALOG SERVICE
// ============================================================================

/// Product catalog management service.
pub struct ProductCatalog {
    /// Products indexed by ID.
    products:    Arc<Mutex<HashMap<ProductId, Product>>>,
    /// Categories indexed by ID.
    categories:  Arc<Mutex<HashMap<CategoryId, Category>>>,
    /// Collections indexed by ID.
    collections: Arc<Mutex<HashMap<CollectionId, Collection>>>,
    /// Where product images live; cleaned up on product removal.
    blobs:       Option<Arc<dyn BlobStore>>,
}

impl std::fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCatalog").field("has_blob_store", &self.blobs.is_some()).finish()
    }
}

impl ProductCatalog {
    /// Creates a new product catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products:    Arc::new(Mutex::new(HashMap::new())),
            categories:  Arc::new(Mutex::new(HashMap::new())),
            collections: Arc::new(Mutex::new(HashMap::new())),
            blobs:       None,
        }
    }

    /// Attaches the blob store that owns product images.
    #[must_use]
    pub fn with_blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    // ========================================================================
    // CATEGORY OPERATIONS
    // ========================================================================

    /// Adds a category to the catalog.
    ///
    /// # Errors
    /// Returns error if the slug is taken or the parent is missing or not a root.
    pub fn add_category(
        &self, ctx: &RequestContext, category: Category,
    ) -> Result<Category, CommerceError> {
        ctx.require_admin()?;
        let mut categories = self.categories.lock().map_err(|_| CommerceError::LockError)?;

        Self::check_category(&categories, &category)?;
        categories.insert(category.id.clone(), category.clone());
        info!(category = %category.id, slug = %category.slug, "category added");
        Ok(category)
    }

    /// Replaces a category.
    pub fn update_category(
        &self, ctx: &RequestContext, category: Category,
    ) -> Result<Category, CommerceError> {
        ctx.require_admin()?;
        let mut categories = self.categories.lock().map_err(|_| CommerceError::LockError)?;

        if !categories.contains_key(&category.id) {
            return Err(CommerceError::CategoryNotFound(category.id.to_string()));
        }
        if category.parent_id.as_ref() == Some(&category.id) {
            return Err(CommerceError::ValidationError(
                "category cannot be its own parent".to_string(),
            ));
        }
        if category.parent_id.is_some()
            && categories.values().any(|c| c.parent_id.as_ref() == Some(&category.id))
        {
            return Err(CommerceError::ValidationError(
                "a category with children cannot be nested".to_string(),
            ));
        }

        Self::check_category(&categories, &category)?;
        categories.insert(category.id.clone(), category.clone());
        Ok(category)
    }

    /// Removes a category that nothing references any more.
    pub fn remove_category(
        &self, ctx: &RequestContext, id: &CategoryId,
    ) -> Result<Category, CommerceError> {
        ctx.require_admin()?;
        let products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        let mut categories = self.categories.lock().map_err(|_| CommerceError::LockError)?;

        if !categories.contains_key(id) {
            return Err(CommerceError::CategoryNotFound(id.to_string()));
        }
        let has_children = categories.values().any(|c| c.parent_id.as_ref() == Some(id));
        let has_products = products.values().any(|p| p.category_id.as_ref() == Some(id));
        if has_children || has_products {
            return Err(CommerceError::CategoryInUse(id.to_string()));
        }

        categories.remove(id).ok_or_else(|| CommerceError::CategoryNotFound(id.to_string()))
    }

    /// Gets a category by ID.
    ///
    /// # Errors
    /// Returns error if category not found.
    pub fn get_category(&self, id: &CategoryId) -> Result<Category, CommerceError> {
        let categories = self.categories.lock().map_err(|_| CommerceError::LockError)?;
        categories.get(id).cloned().ok_or_else(|| CommerceError::CategoryNotFound(id.to_string()))
    }

    /// Gets a category by slug.
    pub fn get_category_by_slug(&self, slug: &str) -> Result<Category, CommerceError> {
        let categories = self.categories.lock().map_err(|_| CommerceError::LockError)?;
        categories
            .values()
            .find(|c| c.slug == slug)
            .cloned()
            .ok_or_else(|| CommerceError::CategoryNotFound(slug.to_string()))
    }

    /// All categories, sorted by name.
    pub fn list_categories(&self) -> Result<Vec<Category>, CommerceError> {
        let categories = self.categories.lock().map_err(|_| CommerceError::LockError)?;
        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    /// Gets all root categories.
    pub fn root_categories(&self) -> Result<Vec<Category>, CommerceError> {
        Ok(self.list_categories()?.into_iter().filter(|c| c.parent_id.is_none()).collect())
    }

    /// Gets child categories.
    pub fn child_categories(&self, parent_id: &CategoryId) -> Result<Vec<Category>, CommerceError> {
        Ok(self
            .list_categories()?
            .into_iter()
            .filter(|c| c.parent_id.as_ref() == Some(parent_id))
            .collect())
    }

    // ========================================================================
    // COLLECTION OPERATIONS
    // ========================================================================

    /// Adds a collection.
    pub fn add_collection(
        &self, ctx: &RequestContext, collection: Collection,
    ) -> Result<Collection, CommerceError> {
        ctx.require_admin()?;
        let mut stored = collection;
        let product_ids = std::mem::take(&mut stored.product_ids);
        {
            let mut collections = self.collections.lock().map_err(|_| CommerceError::LockError)?;
            if collections.contains_key(&stored.id) {
                return Err(CommerceError::ValidationError(format!(
                    "collection already exists: {}",
                    stored.id
                )));
            }
            Self::check_collection_slug(&collections, &stored)?;
            collections.insert(stored.id.clone(), stored.clone());
        }
        if product_ids.is_empty() {
            return Ok(stored);
        }
        self.set_collection_products(ctx, &stored.id, product_ids)
    }

    /// Updates collection metadata; membership is managed by
    /// [`Self::set_collection_products`].
    pub fn update_collection(
        &self, ctx: &RequestContext, collection: Collection,
    ) -> Result<Collection, CommerceError> {
        ctx.require_admin()?;
        let mut collections = self.collections.lock().map_err(|_| CommerceError::LockError)?;

        let existing = collections
            .get(&collection.id)
            .ok_or_else(|| CommerceError::CollectionNotFound(collection.id.to_string()))?;
        let mut updated = collection;
        updated.product_ids = existing.product_ids.clone();

        Self::check_collection_slug(&collections, &updated)?;
        collections.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    /// Removes a collection and unlinks its products.
    pub fn remove_collection(
        &self, ctx: &RequestContext, id: &CollectionId,
    ) -> Result<Collection, CommerceError> {
        ctx.require_admin()?;
        let mut products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        let mut collections = self.collections.lock().map_err(|_| CommerceError::LockError)?;

        let removed =
            collections.remove(id).ok_or_else(|| CommerceError::CollectionNotFound(id.to_string()))?;
        for product in products.values_mut() {
            product.collection_ids.retain(|c| c != id);
        }
        Ok(removed)
    }

    /// Replaces the member list of a collection, keeping both sides in sync.
    pub fn set_collection_products(
        &self, ctx: &RequestContext, id: &CollectionId, product_ids: Vec<ProductId>,
    ) -> Result<Collection, CommerceError> {
        ctx.require_admin()?;
        let mut products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        let mut collections = self.collections.lock().map_err(|_| CommerceError::LockError)?;

        if let Some(missing) = product_ids.iter().find(|pid| !products.contains_key(*pid)) {
            return Err(CommerceError::ProductNotFound(missing.to_string()));
        }
        let collection =
            collections.get_mut(id).ok_or_else(|| CommerceError::CollectionNotFound(id.to_string()))?;

        let mut unique: Vec<ProductId> = Vec::with_capacity(product_ids.len());
        for pid in product_ids {
            if !unique.contains(&pid) {
                unique.push(pid);
            }
        }

        for (pid, product) in products.iter_mut() {
            let member = unique.contains(pid);
            let linked = product.collection_ids.contains(id);
            if member && !linked {
                product.collection_ids.push(id.clone());
            } else if !member && linked {
                product.collection_ids.retain(|c| c != id);
            }
        }
        collection.product_ids = unique;
        Ok(collection.clone())
    }

    /// Gets a collection by ID.
    pub fn get_collection(&self, id: &CollectionId) -> Result<Collection, CommerceError> {
        let collections = self.collections.lock().map_err(|_| CommerceError::LockError)?;
        collections.get(id).cloned().ok_or_else(|| CommerceError::CollectionNotFound(id.to_string()))
    }

    /// Gets a collection by slug.
    pub fn get_collection_by_slug(&self, slug: &str) -> Result<Collection, CommerceError> {
        let collections = self.collections.lock().map_err(|_| CommerceError::LockError)?;
        collections
            .values()
            .find(|c| c.slug == slug)
            .cloned()
            .ok_or_else(|| CommerceError::CollectionNotFound(slug.to_string()))
    }

    /// Visible products of a collection, in collection order.
    pub fn collection_products(&self, id: &CollectionId) -> Result<Vec<Product>, CommerceError> {
        let collection = self.get_collection(id)?;
        let products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        Ok(collection
            .product_ids
            .iter()
            .filter_map(|pid| products.get(pid))
            .filter(|p| p.status.is_visible())
            .cloned()
            .collect())
    }

    // ========================================================================
    // PRODUCT OPERATIONS
    // ========================================================================

    /// Adds a product to the catalog.
    ///
    /// # Errors
    /// Returns error if the product is invalid, its slug is taken or its
    /// category does not exist.
    pub fn add_product(
        &self, ctx: &RequestContext, product: Product,
    ) -> Result<Product, CommerceError> {
        ctx.require_admin()?;
        product.validate()?;
        let mut products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        let categories = self.categories.lock().map_err(|_| CommerceError::LockError)?;

        if products.contains_key(&product.id) {
            return Err(CommerceError::ValidationError(format!(
                "product already exists: {}",
                product.id
            )));
        }
        Self::check_product(&products, &categories, &product)?;

        let mut product = product;
        product.collection_ids.clear();
        products.insert(product.id.clone(), product.clone());
        info!(product = %product.id, slug = %product.slug, "product added");
        Ok(product)
    }

    /// Updates a product.
    ///
    /// # Errors
    /// Returns error if product not found.
    pub fn update_product(
        &self, ctx: &RequestContext, product: Product,
    ) -> Result<Product, CommerceError> {
        ctx.require_admin()?;
        product.validate()?;
        let mut products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        let categories = self.categories.lock().map_err(|_| CommerceError::LockError)?;

        let existing = products
            .get(&product.id)
            .ok_or_else(|| CommerceError::ProductNotFound(product.id.to_string()))?;
        Self::check_product(&products, &categories, &product)?;

        let mut updated = product;
        updated.collection_ids = existing.collection_ids.clone();
        updated.created_at = existing.created_at;
        updated.updated_at = Utc::now();
        let dropped_images: Vec<String> = existing
            .images
            .iter()
            .filter(|url| !updated.images.contains(url))
            .cloned()
            .collect();

        products.insert(updated.id.clone(), updated.clone());
        drop(categories);
        drop(products);

        self.delete_images(&updated.id, &dropped_images);
        Ok(updated)
    }

    /// Removes a product and deletes its images from blob storage.
    ///
    /// # Errors
    /// Returns error if product not found.
    pub fn remove_product(
        &self, ctx: &RequestContext, id: &ProductId,
    ) -> Result<Product, CommerceError> {
        ctx.require_admin()?;
        let removed = {
            let mut products = self.products.lock().map_err(|_| CommerceError::LockError)?;
            let mut collections = self.collections.lock().map_err(|_| CommerceError::LockError)?;

            let product =
                products.remove(id).ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))?;
            for collection in collections.values_mut() {
                collection.product_ids.retain(|pid| pid != id);
            }
            product
        };

        self.delete_images(id, &removed.images);
        info!(product = %id, "product removed");
        Ok(removed)
    }

    /// Gets a product by ID.
    ///
    /// # Errors
    /// Returns error if product not found.
    pub fn get_product(&self, id: &ProductId) -> Result<Product, CommerceError> {
        let products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        products.get(id).cloned().ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    /// Gets a product by slug.
    pub fn get_product_by_slug(&self, slug: &str) -> Result<Product, CommerceError> {
        let products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        products
            .values()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| CommerceError::ProductNotFound(slug.to_string()))
    }

    /// Visible products in a category, optionally including its children.
    pub fn products_by_category(
        &self, category_id: &CategoryId, include_subcategories: bool,
    ) -> Result<Vec<Product>, CommerceError> {
        let products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        let categories = self.categories.lock().map_err(|_| CommerceError::LockError)?;

        if !categories.contains_key(category_id) {
            return Err(CommerceError::CategoryNotFound(category_id.to_string()));
        }
        let mut category_ids = vec![category_id.clone()];
        if include_subcategories {
            category_ids.extend(
                categories
                    .values()
                    .filter(|c| c.parent_id.as_ref() == Some(category_id))
                    .map(|c| c.id.clone()),
            );
        }

        let mut found: Vec<Product> = products
            .values()
            .filter(|p| p.status.is_visible())
            .filter(|p| p.category_id.as_ref().is_some_and(|c| category_ids.contains(c)))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    /// Gets featured products.
    pub fn featured_products(&self, limit: usize) -> Result<Vec<Product>, CommerceError> {
        let products = self.products.lock().map_err(|_| CommerceError::LockError)?;

        let mut featured: Vec<_> =
            products.values().filter(|p| p.is_featured && p.status.is_visible()).cloned().collect();

        featured.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        featured.truncate(limit);
        Ok(featured)
    }

    /// Searches products with filters.
    pub fn search_products(
        &self, filter: &ProductFilter, sort: ProductSortOrder, page: usize, page_size: usize,
    ) -> Result<PaginatedProducts, CommerceError> {
        let products = self.products.lock().map_err(|_| CommerceError::LockError)?;

        let mut filtered: Vec<Product> =
            products.values().filter(|p| Self::matches_filter(p, filter)).cloned().collect();

        let total_count = filtered.len();
        Self::sort_products(&mut filtered, sort);

        let start = page.saturating_mul(page_size);
        let end = start.saturating_add(page_size).min(filtered.len());
        let page_products =
            if start < filtered.len() { filtered[start..end].to_vec() } else { Vec::new() };

        Ok(PaginatedProducts {
            products: page_products,
            total_count,
            page,
            page_size,
            has_next: end < total_count,
        })
    }

    // ========================================================================
    // STOCK
    // ========================================================================

    /// Takes stock for every line, or for none of them.
    ///
    /// Products that run out flip to [`ProductStatus::OutOfStock`].
    pub fn reserve_stock(&self, lines: &[StockLine]) -> Result<(), CommerceError> {
        let mut products = self.products.lock().map_err(|_| CommerceError::LockError)?;

        let mut wanted: HashMap<&ProductId, u32> = HashMap::new();
        for line in lines {
            let entry = wanted.entry(&line.product_id).or_insert(0);
            *entry = entry.saturating_add(line.quantity);
        }

        for (pid, qty) in &wanted {
            let product =
                products.get(*pid).ok_or_else(|| CommerceError::ProductNotFound(pid.to_string()))?;
            if product.stock < *qty {
                return Err(CommerceError::InsufficientInventory {
                    product_id: pid.to_string(),
                    available:  product.stock,
                    requested:  *qty,
                });
            }
        }

        for (pid, qty) in wanted {
            if let Some(product) = products.get_mut(pid) {
                product.stock -= qty;
                if product.stock == 0 && product.status == ProductStatus::Active {
                    product.status = ProductStatus::OutOfStock;
                }
                product.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    /// Puts stock back for every line; products that were sold out become
    /// active again.
    pub fn release_stock(&self, lines: &[StockLine]) -> Result<(), CommerceError> {
        let mut products = self.products.lock().map_err(|_| CommerceError::LockError)?;
        for line in lines {
            if let Some(product) = products.get_mut(&line.product_id) {
                product.stock = product.stock.saturating_add(line.quantity);
                if product.stock > 0 && product.status == ProductStatus::OutOfStock {
                    product.status = ProductStatus::Active;
                }
                product.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    // ========================================================================
    // PRIVATE HELPERS
    // ========================================================================

    fn check_category(
        categories: &HashMap<CategoryId, Category>, category: &Category,
    ) -> Result<(), CommerceError> {
        if category.name.trim().is_empty() || category.slug.is_empty() {
            return Err(CommerceError::ValidationError(
                "category name and slug are required".to_string(),
            ));
        }
        if categories.values().any(|c| c.slug == category.slug && c.id != category.id) {
            return Err(CommerceError::CategorySlugTaken(category.slug.clone()));
        }
        if let Some(parent_id) = &category.parent_id {
            let parent = categories
                .get(parent_id)
                .ok_or_else(|| CommerceError::CategoryNotFound(parent_id.to_string()))?;
            if parent.parent_id.is_some() {
                return Err(CommerceError::ValidationError(
                    "categories are limited to two levels".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn check_collection_slug(
        collections: &HashMap<CollectionId, Collection>, collection: &Collection,
    ) -> Result<(), CommerceError> {
        if collection.slug.is_empty() {
            return Err(CommerceError::ValidationError("collection slug is required".to_string()));
        }
        if collections.values().any(|c| c.slug == collection.slug && c.id != collection.id) {
            return Err(CommerceError::CollectionSlugTaken(collection.slug.clone()));
        }
        Ok(())
    }

    fn check_product(
        products: &HashMap<ProductId, Product>, categories: &HashMap<CategoryId, Category>,
        product: &Product,
    ) -> Result<(), CommerceError> {
        if products.values().any(|p| p.slug == product.slug && p.id != product.id) {
            return Err(CommerceError::ProductSlugTaken(product.slug.clone()));
        }
        if let Some(category_id) = &product.category_id {
            if !categories.contains_key(category_id) {
                return Err(CommerceError::CategoryNotFound(category_id.to_string()));
            }
        }
        Ok(())
    }

    fn delete_images(&self, product_id: &ProductId, urls: &[String]) {
        let Some(blobs) = &self.blobs else {
            return;
        };
        for url in urls {
            if let Err(err) = blobs.delete(url) {
                warn!(product = %product_id, url = %url, error = %err, "image cleanup failed");
            }
        }
    }

    /// Checks if product matches filter.
    fn matches_filter(product: &Product, filter: &ProductFilter) -> bool {
        match filter.status {
            Some(status) if product.status != status => return false,
            None if !product.status.is_visible() => return false,
            _ => {},
        }

        if filter.category_id.as_ref().is_some_and(|c| product.category_id.as_ref() != Some(c)) {
            return false;
        }

        if filter.collection_id.as_ref().is_some_and(|c| !product.collection_ids.contains(c)) {
            return false;
        }

        let price = product.effective_price();
        if filter.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if filter.max_price.is_some_and(|max| price > max) {
            return false;
        }

        if filter.featured_only && !product.is_featured {
            return false;
        }
        if filter.in_stock_only && !product.is_in_stock() {
            return false;
        }
        if filter.on_sale_only && !product.is_on_sale() {
            return false;
        }

        if let Some(query) = &filter.search_query {
            let query_lower = query.to_lowercase();
            let matches_name = product.name.to_lowercase().contains(&query_lower);
            let matches_desc = product.description.to_lowercase().contains(&query_lower);
            let matches_ingredients = product.ingredients.to_lowercase().contains(&query_lower);
            if !matches_name && !matches_desc && !matches_ingredients {
                return false;
            }
        }

        true
    }

    /// Sorts products by specified order.
    fn sort_products(products: &mut [Product], sort: ProductSortOrder) {
        match sort {
            ProductSortOrder::Newest => {
                products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            },
            ProductSortOrder::PriceAsc => {
                products.sort_by_key(Product::effective_price);
            },
            ProductSortOrder::PriceDesc => {
                products.sort_by(|a, b| b.effective_price().cmp(&a.effective_price()));
            },
            ProductSortOrder::NameAsc => {
                products.sort_by(|a, b| a.name.cmp(&b.name));
            },
            ProductSortOrder::Featured => {
                products.sort_by(|a, b| {
                    b.is_featured.cmp(&a.is_featured).then(b.created_at.cmp(&a.created_at))
                });
            },
        }
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new()
    }
}
