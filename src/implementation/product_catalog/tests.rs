//! # Product Catalog Tests
//!
//! Test suite for product catalog functionality.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::errors::CommerceError;
    use crate::implementation::product_catalog::service::{ProductCatalog, StockLine};
    use crate::implementation::uploads::{BlobStore, InMemoryBlobStore};
    use crate::types::context::{RequestContext, UserId};
    use crate::types::product_catalog::*;

    fn admin() -> RequestContext {
        RequestContext::admin(UserId::new("admin"), "admin@shop.test", "Admin")
    }

    fn active_product(id: &str, name: &str, price: u64, stock: u32) -> Product {
        let mut product = Product::new(ProductId::new(id), name, price);
        product.status = ProductStatus::Active;
        product.stock = stock;
        product
    }

    #[test]
    fn test_product_creation() {
        let product = Product::new(ProductId::new("prod-001"), "Rose Hip Serum", 1200);

        assert_eq!(product.id.as_str(), "prod-001");
        assert_eq!(product.slug, "rose-hip-serum");
        assert_eq!(product.status, ProductStatus::Draft);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Aloe & Cucumber  Gel! "), "aloe-cucumber-gel");
        assert_eq!(slugify("Face"), "face");
    }

    #[test]
    fn test_catalog_add_product() {
        let catalog = ProductCatalog::new();
        let product = active_product("prod-001", "Neem Face Wash", 450, 10);

        catalog.add_product(&admin(), product).expect("should add product");

        let retrieved =
            catalog.get_product(&ProductId::new("prod-001")).expect("should get product");
        assert_eq!(retrieved.name, "Neem Face Wash");
        let by_slug = catalog.get_product_by_slug("neem-face-wash").expect("by slug");
        assert_eq!(by_slug.id, retrieved.id);
    }

    #[test]
    fn test_customer_cannot_add_product() {
        let catalog = ProductCatalog::new();
        let ctx = RequestContext::customer(UserId::new("u1"), "u1@shop.test", "U");
        let result = catalog.add_product(&ctx, active_product("p", "Soap", 100, 1));
        assert_eq!(result, Err(CommerceError::NotAuthorized));
    }

    #[test]
    fn test_catalog_duplicate_slug() {
        let catalog = ProductCatalog::new();

        let product1 = active_product("prod-001", "Charcoal Mask", 800, 5);
        let product2 = active_product("prod-002", "Charcoal Mask", 900, 5);

        catalog.add_product(&admin(), product1).expect("should add first product");
        let result = catalog.add_product(&admin(), product2);
        assert!(matches!(result, Err(CommerceError::ProductSlugTaken(_))));
    }

    #[test]
    fn test_discounted_price_above_price_rejected() {
        let catalog = ProductCatalog::new();
        let mut product = active_product("prod-001", "Lip Balm", 200, 5);
        product.discounted_price = Some(250);

        let result = catalog.add_product(&admin(), product);
        assert!(matches!(result, Err(CommerceError::ValidationError(_))));
    }

    #[test]
    fn test_category_hierarchy() {
        let catalog = ProductCatalog::new();

        let root = Category::new(CategoryId::new("cat-root"), "Skin Care");
        let child = Category::new(CategoryId::new("cat-serums"), "Serums")
            .with_parent(CategoryId::new("cat-root"));

        catalog.add_category(&admin(), root).expect("should add root");
        catalog.add_category(&admin(), child).expect("should add child");

        let children =
            catalog.child_categories(&CategoryId::new("cat-root")).expect("should get children");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Serums");
        assert_eq!(catalog.root_categories().expect("roots").len(), 1);
    }

    #[test]
    fn test_category_tree_limited_to_two_levels() {
        let catalog = ProductCatalog::new();
        catalog.add_category(&admin(), Category::new(CategoryId::new("a"), "A")).expect("a");
        catalog
            .add_category(&admin(), Category::new(CategoryId::new("b"), "B").with_parent(CategoryId::new("a")))
            .expect("b");

        let result = catalog.add_category(
            &admin(),
            Category::new(CategoryId::new("c"), "C").with_parent(CategoryId::new("b")),
        );
        assert!(matches!(result, Err(CommerceError::ValidationError(_))));
    }

    #[test]
    fn test_category_slug_unique() {
        let catalog = ProductCatalog::new();
        catalog.add_category(&admin(), Category::new(CategoryId::new("a"), "Hair")).expect("a");

        let result = catalog.add_category(&admin(), Category::new(CategoryId::new("b"), "Hair"));
        assert!(matches!(result, Err(CommerceError::CategorySlugTaken(_))));
    }

    #[test]
    fn test_category_in_use_cannot_be_removed() {
        let catalog = ProductCatalog::new();
        let category_id = CategoryId::new("cat-hair");
        catalog.add_category(&admin(), Category::new(category_id.clone(), "Hair")).expect("cat");

        let mut product = active_product("prod-001", "Argan Oil", 1500, 3);
        product.category_id = Some(category_id.clone());
        catalog.add_product(&admin(), product).expect("product");

        let result = catalog.remove_category(&admin(), &category_id);
        assert!(matches!(result, Err(CommerceError::CategoryInUse(_))));

        catalog.remove_product(&admin(), &ProductId::new("prod-001")).expect("remove product");
        catalog.remove_category(&admin(), &category_id).expect("remove category");
    }

    #[test]
    fn test_products_by_category_includes_children() {
        let catalog = ProductCatalog::new();
        let root = CategoryId::new("root");
        let child = CategoryId::new("child");
        catalog.add_category(&admin(), Category::new(root.clone(), "Body")).expect("root");
        catalog
            .add_category(&admin(), Category::new(child.clone(), "Lotions").with_parent(root.clone()))
            .expect("child");

        let mut p1 = active_product("p1", "Body Butter", 700, 2);
        p1.category_id = Some(root.clone());
        let mut p2 = active_product("p2", "Shea Lotion", 500, 2);
        p2.category_id = Some(child.clone());
        catalog.add_product(&admin(), p1).expect("p1");
        catalog.add_product(&admin(), p2).expect("p2");

        assert_eq!(catalog.products_by_category(&root, false).expect("direct").len(), 1);
        assert_eq!(catalog.products_by_category(&root, true).expect("tree").len(), 2);
    }

    #[test]
    fn test_collection_membership_sync() {
        let catalog = ProductCatalog::new();
        catalog.add_product(&admin(), active_product("p1", "Toner", 300, 1)).expect("p1");
        catalog.add_product(&admin(), active_product("p2", "Cleanser", 350, 1)).expect("p2");

        let collection_id = CollectionId::new("col-summer");
        let mut collection = Collection::new(collection_id.clone(), "Summer Picks");
        collection.product_ids = vec![ProductId::new("p1"), ProductId::new("p2")];
        catalog.add_collection(&admin(), collection).expect("collection");

        let p1 = catalog.get_product(&ProductId::new("p1")).expect("p1");
        assert_eq!(p1.collection_ids, vec![collection_id.clone()]);

        catalog
            .set_collection_products(&admin(), &collection_id, vec![ProductId::new("p2")])
            .expect("set members");
        let p1 = catalog.get_product(&ProductId::new("p1")).expect("p1");
        assert!(p1.collection_ids.is_empty());

        let members = catalog.collection_products(&collection_id).expect("members");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Cleanser");

        let by_slug = catalog.get_collection_by_slug("summer-picks").expect("slug");
        assert_eq!(by_slug.id, collection_id);
    }

    #[test]
    fn test_remove_product_cleans_up_images() {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let url = blobs.put("serum.png", "image/png", b"png").expect("put");
        let catalog = ProductCatalog::new().with_blob_store(blobs.clone());

        let mut product = active_product("p1", "Vitamin C Serum", 1800, 4);
        product.images = vec![url.clone()];
        catalog.add_product(&admin(), product).expect("add");
        assert!(blobs.contains(&url).expect("contains"));

        catalog.remove_product(&admin(), &ProductId::new("p1")).expect("remove");
        assert!(!blobs.contains(&url).expect("contains"));
        assert!(matches!(
            catalog.get_product(&ProductId::new("p1")),
            Err(CommerceError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_product_search() {
        let catalog = ProductCatalog::new();

        catalog.add_product(&admin(), active_product("p1", "Saffron Cream", 2500, 3)).expect("p1");
        catalog.add_product(&admin(), active_product("p2", "Turmeric Cream", 1500, 3)).expect("p2");
        catalog.add_product(&admin(), Product::new(ProductId::new("p3"), "Draft Cream", 100))
            .expect("p3");

        let results = catalog
            .search_products(&ProductFilter::new(), ProductSortOrder::PriceAsc, 0, 10)
            .expect("search should succeed");

        assert_eq!(results.total_count, 2);
        assert_eq!(results.products[0].name, "Turmeric Cream");

        let results = catalog
            .search_products(&ProductFilter::new().with_query("saffron"), ProductSortOrder::Newest, 0, 10)
            .expect("search");
        assert_eq!(results.total_count, 1);
    }

    #[test]
    fn test_search_pagination() {
        let catalog = ProductCatalog::new();
        for i in 0..5 {
            catalog
                .add_product(&admin(), active_product(&format!("p{i}"), &format!("Item {i}"), 100, 1))
                .expect("add");
        }

        let page = catalog
            .search_products(&ProductFilter::new(), ProductSortOrder::NameAsc, 1, 2)
            .expect("page");
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.products[0].name, "Item 2");
        assert!(page.has_next);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_reserve_stock_is_all_or_nothing() {
        let catalog = ProductCatalog::new();
        catalog.add_product(&admin(), active_product("p1", "Soap", 100, 2)).expect("p1");
        catalog.add_product(&admin(), active_product("p2", "Scrub", 100, 1)).expect("p2");

        let result = catalog.reserve_stock(&[
            StockLine { product_id: ProductId::new("p1"), quantity: 1 },
            StockLine { product_id: ProductId::new("p2"), quantity: 2 },
        ]);
        assert!(matches!(result, Err(CommerceError::InsufficientInventory { .. })));
        assert_eq!(catalog.get_product(&ProductId::new("p1")).expect("p1").stock, 2);

        catalog
            .reserve_stock(&[StockLine { product_id: ProductId::new("p2"), quantity: 1 }])
            .expect("reserve");
        let p2 = catalog.get_product(&ProductId::new("p2")).expect("p2");
        assert_eq!(p2.stock, 0);
        assert_eq!(p2.status, ProductStatus::OutOfStock);

        catalog
            .release_stock(&[StockLine { product_id: ProductId::new("p2"), quantity: 1 }])
            .expect("release");
        let p2 = catalog.get_product(&ProductId::new("p2")).expect("p2");
        assert_eq!(p2.stock, 1);
        assert_eq!(p2.status, ProductStatus::Active);
    }

    #[test]
    fn test_effective_price() {
        let mut product = Product::new(ProductId::new("prod-001"), "Face Oil", 10000);

        assert_eq!(product.effective_price(), 10000);
        assert!(!product.is_on_sale());

        product.discounted_price = Some(7500);
        assert_eq!(product.effective_price(), 7500);
        assert!(product.is_on_sale());
    }

    #[test]
    fn test_product_status() {
        assert!(ProductStatus::Active.is_visible());
        assert!(ProductStatus::Active.is_purchasable());
        assert!(ProductStatus::OutOfStock.is_visible());
        assert!(!ProductStatus::OutOfStock.is_purchasable());
        assert!(!ProductStatus::Draft.is_visible());
    }
}
