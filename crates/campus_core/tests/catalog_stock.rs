use campus_core::db::open_db_in_memory;
use campus_core::{
    CatalogService, CatalogServiceError, CatalogValidationError, SqliteCatalogRepository,
};
use uuid::Uuid;

#[test]
fn product_crud_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let mut product = service
        .add_product("Notebook", "A5 ruled", "stationery", 450, 20)
        .unwrap();

    let loaded = service.get_product(product.uuid).unwrap().unwrap();
    assert_eq!(loaded, product);

    product.price_cents = 500;
    product.description = "A5 ruled, 96 pages".to_string();
    service.update_product(&product).unwrap();
    let reloaded = service.get_product(product.uuid).unwrap().unwrap();
    assert_eq!(reloaded.price_cents, 500);

    service.remove_product(product.uuid).unwrap();
    assert!(service.get_product(product.uuid).unwrap().is_none());

    let err = service.remove_product(product.uuid).unwrap_err();
    assert!(matches!(err, CatalogServiceError::ProductNotFound(_)));
}

#[test]
fn search_matches_name_substring_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    service.add_product("Notebook", "", "stationery", 450, 20).unwrap();
    service.add_product("Note cards", "", "stationery", 250, 50).unwrap();
    service.add_product("Stapler", "", "office", 1200, 5).unwrap();

    let hits = service.search_products("NOTE").unwrap();
    assert_eq!(hits.len(), 2);

    // Blank terms fall back to the full listing.
    assert_eq!(service.search_products("  ").unwrap().len(), 3);
}

#[test]
fn stock_adjustments_apply_and_refuse_going_negative() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let product = service
        .add_product("Notebook", "A5 ruled", "stationery", 450, 10)
        .unwrap();

    let after_sale = service.adjust_stock(product.uuid, -4).unwrap();
    assert_eq!(after_sale.stock, 6);

    let restocked = service.adjust_stock(product.uuid, 14).unwrap();
    assert_eq!(restocked.stock, 20);

    let err = service.adjust_stock(product.uuid, -21).unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::InsufficientStock {
            product: id,
            stock: 20,
            requested: -21,
        } if id == product.uuid
    ));

    // A refused adjustment must leave stock untouched.
    let unchanged = service.get_product(product.uuid).unwrap().unwrap();
    assert_eq!(unchanged.stock, 20);

    let err = service.adjust_stock(Uuid::new_v4(), 1).unwrap_err();
    assert!(matches!(err, CatalogServiceError::ProductNotFound(_)));
}

#[test]
fn draining_stock_to_zero_is_allowed() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let product = service.add_product("Stapler", "", "office", 1200, 5).unwrap();
    let drained = service.adjust_stock(product.uuid, -5).unwrap();
    assert_eq!(drained.stock, 0);
}

#[test]
fn validation_rejects_bad_price_stock_and_name() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());

    let err = service.add_product("", "", "stationery", 450, 1).unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::Validation(CatalogValidationError::BlankName)
    ));

    let err = service.add_product("Notebook", "", "stationery", 0, 1).unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::Validation(CatalogValidationError::NonPositivePrice(0))
    ));

    let err = service.add_product("Notebook", "", "stationery", 450, -1).unwrap_err();
    assert!(matches!(
        err,
        CatalogServiceError::Validation(CatalogValidationError::NegativeStock(-1))
    ));
}
