mod common;

use common::*;
use docjoin::document::Document;
use docjoin::resolution::{Resolution, declare};
use docjoin::scalar::Operator;

fn client(id: i64) -> Option<Client> {
    let mut client: Option<Client> = None;
    declare(&mut client, clients())
        .filter("ID", Operator::Eq, id)
        .expect("filter ok")
        .relationship("Orders", orders())
        .expect("declare ok")
        .resolve()
        .expect("resolve ok");
    client
}

#[test]
fn one_to_many_collects_referencing_records() {
    let bob = client(2).expect("client found");
    assert_eq!(bob.name, "Bob");
    let ids: Vec<i64> = bob.orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, [2, 3]);
    assert!(bob.orders.iter().all(|o| o.client_id == bob.id));
}

#[test]
fn one_to_many_without_referencing_records_is_empty() {
    let dee = client(4).expect("client found");
    assert_eq!(dee.name, "Dee");
    assert!(dee.orders.is_empty());
}

#[test]
fn single_parent_follows_foreign_key() {
    let mut all: Vec<Order> = Vec::new();
    Resolution::declare(&mut all, orders())
        .relationship("Client", clients())
        .expect("declare ok")
        .resolve()
        .expect("resolve ok");
    let names: Vec<&str> = all
        .iter()
        .map(|o| o.client.as_ref().map(|c| c.name.as_str()).unwrap_or("-"))
        .collect();
    assert_eq!(names, ["Ann", "Bob", "Bob", "Cy"]);
}

#[test]
fn single_parent_without_match_stays_empty() {
    let stray = Document::from(r#"[{"id": 9, "client_id": 42, "product_id": 1}]"#);
    let mut order: Option<Order> = None;
    Resolution::declare(&mut order, stray)
        .relationship("Client", clients())
        .expect("declare ok")
        .relationship("Product", products())
        .expect("declare ok")
        .resolve()
        .expect("resolve ok");
    let order = order.expect("order found");
    assert!(order.client.is_none());
    assert_eq!(order.product.map(|p| p.title), Some("Lamp".to_string()));
}

#[test]
fn many_to_many_attaches_all_related_records() {
    let mut product: Option<Product> = None;
    Resolution::declare(&mut product, products())
        .filter("ID", Operator::Eq, 2)
        .expect("filter ok")
        .relationship_through("Categories", categories(), products_categories())
        .expect("declare ok")
        .resolve()
        .expect("resolve ok");
    let product = product.expect("product found");
    assert_eq!(names(&product.categories), ["Home", "Office"]);
}

#[test]
fn many_to_many_keeps_join_row_order_for_every_record() {
    let mut all: Vec<Product> = Vec::new();
    Resolution::declare(&mut all, products())
        .relationship_through("Categories", categories(), products_categories())
        .expect("declare ok")
        .resolve()
        .expect("resolve ok");
    let per_product: Vec<Vec<&str>> = all.iter().map(|p| names(&p.categories)).collect();
    assert_eq!(
        per_product,
        vec![vec!["Lighting", "Home"], vec!["Home", "Office"], vec!["Office"]]
    );
}

#[test]
fn many_to_many_into_single_field_takes_first() {
    let mut product: Option<Product> = None;
    Resolution::declare(&mut product, products())
        .filter("Title", Operator::Eq, "Lamp")
        .expect("filter ok")
        .relationship_through("PrimaryCategory", categories(), products_categories())
        .expect("declare ok")
        .resolve()
        .expect("resolve ok");
    let primary = product.and_then(|p| p.primary_category);
    assert_eq!(primary.map(|c| c.name), Some("Lighting".to_string()));
}

#[test]
fn many_to_many_skips_rows_without_remote_key() {
    let join = Document::from(
        r#"[{"product_id": 1}, {"product_id": 1, "category_id": [10]}, {"product_id": 1, "category_id": 30}]"#,
    );
    let mut product: Option<Product> = None;
    Resolution::declare(&mut product, products())
        .filter("ID", Operator::Eq, 1)
        .expect("filter ok")
        .relationship_through("Categories", categories(), join)
        .expect("declare ok")
        .resolve()
        .expect("resolve ok");
    assert_eq!(names(&product.expect("product found").categories), ["Office"]);
}

#[test]
fn many_to_many_without_join_rows_is_empty() {
    let mut product: Option<Product> = None;
    Resolution::declare(&mut product, products())
        .filter("ID", Operator::Eq, 1)
        .expect("filter ok")
        .relationship_through("Categories", categories(), "[]")
        .expect("declare ok")
        .resolve()
        .expect("resolve ok");
    assert!(product.expect("product found").categories.is_empty());
}

#[test]
fn redeclared_relationship_uses_latest_source() {
    let mut bob: Option<Client> = None;
    Resolution::declare(&mut bob, clients())
        .filter("ID", Operator::Eq, 2)
        .expect("filter ok")
        .relationship("Orders", "[]")
        .expect("declare ok")
        .relationship("Orders", orders())
        .expect("redeclare ok")
        .resolve()
        .expect("resolve ok");
    assert_eq!(bob.expect("client found").orders.len(), 2);
}

#[test]
fn key_without_scalar_form_leaves_relationship_empty() {
    let mut ann: Option<Client> = None;
    Resolution::declare(&mut ann, clients())
        .filter("ID", Operator::Eq, 1)
        .expect("filter ok")
        .relationship("TaggedOrders", orders())
        .expect("declare ok")
        .relationship("Orders", orders())
        .expect("declare ok")
        .resolve()
        .expect("resolve ok");
    let ann = ann.expect("client found");
    assert!(ann.tagged_orders.is_empty());
    assert_eq!(ann.orders.len(), 1);
}
