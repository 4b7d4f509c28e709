#![allow(dead_code)]

use docjoin::document::Document;
use docjoin::shape::{Descriptor, Shape};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub tags: Vec<String>,
    #[serde(skip)]
    pub orders: Vec<Order>,
    #[serde(skip)]
    pub tagged_orders: Vec<Order>,
    #[serde(skip)]
    pub ghosts: Vec<Order>,
    #[serde(skip)]
    pub broken: Vec<Order>,
}

impl Shape for Client {
    const NAME: &'static str = "Client";
    fn describe(shape: &mut Descriptor<Self>) {
        shape
            .value("ID", "id", |c| c.id.into())
            .value("Name", "name", |c| c.name.as_str().into())
            .opaque("Tags", "tags")
            .has_many("Orders", "orders", "ID,ClientID", |c| &mut c.orders)
            // keyed on a list, which has no scalar form
            .has_many("TaggedOrders", "tagged_orders", "Tags,ClientID", |c| &mut c.tagged_orders)
            .has_many("Ghosts", "ghosts", "Nope,ClientID", |c| &mut c.ghosts)
            .belongs_to("Broken", "broken", "ID", |c| &mut c.broken);
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: i64,
    pub client_id: i64,
    pub product_id: i64,
    #[serde(skip)]
    pub client: Option<Client>,
    #[serde(skip)]
    pub product: Option<Product>,
}

impl Shape for Order {
    const NAME: &'static str = "Order";
    fn describe(shape: &mut Descriptor<Self>) {
        shape
            .value("ID", "id", |o| o.id.into())
            .value("ClientID", "client_id", |o| o.client_id.into())
            .value("ProductID", "product_id", |o| o.product_id.into())
            .belongs_to("Client", "client", "ClientID,ID", |o| &mut o.client)
            .belongs_to("Product", "product", "ProductID,ID", |o| &mut o.product);
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: i64,
    #[serde(skip)]
    pub categories: Vec<Category>,
    #[serde(skip)]
    pub primary_category: Option<Category>,
    #[serde(skip)]
    pub bad_categories: Vec<Category>,
    #[serde(skip)]
    pub orders: Vec<Order>,
}

impl Shape for Product {
    const NAME: &'static str = "Product";
    fn describe(shape: &mut Descriptor<Self>) {
        shape
            .value("ID", "id", |p| p.id.into())
            .value("Title", "title", |p| p.title.as_str().into())
            .value("Price", "price", |p| p.price.into())
            .many_to_many(
                "Categories",
                "categories",
                "ID,product_id,ID,category_id",
                |p| &mut p.categories,
            )
            .many_to_many(
                "PrimaryCategory",
                "primary_category",
                "ID, product_id, ID, category_id",
                |p| &mut p.primary_category,
            )
            .many_to_many("BadCategories", "bad_categories", "ID,product_id,ID", |p| {
                &mut p.bad_categories
            })
            .has_many("Orders", "orders", "ID,ProductID", |p| &mut p.orders);
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(rename = "category_id")]
    pub id: i64,
    pub name: String,
}

impl Shape for Category {
    const NAME: &'static str = "Category";
    fn describe(shape: &mut Descriptor<Self>) {
        shape
            .value("ID", "category_id", |c| c.id.into())
            .value("Name", "name", |c| c.name.as_str().into());
    }
}

pub fn clients() -> Document {
    Document::from(&include_bytes!("../data/clients.json")[..])
}

pub fn orders() -> Document {
    Document::from(&include_bytes!("../data/orders.json")[..])
}

pub fn products() -> Document {
    Document::from(&include_bytes!("../data/products.json")[..])
}

pub fn categories() -> Document {
    Document::from(&include_bytes!("../data/categories.json")[..])
}

pub fn products_categories() -> Document {
    Document::from(&include_bytes!("../data/products_categories.json")[..])
}

pub fn names<'a>(categories: impl IntoIterator<Item = &'a Category>) -> Vec<&'a str> {
    categories.into_iter().map(|c| c.name.as_str()).collect()
}
