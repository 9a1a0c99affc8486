use axum::extract::{Json, Path};
use axum::http::StatusCode;
use chrono::{NaiveDateTime, Utc};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::entities::error::{BwError, ErrorType};
use crate::storage::{Store, PRODUCTS_SLOT};

#[derive(Serialize, Deserialize, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub selling_points: Vec<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub selling_points: Vec<String>,
}

impl Product {
    pub fn find_all(store: &Store) -> Vec<Product> {
        store.read_slot(PRODUCTS_SLOT).unwrap_or_default()
    }

    pub fn create(store: &Store, new_product: NewProduct) -> Result<Product, BwError> {
        let product = Product {
            id: Uuid::new_v4(),
            name: new_product.name,
            description: new_product.description,
            url: new_product.url,
            selling_points: new_product.selling_points,
            created_at: Utc::now().naive_utc(),
        };
        let mut products = Product::find_all(store);
        products.push(product.clone());
        store.write_slot(PRODUCTS_SLOT, &products)?;
        Ok(product)
    }

    pub fn delete(store: &Store, id: Uuid) -> Result<bool, BwError> {
        let mut products = Product::find_all(store);
        let count_before = products.len();
        products.retain(|product| product.id != id);
        if products.len() == count_before {
            return Ok(false);
        }
        store.write_slot(PRODUCTS_SLOT, &products)?;
        Ok(true)
    }

    /// Prompt-facing description block, matching what the content templates
    /// expect as product info.
    pub fn info_block(&self) -> String {
        let mut info = format!("상품명: {}", self.name);
        if !self.description.is_empty() {
            info.push_str(&format!("\n설명: {}", self.description));
        }
        if !self.selling_points.is_empty() {
            info.push_str(&format!("\n셀링포인트: {}", self.selling_points.join(", ")));
        }
        info
    }
}

pub async fn get_products_route() -> Result<Json<Vec<Product>>, BwError> {
    let store = Store::from_env();
    Ok(Json(Product::find_all(&store)))
}

pub async fn post_product_route(
    Json(new_product): Json<NewProduct>,
) -> Result<Json<Product>, BwError> {
    if new_product.name.trim().is_empty() {
        return Err(BwError::input("상품명을 입력하세요."));
    }
    let store = Store::from_env();
    Ok(Json(Product::create(&store, new_product)?))
}

pub async fn delete_product_route(Path(id): Path<Uuid>) -> Result<StatusCode, BwError> {
    let store = Store::from_env();
    if Product::delete(&store, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(BwError::new(404, ErrorType::InputError, "상품을 찾을 수 없습니다.".to_string()))
    }
}
