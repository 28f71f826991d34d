use chrono::Utc;
use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{char_len, Fields, FieldErrors, Presence, Schema};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 100;
pub const CATEGORY_MIN: usize = 2;
/// Products with stock strictly below this count as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: i32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub description: Option<String>,
}

impl NewProduct {
    pub fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            name: Set(self.name),
            category: Set(self.category),
            price: Set(self.price),
            stock: Set(self.stock),
            description: Set(self.description),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
    }
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.description.is_none()
    }

    /// Copy supplied fields onto `am`; unsupplied ones keep their value.
    pub fn apply(self, am: &mut ActiveModel) {
        if let Some(v) = self.name {
            am.name = Set(v);
        }
        if let Some(v) = self.category {
            am.category = Set(v);
        }
        if let Some(v) = self.price {
            am.price = Set(v);
        }
        if let Some(v) = self.stock {
            am.stock = Set(v);
        }
        if let Some(v) = self.description {
            am.description = Set(Some(v));
        }
    }
}

pub struct ProductSchema;

fn read_name(fields: &mut Fields<'_>, presence: Presence) -> Option<String> {
    let name = fields.string("name", presence)?.trim().to_string();
    let len = char_len(&name);
    if len < NAME_MIN {
        fields.reject("name", format!("String must contain at least {NAME_MIN} character(s)"));
        return None;
    }
    if len > NAME_MAX {
        fields.reject("name", format!("String must contain at most {NAME_MAX} character(s)"));
        return None;
    }
    Some(name)
}

fn read_category(fields: &mut Fields<'_>, presence: Presence) -> Option<String> {
    let category = fields.string("category", presence)?;
    if char_len(&category) < CATEGORY_MIN {
        fields.reject("category", format!("String must contain at least {CATEGORY_MIN} character(s)"));
        return None;
    }
    Some(category)
}

fn read_price(fields: &mut Fields<'_>, presence: Presence) -> Option<f64> {
    let price = fields.number("price", presence)?;
    if price <= 0.0 {
        fields.reject("price", "Number must be greater than 0");
        return None;
    }
    Some(price)
}

fn read_stock(fields: &mut Fields<'_>, presence: Presence) -> Option<i32> {
    let stock = fields.integer("stock", presence)?;
    if stock < 0 {
        fields.reject("stock", "Number must be greater than or equal to 0");
        return None;
    }
    match i32::try_from(stock) {
        Ok(v) => Some(v),
        Err(_) => {
            fields.reject("stock", format!("Number must be less than or equal to {}", i32::MAX));
            None
        }
    }
}

impl Schema for ProductSchema {
    type Create = NewProduct;
    type Patch = ProductPatch;

    fn validate_create(candidate: &Value) -> Result<NewProduct, FieldErrors> {
        let mut fields = Fields::new(candidate);
        let name = read_name(&mut fields, Presence::Required);
        let category = read_category(&mut fields, Presence::Required);
        let price = read_price(&mut fields, Presence::Required);
        let stock = read_stock(&mut fields, Presence::Required);
        let description = fields.string("description", Presence::Optional);
        fields.finish(|| NewProduct {
            name: name.unwrap_or_default(),
            category: category.unwrap_or_default(),
            price: price.unwrap_or_default(),
            stock: stock.unwrap_or_default(),
            description,
        })
    }

    fn validate_patch(candidate: &Value) -> Result<ProductPatch, FieldErrors> {
        let mut fields = Fields::new(candidate);
        let name = read_name(&mut fields, Presence::Optional);
        let category = read_category(&mut fields, Presence::Optional);
        let price = read_price(&mut fields, Presence::Optional);
        let stock = read_stock(&mut fields, Presence::Optional);
        let description = fields.string("description", Presence::Optional);
        fields.finish(|| ProductPatch { name, category, price, stock, description })
    }
}
