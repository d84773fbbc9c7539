use sea_orm::{
    entity::prelude::*, ActiveModelTrait, ActiveValue, ActiveValue::NotSet, ActiveValue::Set,
    ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    sea_query::SimpleExpr,
};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub category: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub available: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A catalog product as held in memory.
///
/// `id` is `None` until [`Product::create`] has stored the record; after that
/// it is never reassigned. The database row is the source of truth, this value
/// is a view of it that can be edited and written back with [`Product::update`].
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: Option<i32>,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub available: bool,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            category: String::new(),
            price: 0.0,
            description: String::new(),
            available: true,
        }
    }
}

impl From<Model> for Product {
    fn from(m: Model) -> Self {
        Self {
            id: Some(m.id),
            name: m.name,
            category: m.category,
            price: m.price,
            description: m.description,
            available: m.available,
        }
    }
}

impl Product {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate every field from an untyped JSON mapping.
    ///
    /// `name`, `category` and `price` are required; `description` defaults to
    /// `""` and `available` to `true`. On error `self` is left untouched.
    pub fn deserialize(&mut self, data: &Value) -> Result<(), ModelError> {
        let obj = as_object(data)?;
        let name = required(obj, "name", parse_label)?;
        let category = required(obj, "category", parse_label)?;
        let price = required(obj, "price", parse_price)?;
        let description = optional(obj, "description", parse_text)?.unwrap_or_default();
        let available = optional(obj, "available", parse_bool)?.unwrap_or(true);

        self.name = name;
        self.category = category;
        self.price = price;
        self.description = description;
        self.available = available;
        Ok(())
    }

    /// Merge the fields present in `data` into `self`; absent keys keep their
    /// current value. Same validation as [`Product::deserialize`].
    pub fn deserialize_partial(&mut self, data: &Value) -> Result<(), ModelError> {
        let obj = as_object(data)?;
        let name = optional(obj, "name", parse_label)?;
        let category = optional(obj, "category", parse_label)?;
        let price = optional(obj, "price", parse_price)?;
        let description = optional(obj, "description", parse_text)?;
        let available = optional(obj, "available", parse_bool)?;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = price {
            self.price = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = available {
            self.available = v;
        }
        Ok(())
    }

    pub fn serialize(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "category": self.category,
            "price": self.price,
            "description": self.description,
            "available": self.available,
        })
    }

    /// Insert as a new row and take the generated id.
    pub async fn create<C: ConnectionTrait>(&mut self, db: &C) -> Result<(), ModelError> {
        if let Some(id) = self.id {
            return Err(ModelError::Validation(format!(
                "Create called on product {id} which already exists"
            )));
        }
        let saved = self.active_model(NotSet).insert(db).await?;
        self.id = Some(saved.id);
        debug!(id = saved.id, name = %saved.name, "created product");
        Ok(())
    }

    /// Write the current field values over the stored row.
    pub async fn update<C: ConnectionTrait>(&self, db: &C) -> Result<(), ModelError> {
        let id = self
            .id
            .ok_or_else(|| ModelError::Validation("Update called with empty ID field".into()))?;
        match self.active_model(Unchanged(id)).update(db).await {
            Ok(_) => {
                debug!(id, "updated product");
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => Err(ModelError::NotFound(format!("product {id}"))),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the stored row. Returns whether a row was actually deleted.
    pub async fn delete<C: ConnectionTrait>(&self, db: &C) -> Result<bool, ModelError> {
        let id = self
            .id
            .ok_or_else(|| ModelError::Validation("Delete called with empty ID field".into()))?;
        let res = Entity::delete_by_id(id).exec(db).await?;
        debug!(id, rows = res.rows_affected, "deleted product");
        Ok(res.rows_affected > 0)
    }

    pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Product>, ModelError> {
        Ok(Entity::find_by_id(id).one(db).await?.map(Product::from))
    }

    /// Every stored product in insertion order.
    pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<Product>, ModelError> {
        Self::find_where(db, None).await
    }

    pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> Result<Vec<Product>, ModelError> {
        Self::find_where(db, Some(Column::Name.eq(name))).await
    }

    pub async fn find_by_category<C: ConnectionTrait>(db: &C, category: &str) -> Result<Vec<Product>, ModelError> {
        Self::find_where(db, Some(Column::Category.eq(category))).await
    }

    pub async fn find_by_availability<C: ConnectionTrait>(db: &C, available: bool) -> Result<Vec<Product>, ModelError> {
        Self::find_where(db, Some(Column::Available.eq(available))).await
    }

    async fn find_where<C: ConnectionTrait>(db: &C, cond: Option<SimpleExpr>) -> Result<Vec<Product>, ModelError> {
        let mut finder = Entity::find();
        if let Some(cond) = cond {
            finder = finder.filter(cond);
        }
        let rows = finder.order_by_asc(Column::Id).all(db).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn active_model(&self, id: ActiveValue<i32>) -> ActiveModel {
        ActiveModel {
            id,
            name: Set(self.name.clone()),
            category: Set(self.category.clone()),
            price: Set(self.price),
            description: Set(self.description.clone()),
            available: Set(self.available),
        }
    }
}

type FieldParser<T> = fn(&str, &Value) -> Result<T, ModelError>;

fn as_object(data: &Value) -> Result<&Map<String, Value>, ModelError> {
    data.as_object().ok_or_else(|| {
        ModelError::Validation(format!("Invalid product: body must be a JSON object, got {}", kind(data)))
    })
}

// JSON null counts as absent
fn optional<T>(obj: &Map<String, Value>, field: &str, parse: FieldParser<T>) -> Result<Option<T>, ModelError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse(field, v).map(Some),
    }
}

fn required<T>(obj: &Map<String, Value>, field: &str, parse: FieldParser<T>) -> Result<T, ModelError> {
    optional(obj, field, parse)?.ok_or_else(|| ModelError::missing(field))
}

fn parse_text(field: &str, v: &Value) -> Result<String, ModelError> {
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| ModelError::invalid_type(field, format!("expected a string, got {}", kind(v))))
}

fn parse_label(field: &str, v: &Value) -> Result<String, ModelError> {
    let s = parse_text(field, v)?;
    if s.trim().is_empty() {
        return Err(ModelError::invalid_value(field, "must not be empty"));
    }
    Ok(s)
}

fn parse_price(field: &str, v: &Value) -> Result<f64, ModelError> {
    let p = v
        .as_f64()
        .ok_or_else(|| ModelError::invalid_type(field, format!("expected a number, got {}", kind(v))))?;
    if !p.is_finite() || p < 0.0 {
        return Err(ModelError::invalid_value(field, "must be a non-negative number"));
    }
    Ok(p)
}

fn parse_bool(field: &str, v: &Value) -> Result<bool, ModelError> {
    v.as_bool()
        .ok_or_else(|| ModelError::invalid_type(field, format!("expected a boolean, got {}", kind(v))))
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
