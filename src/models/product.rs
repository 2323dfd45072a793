use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{Attribute, Period, ProductAttribute, ProductChanges};
use crate::db::repository::product::ProductDetail;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct KeywordItem {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttributeItem {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 128))]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtraItem {
    #[serde(default)]
    #[validate(length(max = 128))]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogisticItem {
    #[serde(skip_serializing)]
    pub origin: i32,
    #[validate(range(min = 1, message = "Value must be greater than 0"))]
    pub quantity: i32,
    #[serde(default)]
    pub period: Period,
}

/// Body of `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub model: String,
    #[validate(length(min = 1, max = 64))]
    pub brand: String,
    #[validate(range(min = 1, message = "Value must be greater than 0"))]
    pub price: i32,
    pub made_in: i32,
    pub category: i32,
    #[serde(default)]
    pub keywords: Vec<KeywordItem>,
    #[serde(default)]
    pub attributes: Vec<AttributeItem>,
    #[serde(default)]
    pub extras: Vec<ExtraItem>,
    #[serde(default)]
    pub logistics: Vec<LogisticItem>,
}

/// Body of `PATCH /products/{id}`.
///
/// `keywords` and `attributes` replace the current set when present;
/// `extras` and `logistics` are appended.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub brand: Option<String>,
    #[validate(range(min = 1, message = "Value must be greater than 0"))]
    pub price: Option<i32>,
    pub made_in: Option<i32>,
    pub category: Option<i32>,
    pub keywords: Option<Vec<KeywordItem>>,
    pub attributes: Option<Vec<AttributeItem>>,
    #[serde(default)]
    pub extras: Vec<ExtraItem>,
    #[serde(default)]
    pub logistics: Vec<LogisticItem>,
}

impl From<ProductPayload> for ProductPatch {
    fn from(p: ProductPayload) -> Self {
        Self {
            name: Some(p.name),
            model: Some(p.model),
            brand: Some(p.brand),
            price: Some(p.price),
            made_in: Some(p.made_in),
            category: Some(p.category),
            keywords: Some(p.keywords),
            attributes: Some(p.attributes),
            extras: p.extras,
            logistics: p.logistics,
        }
    }
}

impl ProductPatch {
    pub fn changes(&self) -> ProductChanges {
        ProductChanges {
            name: self.name.clone(),
            model: self.model.clone(),
            brand: self.brand.clone(),
            price: self.price,
            made_in_id: self.made_in,
            category_id: self.category,
        }
    }
}

/// Completeness of a product's child records, derived on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Flags {
    pub extras: bool,
    pub logistics: bool,
    pub complete: bool,
}

impl Flags {
    pub fn from_counts(extras: usize, logistics: usize) -> Self {
        let extras = extras != 0;
        let logistics = logistics != 0;
        Self {
            extras,
            logistics,
            complete: extras && logistics,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub model: String,
    pub brand: String,
    pub price: i32,
    pub made_in: i32,
    pub category: i32,
    pub keywords: Vec<String>,
    pub attributes: Vec<AttributeItem>,
    pub extras: Vec<ExtraItem>,
    pub logistics: Vec<LogisticItem>,
    pub last_modification: NaiveDateTime,
    pub flags: Flags,
}

impl From<ProductDetail> for ProductView {
    fn from(d: ProductDetail) -> Self {
        let flags = Flags::from_counts(d.extras.len(), d.logistics.len());
        Self {
            id: d.product.id,
            name: d.product.name,
            model: d.product.model,
            brand: d.product.brand,
            price: d.product.price,
            made_in: d.product.made_in_id,
            category: d.product.category_id,
            keywords: d.keywords.into_iter().map(|k| k.name).collect(),
            attributes: d
                .attributes
                .into_iter()
                .map(|(value, attribute)| AttributeItem {
                    name: attribute.name,
                    value: value.value,
                })
                .collect(),
            extras: d
                .extras
                .into_iter()
                .map(|e| ExtraItem {
                    title: e.title,
                    description: e.description,
                })
                .collect(),
            logistics: d
                .logistics
                .into_iter()
                .map(|l| LogisticItem {
                    origin: l.origin_id,
                    quantity: l.quantity,
                    period: l.period,
                })
                .collect(),
            last_modification: d.product.last_modification,
            flags,
        }
    }
}

/// Body of `POST /product_attributes`; also the full form of `PUT`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductAttributePayload {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 128))]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductAttributePatch {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub value: Option<String>,
}

impl From<ProductAttributePayload> for ProductAttributePatch {
    fn from(p: ProductAttributePayload) -> Self {
        Self {
            name: Some(p.name),
            value: Some(p.value),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductAttributeView {
    pub id: i32,
    pub name: String,
    pub value: String,
}

impl From<(ProductAttribute, Attribute)> for ProductAttributeView {
    fn from((row, attribute): (ProductAttribute, Attribute)) -> Self {
        Self {
            id: row.id,
            name: attribute.name,
            value: row.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_needs_both_collections() {
        let cases = [
            (0, 0, false, false, false),
            (1, 0, true, false, false),
            (0, 2, false, true, false),
            (3, 1, true, true, true),
        ];
        for (extras, logistics, has_extras, has_logistics, complete) in cases {
            let flags = Flags::from_counts(extras, logistics);
            assert_eq!(flags.extras, has_extras);
            assert_eq!(flags.logistics, has_logistics);
            assert_eq!(flags.complete, complete, "{extras} extras, {logistics} logistics");
        }
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let body = serde_json::json!({
            "name": "Drill",
            "brand": "Acme",
            "price": 0,
            "made_in": 1,
            "category": 1
        });
        let payload: ProductPayload = serde_json::from_value(body).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn logistic_period_defaults_to_week() {
        let item: LogisticItem =
            serde_json::from_value(serde_json::json!({"origin": 1, "quantity": 5})).unwrap();
        assert_eq!(item.period, Period::Week);
        let rendered = serde_json::to_value(&item).unwrap();
        assert!(rendered.get("origin").is_none());
    }

    #[test]
    fn full_payload_replaces_sets() {
        let payload: ProductPayload = serde_json::from_value(serde_json::json!({
            "name": "Drill",
            "brand": "Acme",
            "price": 10,
            "made_in": 1,
            "category": 1
        }))
        .unwrap();
        let patch = ProductPatch::from(payload);
        assert_eq!(patch.keywords.as_ref().map(|k| k.len()), Some(0));
        assert_eq!(patch.changes().made_in_id, Some(1));
    }
}
