//! Products and the rows hanging off them.
//!
//! Keywords, attributes and attribute values are shared between products and
//! resolved by natural key: posting a name that already exists returns the
//! existing row instead of failing.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use validator::Validate;

use super::reference::{table_resource, Relations};
use super::{field_errors, require, validate_items, Resource};
use crate::db::models::{
    Attribute, ExtraInfo, Keyword, Logistic, NewAttribute, NewExtraInfo, NewKeyword, NewLogistic,
    NewProduct, UpdateAttribute, UpdateExtraInfo, UpdateKeyword, UpdateLogistic,
};
use crate::db::repository::{self, product::ProductDetail};
use crate::error::{FieldErrors, WebError, WebResult};
use crate::models::{
    AttributeItem, ExtraItem, KeywordItem, LogisticItem, ProductAttributePatch,
    ProductAttributePayload, ProductAttributeView, ProductPatch, ProductPayload, ProductView,
};
use crate::AppState;

pub const KEYWORDS: &str = "/keywords";
pub const ATTRIBUTES: &str = "/attributes";
pub const PRODUCT_ATTRIBUTES: &str = "/product_attributes";
pub const PRODUCTS_EXTRA_INFO: &str = "/products_extra_info";
pub const PRODUCT_LOGISTICS: &str = "/product_logistics";
pub const PRODUCTS: &str = "/products";

/// Like `table_resource!`, but `POST` returns the row already holding the name.
macro_rules! named_resource {
    ($resource:ident, $name:literal, $repo:ident, $get_or_create:ident, $row:ty, $new:ty, $changes:ty) => {
        pub struct $resource;

        impl Resource for $resource {
            const NAME: &'static str = $name;

            type View = $row;
            type Create = $new;
            type Update = $changes;

            fn list(state: &AppState) -> WebResult<Vec<$row>> {
                let mut conn = state.conn()?;
                Ok(repository::$repo::list(&mut conn)?)
            }

            fn retrieve(state: &AppState, id: i32) -> WebResult<Option<$row>> {
                let mut conn = state.conn()?;
                Ok(repository::$repo::find(&mut conn, id)?)
            }

            fn create(state: &AppState, payload: $new) -> WebResult<$row> {
                payload.validate()?;
                let mut conn = state.conn()?;
                Ok(repository::product::$get_or_create(&mut conn, &payload.name)?)
            }

            fn update(state: &AppState, id: i32, payload: $changes) -> WebResult<Option<$row>> {
                payload.validate()?;
                let mut conn = state.conn()?;
                Ok(repository::$repo::update(&mut conn, id, &payload)?)
            }

            fn delete(state: &AppState, id: i32) -> WebResult<bool> {
                let mut conn = state.conn()?;
                Ok(repository::$repo::delete(&mut conn, id)? > 0)
            }
        }
    };
}

named_resource!(Keywords, "keywords", keywords, keyword_get_or_create, Keyword, NewKeyword, UpdateKeyword);
named_resource!(
    Attributes,
    "attributes",
    attributes,
    attribute_get_or_create,
    Attribute,
    NewAttribute,
    UpdateAttribute
);

table_resource!(ExtraInfos, "products_extra_info", extra_info, ExtraInfo, NewExtraInfo, UpdateExtraInfo);
table_resource!(Logistics, "product_logistics", logistics, Logistic, NewLogistic, UpdateLogistic);

fn check_product(conn: &mut SqliteConnection, errors: &mut FieldErrors, id: i32) -> QueryResult<()> {
    require(errors, "product", id, repository::product::exists(conn, id)?);
    Ok(())
}

fn check_origin(conn: &mut SqliteConnection, errors: &mut FieldErrors, id: i32) -> QueryResult<()> {
    require(errors, "origin", id, repository::countries::exists(conn, id)?);
    Ok(())
}

impl Relations for NewExtraInfo {
    fn check(&self, conn: &mut SqliteConnection) -> QueryResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        check_product(conn, &mut errors, self.product_id)?;
        Ok(errors)
    }
}

impl Relations for UpdateExtraInfo {
    fn check(&self, conn: &mut SqliteConnection) -> QueryResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(id) = self.product_id {
            check_product(conn, &mut errors, id)?;
        }
        Ok(errors)
    }
}

impl Relations for NewLogistic {
    fn check(&self, conn: &mut SqliteConnection) -> QueryResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        check_product(conn, &mut errors, self.product_id)?;
        check_origin(conn, &mut errors, self.origin_id)?;
        Ok(errors)
    }
}

impl Relations for UpdateLogistic {
    fn check(&self, conn: &mut SqliteConnection) -> QueryResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(id) = self.product_id {
            check_product(conn, &mut errors, id)?;
        }
        if let Some(id) = self.origin_id {
            check_origin(conn, &mut errors, id)?;
        }
        Ok(errors)
    }
}

pub struct ProductAttributes;

impl Resource for ProductAttributes {
    const NAME: &'static str = "product_attributes";

    type View = ProductAttributeView;
    type Create = ProductAttributePayload;
    type Update = ProductAttributePatch;

    fn list(state: &AppState) -> WebResult<Vec<ProductAttributeView>> {
        let mut conn = state.conn()?;
        let rows = repository::product::list_product_attributes(&mut conn)?;
        Ok(rows.into_iter().map(ProductAttributeView::from).collect())
    }

    fn retrieve(state: &AppState, id: i32) -> WebResult<Option<ProductAttributeView>> {
        let mut conn = state.conn()?;
        let row = repository::product::find_product_attribute(&mut conn, id)?;
        Ok(row.map(ProductAttributeView::from))
    }

    fn create(state: &AppState, payload: ProductAttributePayload) -> WebResult<ProductAttributeView> {
        payload.validate()?;
        let mut conn = state.conn()?;
        conn.immediate_transaction::<_, WebError, _>(|conn| {
            let row = repository::product::product_attribute_get_or_create(
                conn,
                &payload.name,
                &payload.value,
            )?;
            Ok(row.into())
        })
    }

    fn update(
        state: &AppState,
        id: i32,
        payload: ProductAttributePatch,
    ) -> WebResult<Option<ProductAttributeView>> {
        payload.validate()?;
        let mut conn = state.conn()?;
        conn.immediate_transaction::<_, WebError, _>(|conn| {
            let Some((row, attribute)) = repository::product::find_product_attribute(conn, id)? else {
                return Ok(None);
            };
            let attribute = match &payload.name {
                Some(name) if *name != attribute.name => {
                    repository::product::attribute_get_or_create(conn, name)?
                }
                _ => attribute,
            };
            let value = payload.value.as_deref().unwrap_or(&row.value);
            repository::product::update_product_attribute(conn, id, attribute.id, value)?;
            let updated = repository::product::find_product_attribute(conn, id)?;
            Ok(updated.map(ProductAttributeView::from))
        })
    }

    fn delete(state: &AppState, id: i32) -> WebResult<bool> {
        let mut conn = state.conn()?;
        Ok(repository::product::delete_product_attribute(&mut conn, id)? > 0)
    }
}

pub struct Products;

/// Validate each logistic entry and the country it ships from, keyed by index.
fn check_logistics(
    conn: &mut SqliteConnection,
    errors: &mut FieldErrors,
    items: &[LogisticItem],
) -> QueryResult<()> {
    let mut nested = FieldErrors::new();
    for (index, item) in items.iter().enumerate() {
        let mut item_errors = field_errors(item);
        check_origin(conn, &mut item_errors, item.origin)?;
        nested.nest(&index.to_string(), item_errors);
    }
    errors.nest("logistics", nested);
    Ok(())
}

fn check_refs(
    conn: &mut SqliteConnection,
    errors: &mut FieldErrors,
    made_in: Option<i32>,
    category: Option<i32>,
) -> QueryResult<()> {
    if let Some(id) = made_in {
        require(errors, "made_in", id, repository::countries::exists(conn, id)?);
    }
    if let Some(id) = category {
        require(errors, "category", id, repository::categories::exists(conn, id)?);
    }
    Ok(())
}

fn item_errors(
    errors: &mut FieldErrors,
    keywords: Option<&[KeywordItem]>,
    attributes: Option<&[AttributeItem]>,
    extras: &[ExtraItem],
) {
    if let Some(keywords) = keywords {
        validate_items(errors, "keywords", keywords);
    }
    if let Some(attributes) = attributes {
        validate_items(errors, "attributes", attributes);
    }
    validate_items(errors, "extras", extras);
}

/// Write the associations and child rows a payload carries.
fn attach(
    conn: &mut SqliteConnection,
    product_id: i32,
    keywords: Option<&[KeywordItem]>,
    attributes: Option<&[AttributeItem]>,
    extras: Vec<NewExtraInfo>,
    logistics: &[LogisticItem],
) -> QueryResult<()> {
    if let Some(keywords) = keywords {
        let ids = keywords
            .iter()
            .map(|k| repository::product::keyword_get_or_create(conn, &k.name).map(|k| k.id))
            .collect::<QueryResult<Vec<_>>>()?;
        repository::product::set_keywords(conn, product_id, &ids)?;
    }
    if let Some(attributes) = attributes {
        let ids = attributes
            .iter()
            .map(|a| {
                repository::product::product_attribute_get_or_create(conn, &a.name, &a.value)
                    .map(|(row, _)| row.id)
            })
            .collect::<QueryResult<Vec<_>>>()?;
        repository::product::set_attributes(conn, product_id, &ids)?;
    }
    repository::product::add_extras(conn, &extras)?;
    let logistics: Vec<NewLogistic> = logistics
        .iter()
        .map(|l| NewLogistic {
            product_id,
            origin_id: l.origin,
            quantity: l.quantity,
            period: l.period,
        })
        .collect();
    repository::product::add_logistics(conn, &logistics)?;
    Ok(())
}

fn extra_rows(product_id: i32, extras: &[ExtraItem]) -> impl Iterator<Item = NewExtraInfo> + '_ {
    extras.iter().map(move |e| NewExtraInfo {
        product_id,
        title: e.title.clone(),
        description: e.description.clone(),
    })
}

fn reload(conn: &mut SqliteConnection, id: i32) -> WebResult<Option<ProductView>> {
    let detail: Option<ProductDetail> = repository::product::find(conn, id)?;
    Ok(detail.map(ProductView::from))
}

impl Resource for Products {
    const NAME: &'static str = "products";

    type View = ProductView;
    type Create = ProductPayload;
    type Update = ProductPatch;

    fn list(state: &AppState) -> WebResult<Vec<ProductView>> {
        let mut conn = state.conn()?;
        let rows = repository::product::list(&mut conn)?;
        Ok(rows.into_iter().map(ProductView::from).collect())
    }

    fn retrieve(state: &AppState, id: i32) -> WebResult<Option<ProductView>> {
        let mut conn = state.conn()?;
        reload(&mut conn, id)
    }

    /// Insert the product, its associations, the empty extra-info row every
    /// product starts with, then any extras and logistics sent along.
    fn create(state: &AppState, payload: ProductPayload) -> WebResult<ProductView> {
        let mut errors = field_errors(&payload);
        item_errors(
            &mut errors,
            Some(payload.keywords.as_slice()),
            Some(payload.attributes.as_slice()),
            &payload.extras,
        );
        let mut conn = state.conn()?;
        conn.immediate_transaction::<_, WebError, _>(|conn| {
            check_refs(conn, &mut errors, Some(payload.made_in), Some(payload.category))?;
            check_logistics(conn, &mut errors, &payload.logistics)?;
            errors.into_result()?;

            let product = repository::product::create(
                conn,
                &NewProduct {
                    name: payload.name.clone(),
                    model: payload.model.clone(),
                    brand: payload.brand.clone(),
                    price: payload.price,
                    made_in_id: payload.made_in,
                    category_id: payload.category,
                    last_modification: Utc::now().naive_utc(),
                },
            )?;
            let extras = std::iter::once(NewExtraInfo::placeholder(product.id))
                .chain(extra_rows(product.id, &payload.extras))
                .collect();
            attach(
                conn,
                product.id,
                Some(payload.keywords.as_slice()),
                Some(payload.attributes.as_slice()),
                extras,
                &payload.logistics,
            )?;
            reload(conn, product.id)?.ok_or(WebError::NotFound)
        })
    }

    fn update(state: &AppState, id: i32, payload: ProductPatch) -> WebResult<Option<ProductView>> {
        let mut errors = field_errors(&payload);
        item_errors(
            &mut errors,
            payload.keywords.as_deref(),
            payload.attributes.as_deref(),
            &payload.extras,
        );
        let mut conn = state.conn()?;
        conn.immediate_transaction::<_, WebError, _>(|conn| {
            if !repository::product::exists(conn, id)? {
                return Ok(None);
            }
            check_refs(conn, &mut errors, payload.made_in, payload.category)?;
            check_logistics(conn, &mut errors, &payload.logistics)?;
            errors.into_result()?;

            repository::product::update(conn, id, &payload.changes())?;
            attach(
                conn,
                id,
                payload.keywords.as_deref(),
                payload.attributes.as_deref(),
                extra_rows(id, &payload.extras).collect(),
                &payload.logistics,
            )?;
            reload(conn, id)
        })
    }

    fn delete(state: &AppState, id: i32) -> WebResult<bool> {
        let mut conn = state.conn()?;
        Ok(repository::product::delete(&mut conn, id)? > 0)
    }
}
