use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::models::{
    Attribute, Changes, ExtraInfo, Keyword, Logistic, NewAttribute, NewExtraInfo, NewKeyword,
    NewLogistic, NewProduct, NewProductAttribute, Product, ProductAttribute, ProductAttributeLink,
    ProductChanges, ProductKeyword,
};
use crate::db::schema::{
    attributes, keywords, product_attributes, product_extra_info, product_logistics, products,
    products_attributes, products_keywords,
};

/// A product row together with every row hanging off it.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub keywords: Vec<Keyword>,
    pub attributes: Vec<(ProductAttribute, Attribute)>,
    pub extras: Vec<ExtraInfo>,
    pub logistics: Vec<Logistic>,
}

pub fn keyword_get_or_create(conn: &mut SqliteConnection, name: &str) -> QueryResult<Keyword> {
    let existing = keywords::table
        .filter(keywords::name.eq(name))
        .select(Keyword::as_select())
        .first(conn)
        .optional()?;
    match existing {
        Some(keyword) => Ok(keyword),
        None => diesel::insert_into(keywords::table)
            .values(&NewKeyword {
                name: name.to_string(),
            })
            .returning(Keyword::as_returning())
            .get_result(conn),
    }
}

pub fn attribute_get_or_create(conn: &mut SqliteConnection, name: &str) -> QueryResult<Attribute> {
    let existing = attributes::table
        .filter(attributes::name.eq(name))
        .select(Attribute::as_select())
        .first(conn)
        .optional()?;
    match existing {
        Some(attribute) => Ok(attribute),
        None => diesel::insert_into(attributes::table)
            .values(&NewAttribute {
                name: name.to_string(),
            })
            .returning(Attribute::as_returning())
            .get_result(conn),
    }
}

/// Resolve `(name, value)` to a shared attribute value row; values compare lowercased.
pub fn product_attribute_get_or_create(
    conn: &mut SqliteConnection,
    name: &str,
    value: &str,
) -> QueryResult<(ProductAttribute, Attribute)> {
    let attribute = attribute_get_or_create(conn, name)?;
    let value = value.to_lowercase();
    let existing = product_attributes::table
        .filter(product_attributes::attribute_id.eq(attribute.id))
        .filter(product_attributes::value.eq(&value))
        .select(ProductAttribute::as_select())
        .first(conn)
        .optional()?;
    let row = match existing {
        Some(row) => row,
        None => diesel::insert_into(product_attributes::table)
            .values(&NewProductAttribute {
                value: &value,
                attribute_id: attribute.id,
            })
            .returning(ProductAttribute::as_returning())
            .get_result(conn)?,
    };
    Ok((row, attribute))
}

pub fn list_product_attributes(
    conn: &mut SqliteConnection,
) -> QueryResult<Vec<(ProductAttribute, Attribute)>> {
    product_attributes::table
        .inner_join(attributes::table)
        .order(product_attributes::id.asc())
        .select((ProductAttribute::as_select(), Attribute::as_select()))
        .load(conn)
}

pub fn find_product_attribute(
    conn: &mut SqliteConnection,
    id: i32,
) -> QueryResult<Option<(ProductAttribute, Attribute)>> {
    product_attributes::table
        .inner_join(attributes::table)
        .filter(product_attributes::id.eq(id))
        .select((ProductAttribute::as_select(), Attribute::as_select()))
        .first(conn)
        .optional()
}

pub fn update_product_attribute(
    conn: &mut SqliteConnection,
    id: i32,
    attribute_id: i32,
    value: &str,
) -> QueryResult<usize> {
    diesel::update(product_attributes::table.find(id))
        .set((
            product_attributes::attribute_id.eq(attribute_id),
            product_attributes::value.eq(value.to_lowercase()),
        ))
        .execute(conn)
}

pub fn delete_product_attribute(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
    diesel::delete(product_attributes::table.find(id)).execute(conn)
}

pub fn exists(conn: &mut SqliteConnection, id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(products::table.find(id))).get_result(conn)
}

pub fn create(conn: &mut SqliteConnection, new_product: &NewProduct) -> QueryResult<Product> {
    diesel::insert_into(products::table)
        .values(new_product)
        .returning(Product::as_returning())
        .get_result(conn)
}

/// Apply `changes` and refresh `last_modification`, even when no column changed.
pub fn update(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &ProductChanges,
) -> QueryResult<Option<Product>> {
    let now = Utc::now().naive_utc();
    if changes.is_empty() {
        return diesel::update(products::table.find(id))
            .set(products::last_modification.eq(now))
            .returning(Product::as_returning())
            .get_result(conn)
            .optional();
    }
    diesel::update(products::table.find(id))
        .set((changes, products::last_modification.eq(now)))
        .returning(Product::as_returning())
        .get_result(conn)
        .optional()
}

pub fn delete(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
    diesel::delete(products::table.find(id)).execute(conn)
}

pub fn set_keywords(
    conn: &mut SqliteConnection,
    product_id: i32,
    keyword_ids: &[i32],
) -> QueryResult<()> {
    diesel::delete(products_keywords::table.filter(products_keywords::product_id.eq(product_id)))
        .execute(conn)?;
    let mut links: Vec<ProductKeyword> = keyword_ids
        .iter()
        .map(|&keyword_id| ProductKeyword {
            product_id,
            keyword_id,
        })
        .collect();
    links.sort_by_key(|l| l.keyword_id);
    links.dedup();
    if !links.is_empty() {
        diesel::insert_into(products_keywords::table)
            .values(&links)
            .execute(conn)?;
    }
    Ok(())
}

pub fn set_attributes(
    conn: &mut SqliteConnection,
    product_id: i32,
    product_attribute_ids: &[i32],
) -> QueryResult<()> {
    diesel::delete(
        products_attributes::table.filter(products_attributes::product_id.eq(product_id)),
    )
    .execute(conn)?;
    let mut links: Vec<ProductAttributeLink> = product_attribute_ids
        .iter()
        .map(|&product_attribute_id| ProductAttributeLink {
            product_id,
            product_attribute_id,
        })
        .collect();
    links.sort_by_key(|l| l.product_attribute_id);
    links.dedup();
    if !links.is_empty() {
        diesel::insert_into(products_attributes::table)
            .values(&links)
            .execute(conn)?;
    }
    Ok(())
}

pub fn add_extras(conn: &mut SqliteConnection, extras: &[NewExtraInfo]) -> QueryResult<usize> {
    if extras.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(product_extra_info::table)
        .values(extras)
        .execute(conn)
}

pub fn add_logistics(conn: &mut SqliteConnection, logistics: &[NewLogistic]) -> QueryResult<usize> {
    if logistics.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(product_logistics::table)
        .values(logistics)
        .execute(conn)
}

fn load_details(conn: &mut SqliteConnection, rows: Vec<Product>) -> QueryResult<Vec<ProductDetail>> {
    let keywords = ProductKeyword::belonging_to(&rows)
        .inner_join(keywords::table)
        .order(products_keywords::keyword_id.asc())
        .select((ProductKeyword::as_select(), Keyword::as_select()))
        .load::<(ProductKeyword, Keyword)>(conn)?
        .grouped_by(&rows);
    let attributes = ProductAttributeLink::belonging_to(&rows)
        .inner_join(product_attributes::table.inner_join(attributes::table))
        .order(products_attributes::product_attribute_id.asc())
        .select((
            ProductAttributeLink::as_select(),
            (ProductAttribute::as_select(), Attribute::as_select()),
        ))
        .load::<(ProductAttributeLink, (ProductAttribute, Attribute))>(conn)?
        .grouped_by(&rows);
    let extras = ExtraInfo::belonging_to(&rows)
        .order(product_extra_info::id.asc())
        .select(ExtraInfo::as_select())
        .load(conn)?
        .grouped_by(&rows);
    let logistics = Logistic::belonging_to(&rows)
        .order(product_logistics::id.asc())
        .select(Logistic::as_select())
        .load(conn)?
        .grouped_by(&rows);

    Ok(rows
        .into_iter()
        .zip(keywords)
        .zip(attributes)
        .zip(extras)
        .zip(logistics)
        .map(
            |((((product, keywords), attributes), extras), logistics)| ProductDetail {
                product,
                keywords: keywords.into_iter().map(|(_, k)| k).collect(),
                attributes: attributes.into_iter().map(|(_, a)| a).collect(),
                extras,
                logistics,
            },
        )
        .collect())
}

pub fn list(conn: &mut SqliteConnection) -> QueryResult<Vec<ProductDetail>> {
    let rows = products::table
        .order(products::id.asc())
        .select(Product::as_select())
        .load(conn)?;
    load_details(conn, rows)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<ProductDetail>> {
    let row = products::table
        .find(id)
        .select(Product::as_select())
        .first(conn)
        .optional()?;
    match row {
        Some(product) => Ok(load_details(conn, vec![product])?.pop()),
        None => Ok(None),
    }
}
