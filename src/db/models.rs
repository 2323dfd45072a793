use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::schema::{
    attributes, categories, companies, companies_product_categories, countries, industries,
    keywords, product_attributes, product_extra_info, product_logistics, products,
    products_attributes, products_keywords, states, user_profiles, user_types, users,
};

/// Changesets whose every column is optional; an empty one must not reach `UPDATE`.
pub trait Changes {
    fn is_empty(&self) -> bool;
}

macro_rules! impl_changes {
    ($($ty:ty => [$($field:ident),+ $(,)?]);+ $(;)?) => {
        $(
            impl Changes for $ty {
                fn is_empty(&self) -> bool {
                    true $(&& self.$field.is_none())+
                }
            }
        )+
    };
}

// Reference data

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = countries)]
pub struct Country {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub phone_code: Option<String>,
}

#[derive(Insertable, Deserialize, Validate, Debug, Clone)]
#[diesel(table_name = countries)]
pub struct NewCountry {
    #[validate(length(min = 1, max = 2))]
    pub code: String,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(max = 5))]
    pub phone_code: Option<String>,
}

#[derive(AsChangeset, Deserialize, Validate, Debug, Clone, Default)]
#[diesel(table_name = countries)]
pub struct UpdateCountry {
    #[validate(length(min = 1, max = 2))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    #[validate(length(max = 5))]
    pub phone_code: Option<Option<String>>,
}

impl From<NewCountry> for UpdateCountry {
    fn from(c: NewCountry) -> Self {
        Self {
            code: Some(c.code),
            name: Some(c.name),
            phone_code: Some(c.phone_code),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Country))]
#[diesel(table_name = states)]
pub struct State {
    pub id: i32,
    #[serde(rename = "country")]
    pub country_id: i32,
    pub name: String,
    pub code: String,
}

#[derive(Insertable, Deserialize, Validate, Debug, Clone)]
#[diesel(table_name = states)]
pub struct NewState {
    #[serde(rename = "country")]
    pub country_id: i32,
    #[validate(length(min = 1, max = 32))]
    pub name: String,
    #[validate(length(min = 1, max = 2))]
    pub code: String,
}

#[derive(AsChangeset, Deserialize, Validate, Debug, Clone, Default)]
#[diesel(table_name = states)]
pub struct UpdateState {
    #[serde(rename = "country")]
    pub country_id: Option<i32>,
    #[validate(length(min = 1, max = 32))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 2))]
    pub code: Option<String>,
}

impl From<NewState> for UpdateState {
    fn from(s: NewState) -> Self {
        Self {
            country_id: Some(s.country_id),
            name: Some(s.name),
            code: Some(s.code),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = industries)]
pub struct Industry {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable, Deserialize, Validate, Debug, Clone)]
#[diesel(table_name = industries)]
pub struct NewIndustry {
    #[validate(length(min = 1, max = 32))]
    pub name: String,
}

#[derive(AsChangeset, Deserialize, Validate, Debug, Clone, Default)]
#[diesel(table_name = industries)]
pub struct UpdateIndustry {
    #[validate(length(min = 1, max = 32))]
    pub name: Option<String>,
}

impl From<NewIndustry> for UpdateIndustry {
    fn from(i: NewIndustry) -> Self {
        Self { name: Some(i.name) }
    }
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub status: bool,
}

#[derive(Insertable, Deserialize, Validate, Debug, Clone)]
#[diesel(table_name = categories)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 30))]
    pub name: String,
    #[serde(default)]
    pub status: bool,
}

#[derive(AsChangeset, Deserialize, Validate, Debug, Clone, Default)]
#[diesel(table_name = categories)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 30))]
    pub name: Option<String>,
    pub status: Option<bool>,
}

impl From<NewCategory> for UpdateCategory {
    fn from(c: NewCategory) -> Self {
        Self {
            name: Some(c.name),
            status: Some(c.status),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = user_types)]
pub struct UserType {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable, Deserialize, Validate, Debug, Clone)]
#[diesel(table_name = user_types)]
pub struct NewUserType {
    #[validate(length(min = 1, max = 30))]
    pub name: String,
}

#[derive(AsChangeset, Deserialize, Validate, Debug, Clone, Default)]
#[diesel(table_name = user_types)]
pub struct UpdateUserType {
    #[validate(length(min = 1, max = 30))]
    pub name: Option<String>,
}

impl From<NewUserType> for UpdateUserType {
    fn from(t: NewUserType) -> Self {
        Self { name: Some(t.name) }
    }
}

// Companies

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = companies)]
pub struct Company {
    pub id: i32,
    pub business_name: String,
    pub website: String,
    pub street: String,
    pub num_ext: String,
    pub zip_code: String,
    pub state_id: i32,
    pub country_id: i32,
    pub phone_number: String,
    pub phone_name: String,
    pub phone_extension: String,
    pub phone_country_id: i32,
    pub industry_id: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub business_name: String,
    pub website: String,
    pub street: String,
    pub num_ext: String,
    pub zip_code: String,
    pub state_id: i32,
    pub country_id: i32,
    pub phone_number: String,
    pub phone_name: String,
    pub phone_extension: String,
    pub phone_country_id: i32,
    pub industry_id: i32,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = companies)]
pub struct CompanyChanges {
    pub business_name: Option<String>,
    pub website: Option<String>,
    pub street: Option<String>,
    pub num_ext: Option<String>,
    pub zip_code: Option<String>,
    pub state_id: Option<i32>,
    pub country_id: Option<i32>,
    pub phone_number: Option<String>,
    pub phone_name: Option<String>,
    pub phone_extension: Option<String>,
    pub phone_country_id: Option<i32>,
    pub industry_id: Option<i32>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Company))]
#[diesel(belongs_to(Category))]
#[diesel(table_name = companies_product_categories)]
#[diesel(primary_key(company_id, category_id))]
pub struct CompanyCategory {
    pub company_id: i32,
    pub category_id: i32,
}

// Products

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = keywords)]
pub struct Keyword {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable, Deserialize, Validate, Debug, Clone)]
#[diesel(table_name = keywords)]
pub struct NewKeyword {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

#[derive(AsChangeset, Deserialize, Validate, Debug, Clone, Default)]
#[diesel(table_name = keywords)]
pub struct UpdateKeyword {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
}

impl From<NewKeyword> for UpdateKeyword {
    fn from(k: NewKeyword) -> Self {
        Self { name: Some(k.name) }
    }
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = attributes)]
pub struct Attribute {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable, Deserialize, Validate, Debug, Clone)]
#[diesel(table_name = attributes)]
pub struct NewAttribute {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

#[derive(AsChangeset, Deserialize, Validate, Debug, Clone, Default)]
#[diesel(table_name = attributes)]
pub struct UpdateAttribute {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
}

impl From<NewAttribute> for UpdateAttribute {
    fn from(a: NewAttribute) -> Self {
        Self { name: Some(a.name) }
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Attribute))]
#[diesel(table_name = product_attributes)]
pub struct ProductAttribute {
    pub id: i32,
    pub value: String,
    pub attribute_id: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = product_attributes)]
pub struct NewProductAttribute<'a> {
    pub value: &'a str,
    pub attribute_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub model: String,
    pub brand: String,
    pub price: i32,
    pub made_in_id: i32,
    pub category_id: i32,
    pub last_modification: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub name: String,
    pub model: String,
    pub brand: String,
    pub price: i32,
    pub made_in_id: i32,
    pub category_id: i32,
    pub last_modification: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = products)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub price: Option<i32>,
    pub made_in_id: Option<i32>,
    pub category_id: Option<i32>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(belongs_to(Keyword))]
#[diesel(table_name = products_keywords)]
#[diesel(primary_key(product_id, keyword_id))]
pub struct ProductKeyword {
    pub product_id: i32,
    pub keyword_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(belongs_to(ProductAttribute))]
#[diesel(table_name = products_attributes)]
#[diesel(primary_key(product_id, product_attribute_id))]
pub struct ProductAttributeLink {
    pub product_id: i32,
    pub product_attribute_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = product_extra_info)]
pub struct ExtraInfo {
    pub id: i32,
    #[serde(rename = "product")]
    pub product_id: i32,
    pub title: String,
    pub description: String,
}

#[derive(Insertable, Deserialize, Validate, Debug, Clone)]
#[diesel(table_name = product_extra_info)]
pub struct NewExtraInfo {
    #[serde(rename = "product")]
    pub product_id: i32,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl NewExtraInfo {
    /// The empty row every product starts with.
    pub fn placeholder(product_id: i32) -> Self {
        Self {
            product_id,
            title: String::new(),
            description: String::new(),
        }
    }
}

#[derive(AsChangeset, Deserialize, Validate, Debug, Clone, Default)]
#[diesel(table_name = product_extra_info)]
pub struct UpdateExtraInfo {
    #[serde(rename = "product")]
    pub product_id: Option<i32>,
    #[validate(length(max = 128))]
    pub title: Option<String>,
    pub description: Option<String>,
}

impl From<NewExtraInfo> for UpdateExtraInfo {
    fn from(e: NewExtraInfo) -> Self {
        Self {
            product_id: Some(e.product_id),
            title: Some(e.title),
            description: Some(e.description),
        }
    }
}

/// Replenishment period of a logistic entry, stored as its one-letter code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum Period {
    #[serde(rename = "D")]
    Day,
    #[serde(rename = "M")]
    Month,
    #[serde(rename = "Y")]
    Year,
    #[default]
    #[serde(rename = "W")]
    Week,
}

impl Period {
    pub fn code(self) -> &'static str {
        match self {
            Period::Day => "D",
            Period::Month => "M",
            Period::Year => "Y",
            Period::Week => "W",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" => Ok(Period::Day),
            "M" => Ok(Period::Month),
            "Y" => Ok(Period::Year),
            "W" => Ok(Period::Week),
            other => Err(format!("unknown period `{other}`")),
        }
    }
}

impl ToSql<Text, Sqlite> for Period {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.code());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for Period {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let code = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        code.parse().map_err(|e: String| e.into())
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = product_logistics)]
pub struct Logistic {
    pub id: i32,
    #[serde(rename = "product")]
    pub product_id: i32,
    #[serde(rename = "origin")]
    pub origin_id: i32,
    pub quantity: i32,
    pub period: Period,
}

#[derive(Insertable, Deserialize, Validate, Debug, Clone)]
#[diesel(table_name = product_logistics)]
pub struct NewLogistic {
    #[serde(rename = "product")]
    pub product_id: i32,
    #[serde(rename = "origin")]
    pub origin_id: i32,
    #[validate(range(min = 1, message = "Value must be greater than 0"))]
    pub quantity: i32,
    #[serde(default)]
    pub period: Period,
}

#[derive(AsChangeset, Deserialize, Validate, Debug, Clone, Default)]
#[diesel(table_name = product_logistics)]
pub struct UpdateLogistic {
    #[serde(rename = "product")]
    pub product_id: Option<i32>,
    #[serde(rename = "origin")]
    pub origin_id: Option<i32>,
    #[validate(range(min = 1, message = "Value must be greater than 0"))]
    pub quantity: Option<i32>,
    pub period: Option<Period>,
}

impl From<NewLogistic> for UpdateLogistic {
    fn from(l: NewLogistic) -> Self {
        Self {
            product_id: Some(l.product_id),
            origin_id: Some(l.origin_id),
            quantity: Some(l.quantity),
            period: Some(l.period),
        }
    }
}

// Users

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = users)]
pub struct UserChanges {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = user_profiles)]
#[diesel(primary_key(user_id))]
pub struct Profile {
    pub user_id: i32,
    pub role: String,
    pub phone: String,
    pub phone_country_id: Option<i32>,
    pub user_type_id: Option<i32>,
}

/// Profile row inserted alongside every user; filled in by the same request.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = user_profiles)]
pub struct NewProfile {
    pub user_id: i32,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = user_profiles)]
pub struct ProfileChanges {
    pub role: Option<String>,
    pub phone: Option<String>,
    pub phone_country_id: Option<Option<i32>>,
    pub user_type_id: Option<Option<i32>>,
}

impl_changes! {
    UpdateCountry => [code, name, phone_code];
    UpdateState => [country_id, name, code];
    UpdateIndustry => [name];
    UpdateCategory => [name, status];
    UpdateUserType => [name];
    UpdateKeyword => [name];
    UpdateAttribute => [name];
    UpdateExtraInfo => [product_id, title, description];
    UpdateLogistic => [product_id, origin_id, quantity, period];
    CompanyChanges => [
        business_name, website, street, num_ext, zip_code, state_id, country_id,
        phone_number, phone_name, phone_extension, phone_country_id, industry_id,
    ];
    ProductChanges => [name, model, brand, price, made_in_id, category_id];
    UserChanges => [username, first_name, last_name, email, password];
    ProfileChanges => [role, phone, phone_country_id, user_type_id];
}
