//! Lookup tables: industries, countries, states, categories and user types.
//!
//! Deleting a row that is still referenced elsewhere is refused (the
//! foreign keys are `ON DELETE RESTRICT`) and surfaces as a 400.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use validator::Validate;

use super::{require, Resource};
use crate::db::models::{
    Category, Country, Industry, NewCategory, NewCountry, NewIndustry, NewState, NewUserType,
    State, UpdateCategory, UpdateCountry, UpdateIndustry, UpdateState, UpdateUserType, UserType,
};
use crate::db::repository;
use crate::error::{FieldErrors, WebError, WebResult};
use crate::AppState;

pub const INDUSTRIES: &str = "/industries";
pub const COUNTRIES: &str = "/countries";
pub const STATES: &str = "/states";
pub const CATEGORIES: &str = "/categories";
pub const USER_TYPES: &str = "/user_types";

/// Foreign keys a table-backed payload points at, checked before writing.
pub(crate) trait Relations {
    fn check(&self, _conn: &mut SqliteConnection) -> QueryResult<FieldErrors> {
        Ok(FieldErrors::new())
    }
}

/// Implement [`Resource`] for a table whose payloads are its own row types.
macro_rules! table_resource {
    ($resource:ident, $name:literal, $repo:ident, $row:ty, $new:ty, $changes:ty) => {
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
                conn.immediate_transaction::<_, WebError, _>(|conn| {
                    payload.check(conn)?.into_result()?;
                    Ok(repository::$repo::create(conn, &payload)?)
                })
            }

            fn update(state: &AppState, id: i32, payload: $changes) -> WebResult<Option<$row>> {
                payload.validate()?;
                let mut conn = state.conn()?;
                conn.immediate_transaction::<_, WebError, _>(|conn| {
                    if !repository::$repo::exists(conn, id)? {
                        return Ok(None);
                    }
                    payload.check(conn)?.into_result()?;
                    Ok(repository::$repo::update(conn, id, &payload)?)
                })
            }

            fn delete(state: &AppState, id: i32) -> WebResult<bool> {
                let mut conn = state.conn()?;
                Ok(repository::$repo::delete(&mut conn, id)? > 0)
            }
        }
    };
}

pub(crate) use table_resource;

table_resource!(Industries, "industries", industries, Industry, NewIndustry, UpdateIndustry);
table_resource!(Countries, "countries", countries, Country, NewCountry, UpdateCountry);
table_resource!(States, "states", states, State, NewState, UpdateState);
table_resource!(Categories, "categories", categories, Category, NewCategory, UpdateCategory);
table_resource!(UserTypes, "user_types", user_types, UserType, NewUserType, UpdateUserType);

impl Relations for NewIndustry {}
impl Relations for UpdateIndustry {}
impl Relations for NewCountry {}
impl Relations for UpdateCountry {}
impl Relations for NewCategory {}
impl Relations for UpdateCategory {}
impl Relations for NewUserType {}
impl Relations for UpdateUserType {}

impl Relations for NewState {
    fn check(&self, conn: &mut SqliteConnection) -> QueryResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        let found = repository::countries::exists(conn, self.country_id)?;
        require(&mut errors, "country", self.country_id, found);
        Ok(errors)
    }
}

impl Relations for UpdateState {
    fn check(&self, conn: &mut SqliteConnection) -> QueryResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(country_id) = self.country_id {
            let found = repository::countries::exists(conn, country_id)?;
            require(&mut errors, "country", country_id, found);
        }
        Ok(errors)
    }
}
