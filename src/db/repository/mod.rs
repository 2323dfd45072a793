//! Diesel queries, one module per table family. Functions take the caller's
//! connection so they compose inside a single transaction.

pub mod company;
pub mod product;
pub mod user;

/// Plain CRUD over a table whose rows need no further assembly.
macro_rules! table_repository {
    ($module:ident, $table:ident, $row:ident, $new:ty, $changes:ty) => {
        pub mod $module {
            use diesel::prelude::*;
            use diesel::sqlite::SqliteConnection;

            use super::*;
            use crate::db::models::{$row, Changes};
            use crate::db::schema::$table;

            pub fn list(conn: &mut SqliteConnection) -> QueryResult<Vec<$row>> {
                $table::table
                    .order($table::id.asc())
                    .select($row::as_select())
                    .load(conn)
            }

            pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<$row>> {
                $table::table
                    .find(id)
                    .select($row::as_select())
                    .first(conn)
                    .optional()
            }

            pub fn exists(conn: &mut SqliteConnection, id: i32) -> QueryResult<bool> {
                diesel::select(diesel::dsl::exists($table::table.find(id))).get_result(conn)
            }

            pub fn create(conn: &mut SqliteConnection, new: &$new) -> QueryResult<$row> {
                diesel::insert_into($table::table)
                    .values(new)
                    .returning($row::as_returning())
                    .get_result(conn)
            }

            pub fn update(
                conn: &mut SqliteConnection,
                id: i32,
                changes: &$changes,
            ) -> QueryResult<Option<$row>> {
                if changes.is_empty() {
                    return find(conn, id);
                }
                diesel::update($table::table.find(id))
                    .set(changes)
                    .returning($row::as_returning())
                    .get_result(conn)
                    .optional()
            }

            pub fn delete(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
                diesel::delete($table::table.find(id)).execute(conn)
            }
        }
    };
}

use crate::db::models::{
    NewAttribute, NewCategory, NewCountry, NewExtraInfo, NewIndustry, NewKeyword, NewLogistic,
    NewState, NewUserType, UpdateAttribute, UpdateCategory, UpdateCountry, UpdateExtraInfo,
    UpdateIndustry, UpdateKeyword, UpdateLogistic, UpdateState, UpdateUserType,
};

table_repository!(countries, countries, Country, NewCountry, UpdateCountry);
table_repository!(states, states, State, NewState, UpdateState);
table_repository!(industries, industries, Industry, NewIndustry, UpdateIndustry);
table_repository!(categories, categories, Category, NewCategory, UpdateCategory);
table_repository!(user_types, user_types, UserType, NewUserType, UpdateUserType);
table_repository!(keywords, keywords, Keyword, NewKeyword, UpdateKeyword);
table_repository!(attributes, attributes, Attribute, NewAttribute, UpdateAttribute);
table_repository!(extra_info, product_extra_info, ExtraInfo, NewExtraInfo, UpdateExtraInfo);
table_repository!(logistics, product_logistics, Logistic, NewLogistic, UpdateLogistic);
