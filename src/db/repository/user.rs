use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::models::{Changes, NewProfile, NewUser, Profile, ProfileChanges, User, UserChanges};
use crate::db::schema::{user_profiles, users};

pub type UserWithProfile = (User, Profile);

pub fn list(conn: &mut SqliteConnection) -> QueryResult<Vec<UserWithProfile>> {
    users::table
        .inner_join(user_profiles::table)
        .order(users::id.asc())
        .select((User::as_select(), Profile::as_select()))
        .load(conn)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<UserWithProfile>> {
    users::table
        .inner_join(user_profiles::table)
        .filter(users::id.eq(id))
        .select((User::as_select(), Profile::as_select()))
        .first(conn)
        .optional()
}

pub fn exists(conn: &mut SqliteConnection, id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(users::table.find(id))).get_result(conn)
}

/// Whether a user other than `except` has registered `email`.
pub fn email_taken(
    conn: &mut SqliteConnection,
    email: &str,
    except: Option<i32>,
) -> QueryResult<bool> {
    let holder: Option<i32> = users::table
        .filter(users::email.eq(email))
        .select(users::id)
        .first(conn)
        .optional()?;
    Ok(matches!(holder, Some(id) if Some(id) != except))
}

/// Insert the user and its empty profile row.
pub fn create(conn: &mut SqliteConnection, new_user: &NewUser) -> QueryResult<UserWithProfile> {
    let user = diesel::insert_into(users::table)
        .values(new_user)
        .returning(User::as_returning())
        .get_result(conn)?;
    let profile = diesel::insert_into(user_profiles::table)
        .values(&NewProfile { user_id: user.id })
        .returning(Profile::as_returning())
        .get_result(conn)?;
    Ok((user, profile))
}

pub fn update_user(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &UserChanges,
) -> QueryResult<Option<User>> {
    if changes.is_empty() {
        return users::table
            .find(id)
            .select(User::as_select())
            .first(conn)
            .optional();
    }
    diesel::update(users::table.find(id))
        .set(changes)
        .returning(User::as_returning())
        .get_result(conn)
        .optional()
}

pub fn update_profile(
    conn: &mut SqliteConnection,
    user_id: i32,
    changes: &ProfileChanges,
) -> QueryResult<Profile> {
    if changes.is_empty() {
        return user_profiles::table
            .find(user_id)
            .select(Profile::as_select())
            .first(conn);
    }
    diesel::update(user_profiles::table.find(user_id))
        .set(changes)
        .returning(Profile::as_returning())
        .get_result(conn)
}

pub fn delete(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
    diesel::delete(users::table.find(id)).execute(conn)
}
