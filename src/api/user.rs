use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::{field_errors, require, Resource};
use crate::db::models::{NewUser, ProfileChanges, UserChanges};
use crate::db::repository;
use crate::error::{FieldErrors, WebError, WebResult};
use crate::models::{UserPatch, UserPayload, UserView, PASSWORD_MISMATCH};
use crate::AppState;

pub const ROUTER_PREFIX: &str = "/users";

const EMAIL_TAKEN: &str = "Email address already exists.";

pub struct Users;

fn check_refs(
    conn: &mut SqliteConnection,
    errors: &mut FieldErrors,
    phone_country: Option<i32>,
    user_type: Option<i32>,
) -> QueryResult<()> {
    if let Some(id) = phone_country {
        require(errors, "phone_country", id, repository::countries::exists(conn, id)?);
    }
    if let Some(id) = user_type {
        require(errors, "user_type", id, repository::user_types::exists(conn, id)?);
    }
    Ok(())
}

fn check_email(
    conn: &mut SqliteConnection,
    errors: &mut FieldErrors,
    email: &str,
    except: Option<i32>,
) -> QueryResult<()> {
    if repository::user::email_taken(conn, email, except)? {
        errors.add("email", EMAIL_TAKEN);
    }
    Ok(())
}

impl Resource for Users {
    const NAME: &'static str = "users";

    type View = UserView;
    type Create = UserPayload;
    type Update = UserPatch;

    fn list(state: &AppState) -> WebResult<Vec<UserView>> {
        let mut conn = state.conn()?;
        let rows = repository::user::list(&mut conn)?;
        Ok(rows.into_iter().map(UserView::from).collect())
    }

    fn retrieve(state: &AppState, id: i32) -> WebResult<Option<UserView>> {
        let mut conn = state.conn()?;
        Ok(repository::user::find(&mut conn, id)?.map(UserView::from))
    }

    /// Insert the user under its email as username, then fill the profile
    /// row created with it.
    fn create(state: &AppState, payload: UserPayload) -> WebResult<UserView> {
        let mut errors = field_errors(&payload);
        if payload.password != payload.password_confirmation {
            errors.add("password", PASSWORD_MISMATCH);
        }
        let mut conn = state.conn()?;
        conn.immediate_transaction::<_, WebError, _>(|conn| {
            check_email(conn, &mut errors, &payload.email, None)?;
            check_refs(conn, &mut errors, payload.phone_country, payload.user_type)?;
            errors.into_result()?;

            let password = bcrypt::hash(&payload.password, state.bcrypt_cost)?;
            let (user, _) = repository::user::create(
                conn,
                &NewUser {
                    username: payload.email.clone(),
                    first_name: payload.first_name.clone(),
                    last_name: payload.last_name.clone(),
                    email: payload.email.clone(),
                    password,
                },
            )?;
            let profile = repository::user::update_profile(
                conn,
                user.id,
                &ProfileChanges {
                    role: Some(payload.role.clone()),
                    phone: Some(payload.phone.clone()),
                    phone_country_id: Some(payload.phone_country),
                    user_type_id: Some(payload.user_type),
                },
            )?;
            Ok(UserView::from((user, profile)))
        })
    }

    fn update(state: &AppState, id: i32, payload: UserPatch) -> WebResult<Option<UserView>> {
        let mut errors = field_errors(&payload);
        if !payload.password_confirmed() {
            errors.add("password", PASSWORD_MISMATCH);
        }
        let mut conn = state.conn()?;
        conn.immediate_transaction::<_, WebError, _>(|conn| {
            if !repository::user::exists(conn, id)? {
                return Ok(None);
            }
            if let Some(email) = &payload.email {
                check_email(conn, &mut errors, email, Some(id))?;
            }
            check_refs(
                conn,
                &mut errors,
                payload.phone_country.flatten(),
                payload.user_type.flatten(),
            )?;
            errors.into_result()?;

            let password = payload
                .password
                .as_ref()
                .map(|p| bcrypt::hash(p, state.bcrypt_cost))
                .transpose()?;
            let changes = UserChanges {
                username: payload.email.clone(),
                first_name: payload.first_name.clone(),
                last_name: payload.last_name.clone(),
                email: payload.email.clone(),
                password,
            };
            repository::user::update_user(conn, id, &changes)?;
            repository::user::update_profile(conn, id, &payload.profile_changes())?;
            Ok(repository::user::find(conn, id)?.map(UserView::from))
        })
    }

    fn delete(state: &AppState, id: i32) -> WebResult<bool> {
        let mut conn = state.conn()?;
        Ok(repository::user::delete(&mut conn, id)? > 0)
    }
}
