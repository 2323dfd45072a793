use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::{field_errors, require, Resource};
use crate::db::repository::{self, company::CompanyWithCategories};
use crate::error::{FieldErrors, WebError, WebResult};
use crate::models::{CompanyPatch, CompanyPayload, CompanyView};
use crate::AppState;

pub const ROUTER_PREFIX: &str = "/companies";

const NAME_TAKEN: &str = "company with this business name already exists.";

pub struct Companies;

struct Refs {
    state: Option<i32>,
    country: Option<i32>,
    phone_country: Option<i32>,
    industry: Option<i32>,
}

/// Validate the referenced rows, nesting address and phone failures.
fn check_refs(
    conn: &mut SqliteConnection,
    errors: &mut FieldErrors,
    refs: Refs,
    categories: Option<&[i32]>,
) -> QueryResult<()> {
    let mut address = FieldErrors::new();
    if let Some(id) = refs.state {
        require(&mut address, "state", id, repository::states::exists(conn, id)?);
    }
    if let Some(id) = refs.country {
        require(&mut address, "country", id, repository::countries::exists(conn, id)?);
    }
    errors.nest("address", address);

    let mut phone = FieldErrors::new();
    if let Some(id) = refs.phone_country {
        require(&mut phone, "country", id, repository::countries::exists(conn, id)?);
    }
    errors.nest("main_phone", phone);

    if let Some(id) = refs.industry {
        require(errors, "industry", id, repository::industries::exists(conn, id)?);
    }
    if let Some(wanted) = categories {
        for id in repository::company::missing_categories(conn, wanted)? {
            require(errors, "product_categories", id, false);
        }
    }
    Ok(())
}

fn check_name(
    conn: &mut SqliteConnection,
    errors: &mut FieldErrors,
    name: &str,
    except: Option<i32>,
) -> QueryResult<()> {
    if repository::company::name_taken(conn, name, except)? {
        errors.add("business_name", NAME_TAKEN);
    }
    Ok(())
}

impl Resource for Companies {
    const NAME: &'static str = "companies";

    type View = CompanyView;
    type Create = CompanyPayload;
    type Update = CompanyPatch;

    fn list(state: &AppState) -> WebResult<Vec<CompanyView>> {
        let mut conn = state.conn()?;
        let rows = repository::company::list(&mut conn)?;
        Ok(rows.into_iter().map(CompanyView::from).collect())
    }

    fn retrieve(state: &AppState, id: i32) -> WebResult<Option<CompanyView>> {
        let mut conn = state.conn()?;
        Ok(repository::company::find(&mut conn, id)?.map(CompanyView::from))
    }

    fn create(state: &AppState, payload: CompanyPayload) -> WebResult<CompanyView> {
        let mut errors = field_errors(&payload);
        errors.nest("address", field_errors(&payload.address));
        errors.nest("main_phone", field_errors(&payload.main_phone));
        let mut conn = state.conn()?;
        conn.immediate_transaction::<_, WebError, _>(|conn| {
            check_name(conn, &mut errors, &payload.business_name, None)?;
            let refs = Refs {
                state: Some(payload.address.state),
                country: Some(payload.address.country),
                phone_country: Some(payload.main_phone.country),
                industry: Some(payload.industry),
            };
            check_refs(conn, &mut errors, refs, Some(&payload.product_categories))?;
            errors.into_result()?;

            let company =
                repository::company::create(conn, &payload.to_new(), &payload.product_categories)?;
            let created: CompanyWithCategories = repository::company::find(conn, company.id)?
                .ok_or(WebError::NotFound)?;
            Ok(created.into())
        })
    }

    fn update(state: &AppState, id: i32, payload: CompanyPatch) -> WebResult<Option<CompanyView>> {
        let mut errors = field_errors(&payload);
        if let Some(address) = &payload.address {
            errors.nest("address", field_errors(address));
        }
        if let Some(phone) = &payload.main_phone {
            errors.nest("main_phone", field_errors(phone));
        }
        let mut conn = state.conn()?;
        conn.immediate_transaction::<_, WebError, _>(|conn| {
            if !repository::company::exists(conn, id)? {
                return Ok(None);
            }
            if let Some(name) = &payload.business_name {
                check_name(conn, &mut errors, name, Some(id))?;
            }
            let address = payload.address.as_ref();
            let phone = payload.main_phone.as_ref();
            let refs = Refs {
                state: address.and_then(|a| a.state),
                country: address.and_then(|a| a.country),
                phone_country: phone.and_then(|p| p.country),
                industry: payload.industry,
            };
            check_refs(conn, &mut errors, refs, payload.product_categories.as_deref())?;
            errors.into_result()?;

            repository::company::update(conn, id, &payload.changes())?;
            if let Some(categories) = &payload.product_categories {
                repository::company::set_categories(conn, id, categories)?;
            }
            Ok(repository::company::find(conn, id)?.map(CompanyView::from))
        })
    }

    fn delete(state: &AppState, id: i32) -> WebResult<bool> {
        let mut conn = state.conn()?;
        Ok(repository::company::delete(&mut conn, id)? > 0)
    }
}
