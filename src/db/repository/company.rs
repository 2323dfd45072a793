use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::models::{Changes, Company, CompanyCategory, CompanyChanges, NewCompany};
use crate::db::schema::{categories, companies, companies_product_categories};

/// A company row with the ids of its product categories.
pub type CompanyWithCategories = (Company, Vec<i32>);

fn attach_categories(
    conn: &mut SqliteConnection,
    rows: Vec<Company>,
) -> QueryResult<Vec<CompanyWithCategories>> {
    let links = CompanyCategory::belonging_to(&rows)
        .select(CompanyCategory::as_select())
        .order(companies_product_categories::category_id.asc())
        .load(conn)?;
    Ok(links
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(links, company)| {
            let ids = links.into_iter().map(|l| l.category_id).collect();
            (company, ids)
        })
        .collect())
}

pub fn list(conn: &mut SqliteConnection) -> QueryResult<Vec<CompanyWithCategories>> {
    let rows = companies::table
        .order(companies::id.asc())
        .select(Company::as_select())
        .load(conn)?;
    attach_categories(conn, rows)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<CompanyWithCategories>> {
    let row = companies::table
        .find(id)
        .select(Company::as_select())
        .first(conn)
        .optional()?;
    match row {
        Some(company) => Ok(attach_categories(conn, vec![company])?.pop()),
        None => Ok(None),
    }
}

pub fn exists(conn: &mut SqliteConnection, id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(companies::table.find(id))).get_result(conn)
}

/// Whether another company already uses `business_name`.
pub fn name_taken(
    conn: &mut SqliteConnection,
    business_name: &str,
    except: Option<i32>,
) -> QueryResult<bool> {
    let holder: Option<i32> = companies::table
        .filter(companies::business_name.eq(business_name))
        .select(companies::id)
        .first(conn)
        .optional()?;
    Ok(matches!(holder, Some(id) if Some(id) != except))
}

/// Category ids from `wanted` with no matching row, in request order.
pub fn missing_categories(conn: &mut SqliteConnection, wanted: &[i32]) -> QueryResult<Vec<i32>> {
    let found: Vec<i32> = categories::table
        .filter(categories::id.eq_any(wanted))
        .select(categories::id)
        .load(conn)?;
    Ok(wanted
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect())
}

pub fn create(
    conn: &mut SqliteConnection,
    new_company: &NewCompany,
    category_ids: &[i32],
) -> QueryResult<Company> {
    let company = diesel::insert_into(companies::table)
        .values(new_company)
        .returning(Company::as_returning())
        .get_result(conn)?;
    set_categories(conn, company.id, category_ids)?;
    Ok(company)
}

pub fn update(
    conn: &mut SqliteConnection,
    id: i32,
    changes: &CompanyChanges,
) -> QueryResult<Option<Company>> {
    if changes.is_empty() {
        return companies::table
            .find(id)
            .select(Company::as_select())
            .first(conn)
            .optional();
    }
    diesel::update(companies::table.find(id))
        .set(changes)
        .returning(Company::as_returning())
        .get_result(conn)
        .optional()
}

/// Replace the category set of a company.
pub fn set_categories(
    conn: &mut SqliteConnection,
    company_id: i32,
    category_ids: &[i32],
) -> QueryResult<()> {
    diesel::delete(
        companies_product_categories::table
            .filter(companies_product_categories::company_id.eq(company_id)),
    )
    .execute(conn)?;
    let mut links: Vec<CompanyCategory> = category_ids
        .iter()
        .map(|&category_id| CompanyCategory {
            company_id,
            category_id,
        })
        .collect();
    links.sort_by_key(|l| l.category_id);
    links.dedup();
    if !links.is_empty() {
        diesel::insert_into(companies_product_categories::table)
            .values(&links)
            .execute(conn)?;
    }
    Ok(())
}

pub fn delete(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
    diesel::delete(companies::table.find(id)).execute(conn)
}
