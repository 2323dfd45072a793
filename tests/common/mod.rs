#![allow(dead_code)]

use actix_web::dev::ServiceResponse;
use actix_web::test;
use catalog::config::DatabaseSettings;
use catalog::db::connection::{init_pool, run_migrations};
use catalog::db::models::{NewCategory, NewCountry, NewIndustry, NewState, NewUserType};
use catalog::db::repository;
use catalog::AppState;
use serde_json::Value;
use tempfile::TempDir;

/// Ids of the rows every test database starts with.
pub struct Fixtures {
    pub mexico: i32,
    pub canada: i32,
    pub chihuahua: i32,
    pub industry: i32,
    pub tools: i32,
    pub garden: i32,
    pub buyer: i32,
}

pub struct TestDb {
    pub state: AppState,
    pub fixtures: Fixtures,
    _dir: TempDir,
}

/// A migrated SQLite file in a fresh temp directory, seeded with reference data.
pub fn setup() -> TestDb {
    setup_with_pool(2)
}

pub fn setup_with_pool(pool_size: u32) -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let settings = DatabaseSettings {
        url: dir.path().join("catalog.db").to_string_lossy().into_owned(),
        pool_size,
        timeout_seconds: 5,
    };
    let pool = init_pool(&settings).unwrap();
    let mut conn = pool.get().unwrap();
    run_migrations(&mut conn).unwrap();

    let mexico = repository::countries::create(
        &mut conn,
        &NewCountry {
            code: "MX".to_string(),
            name: "Mexico".to_string(),
            phone_code: Some("52".to_string()),
        },
    )
    .unwrap();
    let canada = repository::countries::create(
        &mut conn,
        &NewCountry {
            code: "CA".to_string(),
            name: "Canada".to_string(),
            phone_code: Some("1".to_string()),
        },
    )
    .unwrap();
    let chihuahua = repository::states::create(
        &mut conn,
        &NewState {
            country_id: mexico.id,
            name: "Chihuahua".to_string(),
            code: "CH".to_string(),
        },
    )
    .unwrap();
    let industry = repository::industries::create(
        &mut conn,
        &NewIndustry {
            name: "Manufacturing".to_string(),
        },
    )
    .unwrap();
    let tools = repository::categories::create(
        &mut conn,
        &NewCategory {
            name: "Tools".to_string(),
            status: true,
        },
    )
    .unwrap();
    let garden = repository::categories::create(
        &mut conn,
        &NewCategory {
            name: "Garden".to_string(),
            status: false,
        },
    )
    .unwrap();
    let buyer = repository::user_types::create(
        &mut conn,
        &NewUserType {
            name: "Buyer".to_string(),
        },
    )
    .unwrap();
    drop(conn);

    TestDb {
        // Lowest bcrypt cost keeps user tests fast.
        state: AppState::new(pool, 4),
        fixtures: Fixtures {
            mexico: mexico.id,
            canada: canada.id,
            chihuahua: chihuahua.id,
            industry: industry.id,
            tools: tools.id,
            garden: garden.id,
            buyer: buyer.id,
        },
        _dir: dir,
    }
}

pub async fn body(resp: ServiceResponse) -> Value {
    test::read_body_json(resp).await
}

/// `GET` a path and decode the JSON body.
macro_rules! get_json {
    ($app:expr, $uri:expr) => {{
        let req = actix_web::test::TestRequest::get().uri($uri).to_request();
        let resp = actix_web::test::call_service($app, req).await;
        crate::common::body(resp).await
    }};
}

/// Number of rows a collection endpoint lists.
macro_rules! count {
    ($app:expr, $uri:expr) => {
        get_json!($app, $uri).as_array().map(Vec::len).unwrap_or(0)
    };
}
