#[macro_use]
mod common;

use actix_web::{http::StatusCode, test, web, App};
use catalog::api;
use serde_json::{json, Value};

fn company(fixtures: &common::Fixtures, business_name: &str) -> Value {
    json!({
        "business_name": business_name,
        "website": "https://lnphi.example.com",
        "industry": fixtures.industry,
        "product_categories": [fixtures.tools, fixtures.garden],
        "address": {
            "street": "Av. Tecnologico",
            "num_ext": "1340",
            "zip_code": "31000",
            "state": fixtures.chihuahua,
            "country": fixtures.mexico
        },
        "main_phone": {
            "number": "6141234567",
            "name": "Front desk",
            "extension": "101",
            "country": fixtures.mexico
        }
    })
}

#[actix_web::test]
async fn test_create_company() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(company(&db.fixtures, "Lnphi"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let created = common::body(resp).await;
    assert_eq!(created["business_name"], "Lnphi");
    assert_eq!(created["address"]["zip_code"], "31000");
    assert_eq!(created["address"]["state"], db.fixtures.chihuahua);
    assert_eq!(created["main_phone"]["extension"], "101");
    assert_eq!(
        created["product_categories"],
        json!([db.fixtures.tools, db.fixtures.garden])
    );
    assert!(created.get("street").is_none());

    let uri = format!("/companies/{}", created["id"]);
    let fetched = get_json!(&app, &uri);
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn test_duplicate_business_name_is_rejected() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(company(&db.fixtures, "Lnphi"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(company(&db.fixtures, "Lnphi"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors = common::body(resp).await;
    assert_eq!(
        errors["business_name"][0],
        "company with this business name already exists."
    );
    assert_eq!(count!(&app, "/companies"), 1);
}

#[actix_web::test]
async fn test_malformed_website_is_rejected() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let mut payload = company(&db.fixtures, "Lnphi");
    payload["website"] = json!("lnphi123");
    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors = common::body(resp).await;
    assert_eq!(errors["website"][0], "Enter a valid URL.");
    assert_eq!(count!(&app, "/companies"), 0);
}

#[actix_web::test]
async fn test_unknown_references_are_rejected() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let cases: [(&str, fn(&mut Value)); 5] = [
        ("country", |p: &mut Value| p["address"]["country"] = json!(999)),
        ("state", |p: &mut Value| p["address"]["state"] = json!(999)),
        ("main_phone", |p: &mut Value| p["main_phone"]["country"] = json!(999)),
        ("industry", |p: &mut Value| p["industry"] = json!(999)),
        ("product_categories", |p: &mut Value| {
            p["product_categories"] = json!([999])
        }),
    ];
    for (field, edit) in cases {
        let mut payload = company(&db.fixtures, "Lnphi");
        edit(&mut payload);
        let req = test::TestRequest::post()
            .uri("/companies")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "unknown {field}");
    }
    assert_eq!(count!(&app, "/companies"), 0);
}

#[actix_web::test]
async fn test_unknown_state_is_reported_under_address() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let mut payload = company(&db.fixtures, "Lnphi");
    payload["address"]["state"] = json!(999);
    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors = common::body(resp).await;
    assert_eq!(
        errors["address"]["state"][0],
        "Invalid pk \"999\" - object does not exist."
    );
}

#[actix_web::test]
async fn test_flattened_address_is_rejected() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let mut payload = company(&db.fixtures, "Lnphi");
    let address = payload["address"].take();
    let map = payload.as_object_mut().unwrap();
    map.remove("address");
    for (key, value) in address.as_object().unwrap() {
        map.insert(key.clone(), value.clone());
    }
    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors = common::body(resp).await;
    assert_eq!(errors["address"], json!(["This field is required."]));
    assert_eq!(count!(&app, "/companies"), 0);
}

#[actix_web::test]
async fn test_patch_company_partially() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(company(&db.fixtures, "Lnphi"))
        .to_request();
    let created = common::body(test::call_service(&app, req).await).await;
    let uri = format!("/companies/{}", created["id"]);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({
            "address": {"zip_code": "31100"},
            "product_categories": [db.fixtures.tools]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = common::body(resp).await;
    assert_eq!(updated["address"]["zip_code"], "31100");
    assert_eq!(updated["address"]["street"], "Av. Tecnologico");
    assert_eq!(updated["business_name"], "Lnphi");
    assert_eq!(updated["product_categories"], json!([db.fixtures.tools]));
}

#[actix_web::test]
async fn test_invalid_update_leaves_company_untouched() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(company(&db.fixtures, "Lnphi"))
        .to_request();
    let created = common::body(test::call_service(&app, req).await).await;
    let uri = format!("/companies/{}", created["id"]);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({"business_name": "Renamed", "website": "not a url"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let fetched = get_json!(&app, &uri);
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn test_put_replaces_company() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(company(&db.fixtures, "Lnphi"))
        .to_request();
    let created = common::body(test::call_service(&app, req).await).await;
    let uri = format!("/companies/{}", created["id"]);

    // Keeping its own name is not a conflict.
    let mut payload = company(&db.fixtures, "Lnphi");
    payload["main_phone"]["country"] = json!(db.fixtures.canada);
    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = common::body(resp).await;
    assert_eq!(updated["main_phone"]["country"], db.fixtures.canada);
}

#[actix_web::test]
async fn test_delete_company() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    for name in ["Lnphi", "Acme"] {
        let req = test::TestRequest::post()
            .uri("/companies")
            .set_json(company(&db.fixtures, name))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    assert_eq!(count!(&app, "/companies"), 2);

    let req = test::TestRequest::delete().uri("/companies/999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(count!(&app, "/companies"), 2);

    let first = get_json!(&app, "/companies")[0]["id"].clone();
    let req = test::TestRequest::delete()
        .uri(&format!("/companies/{first}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(count!(&app, "/companies"), 1);
}
