#[macro_use]
mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use actix_web::{http::StatusCode, test, web, App};
use catalog::api::{self, product::Products, Resource};
use catalog::db::repository;
use catalog::models::ProductPayload;
use serde_json::{json, Value};

fn product(fixtures: &common::Fixtures, name: &str, price: i64) -> Value {
    json!({
        "name": name,
        "model": "X-200",
        "brand": "Acme",
        "price": price,
        "made_in": fixtures.mexico,
        "category": fixtures.tools,
        "keywords": [{"name": "power"}, {"name": "drill"}],
        "attributes": [{"name": "Color", "value": "Red"}]
    })
}

#[actix_web::test]
async fn test_create_product_provisions_one_empty_extra() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(product(&db.fixtures, "Drill", 1200))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let created = common::body(resp).await;
    assert_eq!(created["extras"], json!([{"title": "", "description": ""}]));
    assert_eq!(created["logistics"], json!([]));
    assert_eq!(
        created["flags"],
        json!({"extras": true, "logistics": false, "complete": false})
    );
    assert_eq!(created["keywords"], json!(["power", "drill"]));
    assert_eq!(created["attributes"], json!([{"name": "Color", "value": "red"}]));
    assert!(created["last_modification"].is_string());

    let extras = get_json!(&app, "/products_extra_info");
    assert_eq!(extras.as_array().map(Vec::len), Some(1));
    assert_eq!(extras[0]["product"], created["id"]);
}

#[actix_web::test]
async fn test_price_must_be_positive() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    for price in [0, -5] {
        let req = test::TestRequest::post()
            .uri("/products")
            .set_json(product(&db.fixtures, "Drill", price))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let errors = common::body(resp).await;
        assert_eq!(errors["price"][0], "Value must be greater than 0");
    }
    assert_eq!(count!(&app, "/products"), 0);

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(product(&db.fixtures, "Drill", 1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn test_missing_made_in_is_rejected() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let mut payload = product(&db.fixtures, "Drill", 10);
    payload.as_object_mut().unwrap().remove("made_in");
    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors = common::body(resp).await;
    assert_eq!(errors, json!({"made_in": ["This field is required."]}));

    let mut payload = product(&db.fixtures, "Drill", 10);
    payload["made_in"] = json!(999);
    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors = common::body(resp).await;
    assert!(errors["made_in"].is_array());
    assert_eq!(count!(&app, "/products"), 0);
}

#[actix_web::test]
async fn test_logistic_quantity_must_be_positive() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(product(&db.fixtures, "Drill", 10))
        .to_request();
    let created = common::body(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri("/product_logistics")
        .set_json(json!({"product": created["id"], "origin": db.fixtures.mexico, "quantity": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors = common::body(resp).await;
    assert_eq!(errors["quantity"][0], "Value must be greater than 0");

    let req = test::TestRequest::post()
        .uri("/product_logistics")
        .set_json(json!({"product": created["id"], "origin": db.fixtures.mexico, "quantity": 1}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let logistic = common::body(resp).await;
    assert_eq!(logistic["period"], "W");
}

#[actix_web::test]
async fn test_nested_logistic_quantity_is_validated() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let mut payload = product(&db.fixtures, "Drill", 10);
    payload["logistics"] = json!([{"origin": db.fixtures.mexico, "quantity": 0, "period": "M"}]);
    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors = common::body(resp).await;
    assert_eq!(
        errors["logistics"]["0"]["quantity"][0],
        "Value must be greater than 0"
    );
    assert_eq!(count!(&app, "/products"), 0);
    assert_eq!(count!(&app, "/products_extra_info"), 0);
}

#[actix_web::test]
async fn test_keywords_are_shared_between_products() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    for name in ["Drill", "Saw"] {
        let color = if name == "Drill" { "Red" } else { "RED" };
        let mut payload = product(&db.fixtures, name, 10);
        payload["attributes"] = json!([{"name": "Color", "value": color}]);
        let req = test::TestRequest::post()
            .uri("/products")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    assert_eq!(count!(&app, "/keywords"), 2);
    assert_eq!(count!(&app, "/attributes"), 1);
    let values = get_json!(&app, "/product_attributes");
    assert_eq!(values, json!([{"id": values[0]["id"], "name": "Color", "value": "red"}]));

    let req = test::TestRequest::post()
        .uri("/keywords")
        .set_json(json!({"name": "drill"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(count!(&app, "/keywords"), 2);
}

#[actix_web::test]
async fn test_flags_follow_child_rows() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(product(&db.fixtures, "Drill", 10))
        .to_request();
    let created = common::body(test::call_service(&app, req).await).await;
    let uri = format!("/products/{}", created["id"]);
    assert_eq!(created["flags"]["complete"], false);

    let req = test::TestRequest::post()
        .uri("/product_logistics")
        .set_json(json!({"product": created["id"], "origin": db.fixtures.canada, "quantity": 3, "period": "M"}))
        .to_request();
    let logistic = common::body(test::call_service(&app, req).await).await;
    let flags = get_json!(&app, &uri)["flags"].clone();
    assert_eq!(flags, json!({"extras": true, "logistics": true, "complete": true}));

    let extra_id = get_json!(&app, "/products_extra_info")[0]["id"].clone();
    let req = test::TestRequest::delete()
        .uri(&format!("/products_extra_info/{extra_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    let flags = get_json!(&app, &uri)["flags"].clone();
    assert_eq!(flags, json!({"extras": false, "logistics": true, "complete": false}));

    let req = test::TestRequest::delete()
        .uri(&format!("/product_logistics/{}", logistic["id"]))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    let flags = get_json!(&app, &uri)["flags"].clone();
    assert_eq!(flags, json!({"extras": false, "logistics": false, "complete": false}));
}

#[actix_web::test]
async fn test_patch_appends_extras_and_logistics() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(product(&db.fixtures, "Drill", 10))
        .to_request();
    let created = common::body(test::call_service(&app, req).await).await;
    let uri = format!("/products/{}", created["id"]);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({
            "price": 15,
            "extras": [{"title": "Warranty", "description": "Two years"}],
            "logistics": [{"origin": db.fixtures.mexico, "quantity": 40, "period": "Y"}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = common::body(resp).await;
    assert_eq!(updated["price"], 15);
    assert_eq!(updated["name"], "Drill");
    assert_eq!(updated["keywords"], created["keywords"]);
    assert_eq!(
        updated["extras"],
        json!([
            {"title": "", "description": ""},
            {"title": "Warranty", "description": "Two years"}
        ])
    );
    assert_eq!(
        updated["logistics"],
        json!([{"quantity": 40, "period": "Y"}])
    );
    assert_eq!(updated["flags"]["complete"], true);
}

#[actix_web::test]
async fn test_patch_replaces_keywords_when_given() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(product(&db.fixtures, "Drill", 10))
        .to_request();
    let created = common::body(test::call_service(&app, req).await).await;
    let uri = format!("/products/{}", created["id"]);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({"keywords": [{"name": "cordless"}]}))
        .to_request();
    let updated = common::body(test::call_service(&app, req).await).await;
    assert_eq!(updated["keywords"], json!(["cordless"]));
    assert_eq!(updated["attributes"], created["attributes"]);
    assert_eq!(count!(&app, "/keywords"), 3);
}

#[actix_web::test]
async fn test_delete_product() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    for name in ["Drill", "Saw"] {
        let req = test::TestRequest::post()
            .uri("/products")
            .set_json(product(&db.fixtures, name, 10))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::delete().uri("/products/999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(count!(&app, "/products"), 2);

    let first = get_json!(&app, "/products")[0]["id"].clone();
    let req = test::TestRequest::delete()
        .uri(&format!("/products/{first}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(count!(&app, "/products"), 1);
    // Child rows go with the product; shared keywords stay.
    assert_eq!(count!(&app, "/products_extra_info"), 1);
    assert_eq!(count!(&app, "/keywords"), 2);
}

#[actix_web::test]
async fn test_product_attribute_endpoint() {
    let db = common::setup();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.state.clone()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/product_attributes")
        .set_json(json!({"name": "Voltage", "value": "110V"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = common::body(resp).await;
    assert_eq!(created["value"], "110v");

    let uri = format!("/product_attributes/{}", created["id"]);
    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({"value": "220V"}))
        .to_request();
    let updated = common::body(test::call_service(&app, req).await).await;
    assert_eq!(updated["name"], "Voltage");
    assert_eq!(updated["value"], "220v");
}

#[::core::prelude::v1::test]
fn test_concurrent_creates_share_one_keyword() {
    let db = common::setup_with_pool(8);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let state = db.state.clone();
            let barrier = Arc::clone(&barrier);
            let mut body = product(&db.fixtures, &format!("Drill {n}"), 10);
            body["keywords"] = json!([{"name": format!("kw{n}")}, {"name": "shared"}]);
            let payload: ProductPayload = serde_json::from_value(body).unwrap();
            thread::spawn(move || {
                barrier.wait();
                Products::create(&state, payload)
            })
        })
        .collect();
    for handle in handles {
        let created = handle.join().unwrap();
        assert!(created.is_ok(), "{:?}", created.err());
    }

    let mut conn = db.state.conn().unwrap();
    let keywords = repository::keywords::list(&mut conn).unwrap();
    assert_eq!(keywords.iter().filter(|k| k.name == "shared").count(), 1);
    assert_eq!(keywords.len(), 9);
    assert_eq!(repository::product::list(&mut conn).unwrap().len(), 8);
}
