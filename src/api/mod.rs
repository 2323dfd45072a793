//! HTTP surface: one collection per entity, each mapped onto the same five
//! verbs by [`configure_resource`].

pub mod company;
pub mod product;
pub mod reference;
pub mod user;

use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::error::{FieldErrors, WebError, WebResult, REQUIRED};
use crate::AppState;

/// A REST collection backed by the database.
///
/// `Create` is the full write shape (POST and PUT), `Update` the partial one
/// (PATCH). Implementations validate their input, check referenced rows and
/// run their writes in one transaction.
pub trait Resource: 'static {
    const NAME: &'static str;

    type View: Serialize;
    type Create: DeserializeOwned + 'static;
    type Update: DeserializeOwned + From<Self::Create> + 'static;

    fn list(state: &AppState) -> WebResult<Vec<Self::View>>;

    fn retrieve(state: &AppState, id: i32) -> WebResult<Option<Self::View>>;

    fn create(state: &AppState, payload: Self::Create) -> WebResult<Self::View>;

    /// `Ok(None)` when no row has `id`.
    fn update(state: &AppState, id: i32, payload: Self::Update) -> WebResult<Option<Self::View>>;

    /// `Ok(false)` when no row has `id`.
    fn delete(state: &AppState, id: i32) -> WebResult<bool>;
}

fn log_rejection<T>(resource: &str, action: &str, result: &WebResult<T>) {
    if let Err(e) = result {
        warn!("Rejected {action} on {resource}: {e}");
    }
}

async fn list<R: Resource>(data: web::Data<AppState>) -> WebResult<HttpResponse> {
    let items = R::list(&data)?;
    debug!("Listed {} {}", items.len(), R::NAME);
    Ok(HttpResponse::Ok().json(items))
}

async fn retrieve<R: Resource>(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> WebResult<HttpResponse> {
    let id = id.into_inner();
    debug!("Retrieving {} {}", R::NAME, id);
    let item = R::retrieve(&data, id)?.ok_or(WebError::NotFound)?;
    Ok(HttpResponse::Ok().json(item))
}

async fn create<R: Resource>(
    data: web::Data<AppState>,
    payload: web::Json<R::Create>,
) -> WebResult<HttpResponse> {
    let result = R::create(&data, payload.into_inner());
    log_rejection(R::NAME, "create", &result);
    let item = result?;
    info!("Created entry in {}", R::NAME);
    Ok(HttpResponse::Created().json(item))
}

async fn replace<R: Resource>(
    data: web::Data<AppState>,
    id: web::Path<i32>,
    payload: web::Json<R::Create>,
) -> WebResult<HttpResponse> {
    let id = id.into_inner();
    let result = R::update(&data, id, R::Update::from(payload.into_inner()));
    log_rejection(R::NAME, "update", &result);
    let item = result?.ok_or(WebError::NotFound)?;
    info!("Replaced {} {}", R::NAME, id);
    Ok(HttpResponse::Ok().json(item))
}

async fn partial_update<R: Resource>(
    data: web::Data<AppState>,
    id: web::Path<i32>,
    payload: web::Json<R::Update>,
) -> WebResult<HttpResponse> {
    let id = id.into_inner();
    let result = R::update(&data, id, payload.into_inner());
    log_rejection(R::NAME, "partial update", &result);
    let item = result?.ok_or(WebError::NotFound)?;
    info!("Updated {} {}", R::NAME, id);
    Ok(HttpResponse::Ok().json(item))
}

async fn destroy<R: Resource>(
    data: web::Data<AppState>,
    id: web::Path<i32>,
) -> WebResult<HttpResponse> {
    let id = id.into_inner();
    let result = R::delete(&data, id);
    log_rejection(R::NAME, "delete", &result);
    if result? {
        info!("Deleted {} {}", R::NAME, id);
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(WebError::NotFound)
    }
}

/// Register list/create on `""` and retrieve/replace/update/delete on `/{id}`.
pub fn configure_resource<R: Resource>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list::<R>))
            .route(web::post().to(create::<R>)),
    )
    .service(
        web::resource("/{id}")
            .route(web::get().to(retrieve::<R>))
            .route(web::put().to(replace::<R>))
            .route(web::patch().to(partial_update::<R>))
            .route(web::delete().to(destroy::<R>)),
    );
}

/// Name of the field serde reported as absent, if that is what went wrong.
fn missing_field(err: &serde_json::Error) -> Option<String> {
    if !err.is_data() {
        return None;
    }
    let message = err.to_string();
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next().map(str::to_string)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    if let JsonPayloadError::Deserialize(inner) = &err {
        if let Some(field) = missing_field(inner) {
            let mut errors = FieldErrors::new();
            errors.add(&field, REQUIRED);
            return errors.into_error().into();
        }
    }
    WebError::Payload(err.to_string()).into()
}

/// Mount every collection at the application root.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(
            web::scope(reference::INDUSTRIES)
                .configure(configure_resource::<reference::Industries>),
        )
        .service(
            web::scope(reference::COUNTRIES).configure(configure_resource::<reference::Countries>),
        )
        .service(web::scope(reference::STATES).configure(configure_resource::<reference::States>))
        .service(
            web::scope(reference::CATEGORIES)
                .configure(configure_resource::<reference::Categories>),
        )
        .service(
            web::scope(reference::USER_TYPES).configure(configure_resource::<reference::UserTypes>),
        )
        .service(
            web::scope(company::ROUTER_PREFIX).configure(configure_resource::<company::Companies>),
        )
        .service(
            web::scope(product::KEYWORDS).configure(configure_resource::<product::Keywords>),
        )
        .service(
            web::scope(product::ATTRIBUTES).configure(configure_resource::<product::Attributes>),
        )
        .service(
            web::scope(product::PRODUCT_ATTRIBUTES)
                .configure(configure_resource::<product::ProductAttributes>),
        )
        .service(
            web::scope(product::PRODUCTS_EXTRA_INFO)
                .configure(configure_resource::<product::ExtraInfos>),
        )
        .service(
            web::scope(product::PRODUCT_LOGISTICS)
                .configure(configure_resource::<product::Logistics>),
        )
        .service(
            web::scope(product::PRODUCTS).configure(configure_resource::<product::Products>),
        )
        .service(web::scope(user::ROUTER_PREFIX).configure(configure_resource::<user::Users>));
}

/// Validate a payload into a field map, so later checks can add to it.
pub(crate) fn field_errors<T: Validate>(payload: &T) -> FieldErrors {
    match payload.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => e.into(),
    }
}

/// Validate each item of a nested list, keying failures by index under `field`.
pub(crate) fn validate_items<T: Validate>(errors: &mut FieldErrors, field: &str, items: &[T]) {
    let mut nested = FieldErrors::new();
    for (index, item) in items.iter().enumerate() {
        nested.nest(&index.to_string(), field_errors(item));
    }
    errors.nest(field, nested);
}

pub(crate) fn does_not_exist(id: i32) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Record a missing-row error under `field` unless `found`.
pub(crate) fn require(errors: &mut FieldErrors, field: &str, id: i32, found: bool) {
    if !found {
        errors.add(field, does_not_exist(id));
    }
}
