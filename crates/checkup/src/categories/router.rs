use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::adapter::{
    ContactDetailsAdapter, ContactDetailsListing, PaymentCategoryAdapter, PaymentListing,
};
use super::contact_details::{Address, ContactField};
use super::payments::Payment;
use crate::auth::{ApiContext, AuthenticatedCustomer};
use crate::engagement::{ConfirmationOutcome, ScoreCategory};
use crate::error::ApiError;

/// Every tracked category's adapter, ready to be mounted.
#[derive(Clone)]
pub struct CategoryAdapters {
    pub direct_debits: PaymentCategoryAdapter,
    pub standing_orders: PaymentCategoryAdapter,
    pub incomes: PaymentCategoryAdapter,
    pub contact_details: ContactDetailsAdapter,
}

#[derive(Clone)]
pub(crate) struct PaymentRouteState {
    pub(crate) adapter: PaymentCategoryAdapter,
    pub(crate) context: ApiContext,
}

impl FromRef<PaymentRouteState> for ApiContext {
    fn from_ref(state: &PaymentRouteState) -> Self {
        state.context.clone()
    }
}

#[derive(Clone)]
pub(crate) struct ContactRouteState {
    pub(crate) adapter: ContactDetailsAdapter,
    pub(crate) context: ApiContext,
}

impl FromRef<ContactRouteState> for ApiContext {
    fn from_ref(state: &ContactRouteState) -> Self {
        state.context.clone()
    }
}

/// Listing, confirmation and update endpoints for the four tracked categories.
pub fn category_router(adapters: CategoryAdapters, context: ApiContext) -> Router {
    let CategoryAdapters {
        direct_debits,
        standing_orders,
        incomes,
        contact_details,
    } = adapters;

    [direct_debits, standing_orders, incomes]
        .into_iter()
        .fold(Router::new(), |router, adapter| {
            router.merge(payment_routes(adapter, context.clone()))
        })
        .merge(contact_routes(contact_details, context))
}

fn payment_segment(category: ScoreCategory) -> &'static str {
    match category {
        ScoreCategory::DirectDebits => "direct-debits",
        ScoreCategory::StandingOrders => "standing-orders",
        ScoreCategory::Incomes => "incomes",
        ScoreCategory::ContactDetails => "contact-details",
        ScoreCategory::All => "all",
    }
}

fn payment_routes(adapter: PaymentCategoryAdapter, context: ApiContext) -> Router {
    let base = format!("/api/v1/{}", payment_segment(adapter.category()));
    Router::new()
        .route(&base, get(list_payments).put(update_payment))
        .route(&format!("{base}/confirm"), post(confirm_payments))
        .with_state(PaymentRouteState { adapter, context })
}

fn contact_routes(adapter: ContactDetailsAdapter, context: ApiContext) -> Router {
    Router::new()
        .route("/api/v1/contact-details", get(contact_details))
        .route("/api/v1/contact-details/confirm", post(confirm_contact_details))
        .route("/api/v1/contact-details/mobile-number", put(save_mobile_number))
        .route("/api/v1/contact-details/home-number", put(save_home_number))
        .route("/api/v1/contact-details/email-address", put(save_email_address))
        .route("/api/v1/contact-details/address", put(save_address))
        .with_state(ContactRouteState { adapter, context })
}

pub(crate) async fn list_payments(
    State(state): State<PaymentRouteState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<Json<PaymentListing>, ApiError> {
    state
        .adapter
        .list(&customer)
        .map(Json)
        .map_err(|err| state.context.fail(err))
}

pub(crate) async fn confirm_payments(
    State(state): State<PaymentRouteState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<Json<ConfirmationOutcome>, ApiError> {
    state
        .adapter
        .confirm(&customer)
        .map(Json)
        .map_err(|err| state.context.fail(err))
}

pub(crate) async fn update_payment(
    State(state): State<PaymentRouteState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    payload: Result<Json<Payment>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payment) =
        payload.map_err(|err| state.context.fail(ApiError::bad_request(err.body_text())))?;
    state
        .adapter
        .update(&customer, payment)
        .map_err(|err| state.context.fail(err))?;
    Ok(Json(json!({ "ok": true })))
}

pub(crate) async fn contact_details(
    State(state): State<ContactRouteState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<Json<ContactDetailsListing>, ApiError> {
    state
        .adapter
        .details(&customer)
        .map(Json)
        .map_err(|err| state.context.fail(err))
}

pub(crate) async fn confirm_contact_details(
    State(state): State<ContactRouteState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<Json<ConfirmationOutcome>, ApiError> {
    state
        .adapter
        .confirm(&customer)
        .map(Json)
        .map_err(|err| state.context.fail(err))
}

async fn save_mobile_number(
    state: State<ContactRouteState>,
    customer: AuthenticatedCustomer,
    body: String,
) -> Result<Json<Value>, ApiError> {
    save_contact_field(state, customer, ContactField::MobileNumber, body)
}

async fn save_home_number(
    state: State<ContactRouteState>,
    customer: AuthenticatedCustomer,
    body: String,
) -> Result<Json<Value>, ApiError> {
    save_contact_field(state, customer, ContactField::HomeNumber, body)
}

async fn save_email_address(
    state: State<ContactRouteState>,
    customer: AuthenticatedCustomer,
    body: String,
) -> Result<Json<Value>, ApiError> {
    save_contact_field(state, customer, ContactField::EmailAddress, body)
}

fn save_contact_field(
    State(state): State<ContactRouteState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    field: ContactField,
    value: String,
) -> Result<Json<Value>, ApiError> {
    state
        .adapter
        .save_field(&customer, field, &value)
        .map_err(|err| state.context.fail(err))?;
    Ok(Json(json!({ "ok": true })))
}

async fn save_address(
    State(state): State<ContactRouteState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    payload: Result<Json<Address>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(address) =
        payload.map_err(|err| state.context.fail(ApiError::bad_request(err.body_text())))?;
    state
        .adapter
        .save_address(&customer, address)
        .map_err(|err| state.context.fail(err))?;
    Ok(Json(json!({ "ok": true })))
}
