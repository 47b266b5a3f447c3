//! Per-category bindings of upstream data providers to the shared confirmation engine.

pub mod adapter;
pub mod contact_details;
pub mod payments;
pub mod router;

pub use adapter::{
    AdapterError, ContactDetailsAdapter, ContactDetailsListing, PaymentCategoryAdapter,
    PaymentListing,
};
pub use contact_details::{Address, ContactDetails, ContactDetailsProvider, ContactField};
pub use payments::{Frequency, Payment, PaymentProvider};
pub use router::{category_router, CategoryAdapters};

/// Failure reported by an upstream category data provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid update: {0}")]
    Invalid(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}
