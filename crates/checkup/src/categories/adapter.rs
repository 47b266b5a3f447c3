use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::contact_details::{Address, ContactDetails, ContactDetailsProvider, ContactField};
use super::payments::{Payment, PaymentProvider};
use super::ProviderError;
use crate::engagement::{
    BadgeType, CategoryStatus, ConfirmationEngine, ConfirmationOutcome, CustomerId,
    EngagementError, ScoreCategory,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Engagement(#[from] EngagementError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentListing {
    pub payments: Vec<Payment>,
    pub last_confirmed: DateTime<Utc>,
    pub last_scored: DateTime<Utc>,
    pub badges: Vec<BadgeType>,
}

/// Direct debits, standing orders or incomes bound to the confirmation engine.
#[derive(Clone)]
pub struct PaymentCategoryAdapter {
    category: ScoreCategory,
    provider: Arc<dyn PaymentProvider>,
    engine: Arc<ConfirmationEngine>,
}

impl PaymentCategoryAdapter {
    pub fn new(
        category: ScoreCategory,
        provider: Arc<dyn PaymentProvider>,
        engine: Arc<ConfirmationEngine>,
    ) -> Self {
        Self {
            category,
            provider,
            engine,
        }
    }

    pub fn category(&self) -> ScoreCategory {
        self.category
    }

    pub fn list(&self, customer_id: &CustomerId) -> Result<PaymentListing, AdapterError> {
        let payments = self.provider.list(customer_id)?;
        let CategoryStatus {
            last_confirmed,
            last_scored,
            badges,
        } = self.engine.category_status(customer_id, self.category)?;

        Ok(PaymentListing {
            payments,
            last_confirmed,
            last_scored,
            badges,
        })
    }

    pub fn confirm(&self, customer_id: &CustomerId) -> Result<ConfirmationOutcome, AdapterError> {
        Ok(self.engine.confirm_category(customer_id, self.category)?)
    }

    /// Pass an edited payment through to the provider. Never scores.
    pub fn update(&self, customer_id: &CustomerId, payment: Payment) -> Result<(), AdapterError> {
        let payment_id = payment.id;
        self.provider.update(customer_id, payment)?;
        info!(customer = %customer_id, category = %self.category, payment_id, "payment updated");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetailsListing {
    pub contact_details: ContactDetails,
    pub last_confirmed: DateTime<Utc>,
    pub last_scored: DateTime<Utc>,
    pub badges: Vec<BadgeType>,
}

#[derive(Clone)]
pub struct ContactDetailsAdapter {
    provider: Arc<dyn ContactDetailsProvider>,
    engine: Arc<ConfirmationEngine>,
}

impl ContactDetailsAdapter {
    pub fn new(provider: Arc<dyn ContactDetailsProvider>, engine: Arc<ConfirmationEngine>) -> Self {
        Self { provider, engine }
    }

    pub fn details(&self, customer_id: &CustomerId) -> Result<ContactDetailsListing, AdapterError> {
        let contact_details = self.provider.get(customer_id)?;
        let CategoryStatus {
            last_confirmed,
            last_scored,
            badges,
        } = self
            .engine
            .category_status(customer_id, ScoreCategory::ContactDetails)?;

        Ok(ContactDetailsListing {
            contact_details,
            last_confirmed,
            last_scored,
            badges,
        })
    }

    pub fn confirm(&self, customer_id: &CustomerId) -> Result<ConfirmationOutcome, AdapterError> {
        Ok(self
            .engine
            .confirm_category(customer_id, ScoreCategory::ContactDetails)?)
    }

    pub fn save_field(
        &self,
        customer_id: &CustomerId,
        field: ContactField,
        value: &str,
    ) -> Result<(), AdapterError> {
        let value = value.trim();
        if value.is_empty() {
            let message = format!("{} must not be empty", field.label());
            return Err(ProviderError::Invalid(message).into());
        }

        match field {
            ContactField::MobileNumber => self.provider.save_mobile_number(customer_id, value)?,
            ContactField::HomeNumber => self.provider.save_home_number(customer_id, value)?,
            ContactField::EmailAddress => self.provider.save_email_address(customer_id, value)?,
        }
        info!(customer = %customer_id, field = field.label(), "contact detail updated");
        Ok(())
    }

    pub fn save_address(
        &self,
        customer_id: &CustomerId,
        address: Address,
    ) -> Result<(), AdapterError> {
        self.provider.save_address(customer_id, address)?;
        info!(customer = %customer_id, "home address updated");
        Ok(())
    }
}
