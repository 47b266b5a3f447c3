use serde::{Deserialize, Serialize};

use super::ProviderError;
use crate::engagement::CustomerId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    #[serde(rename = "customerCIF")]
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub mobile_phone_number: String,
    pub home_phone_number: String,
    pub email_address: String,
    pub home_address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub flat_number: String,
    pub house_name: String,
    pub house_number: String,
    pub street_name: String,
    pub district: String,
    pub town: String,
    pub county: String,
    pub post_code: String,
}

/// Single-value contact fields that are updated from a raw text body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    MobileNumber,
    HomeNumber,
    EmailAddress,
}

impl ContactField {
    pub fn label(self) -> &'static str {
        match self {
            Self::MobileNumber => "mobile number",
            Self::HomeNumber => "home number",
            Self::EmailAddress => "email address",
        }
    }
}

/// Upstream source of a customer's contact details.
pub trait ContactDetailsProvider: Send + Sync {
    fn get(&self, customer_id: &CustomerId) -> Result<ContactDetails, ProviderError>;
    fn save_mobile_number(&self, customer_id: &CustomerId, value: &str)
        -> Result<(), ProviderError>;
    fn save_home_number(&self, customer_id: &CustomerId, value: &str) -> Result<(), ProviderError>;
    fn save_email_address(&self, customer_id: &CustomerId, value: &str)
        -> Result<(), ProviderError>;
    fn save_address(&self, customer_id: &CustomerId, address: Address)
        -> Result<(), ProviderError>;
}
