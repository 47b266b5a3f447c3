use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::auth::{issue_token, ApiContext, TokenAuthenticator};
use crate::categories::{
    category_router, Address, CategoryAdapters, ContactDetails, ContactDetailsAdapter,
    ContactDetailsProvider, Frequency, Payment, PaymentCategoryAdapter, PaymentProvider,
    ProviderError,
};
use crate::config::{AppEnvironment, AuthConfig};
use crate::engagement::{
    BadgeAward, BadgeRepository, BadgeTierResolver, Catalog, CategoryHistory,
    CategoryHistoryRepository, ConfirmationEngine, CustomerId, CustomerScore, FixedClock,
    LeaderboardRanker, Repositories, RepositoryError, ScoreCategory, ScoreRepository,
};
use crate::engagement::score_router;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn customer(id: &str) -> CustomerId {
    CustomerId::new(id)
}

pub(super) fn history(
    customer_id: &str,
    category: ScoreCategory,
    last_scored: DateTime<Utc>,
    times_confirmed: u32,
    times_scored: u32,
) -> CategoryHistory {
    CategoryHistory {
        customer_id: customer(customer_id),
        category,
        last_confirmed: last_scored,
        last_scored,
        times_confirmed,
        times_scored,
    }
}

#[derive(Default)]
pub(super) struct MemoryScores {
    records: Mutex<HashMap<CustomerId, CustomerScore>>,
    puts: Mutex<usize>,
}

impl MemoryScores {
    pub(super) fn seed(&self, customer_id: &str, total_score: i64) {
        self.records.lock().expect("scores mutex poisoned").insert(
            customer(customer_id),
            CustomerScore {
                customer_id: customer(customer_id),
                total_score,
            },
        );
    }

    pub(super) fn total(&self, customer_id: &str) -> Option<i64> {
        self.records
            .lock()
            .expect("scores mutex poisoned")
            .get(&customer(customer_id))
            .map(|record| record.total_score)
    }

    pub(super) fn put_count(&self) -> usize {
        *self.puts.lock().expect("scores mutex poisoned")
    }
}

impl ScoreRepository for MemoryScores {
    fn get(&self, customer_id: &CustomerId) -> Result<Option<CustomerScore>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("scores mutex poisoned")
            .get(customer_id)
            .cloned())
    }

    fn put(&self, score: CustomerScore) -> Result<(), RepositoryError> {
        *self.puts.lock().expect("scores mutex poisoned") += 1;
        self.records
            .lock()
            .expect("scores mutex poisoned")
            .insert(score.customer_id.clone(), score);
        Ok(())
    }

    fn all_totals(&self) -> Result<Vec<i64>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("scores mutex poisoned")
            .values()
            .map(|record| record.total_score)
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryHistory {
    records: Mutex<HashMap<(CustomerId, ScoreCategory), CategoryHistory>>,
}

impl MemoryHistory {
    pub(super) fn seed(&self, row: CategoryHistory) {
        self.records
            .lock()
            .expect("history mutex poisoned")
            .insert((row.customer_id.clone(), row.category), row);
    }

    pub(super) fn row(
        &self,
        customer_id: &str,
        category: ScoreCategory,
    ) -> Option<CategoryHistory> {
        self.records
            .lock()
            .expect("history mutex poisoned")
            .get(&(customer(customer_id), category))
            .cloned()
    }
}

impl CategoryHistoryRepository for MemoryHistory {
    fn get(
        &self,
        customer_id: &CustomerId,
        category: ScoreCategory,
    ) -> Result<Option<CategoryHistory>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("history mutex poisoned")
            .get(&(customer_id.clone(), category))
            .cloned())
    }

    fn get_all(&self, customer_id: &CustomerId) -> Result<Vec<CategoryHistory>, RepositoryError> {
        let mut rows: Vec<CategoryHistory> = self
            .records
            .lock()
            .expect("history mutex poisoned")
            .values()
            .filter(|row| &row.customer_id == customer_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.category);
        Ok(rows)
    }

    fn put(&self, history: CategoryHistory) -> Result<(), RepositoryError> {
        self.seed(history);
        Ok(())
    }
}

/// Keeps every write so duplicate awards stay visible.
#[derive(Default)]
pub(super) struct MemoryBadges {
    writes: Mutex<Vec<BadgeAward>>,
}

impl MemoryBadges {
    pub(super) fn seed(&self, customer_id: &str, codes: &[&str]) {
        let mut guard = self.writes.lock().expect("badges mutex poisoned");
        for code in codes {
            guard.push(BadgeAward {
                customer_id: customer(customer_id),
                badge_code: code.to_string(),
                date_awarded: days_ago(90),
            });
        }
    }

    pub(super) fn writes(&self) -> Vec<BadgeAward> {
        self.writes.lock().expect("badges mutex poisoned").clone()
    }

    pub(super) fn codes(&self, customer_id: &str) -> Vec<String> {
        self.writes()
            .into_iter()
            .filter(|award| award.customer_id == customer(customer_id))
            .map(|award| award.badge_code)
            .collect()
    }
}

impl BadgeRepository for MemoryBadges {
    fn get(&self, customer_id: &CustomerId) -> Result<Vec<BadgeAward>, RepositoryError> {
        Ok(self
            .writes()
            .into_iter()
            .filter(|award| &award.customer_id == customer_id)
            .collect())
    }

    fn put(&self, award: BadgeAward) -> Result<(), RepositoryError> {
        self.writes
            .lock()
            .expect("badges mutex poisoned")
            .push(award);
        Ok(())
    }
}

pub(super) struct UnavailableScores;

impl ScoreRepository for UnavailableScores {
    fn get(&self, _customer_id: &CustomerId) -> Result<Option<CustomerScore>, RepositoryError> {
        Err(RepositoryError::Unavailable("score table offline".to_string()))
    }

    fn put(&self, _score: CustomerScore) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("score table offline".to_string()))
    }

    fn all_totals(&self) -> Result<Vec<i64>, RepositoryError> {
        Err(RepositoryError::Unavailable("score table offline".to_string()))
    }
}

/// Totals read from memory, every write fails.
#[derive(Default)]
pub(super) struct WriteFailingScores {
    inner: MemoryScores,
}

impl WriteFailingScores {
    pub(super) fn seed(&self, customer_id: &str, total: i64) {
        self.inner.seed(customer_id, total);
    }
}

impl ScoreRepository for WriteFailingScores {
    fn get(&self, customer_id: &CustomerId) -> Result<Option<CustomerScore>, RepositoryError> {
        self.inner.get(customer_id)
    }

    fn put(&self, _score: CustomerScore) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("score write throttled".to_string()))
    }

    fn all_totals(&self) -> Result<Vec<i64>, RepositoryError> {
        self.inner.all_totals()
    }
}

/// Reads succeed, every write fails.
#[derive(Default)]
pub(super) struct ReadOnlyBadges {
    inner: MemoryBadges,
}

impl BadgeRepository for ReadOnlyBadges {
    fn get(&self, customer_id: &CustomerId) -> Result<Vec<BadgeAward>, RepositoryError> {
        self.inner.get(customer_id)
    }

    fn put(&self, _award: BadgeAward) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("badge table read-only".to_string()))
    }
}

pub(super) struct Harness {
    pub(super) scores: Arc<MemoryScores>,
    pub(super) history: Arc<MemoryHistory>,
    pub(super) badges: Arc<MemoryBadges>,
    pub(super) clock: Arc<FixedClock>,
    pub(super) catalog: Arc<Catalog>,
}

impl Harness {
    pub(super) fn new() -> Self {
        Self {
            scores: Arc::new(MemoryScores::default()),
            history: Arc::new(MemoryHistory::default()),
            badges: Arc::new(MemoryBadges::default()),
            clock: Arc::new(FixedClock::new(now())),
            catalog: Arc::new(Catalog::standard()),
        }
    }

    pub(super) fn repositories(&self) -> Repositories {
        Repositories::new(self.scores.clone(), self.history.clone(), self.badges.clone())
    }

    pub(super) fn engine(&self) -> ConfirmationEngine {
        ConfirmationEngine::new(self.catalog.clone(), self.repositories(), self.clock.clone())
    }

    pub(super) fn resolver(&self) -> BadgeTierResolver {
        BadgeTierResolver::new(self.catalog.clone(), self.history.clone(), self.badges.clone())
    }

    pub(super) fn ranker(&self) -> LeaderboardRanker {
        LeaderboardRanker::new(self.repositories(), self.resolver())
    }
}

pub(super) fn api_context(environment: AppEnvironment) -> ApiContext {
    ApiContext::new(
        Arc::new(TokenAuthenticator::new(&AuthConfig::default())),
        environment,
    )
}

/// Signed `x-auth-token` value for `customer_id`, valid for the next half hour.
pub(super) fn auth_token(customer_id: &str) -> String {
    issue_token(&AuthConfig::default(), &customer(customer_id), Utc::now()).expect("token signs")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json body")
}

pub(super) fn payment(id: i64, recipient: &str, amount_pence: i64) -> Payment {
    Payment {
        id,
        recipient_id: id * 10,
        recipient_name: recipient.to_string(),
        due_date: Utc
            .with_ymd_and_hms(2024, 7, 1, 0, 0, 0)
            .single()
            .expect("valid due date"),
        frequency: Frequency::Monthly,
        amount_pence,
    }
}

#[derive(Default)]
pub(super) struct MemoryPayments {
    payments: Mutex<HashMap<CustomerId, Vec<Payment>>>,
}

impl MemoryPayments {
    pub(super) fn seed(&self, customer_id: &str, payments: Vec<Payment>) {
        self.payments
            .lock()
            .expect("payments mutex poisoned")
            .insert(customer(customer_id), payments);
    }
}

impl PaymentProvider for MemoryPayments {
    fn list(&self, customer_id: &CustomerId) -> Result<Vec<Payment>, ProviderError> {
        Ok(self
            .payments
            .lock()
            .expect("payments mutex poisoned")
            .get(customer_id)
            .cloned()
            .unwrap_or_default())
    }

    fn update(&self, customer_id: &CustomerId, payment: Payment) -> Result<(), ProviderError> {
        let mut guard = self.payments.lock().expect("payments mutex poisoned");
        let existing = guard
            .get_mut(customer_id)
            .and_then(|payments| payments.iter_mut().find(|p| p.id == payment.id))
            .ok_or_else(|| ProviderError::NotFound(format!("payment {}", payment.id)))?;
        *existing = payment;
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryContacts {
    details: Mutex<HashMap<CustomerId, ContactDetails>>,
}

impl MemoryContacts {
    pub(super) fn seed(&self, customer_id: &str) {
        self.details.lock().expect("contacts mutex poisoned").insert(
            customer(customer_id),
            ContactDetails {
                customer_id: customer(customer_id),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                mobile_phone_number: "07700900123".to_string(),
                home_phone_number: "01632960123".to_string(),
                email_address: "ada@example.com".to_string(),
                home_address: Address {
                    house_number: "12".to_string(),
                    street_name: "Analytical Row".to_string(),
                    town: "Manchester".to_string(),
                    post_code: "M1 1AA".to_string(),
                    ..Address::default()
                },
            },
        );
    }

    pub(super) fn stored(&self, customer_id: &str) -> Option<ContactDetails> {
        self.details
            .lock()
            .expect("contacts mutex poisoned")
            .get(&customer(customer_id))
            .cloned()
    }

    fn edit(
        &self,
        customer_id: &CustomerId,
        apply: impl FnOnce(&mut ContactDetails),
    ) -> Result<(), ProviderError> {
        let mut guard = self.details.lock().expect("contacts mutex poisoned");
        let details = guard
            .get_mut(customer_id)
            .ok_or_else(|| ProviderError::NotFound(format!("contact details for {customer_id}")))?;
        apply(details);
        Ok(())
    }
}

impl ContactDetailsProvider for MemoryContacts {
    fn get(&self, customer_id: &CustomerId) -> Result<ContactDetails, ProviderError> {
        self.details
            .lock()
            .expect("contacts mutex poisoned")
            .get(customer_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("contact details for {customer_id}")))
    }

    fn save_mobile_number(
        &self,
        customer_id: &CustomerId,
        value: &str,
    ) -> Result<(), ProviderError> {
        self.edit(customer_id, |details| details.mobile_phone_number = value.to_string())
    }

    fn save_home_number(&self, customer_id: &CustomerId, value: &str) -> Result<(), ProviderError> {
        self.edit(customer_id, |details| details.home_phone_number = value.to_string())
    }

    fn save_email_address(
        &self,
        customer_id: &CustomerId,
        value: &str,
    ) -> Result<(), ProviderError> {
        self.edit(customer_id, |details| details.email_address = value.to_string())
    }

    fn save_address(
        &self,
        customer_id: &CustomerId,
        address: Address,
    ) -> Result<(), ProviderError> {
        self.edit(customer_id, |details| details.home_address = address)
    }
}

pub(super) struct CategoryFixture {
    pub(super) adapters: CategoryAdapters,
    pub(super) direct_debits: Arc<MemoryPayments>,
    pub(super) contacts: Arc<MemoryContacts>,
}

impl Harness {
    pub(super) fn categories(&self) -> CategoryFixture {
        let engine = Arc::new(self.engine());
        let direct_debits = Arc::new(MemoryPayments::default());
        let contacts = Arc::new(MemoryContacts::default());

        let adapters = CategoryAdapters {
            direct_debits: PaymentCategoryAdapter::new(
                ScoreCategory::DirectDebits,
                direct_debits.clone(),
                engine.clone(),
            ),
            standing_orders: PaymentCategoryAdapter::new(
                ScoreCategory::StandingOrders,
                Arc::new(MemoryPayments::default()),
                engine.clone(),
            ),
            incomes: PaymentCategoryAdapter::new(
                ScoreCategory::Incomes,
                Arc::new(MemoryPayments::default()),
                engine.clone(),
            ),
            contact_details: ContactDetailsAdapter::new(contacts.clone(), engine),
        };

        CategoryFixture {
            adapters,
            direct_debits,
            contacts,
        }
    }

    pub(super) fn router(&self, environment: AppEnvironment) -> (Router, CategoryFixture) {
        let fixture = self.categories();
        let context = api_context(environment);
        let router = score_router(self.ranker(), context.clone())
            .merge(category_router(fixture.adapters.clone(), context));
        (router, fixture)
    }
}
