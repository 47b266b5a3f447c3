use checkup::categories::{
    Address, CategoryAdapters, ContactDetails, ContactDetailsAdapter, ContactDetailsProvider,
    Frequency, Payment, PaymentCategoryAdapter, PaymentProvider, ProviderError,
};
use checkup::engagement::{
    BadgeAward, BadgeRepository, Catalog, CategoryHistory, CategoryHistoryRepository, Clock,
    ConfirmationEngine, CustomerId, CustomerScore, LeaderboardRanker, Repositories,
    RepositoryError, ScoreCategory, ScoreRepository,
};
use chrono::{NaiveDate, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

/// Customer seeded with sample payments and contact details.
pub(crate) const DEMO_CUSTOMER: &str = "4006079876";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryScoreRepository {
    records: Arc<Mutex<HashMap<CustomerId, CustomerScore>>>,
}

impl ScoreRepository for InMemoryScoreRepository {
    fn get(&self, customer_id: &CustomerId) -> Result<Option<CustomerScore>, RepositoryError> {
        let guard = self.records.lock().expect("score mutex poisoned");
        Ok(guard.get(customer_id).cloned())
    }

    fn put(&self, score: CustomerScore) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("score mutex poisoned");
        guard.insert(score.customer_id.clone(), score);
        Ok(())
    }

    fn all_totals(&self) -> Result<Vec<i64>, RepositoryError> {
        let guard = self.records.lock().expect("score mutex poisoned");
        Ok(guard.values().map(|record| record.total_score).collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCategoryHistoryRepository {
    records: Arc<Mutex<HashMap<(CustomerId, ScoreCategory), CategoryHistory>>>,
}

impl CategoryHistoryRepository for InMemoryCategoryHistoryRepository {
    fn get(
        &self,
        customer_id: &CustomerId,
        category: ScoreCategory,
    ) -> Result<Option<CategoryHistory>, RepositoryError> {
        let guard = self.records.lock().expect("history mutex poisoned");
        Ok(guard.get(&(customer_id.clone(), category)).cloned())
    }

    fn get_all(&self, customer_id: &CustomerId) -> Result<Vec<CategoryHistory>, RepositoryError> {
        let guard = self.records.lock().expect("history mutex poisoned");
        let mut rows: Vec<CategoryHistory> = guard
            .values()
            .filter(|row| &row.customer_id == customer_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.category);
        Ok(rows)
    }

    fn put(&self, history: CategoryHistory) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("history mutex poisoned");
        guard.insert((history.customer_id.clone(), history.category), history);
        Ok(())
    }
}

/// Awards keyed by customer and badge code; a repeated award keeps the first date.
#[derive(Default, Clone)]
pub(crate) struct InMemoryBadgeRepository {
    awards: Arc<Mutex<Vec<BadgeAward>>>,
}

impl BadgeRepository for InMemoryBadgeRepository {
    fn get(&self, customer_id: &CustomerId) -> Result<Vec<BadgeAward>, RepositoryError> {
        let guard = self.awards.lock().expect("badge mutex poisoned");
        Ok(guard
            .iter()
            .filter(|award| &award.customer_id == customer_id)
            .cloned()
            .collect())
    }

    fn put(&self, award: BadgeAward) -> Result<(), RepositoryError> {
        let mut guard = self.awards.lock().expect("badge mutex poisoned");
        let exists = guard.iter().any(|existing| {
            existing.customer_id == award.customer_id && existing.badge_code == award.badge_code
        });
        if !exists {
            guard.push(award);
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPaymentProvider {
    payments: Arc<Mutex<HashMap<CustomerId, Vec<Payment>>>>,
}

impl InMemoryPaymentProvider {
    pub(crate) fn with_payments(self, customer_id: &str, payments: Vec<Payment>) -> Self {
        self.payments
            .lock()
            .expect("payment mutex poisoned")
            .insert(CustomerId::new(customer_id), payments);
        self
    }
}

impl PaymentProvider for InMemoryPaymentProvider {
    fn list(&self, customer_id: &CustomerId) -> Result<Vec<Payment>, ProviderError> {
        let guard = self.payments.lock().expect("payment mutex poisoned");
        Ok(guard.get(customer_id).cloned().unwrap_or_default())
    }

    fn update(&self, customer_id: &CustomerId, payment: Payment) -> Result<(), ProviderError> {
        let mut guard = self.payments.lock().expect("payment mutex poisoned");
        let slot = guard
            .get_mut(customer_id)
            .and_then(|payments| payments.iter_mut().find(|existing| existing.id == payment.id))
            .ok_or_else(|| ProviderError::NotFound(format!("payment {}", payment.id)))?;
        *slot = payment;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryContactDetailsProvider {
    details: Arc<Mutex<HashMap<CustomerId, ContactDetails>>>,
}

impl InMemoryContactDetailsProvider {
    pub(crate) fn with_details(self, details: ContactDetails) -> Self {
        self.details
            .lock()
            .expect("contact mutex poisoned")
            .insert(details.customer_id.clone(), details);
        self
    }

    fn edit(
        &self,
        customer_id: &CustomerId,
        apply: impl FnOnce(&mut ContactDetails),
    ) -> Result<(), ProviderError> {
        let mut guard = self.details.lock().expect("contact mutex poisoned");
        let details = guard
            .get_mut(customer_id)
            .ok_or_else(|| ProviderError::NotFound(format!("contact details for {customer_id}")))?;
        apply(details);
        Ok(())
    }
}

impl ContactDetailsProvider for InMemoryContactDetailsProvider {
    fn get(&self, customer_id: &CustomerId) -> Result<ContactDetails, ProviderError> {
        let guard = self.details.lock().expect("contact mutex poisoned");
        guard
            .get(customer_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("contact details for {customer_id}")))
    }

    fn save_mobile_number(
        &self,
        customer_id: &CustomerId,
        value: &str,
    ) -> Result<(), ProviderError> {
        self.edit(customer_id, |details| {
            details.mobile_phone_number = value.to_string()
        })
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

/// Engine, ranker and adapters sharing one set of in-memory stores.
#[derive(Clone)]
pub(crate) struct EngagementStack {
    pub(crate) engine: Arc<ConfirmationEngine>,
    pub(crate) ranker: LeaderboardRanker,
    pub(crate) adapters: CategoryAdapters,
}

impl EngagementStack {
    pub(crate) fn in_memory(clock: Arc<dyn Clock>) -> Self {
        let repositories = Repositories::new(
            Arc::new(InMemoryScoreRepository::default()),
            Arc::new(InMemoryCategoryHistoryRepository::default()),
            Arc::new(InMemoryBadgeRepository::default()),
        );
        let engine = Arc::new(ConfirmationEngine::new(
            Arc::new(Catalog::standard()),
            repositories.clone(),
            clock,
        ));
        let ranker = LeaderboardRanker::new(repositories, engine.resolver().clone());

        let payments = |category, seeded: Vec<Payment>| {
            let provider = InMemoryPaymentProvider::default().with_payments(DEMO_CUSTOMER, seeded);
            PaymentCategoryAdapter::new(category, Arc::new(provider), engine.clone())
        };
        let adapters = CategoryAdapters {
            direct_debits: payments(
                ScoreCategory::DirectDebits,
                vec![
                    demo_payment(1, "Northern Water", Frequency::Monthly, 3150),
                    demo_payment(2, "City Council Tax", Frequency::Monthly, 14200),
                ],
            ),
            standing_orders: payments(
                ScoreCategory::StandingOrders,
                vec![demo_payment(3, "Savings Pot", Frequency::Weekly, 2500)],
            ),
            incomes: payments(
                ScoreCategory::Incomes,
                vec![demo_payment(4, "Acme Payroll", Frequency::Monthly, 245000)],
            ),
            contact_details: ContactDetailsAdapter::new(
                Arc::new(InMemoryContactDetailsProvider::default().with_details(demo_contact())),
                engine.clone(),
            ),
        };

        Self {
            engine,
            ranker,
            adapters,
        }
    }
}

fn demo_payment(id: i64, recipient: &str, frequency: Frequency, amount_pence: i64) -> Payment {
    Payment {
        id,
        recipient_id: 1000 + id,
        recipient_name: recipient.to_string(),
        due_date: Utc
            .with_ymd_and_hms(2024, 7, 1, 0, 0, 0)
            .single()
            .unwrap_or_default(),
        frequency,
        amount_pence,
    }
}

fn demo_contact() -> ContactDetails {
    ContactDetails {
        customer_id: CustomerId::new(DEMO_CUSTOMER),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        mobile_phone_number: "07700900456".to_string(),
        home_phone_number: "01632960456".to_string(),
        email_address: "grace@example.com".to_string(),
        home_address: Address {
            house_number: "7".to_string(),
            street_name: "Compiler Close".to_string(),
            town: "Leeds".to_string(),
            post_code: "LS1 4AP".to_string(),
            ..Address::default()
        },
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
