use super::names::*;
use super::records::*;
use crate::types::{Identity, Role, Session, SessionUser};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Seconds from the Unix epoch to 2024-01-01T00:00:00Z; generated dates are offsets from it
const FIXTURE_EPOCH_SECS: i64 = 1_704_067_200;

/// Seed used by [`FixtureFactory::default`]
pub const DEFAULT_SEED: u64 = 42;

fn fixture_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default() + Duration::seconds(FIXTURE_EPOCH_SECS)
}

/// Build the simulated session for an identity.
///
/// Sessions are derived from the identity alone so repeated matrix runs see the
/// same user.
pub fn session_for(identity: &Identity) -> Session {
    let role = identity.role.as_str().to_ascii_lowercase();
    Session {
        user: SessionUser {
            id: format!("user-{}-{}", role, identity.tenant_id),
            email: format!("{}@{}.test", role, identity.tenant_id),
            name: format!("Test {}", identity.role.as_str()),
            role: identity.role,
            tenant_id: identity.tenant_id.clone(),
        },
        expires: fixture_epoch() + Duration::days(3650),
    }
}

/// Generator of synthetic domain records.
///
/// All entropy comes from one seeded generator, so a factory reset to the same
/// seed replays the same records.
#[derive(Debug, Clone)]
pub struct FixtureFactory {
    rng: StdRng,
    invoice_sequence: u32,
}

impl Default for FixtureFactory {
    fn default() -> Self {
        Self::seeded(DEFAULT_SEED)
    }
}

impl FixtureFactory {
    /// Factory seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            invoice_sequence: 0,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            invoice_sequence: 0,
        }
    }

    /// Reseed the generator; call at the start of any test needing reproducible data
    pub fn reset_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.invoice_sequence = 0;
    }

    pub fn session(&self, role: Role, tenant_id: &str) -> Session {
        session_for(&Identity::new(role, tenant_id))
    }

    // --- entropy helpers -------------------------------------------------

    fn uuid(&mut self) -> Uuid {
        uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid()
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.gen_range(0..items.len())]
    }

    fn money(&mut self, min_cents: u64, max_cents: u64) -> f64 {
        self.rng.gen_range(min_cents..max_cents) as f64 / 100.0
    }

    fn timestamp_within_days(&mut self, days: i64) -> DateTime<Utc> {
        fixture_epoch() + Duration::seconds(self.rng.gen_range(0..days * 86_400))
    }

    fn date_within_days(&mut self, days: i64) -> NaiveDate {
        self.timestamp_within_days(days).date_naive()
    }

    fn person_name(&mut self) -> (String, String) {
        (
            self.pick(FIRST_NAMES).to_string(),
            self.pick(LAST_NAMES).to_string(),
        )
    }

    fn email(&mut self, first: &str, last: &str) -> String {
        let n: u16 = self.rng.gen_range(1..1000);
        let domain = self.pick(EMAIL_DOMAINS);
        format!(
            "{}.{}{}@{}",
            first.to_ascii_lowercase(),
            last.to_ascii_lowercase(),
            n,
            domain
        )
    }

    fn company_name(&mut self) -> String {
        format!("{} {}", self.pick(COMPANY_PREFIXES), self.pick(COMPANY_SUFFIXES))
    }

    // --- base records ----------------------------------------------------

    pub fn tenant(&mut self, patch: TenantPatch) -> Tenant {
        let name = self.company_name();
        let slug = format!(
            "{}-{}",
            name.to_ascii_lowercase().replace(' ', "-"),
            self.rng.gen_range(100..1000)
        );
        let mut tenant = Tenant {
            id: self.uuid(),
            domain: format!("{}.example.com", slug),
            name,
            slug,
            plan: self.pick(&[Plan::Starter, Plan::Professional]),
            created_at: self.timestamp_within_days(365),
        };
        patch.apply_to(&mut tenant);
        tenant
    }

    pub fn user(&mut self, patch: UserPatch) -> User {
        let (first, last) = self.person_name();
        let mut user = User {
            id: self.uuid(),
            tenant_id: self.uuid(),
            email: self.email(&first, &last),
            name: format!("{} {}", first, last),
            role: self.pick(&[Role::Manager, Role::User, Role::Viewer]),
            active: true,
            created_at: self.timestamp_within_days(365),
        };
        patch.apply_to(&mut user);
        user
    }

    pub fn customer(&mut self, patch: CustomerPatch) -> Customer {
        let (first, last) = self.person_name();
        let phone = format!("+1-555-{:04}", self.rng.gen_range(0..10_000));
        let mut customer = Customer {
            id: self.uuid(),
            tenant_id: self.uuid(),
            email: self.email(&first, &last),
            name: format!("{} {}", first, last),
            phone: Some(phone),
            company: Some(self.company_name()),
            status: self.pick(&[CustomerStatus::Lead, CustomerStatus::Active]),
            lifetime_value: self.money(0, 5_000_000),
            created_at: self.timestamp_within_days(365),
        };
        patch.apply_to(&mut customer);
        customer
    }

    pub fn deal(&mut self, patch: DealPatch) -> Deal {
        let stage = self.pick(&[
            DealStage::Lead,
            DealStage::Qualified,
            DealStage::Proposal,
            DealStage::Negotiation,
        ]);
        let probability = match stage {
            DealStage::Lead => 10,
            DealStage::Qualified => 30,
            DealStage::Proposal => 50,
            DealStage::Negotiation => 75,
            DealStage::Won => 100,
            DealStage::Lost => 0,
        };
        let mut deal = Deal {
            id: self.uuid(),
            tenant_id: self.uuid(),
            customer_id: self.uuid(),
            title: format!("{} - {}", self.pick(DEAL_TOPICS), self.pick(COMPANY_PREFIXES)),
            value: self.money(100_000, 25_000_000),
            stage,
            probability,
            owner_id: Some(self.uuid()),
            expected_close_date: self.date_within_days(540),
            created_at: self.timestamp_within_days(365),
        };
        patch.apply_to(&mut deal);
        deal
    }

    pub fn invoice(&mut self, patch: InvoicePatch) -> Invoice {
        self.invoice_sequence += 1;
        let amount = self.money(5_000, 2_000_000);
        let tax = (amount * 0.2 * 100.0).round() / 100.0;
        let issued_on = self.date_within_days(365);
        let mut invoice = Invoice {
            id: self.uuid(),
            tenant_id: self.uuid(),
            customer_id: self.uuid(),
            number: format!("INV-2024-{:05}", self.invoice_sequence),
            amount,
            tax,
            total: ((amount + tax) * 100.0).round() / 100.0,
            currency: "USD".to_string(),
            status: self.pick(&[InvoiceStatus::Draft, InvoiceStatus::Sent]),
            issued_on,
            due_on: issued_on + Duration::days(30),
            paid_on: None,
        };
        patch.apply_to(&mut invoice);
        invoice
    }

    pub fn employee(&mut self, patch: EmployeePatch) -> Employee {
        let (first, last) = self.person_name();
        let mut employee = Employee {
            id: self.uuid(),
            tenant_id: self.uuid(),
            email: self.email(&first, &last),
            first_name: first,
            last_name: last,
            department: self.pick(DEPARTMENTS).to_string(),
            position: self.pick(POSITIONS).to_string(),
            salary: self.money(3_500_000, 18_000_000),
            manager_id: Some(self.uuid()),
            hire_date: self.date_within_days(3650),
            active: true,
        };
        patch.apply_to(&mut employee);
        employee
    }

    pub fn alert(&mut self, patch: AlertPatch) -> Alert {
        let title = self.pick(ALERT_TITLES);
        let source = self.pick(ALERT_SOURCES);
        let mut alert = Alert {
            id: self.uuid(),
            tenant_id: self.uuid(),
            severity: self.pick(&[AlertSeverity::Info, AlertSeverity::Warning]),
            title: title.to_string(),
            message: format!("{} reported by {}", title, source),
            source: source.to_string(),
            acknowledged: false,
            created_at: self.timestamp_within_days(30),
        };
        patch.apply_to(&mut alert);
        alert
    }

    pub fn ai_analysis(&mut self, patch: AiAnalysisPatch) -> AiAnalysis {
        let symbol = self.pick(TICKERS);
        let sentiment = self.pick(&[Sentiment::Bullish, Sentiment::Neutral, Sentiment::Bearish]);
        let recommendation = match sentiment {
            Sentiment::Bullish => Recommendation::Buy,
            Sentiment::Neutral => Recommendation::Hold,
            Sentiment::Bearish => Recommendation::Sell,
        };
        let mut analysis = AiAnalysis {
            id: self.uuid(),
            tenant_id: self.uuid(),
            symbol: symbol.to_string(),
            model: self.pick(ANALYSIS_MODELS).to_string(),
            summary: format!("{:?} outlook for {} over the next quarter", sentiment, symbol),
            sentiment,
            confidence: f64::from(self.rng.gen_range(50u32..100)) / 100.0,
            recommendation,
            created_at: self.timestamp_within_days(30),
        };
        patch.apply_to(&mut analysis);
        analysis
    }

    // --- variants: base record, then fixed fields, then the caller's patch ---

    pub fn admin_user(&mut self, patch: UserPatch) -> User {
        let variant = UserPatch {
            role: Some(Role::Admin),
            ..Default::default()
        };
        self.user(variant.merge(patch))
    }

    pub fn won_deal(&mut self, patch: DealPatch) -> Deal {
        let variant = DealPatch {
            stage: Some(DealStage::Won),
            probability: Some(100),
            ..Default::default()
        };
        self.deal(variant.merge(patch))
    }

    pub fn lost_deal(&mut self, patch: DealPatch) -> Deal {
        let variant = DealPatch {
            stage: Some(DealStage::Lost),
            probability: Some(0),
            ..Default::default()
        };
        self.deal(variant.merge(patch))
    }

    pub fn paid_invoice(&mut self, patch: InvoicePatch) -> Invoice {
        let mut invoice = self.invoice(InvoicePatch::default());
        InvoicePatch {
            status: Some(InvoiceStatus::Paid),
            paid_on: Some(Some(invoice.due_on - Duration::days(5))),
            ..Default::default()
        }
        .apply_to(&mut invoice);
        patch.apply_to(&mut invoice);
        invoice
    }

    pub fn overdue_invoice(&mut self, patch: InvoicePatch) -> Invoice {
        let variant = InvoicePatch {
            status: Some(InvoiceStatus::Overdue),
            paid_on: Some(None),
            ..Default::default()
        };
        self.invoice(variant.merge(patch))
    }

    pub fn critical_alert(&mut self, patch: AlertPatch) -> Alert {
        let variant = AlertPatch {
            severity: Some(AlertSeverity::Critical),
            acknowledged: Some(false),
            ..Default::default()
        };
        self.alert(variant.merge(patch))
    }
}
