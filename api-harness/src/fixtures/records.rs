//! Typed domain records and their partial overrides.
//!
//! Every record has a companion `*Patch` whose `Some` fields replace the
//! generated values. Nullable record fields take `Some(None)` to force null.

use crate::types::Role;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a partial-override struct for a record type
macro_rules! record_patch {
    ($patch:ident for $record:ident { $($field:ident: $ty:ty),* $(,)? }) => {
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $patch {
            $(pub $field: Option<$ty>,)*
        }

        impl $patch {
            /// Overwrite every field set in this patch
            pub fn apply_to(self, record: &mut $record) {
                $(
                    if let Some(value) = self.$field {
                        record.$field = value;
                    }
                )*
            }

            /// Layer `other` on top of `self`; fields set in `other` win
            #[must_use]
            pub fn merge(self, other: $patch) -> $patch {
                $patch {
                    $($field: other.$field.or(self.$field),)*
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    Starter,
    Professional,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub domain: String,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
}

record_patch!(TenantPatch for Tenant {
    id: Uuid,
    name: String,
    slug: String,
    domain: String,
    plan: Plan,
    created_at: DateTime<Utc>,
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

record_patch!(UserPatch for User {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    email: String,
    role: Role,
    active: bool,
    created_at: DateTime<Utc>,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Lead,
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: CustomerStatus,
    pub lifetime_value: f64,
    pub created_at: DateTime<Utc>,
}

record_patch!(CustomerPatch for Customer {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    company: Option<String>,
    status: CustomerStatus,
    lifetime_value: f64,
    created_at: DateTime<Utc>,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub title: String,
    pub value: f64,
    pub stage: DealStage,
    pub probability: u8,
    pub owner_id: Option<Uuid>,
    pub expected_close_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

record_patch!(DealPatch for Deal {
    id: Uuid,
    tenant_id: Uuid,
    customer_id: Uuid,
    title: String,
    value: f64,
    stage: DealStage,
    probability: u8,
    owner_id: Option<Uuid>,
    expected_close_date: NaiveDate,
    created_at: DateTime<Utc>,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub number: String,
    pub amount: f64,
    pub tax: f64,
    pub total: f64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub paid_on: Option<NaiveDate>,
}

record_patch!(InvoicePatch for Invoice {
    id: Uuid,
    tenant_id: Uuid,
    customer_id: Uuid,
    number: String,
    amount: f64,
    tax: f64,
    total: f64,
    currency: String,
    status: InvoiceStatus,
    issued_on: NaiveDate,
    due_on: NaiveDate,
    paid_on: Option<NaiveDate>,
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub manager_id: Option<Uuid>,
    pub hire_date: NaiveDate,
    pub active: bool,
}

record_patch!(EmployeePatch for Employee {
    id: Uuid,
    tenant_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    department: String,
    position: String,
    salary: f64,
    manager_id: Option<Uuid>,
    hire_date: NaiveDate,
    active: bool,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub source: String,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
}

record_patch!(AlertPatch for Alert {
    id: Uuid,
    tenant_id: Uuid,
    severity: AlertSeverity,
    title: String,
    message: String,
    source: String,
    acknowledged: bool,
    created_at: DateTime<Utc>,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

/// Model-produced analysis of a portfolio holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub symbol: String,
    pub model: String,
    pub summary: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub recommendation: Recommendation,
    pub created_at: DateTime<Utc>,
}

record_patch!(AiAnalysisPatch for AiAnalysis {
    id: Uuid,
    tenant_id: Uuid,
    symbol: String,
    model: String,
    summary: String,
    sentiment: Sentiment,
    confidence: f64,
    recommendation: Recommendation,
    created_at: DateTime<Utc>,
});
