//! Word pools for synthetic field values.

pub(crate) const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elena", "Felipe", "Grace", "Hugo", "Irene", "Jonas",
    "Karin", "Luis", "Marta", "Nadia", "Omar", "Paula", "Quentin", "Rosa", "Samuel", "Tania",
];

pub(crate) const LAST_NAMES: &[&str] = &[
    "Alvarez", "Bauer", "Costa", "Dubois", "Evans", "Fischer", "Garcia", "Hansen", "Ito",
    "Jensen", "Kowalski", "Lopez", "Moreau", "Nakamura", "Okafor", "Petrov", "Rossi", "Silva",
];

pub(crate) const COMPANY_PREFIXES: &[&str] = &[
    "Acme", "Blue", "Cedar", "Delta", "Evergreen", "Falcon", "Granite", "Harbor", "Ion",
    "Juniper", "Keystone", "Lumen", "Meridian", "Northwind", "Orchid", "Pioneer",
];

pub(crate) const COMPANY_SUFFIXES: &[&str] = &[
    "Labs", "Systems", "Holdings", "Logistics", "Partners", "Foods", "Analytics", "Works",
    "Capital", "Health",
];

pub(crate) const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

pub(crate) const DEAL_TOPICS: &[&str] = &[
    "Annual license", "Onboarding package", "Support renewal", "Platform upgrade",
    "Consulting retainer", "Data migration", "Seat expansion",
];

pub(crate) const DEPARTMENTS: &[&str] = &[
    "Engineering", "Sales", "Marketing", "Finance", "Operations", "Support",
];

pub(crate) const POSITIONS: &[&str] = &[
    "Associate", "Specialist", "Senior Specialist", "Team Lead", "Manager", "Director",
];

pub(crate) const ALERT_TITLES: &[&str] = &[
    "Invoice overdue", "Deal stalled", "Unusual login", "Quota reached", "Sync failed",
    "Price threshold crossed",
];

pub(crate) const ALERT_SOURCES: &[&str] = &["billing", "crm", "auth", "integrations", "portfolio"];

pub(crate) const TICKERS: &[&str] = &[
    "AAPL", "MSFT", "NVDA", "AMZN", "GOOGL", "TSLA", "JPM", "V", "XOM", "KO",
];

pub(crate) const ANALYSIS_MODELS: &[&str] = &["fin-sentiment-v2", "fin-forecast-v1", "risk-scan-v3"];
