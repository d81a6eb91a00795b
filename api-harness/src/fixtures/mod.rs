//! Synthetic domain records and composite record graphs.

pub mod factory;
mod names;
pub mod records;
pub mod scenarios;

pub use factory::{session_for, FixtureFactory, DEFAULT_SEED};
pub use records::*;
pub use scenarios::{EnterpriseBusiness, MultiTenant, SmallBusiness, TenantData};
