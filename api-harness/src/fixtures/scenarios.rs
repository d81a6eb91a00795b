//! Composite record graphs for end-to-end situations.
//!
//! Cardinalities are part of each builder's contract; tests assert on them.

use super::factory::FixtureFactory;
use super::names::DEPARTMENTS;
use super::records::*;
use crate::types::Role;
use serde::Serialize;

pub const SMALL_BUSINESS_EMPLOYEES: usize = 3;
pub const SMALL_BUSINESS_CUSTOMERS: usize = 10;
/// Deals and invoices are created for the first customers only
pub const SMALL_BUSINESS_DEALS: usize = 5;

pub const ENTERPRISE_EMPLOYEES: usize = 50;
pub const ENTERPRISE_CUSTOMERS: usize = 100;
pub const ENTERPRISE_DEALS_PER_CUSTOMER: usize = 2;

pub const MULTI_TENANT_TENANTS: usize = 3;
pub const MULTI_TENANT_CUSTOMERS: usize = 5;
pub const MULTI_TENANT_EMPLOYEES: usize = 2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmallBusiness {
    pub tenant: Tenant,
    pub admin: User,
    pub employees: Vec<Employee>,
    pub customers: Vec<Customer>,
    pub deals: Vec<Deal>,
    pub invoices: Vec<Invoice>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseBusiness {
    pub tenant: Tenant,
    /// One user per role, in matrix order
    pub users: Vec<User>,
    pub departments: Vec<String>,
    pub employees: Vec<Employee>,
    pub customers: Vec<Customer>,
    pub deals: Vec<Deal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantData {
    pub tenant: Tenant,
    pub admin: User,
    pub customers: Vec<Customer>,
    pub employees: Vec<Employee>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiTenant {
    pub tenants: Vec<TenantData>,
}

impl FixtureFactory {
    /// One tenant with an admin, 3 employees, 10 customers and deals/invoices for 5 of them
    pub fn small_business(&mut self) -> SmallBusiness {
        let tenant = self.tenant(TenantPatch {
            plan: Some(Plan::Starter),
            ..Default::default()
        });
        let admin = self.admin_user(UserPatch {
            tenant_id: Some(tenant.id),
            ..Default::default()
        });

        let employees = (0..SMALL_BUSINESS_EMPLOYEES)
            .map(|_| {
                self.employee(EmployeePatch {
                    tenant_id: Some(tenant.id),
                    ..Default::default()
                })
            })
            .collect();

        let customers: Vec<Customer> = (0..SMALL_BUSINESS_CUSTOMERS)
            .map(|_| {
                self.customer(CustomerPatch {
                    tenant_id: Some(tenant.id),
                    ..Default::default()
                })
            })
            .collect();

        let mut deals = Vec::with_capacity(SMALL_BUSINESS_DEALS);
        let mut invoices = Vec::with_capacity(SMALL_BUSINESS_DEALS);
        for customer in customers.iter().take(SMALL_BUSINESS_DEALS) {
            deals.push(self.deal(DealPatch {
                tenant_id: Some(tenant.id),
                customer_id: Some(customer.id),
                owner_id: Some(Some(admin.id)),
                ..Default::default()
            }));
            invoices.push(self.invoice(InvoicePatch {
                tenant_id: Some(tenant.id),
                customer_id: Some(customer.id),
                ..Default::default()
            }));
        }

        SmallBusiness {
            tenant,
            admin,
            employees,
            customers,
            deals,
            invoices,
        }
    }

    /// Enterprise tenant: a user per role, 50 employees over 6 departments, 100 customers, 2 deals each
    pub fn enterprise_business(&mut self) -> EnterpriseBusiness {
        let tenant = self.tenant(TenantPatch {
            plan: Some(Plan::Enterprise),
            ..Default::default()
        });

        let users: Vec<User> = crate::matrix::ALL_ROLES
            .iter()
            .map(|role| {
                self.user(UserPatch {
                    tenant_id: Some(tenant.id),
                    role: Some(*role),
                    ..Default::default()
                })
            })
            .collect();

        let employees = (0..ENTERPRISE_EMPLOYEES)
            .map(|i| {
                self.employee(EmployeePatch {
                    tenant_id: Some(tenant.id),
                    department: Some(DEPARTMENTS[i % DEPARTMENTS.len()].to_string()),
                    ..Default::default()
                })
            })
            .collect();

        let customers: Vec<Customer> = (0..ENTERPRISE_CUSTOMERS)
            .map(|_| {
                self.customer(CustomerPatch {
                    tenant_id: Some(tenant.id),
                    status: Some(CustomerStatus::Active),
                    ..Default::default()
                })
            })
            .collect();

        let owner = users
            .iter()
            .find(|u| u.role == Role::Manager)
            .map(|u| u.id);
        let mut deals = Vec::with_capacity(ENTERPRISE_CUSTOMERS * ENTERPRISE_DEALS_PER_CUSTOMER);
        for customer in &customers {
            for _ in 0..ENTERPRISE_DEALS_PER_CUSTOMER {
                deals.push(self.deal(DealPatch {
                    tenant_id: Some(tenant.id),
                    customer_id: Some(customer.id),
                    owner_id: Some(owner),
                    ..Default::default()
                }));
            }
        }

        EnterpriseBusiness {
            tenant,
            users,
            departments: DEPARTMENTS.iter().map(|d| d.to_string()).collect(),
            employees,
            customers,
            deals,
        }
    }

    /// Three independent tenants, each with an admin, 5 customers and 2 employees
    pub fn multi_tenant(&mut self) -> MultiTenant {
        let tenants = (0..MULTI_TENANT_TENANTS)
            .map(|_| {
                let tenant = self.tenant(TenantPatch::default());
                let admin = self.admin_user(UserPatch {
                    tenant_id: Some(tenant.id),
                    ..Default::default()
                });
                let customers = (0..MULTI_TENANT_CUSTOMERS)
                    .map(|_| {
                        self.customer(CustomerPatch {
                            tenant_id: Some(tenant.id),
                            ..Default::default()
                        })
                    })
                    .collect();
                let employees = (0..MULTI_TENANT_EMPLOYEES)
                    .map(|_| {
                        self.employee(EmployeePatch {
                            tenant_id: Some(tenant.id),
                            ..Default::default()
                        })
                    })
                    .collect();
                TenantData {
                    tenant,
                    admin,
                    customers,
                    employees,
                }
            })
            .collect();

        MultiTenant { tenants }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_small_business_shape() {
        let mut factory = FixtureFactory::seeded(11);
        let business = factory.small_business();

        assert_eq!(business.customers.len(), 10);
        assert_eq!(business.employees.len(), 3);
        assert_eq!(business.deals.len(), SMALL_BUSINESS_DEALS);
        assert_eq!(business.admin.role, Role::Admin);

        let tenant_id = business.tenant.id;
        assert!(business.customers.iter().all(|c| c.tenant_id == tenant_id));
        assert!(business.employees.iter().all(|e| e.tenant_id == tenant_id));
        assert!(business.deals.iter().all(|d| d.tenant_id == tenant_id));
        assert!(business.invoices.iter().all(|i| i.tenant_id == tenant_id));
        assert_eq!(business.admin.tenant_id, tenant_id);

        let customer_ids: HashSet<_> = business.customers.iter().map(|c| c.id).collect();
        assert!(business.deals.iter().all(|d| customer_ids.contains(&d.customer_id)));
    }

    #[test]
    fn test_enterprise_business_shape() {
        let mut factory = FixtureFactory::seeded(12);
        let business = factory.enterprise_business();

        assert_eq!(business.employees.len(), ENTERPRISE_EMPLOYEES);
        assert_eq!(business.customers.len(), ENTERPRISE_CUSTOMERS);
        assert_eq!(business.deals.len(), 200);
        assert_eq!(business.tenant.plan, Plan::Enterprise);
        assert_eq!(
            business.users.iter().map(|u| u.role).collect::<Vec<_>>(),
            crate::matrix::ALL_ROLES.to_vec()
        );

        let engineering = business
            .employees
            .iter()
            .filter(|e| e.department == "Engineering")
            .count();
        assert_eq!(engineering, 9);
        assert!(business
            .employees
            .iter()
            .all(|e| business.departments.contains(&e.department)));
    }

    #[test]
    fn test_multi_tenant_children_reference_their_own_tenant() {
        let mut factory = FixtureFactory::seeded(13);
        let scenario = factory.multi_tenant();

        assert_eq!(scenario.tenants.len(), MULTI_TENANT_TENANTS);
        let ids: HashSet<_> = scenario.tenants.iter().map(|t| t.tenant.id).collect();
        assert_eq!(ids.len(), MULTI_TENANT_TENANTS);

        for data in &scenario.tenants {
            assert_eq!(data.customers.len(), MULTI_TENANT_CUSTOMERS);
            assert_eq!(data.employees.len(), MULTI_TENANT_EMPLOYEES);
            assert!(data.customers.iter().all(|c| c.tenant_id == data.tenant.id));
            assert!(data.employees.iter().all(|e| e.tenant_id == data.tenant.id));
        }
    }
}
