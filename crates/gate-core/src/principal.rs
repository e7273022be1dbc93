//! # Principal
//!
//! The authenticated identity attached to one request.

use serde::{Deserialize, Serialize};

/// Sentinel owner id meaning "all customers", sent by admin callers
pub const ALL_CUSTOMERS: &str = "admin";

/// Roles known to the gateway. No hierarchy between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Customer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    /// Parse the role string issued by the authentication backend
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(Role::Customer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified identity (subject id + role). Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject_id: String,
    role: Role,
}

impl Principal {
    pub fn new(subject_id: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            role,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner id for "my resources" endpoints: always the caller itself
    pub fn own_scope(&self) -> String {
        self.subject_id.clone()
    }

    /// Owner id for endpoints where an admin acts on behalf of any customer
    pub fn owner_scope(&self) -> String {
        if self.is_admin() {
            ALL_CUSTOMERS.to_string()
        } else {
            self.subject_id.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("customer"), Some(Role::Customer));
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("pharmacist"), None);
    }

    #[test]
    fn test_owner_scope() {
        let customer = Principal::new("cust-1", Role::Customer);
        assert_eq!(customer.owner_scope(), "cust-1");
        assert_eq!(customer.own_scope(), "cust-1");

        let admin = Principal::new("adm-1", Role::Admin);
        assert_eq!(admin.owner_scope(), ALL_CUSTOMERS);
        assert_eq!(admin.own_scope(), "adm-1");
    }
}
