//! # Role-Based Access Control
//!
//! Exact-match role check over a finite role set.

use crate::error::{GatewayError, GatewayResult};
use crate::principal::{Principal, Role};

/// Admin-only endpoints
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Customer-only endpoints ("my resources")
pub const CUSTOMER_ONLY: &[Role] = &[Role::Customer];

/// Endpoints open to any authenticated role
pub const ANY_ROLE: &[Role] = &[Role::Customer, Role::Admin];

/// Authorize a principal against an allowed-role set.
///
/// Fails with an auth error when no principal is bound, and when the
/// principal's role is not a literal member of `allowed`.
pub fn authorize(principal: Option<&Principal>, allowed: &[Role]) -> GatewayResult<()> {
    let principal = principal
        .ok_or_else(|| GatewayError::Unauthenticated("User not authenticated".to_string()))?;

    if allowed.contains(&principal.role()) {
        Ok(())
    } else {
        Err(GatewayError::Forbidden("User not authorized".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every subset of the role set
    fn all_role_sets() -> Vec<Vec<Role>> {
        (0..(1u8 << Role::ALL.len()))
            .map(|mask| {
                Role::ALL
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, r)| *r)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_authorize_iff_member() {
        for role in Role::ALL {
            let principal = Principal::new("subject", role);
            for allowed in all_role_sets() {
                let result = authorize(Some(&principal), &allowed);
                assert_eq!(
                    result.is_ok(),
                    allowed.contains(&role),
                    "role={role} allowed={allowed:?}"
                );
            }
        }
    }

    #[test]
    fn test_admin_is_not_implicitly_customer() {
        let admin = Principal::new("adm", Role::Admin);
        assert!(matches!(
            authorize(Some(&admin), CUSTOMER_ONLY),
            Err(GatewayError::Forbidden(_))
        ));
    }

    #[test]
    fn test_missing_principal() {
        let err = authorize(None, ANY_ROLE).unwrap_err();
        assert!(matches!(err, GatewayError::Unauthenticated(_)));
        assert_eq!(err.status_code(), 401);
    }
}
