use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::user::{Identity, Role};

/// Allows the operation iff the identity's role is in `required`.
///
/// An empty set means "any authenticated identity". There is no role
/// hierarchy: `admin` does not satisfy a check that names only `user`.
/// Every operation that touches another identity's data goes through
/// here (or `require_owner_or_admin`) before mutating anything.
pub fn authorize(identity: &Identity, required: &[Role]) -> Result<()> {
    if required.is_empty() || required.contains(&identity.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Allows the operation iff the identity owns the resource or is an admin.
pub fn require_owner_or_admin(identity: &Identity, owner_id: Uuid) -> Result<()> {
    if identity.role == Role::Admin || identity.id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity_with(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "tester@shop.test".to_string(),
            password_hash: String::new(),
            first_name: "Tester".to_string(),
            last_name: "One".to_string(),
            role,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn allow_iff_role_in_set() {
        let user = identity_with(Role::User);
        let admin = identity_with(Role::Admin);

        assert!(authorize(&user, &[Role::User]).is_ok());
        assert!(authorize(&admin, &[Role::Admin]).is_ok());
        assert!(authorize(&user, &[Role::Admin]).is_err());
    }

    #[test]
    fn admin_does_not_implicitly_satisfy_user_only_checks() {
        let admin = identity_with(Role::Admin);

        assert!(matches!(
            authorize(&admin, &[Role::User]),
            Err(AppError::Forbidden)
        ));
        // unless the set names admin explicitly
        assert!(authorize(&admin, &[Role::User, Role::Admin]).is_ok());
    }

    #[test]
    fn empty_set_admits_any_authenticated_identity() {
        assert!(authorize(&identity_with(Role::User), &[]).is_ok());
        assert!(authorize(&identity_with(Role::Admin), &[]).is_ok());
    }

    #[test]
    fn ownership_or_admin() {
        let owner = identity_with(Role::User);
        let stranger = identity_with(Role::User);
        let admin = identity_with(Role::Admin);

        assert!(require_owner_or_admin(&owner, owner.id).is_ok());
        assert!(require_owner_or_admin(&admin, owner.id).is_ok());
        assert!(matches!(
            require_owner_or_admin(&stranger, owner.id),
            Err(AppError::Forbidden)
        ));
    }
}
