//! Role checks shared by handlers that distinguish owners/admins from members.

use photopro_db::models::user::{ROLE_ADMIN, ROLE_OWNER};

/// Owners and admins manage organization-wide resources.
pub fn is_admin_role(role: &str) -> bool {
    role == ROLE_OWNER || role == ROLE_ADMIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use photopro_db::models::user::ROLE_MEMBER;

    #[test]
    fn only_owners_and_admins_are_admins() {
        assert!(is_admin_role(ROLE_OWNER));
        assert!(is_admin_role(ROLE_ADMIN));
        assert!(!is_admin_role(ROLE_MEMBER));
        assert!(!is_admin_role(""));
    }
}
