//! Well-known role name constants.
//!
//! These must match the role strings the backend returns in the login
//! response and in `/admin/users`.

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_SUPER_ADMIN: &str = "SUPER_ADMIN";

/// True when `roles` grants access to the moderation panel.
///
/// Both `ADMIN` and `SUPER_ADMIN` qualify.
pub fn grants_admin<S: AsRef<str>>(roles: &[S]) -> bool {
    roles
        .iter()
        .any(|r| r.as_ref() == ROLE_ADMIN || r.as_ref() == ROLE_SUPER_ADMIN)
}

/// True when `roles` contains `SUPER_ADMIN`, the only role allowed to
/// promote or demote other admins.
pub fn grants_super_admin<S: AsRef<str>>(roles: &[S]) -> bool {
    roles.iter().any(|r| r.as_ref() == ROLE_SUPER_ADMIN)
}
