//! Role resolution and order visibility rules.
//!
//! Managers see every order, delivery crew see the orders assigned to them,
//! and everyone else sees only their own. Mutation rules live with the
//! handlers; this module only answers "which rows" and "is this caller
//! staff".

use bistro_core::types::{StaffGroup, UserId};

use crate::error::ApiError;
use crate::models::CurrentUser;

/// Staff roles held by one user. A user may be in both groups at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet {
    pub manager: bool,
    pub delivery_crew: bool,
}

impl RoleSet {
    /// Builds a role set from raw group names as stored in the membership
    /// table. Unknown names are ignored.
    pub fn from_group_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles = Self::default();
        for name in names {
            if name.as_ref() == StaffGroup::Manager.group_name() {
                roles.manager = true;
            } else if name.as_ref() == StaffGroup::DeliveryCrew.group_name() {
                roles.delivery_crew = true;
            }
        }
        roles
    }
}

/// Which orders a caller may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Every order in the system.
    All,
    /// Orders assigned to this delivery crew member.
    AssignedTo(UserId),
    /// Orders placed by this customer.
    OwnedBy(UserId),
}

/// Resolves the read scope for the caller. Manager wins over delivery crew
/// when a user is in both groups.
#[must_use]
pub const fn order_scope(current: &CurrentUser) -> OrderScope {
    if current.is_manager() {
        OrderScope::All
    } else if current.is_delivery_crew() {
        OrderScope::AssignedTo(current.id())
    } else {
        OrderScope::OwnedBy(current.id())
    }
}

/// Rejects non-managers with a 403.
pub const fn require_manager(current: &CurrentUser) -> Result<(), ApiError> {
    if current.is_manager() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
