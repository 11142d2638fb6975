use bistro_core::types::UserId;
use serde::Serialize;

use crate::policy::RoleSet;

/// Account record as exposed by the group roster endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// The authenticated caller together with the staff roles loaded for this
/// request. Roles are resolved once per request, so a roster change takes
/// effect on the follower's next call.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub roles: RoleSet,
}

impl CurrentUser {
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }

    #[must_use]
    pub const fn is_manager(&self) -> bool {
        self.roles.manager
    }

    #[must_use]
    pub const fn is_delivery_crew(&self) -> bool {
        self.roles.delivery_crew
    }
}
