//! Staff role groups.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The two named staff groups.
///
/// Role is determined by group membership: a user in neither group is a
/// customer. The group names are stored verbatim in the membership table,
/// so [`StaffGroup::group_name`] must match them exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffGroup {
    Manager,
    DeliveryCrew,
}

impl StaffGroup {
    /// The exact group name as persisted in the membership table.
    #[must_use]
    pub const fn group_name(self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::DeliveryCrew => "Delivery crew",
        }
    }
}

impl fmt::Display for StaffGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.group_name())
    }
}

impl std::str::FromStr for StaffGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Manager" | "manager" => Ok(Self::Manager),
            "Delivery crew" | "delivery-crew" | "delivery_crew" => Ok(Self::DeliveryCrew),
            _ => Err(format!("invalid staff group: {s}")),
        }
    }
}
