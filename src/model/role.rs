use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin = 1,
    HrManager = 2,
    StationManager = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::HrManager),
            3 => Some(Role::StationManager),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Approve, reject and override leave requests.
    pub fn can_decide(self) -> bool {
        matches!(self, Role::Admin | Role::HrManager)
    }

    pub fn can_override(self) -> bool {
        self.can_decide()
    }

    /// Station managers only see employees of their own location.
    pub fn is_location_scoped(self) -> bool {
        self == Role::StationManager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for role in [Role::Admin, Role::HrManager, Role::StationManager] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(4), None);
    }

    #[test]
    fn only_hr_and_admin_override() {
        assert!(Role::Admin.can_override());
        assert!(Role::HrManager.can_override());
        assert!(!Role::StationManager.can_override());
    }

    #[test]
    fn names_are_snake_case() {
        assert_eq!(Role::HrManager.to_string(), "hr_manager");
        assert_eq!("station_manager".parse::<Role>().ok(), Some(Role::StationManager));
    }
}
