use strum::Display;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin = 1,
    Volunteer = 2,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Volunteer),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Table holding the credentials for this role
    pub fn account_table(self) -> &'static str {
        match self {
            Role::Admin => "admin_login",
            Role::Volunteer => "volunteer_login",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_id_round_trip() {
        assert_eq!(Role::from_id(Role::Admin.id()), Some(Role::Admin));
        assert_eq!(Role::from_id(Role::Volunteer.id()), Some(Role::Volunteer));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(3), None);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Volunteer.to_string(), "volunteer");
    }
}
