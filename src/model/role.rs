#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    CeoCoo = 1,
    Admin = 2,
    Hr = 3,
    Manager = 4,
    Executive = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::CeoCoo),
            2 => Some(Role::Admin),
            3 => Some(Role::Hr),
            4 => Some(Role::Manager),
            5 => Some(Role::Executive),
            _ => None,
        }
    }

    /// The CEO/COO role is excluded from automatic fine creation.
    pub fn is_fine_exempt(&self) -> bool {
        matches!(self, Role::CeoCoo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ceo_coo_is_fine_exempt() {
        assert!(Role::CeoCoo.is_fine_exempt());
        for role in [Role::Admin, Role::Hr, Role::Manager, Role::Executive] {
            assert!(!role.is_fine_exempt());
        }
    }
}
