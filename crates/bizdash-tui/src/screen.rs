//! Screen identifiers and tab order.

use std::fmt;

use strum::IntoEnumIterator;

use bizdash_core::Resource;

/// The login form, or one collection table per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Login,
    Crud(Resource),
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::Crud(Resource::Employees)
    }
}

impl ScreenId {
    /// Table screens in tab-bar order.
    pub fn tabs() -> impl Iterator<Item = ScreenId> {
        Resource::iter().map(Self::Crud)
    }

    /// Number key (1-5). Login has none.
    pub fn number(self) -> Option<usize> {
        match self {
            Self::Login => None,
            Self::Crud(resource) => Resource::iter().position(|r| r == resource).map(|i| i + 1),
        }
    }

    pub fn from_number(n: usize) -> Option<Self> {
        n.checked_sub(1)
            .and_then(|i| Resource::iter().nth(i))
            .map(Self::Crud)
    }

    /// Next tab, wrapping. Login stays put.
    pub fn next(self) -> Self {
        self.step(1)
    }

    pub fn prev(self) -> Self {
        let len = Resource::iter().count();
        self.step(len - 1)
    }

    fn step(self, by: usize) -> Self {
        match self.number() {
            Some(n) => {
                let len = Resource::iter().count();
                Self::from_number((n - 1 + by) % len + 1).unwrap_or(self)
            }
            None => self,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Crud(resource) => resource.label(),
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn number_keys_follow_tab_order() {
        assert_eq!(ScreenId::from_number(1), Some(ScreenId::Crud(Resource::Employees)));
        assert_eq!(ScreenId::from_number(4), Some(ScreenId::Crud(Resource::Transactions)));
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(6), None);
        assert_eq!(ScreenId::Crud(Resource::Assets).number(), Some(5));
        assert_eq!(ScreenId::Crud(Resource::Transactions).label(), "Finance");
    }

    #[test]
    fn tab_cycling_wraps() {
        let assets = ScreenId::Crud(Resource::Assets);
        let employees = ScreenId::Crud(Resource::Employees);
        assert_eq!(assets.next(), employees);
        assert_eq!(employees.prev(), assets);
        assert_eq!(ScreenId::Login.next(), ScreenId::Login);
    }
}
