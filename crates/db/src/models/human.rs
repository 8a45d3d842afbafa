//! The `human` entity.

use std::fmt;

use hello_core::greeting::display_name;
use hello_core::types::DbId;
use sqlx::FromRow;

/// A row of the `human` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Human {
    pub id: DbId,
    pub name: Option<String>,
}

impl fmt::Display for Human {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Human[id={}, name='{}']",
            self.id,
            display_name(self.name.as_deref())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_named() {
        let human = Human {
            id: 7,
            name: Some("Ada".into()),
        };
        assert_eq!(human.to_string(), "Human[id=7, name='Ada']");
    }

    #[test]
    fn display_unnamed() {
        let human = Human { id: 8, name: None };
        assert_eq!(human.to_string(), "Human[id=8, name='null']");
    }
}
