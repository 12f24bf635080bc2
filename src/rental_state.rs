use crate::visitor::VisitorId;

/// Rental status of a book, derived from visitor records
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RentalStatus {
    /// No visitor holds the book
    #[default]
    Available,
    /// Held by these visitors, in ascending visitor id order
    Rented(Vec<VisitorId>),
}

impl RentalStatus {
    /// Build the status from the visitors currently holding a book
    #[must_use]
    pub fn from_holders(holders: Vec<VisitorId>) -> Self {
        if holders.is_empty() {
            Self::Available
        } else {
            Self::Rented(holders)
        }
    }

    /// Visitors holding the book
    #[must_use]
    pub fn holders(&self) -> &[VisitorId] {
        match self {
            Self::Available => &[],
            Self::Rented(holders) => holders,
        }
    }

    /// Get a human-readable description of the current status
    #[must_use]
    pub fn get_description(&self) -> String {
        match self {
            Self::Available => "Book is available".to_string(),
            Self::Rented(holders) => {
                let ids: Vec<String> = holders.iter().map(ToString::to_string).collect();
                format!("Book is rented by visitor(s) {}", ids.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_holders_is_available() {
        assert_eq!(
            RentalStatus::from_holders(Vec::new()),
            RentalStatus::Available
        );
        assert!(RentalStatus::Available.holders().is_empty());
    }

    #[test]
    fn test_description_lists_holders() {
        let status = RentalStatus::from_holders(vec![VisitorId(1), VisitorId(4)]);
        let described = status.get_description();
        assert_eq!(described, "Book is rented by visitor(s) 1, 4");
    }
}
