use serde::{Deserialize, Serialize};

/// Error returned when an identifier is not a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidId(pub i64);

impl std::fmt::Display for InvalidId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "identifier must be positive, got {}", self.0)
    }
}

impl std::error::Error for InvalidId {}

macro_rules! ledger_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw value without validation.
            ///
            /// Ledger implementations use this for keys they assigned themselves.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Creates an identifier, rejecting zero and negative values.
            pub fn parse(raw: i64) -> Result<Self, InvalidId> {
                if raw > 0 { Ok(Self(raw)) } else { Err(InvalidId(raw)) }
            }

            /// Returns the underlying integer key.
            pub fn as_i64(&self) -> i64 {
                self.0
            }

            /// Returns true if the identifier is a valid ledger key.
            pub fn is_valid(&self) -> bool {
                self.0 > 0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

ledger_id!(
    /// Ledger key of a beverage definition.
    BeverageId
);

ledger_id!(
    /// Ledger key of an ingredient stock row.
    IngredientId
);

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_non_positive_ids() {
        assert_eq!(BeverageId::parse(0), Err(InvalidId(0)));
        assert_eq!(IngredientId::parse(-4), Err(InvalidId(-4)));
        assert_eq!(BeverageId::parse(7).unwrap().as_i64(), 7);
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&IngredientId::new(12)).unwrap();
        assert_eq!(json, "12");
        let id: BeverageId = serde_json::from_str("3").unwrap();
        assert_eq!(id, BeverageId::new(3));
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(300).to_string(), "3.00");
        assert_eq!(Money::from_cents(205).to_string(), "2.05");
        assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
    }

    #[test]
    fn money_positivity() {
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert_eq!(Money::default(), Money::zero());
    }
}
