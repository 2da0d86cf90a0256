// Lock types and their compatibility lattice
//
// The lock table treats these as opaque values and only asks two questions:
// can two locks held by different transactions coexist on one resource, and
// does one lock type grant at least everything another one does.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use txlock_error::{TypesError, TypesResult};

/// Multigranularity lock types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockType {
    /// No lock held
    NL,
    /// Intention shared
    IS,
    /// Intention exclusive
    IX,
    /// Shared
    S,
    /// Shared + intention exclusive
    SIX,
    /// Exclusive
    X,
}

impl LockType {
    /// All lock types, weakest first
    pub const ALL: [LockType; 6] = [
        LockType::NL,
        LockType::IS,
        LockType::IX,
        LockType::S,
        LockType::SIX,
        LockType::X,
    ];

    /// Whether locks of type `a` and `b` held by different transactions can
    /// coexist on the same resource. Symmetric.
    pub fn compatible(a: LockType, b: LockType) -> bool {
        use LockType::*;
        match (a, b) {
            (NL, _) | (_, NL) => true,
            (X, _) | (_, X) => false,
            (IS, _) | (_, IS) => true,
            (IX, IX) => true,
            (S, S) => true,
            _ => false,
        }
    }

    /// Whether `substitute` permits everything `required` permits, so that a
    /// transaction holding `required` may be switched to `substitute`.
    pub fn substitutable(substitute: LockType, required: LockType) -> bool {
        use LockType::*;
        if required == NL || substitute == required {
            return true;
        }
        match required {
            IS => matches!(substitute, IX | S | SIX | X),
            IX | S => matches!(substitute, SIX | X),
            SIX => substitute == X,
            NL | X => false,
        }
    }

    /// Whether this is one of the intention types
    pub fn is_intent(&self) -> bool {
        matches!(self, LockType::IS | LockType::IX | LockType::SIX)
    }

    /// Short name used in logs and rendered snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            LockType::NL => "NL",
            LockType::IS => "IS",
            LockType::IX => "IX",
            LockType::S => "S",
            LockType::SIX => "SIX",
            LockType::X => "X",
        }
    }
}

impl Default for LockType {
    fn default() -> Self {
        LockType::NL
    }
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockType {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        LockType::ALL
            .iter()
            .copied()
            .find(|lock_type| lock_type.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypesError::parse_error(format!("unknown lock type '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use LockType::*;

    #[test]
    fn test_compatibility_matrix() {
        // rows and columns in ALL order
        let expected = [
            [true, true, true, true, true, true],
            [true, true, true, true, true, false],
            [true, true, true, false, false, false],
            [true, true, false, true, false, false],
            [true, true, false, false, false, false],
            [true, false, false, false, false, false],
        ];
        for (i, a) in LockType::ALL.iter().enumerate() {
            for (j, b) in LockType::ALL.iter().enumerate() {
                assert_eq!(
                    LockType::compatible(*a, *b),
                    expected[i][j],
                    "compatible({}, {})",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_substitutability() {
        assert!(LockType::substitutable(X, S));
        assert!(LockType::substitutable(SIX, S));
        assert!(LockType::substitutable(SIX, IX));
        assert!(LockType::substitutable(S, IS));
        assert!(LockType::substitutable(IX, IS));
        assert!(LockType::substitutable(S, NL));

        assert!(!LockType::substitutable(S, X));
        assert!(!LockType::substitutable(IX, S));
        assert!(!LockType::substitutable(S, IX));
        assert!(!LockType::substitutable(NL, S));
        assert!(!LockType::substitutable(IS, IX));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("six".parse::<LockType>().unwrap(), SIX);
        assert_eq!("X".parse::<LockType>().unwrap(), X);
        assert!("Y".parse::<LockType>().is_err());
        assert_eq!(IX.to_string(), "IX");
        assert_eq!(LockType::default(), NL);
        assert!(SIX.is_intent());
        assert!(!S.is_intent());
    }

    fn any_lock_type() -> impl Strategy<Value = LockType> {
        prop::sample::select(LockType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn compatible_is_symmetric(a in any_lock_type(), b in any_lock_type()) {
            prop_assert_eq!(LockType::compatible(a, b), LockType::compatible(b, a));
        }

        #[test]
        fn substitute_conflicts_with_at_least_as_much(
            new in any_lock_type(),
            old in any_lock_type(),
            other in any_lock_type(),
        ) {
            // a stronger lock never admits a holder the weaker one excluded
            if LockType::substitutable(new, old) && !LockType::compatible(old, other) {
                prop_assert!(!LockType::compatible(new, other));
            }
        }

        #[test]
        fn substitutable_is_transitive(
            a in any_lock_type(),
            b in any_lock_type(),
            c in any_lock_type(),
        ) {
            if LockType::substitutable(a, b) && LockType::substitutable(b, c) {
                prop_assert!(LockType::substitutable(a, c));
            }
        }
    }
}
