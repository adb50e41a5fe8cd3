//! Identifier newtypes.
//!
//! The backend hands out opaque string ids. Wrapping them keeps a plan id
//! from being passed where a plan-spot id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Id of a spot in the catalogue.
    SpotId
);
string_id!(
    /// Id of one occurrence of a spot within a plan.
    PlanSpotId
);
string_id!(
    /// Id of a saved plan.
    PlanId
);
string_id!(
    /// Id of a plan folder.
    FolderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display() {
        let id = PlanSpotId::new("ps-1");
        assert_eq!(id.to_string(), "ps-1");
        assert_eq!(format!("{id:?}"), "PlanSpotId(ps-1)");
    }

    #[test]
    fn serde_transparent() {
        let id: PlanId = serde_json::from_str("\"plan-9\"").unwrap();
        assert_eq!(id.as_str(), "plan-9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"plan-9\"");
    }
}
