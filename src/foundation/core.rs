use std::{borrow::Borrow, fmt};

pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Logical identifier of a diagram node.
///
/// Nodes are referenced by connectors through this id; the live element behind it is tracked
/// separately and may come and go.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub String);

/// Unique identifier of a connector definition.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ConnectorId(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Borrow the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(NodeId);
string_id!(ConnectorId);

/// Zero-based index into the reveal sequence.
pub type StepIndex = u32;
