//! State machine names reported by the backend.
//!
//! The backend exposes states as display names (`"Shipped (partially)"`), and
//! shops can add their own. Known names map to variants; anything else is kept
//! verbatim in `Other` so it can still be reported.

use serde::{Deserialize, Serialize};

macro_rules! state_names {
    (
        $(#[$meta:meta])*
        $t:ident { $($variant:ident => $name:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $t {
            $($variant,)+
            Other(String),
        }

        impl $t {
            pub fn from_name(name: &str) -> Self {
                match name {
                    $($name => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $name,)+
                    Self::Other(name) => name,
                }
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self::from_name(&value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                match value {
                    $t::Other(name) => name,
                    known => known.as_str().to_string(),
                }
            }
        }
    };
}

state_names! {
    /// Overall order state.
    OrderState {
        Open => "Open",
        InProgress => "In progress",
        Done => "Done",
        Cancelled => "Cancelled",
    }
}

state_names! {
    /// Delivery (shipping) state.
    DeliveryState {
        Open => "Open",
        Shipped => "Shipped",
        ShippedPartially => "Shipped (partially)",
        Cancelled => "Cancelled",
        Returned => "Returned",
        ReturnedPartially => "Returned (partially)",
    }
}

state_names! {
    /// Payment transaction state.
    TransactionState {
        Open => "Open",
        Paid => "Paid",
        Cancelled => "Cancelled",
        Refunded => "Refunded",
        RefundedPartially => "Refunded (partially)",
        Reminded => "Reminded",
        Failed => "Failed",
        InProgress => "In Progress",
    }
}
