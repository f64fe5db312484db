//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table (`event_states`,
//! `registration_statuses`, `payment_statuses`). Variants serialize as their
//! lowercase name so API payloads read `"status": "pending"`.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// A status id read from the database that matches no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} id {id}")]
pub struct UnknownStatusId {
    pub kind: &'static str,
    pub id: StatusId,
}

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// All variants in seed order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Return the lowercase name stored in the lookup table.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Look up a variant by its database ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                Self::ALL.iter().copied().find(|s| s.id() == id)
            }

            /// Look up a variant by its lowercase name.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|s| s.name() == name)
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl TryFrom<StatusId> for $name {
            type Error = UnknownStatusId;

            fn try_from(id: StatusId) -> Result<Self, Self::Error> {
                Self::from_id(id).ok_or(UnknownStatusId {
                    kind: stringify!($name),
                    id,
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }
    };
}

define_status_enum! {
    /// Event moderation lifecycle. Transitioned only by an admin.
    EventState {
        Pending = 1 => "pending",
        Accepted = 2 => "accepted",
        Rejected = 3 => "rejected",
    }
}

define_status_enum! {
    /// Registration lifecycle.
    RegistrationStatus {
        Pending = 1 => "pending",
        Confirmed = 2 => "confirmed",
        Cancelled = 3 => "cancelled",
    }
}

define_status_enum! {
    /// Manual payment review status.
    PaymentStatus {
        Pending = 1 => "pending",
        Approved = 2 => "approved",
        Rejected = 3 => "rejected",
    }
}
