//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                $(
                    if id == $val {
                        return Some(Self::$variant);
                    }
                )+
                None
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Rating workflow status. New ratings start as `Pending`.
    RatingStatus {
        Pending = 1,
        InProgress = 2,
        UnderReview = 3,
        Completed = 4,
        Archived = 5,
    }
}

impl RatingStatus {
    /// Display name, matching the `rating_statuses.name` seed row.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::UnderReview => "Under Review",
            Self::Completed => "Completed",
            Self::Archived => "Archived",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_and_match_status_choices() {
        for (id, label) in rms_core::schemas::RATING_STATUS_CHOICES {
            let id: StatusId = id.parse().unwrap();
            let status = RatingStatus::from_id(id).unwrap();
            assert_eq!(status.id(), id);
            assert_eq!(status.label(), *label);
        }
        assert_eq!(RatingStatus::from_id(9), None);
    }
}
