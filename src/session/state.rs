use crate::api::UserProfile;
use serde::Serialize;
use std::fmt;

/// Authentication session. The profile and the superuser flag only exist while
/// authenticated, so a stale user cannot outlive a logout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Session {
    #[default]
    Unauthenticated,
    /// A login or logout request is in flight.
    Pending,
    Authenticated {
        user: UserProfile,
        is_superuser: bool,
        /// Changes on every entry into this state, so work started for an
        /// earlier login can tell it is stale.
        #[serde(skip)]
        generation: u64,
    },
}

/// Field-less view of [`Session`] for routing decisions and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Unauthenticated,
    Pending,
    Authenticated,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unauthenticated => "false",
            Self::Pending => "pending",
            Self::Authenticated => "true",
        };
        formatter.write_str(label)
    }
}

impl Session {
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Unauthenticated => StatusKind::Unauthenticated,
            Self::Pending => StatusKind::Pending,
            Self::Authenticated { .. } => StatusKind::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::Authenticated { generation, .. } => Some(*generation),
            _ => None,
        }
    }

    /// Always `false` unless authenticated.
    pub fn is_superuser(&self) -> bool {
        matches!(
            self,
            Self::Authenticated {
                is_superuser: true,
                ..
            }
        )
    }

    /// Marks a request as in flight. Returns whether the session changed.
    pub(crate) fn begin_request(&mut self) -> bool {
        if matches!(self, Self::Pending) {
            false
        } else {
            *self = Self::Pending;
            true
        }
    }

    /// Applies a successful authentication check. The known profile and the
    /// generation survive a re-confirmation; only a different superuser flag
    /// counts as a change. `next_generation` is used when entering the state.
    pub(crate) fn confirm(&mut self, superuser: bool, next_generation: u64) -> bool {
        match self {
            Self::Authenticated { is_superuser, .. } => {
                if *is_superuser == superuser {
                    false
                } else {
                    *is_superuser = superuser;
                    true
                }
            }
            _ => {
                *self = Self::Authenticated {
                    user: UserProfile::default(),
                    is_superuser: superuser,
                    generation: next_generation,
                };
                true
            }
        }
    }

    /// Drops to unauthenticated. Returns whether the session changed.
    pub(crate) fn demote(&mut self) -> bool {
        if matches!(self, Self::Unauthenticated) {
            false
        } else {
            *self = Self::Unauthenticated;
            true
        }
    }
}
