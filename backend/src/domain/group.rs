//! Group and member identities as seen by the ledger.
//!
//! Groups and members are owned by an external group-management collaborator.
//! The ledger only reads a group's roster to confirm existence and membership.

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Access the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(value: ::uuid::Uuid) -> Self {
                Self(value)
            }
        }
    };
}

pub(crate) use define_uuid_id;

define_uuid_id! {
    /// Stable group identifier.
    GroupId
}

define_uuid_id! {
    /// Stable member identifier. A member belongs to exactly one group.
    MemberId
}

/// Group identity plus its ordered member list.
///
/// Members are ordered by the store (join order, then id) so that the default
/// participant set, and therefore remainder assignment, is reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRoster {
    group_id: GroupId,
    name: String,
    member_ids: Vec<MemberId>,
}

impl GroupRoster {
    /// Build a roster from a group and its ordered members.
    pub fn new(group_id: GroupId, name: impl Into<String>, member_ids: Vec<MemberId>) -> Self {
        Self {
            group_id,
            name: name.into(),
            member_ids,
        }
    }

    /// Group identifier.
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Display name of the group.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Members in roster order.
    pub fn member_ids(&self) -> &[MemberId] {
        &self.member_ids
    }

    /// True when the member belongs to this group.
    pub fn contains(&self, member_id: &MemberId) -> bool {
        self.member_ids.contains(member_id)
    }

    /// True when the group has no members.
    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}
