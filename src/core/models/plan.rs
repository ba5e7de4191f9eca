use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Owner => "OWNER",
            Role::Member => "MEMBER",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberStatus {
    Active,
    Left,
    Removed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanMember {
    pub user_id: Uuid,
    pub role: Role,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
}

impl PlanMember {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// A shared group context (trip or event). Plans are owned by the
/// surrounding platform; the ledger only reads active membership, the
/// owner and the activity references.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub currency: String,
    pub members: Vec<PlanMember>,
    pub activity_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn new(name: impl Into<String>, owner_id: Uuid, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Plan {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_id,
            currency: currency.into(),
            members: vec![PlanMember {
                user_id: owner_id,
                role: Role::Owner,
                status: MemberStatus::Active,
                joined_at: now,
            }],
            activity_ids: Vec::new(),
            created_at: now,
        }
    }

    pub fn add_member(&mut self, user_id: Uuid) {
        self.members.push(PlanMember {
            user_id,
            role: Role::Member,
            status: MemberStatus::Active,
            joined_at: Utc::now(),
        });
    }

    pub fn is_active_member(&self, user_id: Uuid) -> bool {
        self.members
            .iter()
            .any(|m| m.user_id == user_id && m.is_active())
    }

    pub fn active_member_ids(&self) -> Vec<Uuid> {
        self.members
            .iter()
            .filter(|m| m.is_active())
            .map(|m| m.user_id)
            .collect()
    }

    pub fn has_activity(&self, activity_id: Uuid) -> bool {
        self.activity_ids.contains(&activity_id)
    }
}
