//! Identity projection for account holders.
//!
//! Authentication and identity resolution live outside this crate. The
//! resolver hands every operation a [`CallerContext`] built once from the
//! caller's token; services never re-derive roles from a username lookup.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type HolderId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountHolder {
    pub id: HolderId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl AccountHolder {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// Resolved caller identity passed into every core operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerContext {
    pub account_holder_id: HolderId,
    pub roles: Vec<Role>,
}

impl CallerContext {
    pub fn new(account_holder_id: HolderId, roles: Vec<Role>) -> Self {
        CallerContext {
            account_holder_id,
            roles,
        }
    }

    pub fn for_holder(holder: &AccountHolder) -> Self {
        CallerContext {
            account_holder_id: holder.id,
            roles: holder.roles.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}
