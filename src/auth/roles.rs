// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - mint, treasury and exemption management, stats
/// - `Student` - own wallet, transfers, purchases, history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Normal student user (owns one custodial wallet)
    Student,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::Student, Role::Student) => true,
            _ => false,
        }
    }

    /// Parse role from string (case-insensitive). Used when extracting
    /// roles from session token claims.
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl Default for Role {
    /// Default role is Student (least privilege for authenticated users).
    fn default() -> Self {
        Role::Student
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Student => write!(f, "student"),
        }
    }
}
