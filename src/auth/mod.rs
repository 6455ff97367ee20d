// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! # Authentication Module
//!
//! Session-token authentication for the campus wallet API.
//!
//! ## Auth Flow
//!
//! 1. The identity frontend authenticates the student against the
//!    university identity provider
//! 2. It mints an HS256 session token with the shared `SESSION_JWT_SECRET`
//! 3. The client sends `Authorization: Bearer <token>`
//! 4. This service verifies signature and expiry and extracts:
//!    - `sub` → canonical `user_id`
//!    - `university_id`, names, email → directory identity
//!    - `role` → authorization (`student` by default)
//!
//! ## Security
//!
//! - All non-health endpoints require authentication
//! - Identity and role are trusted as verified claims; this service does
//!   no password or credential checking of its own
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod roles;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use roles::Role;
