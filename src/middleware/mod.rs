// SPDX-License-Identifier: MIT

//! Request middleware.

pub mod auth;
pub mod rate_limit;
pub mod security;
