// SPDX-License-Identifier: MIT

//! Document store access.

pub mod mongo;

pub use mongo::MongoDb;

/// Collection names.
pub mod collections {
    pub const USER_CONFIGS: &str = "user_configs";
}
