// SPDX-License-Identifier: MIT

//! External-platform adapters and the session codec.

pub mod auth;
pub mod firebase;
pub mod session;
pub mod telegram;
pub mod vk;

pub use auth::AuthService;
pub use firebase::FirebaseAuthProvider;
pub use session::SessionCodec;
pub use telegram::TelegramClient;
pub use vk::VkClient;
