// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod edge;
pub mod media;
pub mod post;
pub mod user;

pub use edge::{Edge, EdgeKind};
pub use media::Media;
pub use post::{Comment, Post};
pub use user::User;

/// Generate a fresh row id. IDs are always server-generated, never
/// client-supplied.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
