// SPDX-License-Identifier: MIT

//! Business services.

pub mod feed;
pub mod token;

pub use token::{TokenService, TOKEN_EPOCH};
