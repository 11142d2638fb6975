//! Core types for Bistro.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod role;
pub mod slug;
pub mod status;
pub mod title;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use role::StaffGroup;
pub use slug::{Slug, SlugError};
pub use status::OrderStatus;
pub use title::{Title, TitleError};
