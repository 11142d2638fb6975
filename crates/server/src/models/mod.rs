//! Domain models shared by the data and route layers.
//!
//! These structs serialize directly into the API's JSON shapes; foreign keys
//! serialize as bare ids.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use cart::CartLine;
pub use catalog::{Category, MenuItem, NewMenuItem};
pub use order::{Order, OrderLine};
pub use user::{CurrentUser, User};
