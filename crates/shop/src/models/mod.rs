//! Domain models.
//!
//! These types represent validated domain objects separate from database row
//! types and wire DTOs.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;
pub mod wallet;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderItem, ShippingAddress};
pub use product::Product;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
pub use wallet::{WalletSnapshot, WalletSummary, WalletTransaction};
