//! Shared type definitions.

pub mod email;
pub mod id;
pub mod money;
pub mod reference;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{CartId, CartItemId, OrderId, ProductId, TransactionId, UserId};
pub use money::{Money, MoneyError};
pub use reference::{ReferenceId, ReferenceIdError};
pub use role::Role;
pub use status::{OrderStatus, TransactionStatus, TransactionType, WalletStatus};
