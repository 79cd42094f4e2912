//! Business logic services for the shop.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `cart` - Durable cart mutations behind the revision guard
//! - `wallet` - Balance reads and the transactional credit/debit path
//! - `checkout` - The single-transaction cart-to-order conversion

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod wallet;
