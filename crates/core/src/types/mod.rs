//! Shared type definitions.

pub mod catalog;
pub mod id;
pub mod money;
pub mod status;

pub use catalog::{Category, ClothingType, Size, SizeStock, SizeStockError};
pub use id::{AddressId, CartId, OrderId, ProductId, UserId};
pub use money::{Money, MoneyParseError};
pub use status::OrderStatus;
