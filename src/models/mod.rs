pub mod user;
pub mod product;
pub mod order;

pub use user::{CurrentUser, User};
pub use product::Product;
pub use order::Order;
