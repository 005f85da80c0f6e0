pub mod home_controller;
pub mod auth_controller;
pub mod products_controller;
pub mod orders_controller;
