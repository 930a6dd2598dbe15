pub mod cart;
pub mod orders;
pub mod payments;
pub mod products_admin;
