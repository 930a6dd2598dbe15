pub mod cart_item;
pub mod order;
pub mod product;
pub mod user;

pub use cart_item::CartItem;
pub use order::Order;
pub use product::Product;
pub use user::User;
