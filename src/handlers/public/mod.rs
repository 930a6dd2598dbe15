pub mod login;
pub mod products;
pub mod refresh;
pub mod register;
pub mod wishlist;

pub use login::login;
pub use products::{list_products, product_facets};
pub use refresh::refresh;
pub use register::register;
pub use wishlist::resolve_wishlist;
