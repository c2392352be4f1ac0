pub mod cart;
pub mod checkout;
pub mod domain;
pub mod ports;
pub mod pricing;
pub mod validate;

pub use cart::{Cart, CartLine, CartStorage, MemoryStorage, ProductSnapshot, CART_STORAGE_KEY};
pub use domain::{
    Category, Order, OrderLine, OrderStatus, PaymentMethod, Product, Role, ShippingAddress, User,
    UserCredentials,
};
pub use ports::{
    AccountStore, CatalogStore, NewOrder, NewProduct, NewUser, OrderStore, PortError, PortResult,
    ProductPage, ProductQuery, ProductSort, ProductUpdate,
};
