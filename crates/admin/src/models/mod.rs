//! Domain models for the console.
//!
//! Repositories return these types; route handlers serialize them as
//! camelCase JSON.

pub mod analytics;
pub mod attribute;
pub mod billboard;
pub mod category;
pub mod client;
pub mod order;
pub mod product;
pub mod review;
pub mod store;
pub mod user;

pub use analytics::{DashboardStats, MonthlyRevenue, monthly_series};
pub use attribute::{Color, ColorInput, Size, SizeInput};
pub use billboard::{Billboard, BillboardInput};
pub use category::{Category, CategoryDetail, CategoryInput};
pub use client::{Client, PostalAddress};
pub use order::{CheckoutCompletion, CheckoutLine, FulfillmentOutcome, Order, OrderListing};
pub use product::{
    CategorySummary, Image, NewImage, Product, ProductDetail, ProductFilter, ProductInput,
    ProductListing,
};
pub use review::{Review, ReviewInput, ReviewWithProduct};
pub use store::{Store, StoreInput};
pub use user::CurrentUser;
