//! Domain models for the Saltbox API.

pub mod payment;
pub mod product;
pub mod session;
pub mod settings;

pub use payment::{CustomerInfo, OrderInfo, PaymentIntent, PaymentWithOrder};
pub use product::{ImageRef, Product, ProductImage, ProductPatch, ProductWithImages};
pub use session::{CurrentUser, session_keys};
pub use settings::{PublicSettings, Settings, SettingsPatch};
