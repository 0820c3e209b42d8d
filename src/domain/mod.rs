pub mod link;
pub mod quote;

pub use link::ProductId;
pub use quote::{ProductGroup, Quote, ResolvedPrice, Resolution, SelectionResult, NO_COUPON};
