//! Extend module - compose automation objects with extra behaviour
//!
//! Extended browsers, contexts and pages keep the full surface of the object
//! they wrap and add image-based interactions on top.

mod browser;
mod delegate;
mod page;

pub use browser::{extend, ExtendedBrowser, ExtendedContext};
pub use delegate::Extended;
pub use page::ExtendedPage;
