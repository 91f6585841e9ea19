//! Browser automation engine for JavaScript-rendered job boards.
//!
//! One shared headless Chromium process, with a scoped page per adapter
//! call and a randomized desktop fingerprint on every page.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;

pub use actions::BrowserActions;
pub use engine::{BrowserEngine, PageSession};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
