//! Screens, one per route
//!
//! Screens own their view state and translate keys into [`Action`]s. The
//! [`App`](crate::App) runs the actions (network requests, navigation) and
//! feeds results back into the screen.

pub mod generate;
pub mod landing;
pub mod login;
pub mod preview;
pub mod pricing;

pub use generate::GenerateScreen;
pub use landing::LandingScreen;
pub use login::LoginScreen;
pub use preview::PreviewScreen;
pub use pricing::PricingScreen;

use crate::theme::Palette;
use ratatui::text::Span;
use sitegen_core::Route;
use std::time::Instant;

/// Something a screen wants the app to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Navigate(Route),
    /// Go to pricing, remembering the current screen as the return path
    OpenPricing,
    SignIn(String),
    Analyze,
    Generate,
    OpenEdit,
    SubmitEdit,
    CloseEdit,
    Purchase(&'static str),
    CopyCode,
    Download,
    OpenInBrowser,
}

/// Read-only data every screen may draw
pub struct RenderContext<'a> {
    pub palette: &'a Palette,
    pub balance: u64,
    pub spinner: Span<'static>,
    pub now: Instant,
}
