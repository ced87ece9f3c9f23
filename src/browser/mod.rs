//! Headless browser rendering
//!
//! Result pages are client-rendered, so they are loaded in Chromium and the
//! DOM is read back once the expected element shows up.

mod renderer;

pub use renderer::ChromeRenderer;
