//! Bookpress - headless Minecraft book preview engine.
//!
//! A user types formatted book text; after each quiet period the text is
//! handed to an external page generator (a remote render service or an
//! embedded generation function) and the resulting image is drawn onto a
//! fixed-size page canvas. The crate provides the debounced, supersession-safe
//! synchronization between input and rendering; the formatting grammar and the
//! rasterizer live behind the [`ports::PageGenerator`] boundary.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use bookpress::adapters::live::RemoteGenerator;
//! use bookpress::session::{EditorSession, SessionConfig};
//!
//! # async fn demo() {
//! let generator = Arc::new(RemoteGenerator::new("https://books.example/render"));
//! let session = EditorSession::spawn(
//!     generator,
//!     SessionConfig { debounce_window: Duration::from_millis(300), initial_text: String::new() },
//! );
//!
//! session.set_input("&cHello &lworld");
//! session.drain().await;
//! let png = session.canvas_png().unwrap();
//! # let _ = png;
//! session.shutdown();
//! # }
//! ```

pub mod adapters;
pub mod canvas;
pub mod cassette;
pub mod config;
pub mod context;
pub mod debounce;
pub mod editor;
pub mod error;
pub mod output;
pub mod params;
pub mod ports;
pub mod render;
pub mod resource;
pub mod session;

pub use canvas::{PageCanvas, PAGE_HEIGHT, PAGE_WIDTH};
pub use context::ServiceContext;
pub use error::PreviewError;
pub use ports::{PageGenerator, PageImage, PageRequest};
pub use render::{RenderEvent, SkipReason};
pub use session::{EditorSession, SessionConfig};
