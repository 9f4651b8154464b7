//! Cazza Core Library
//!
//! Room catalog, list rendering, the details panel with its media viewer,
//! split layout and section navigation for the Cazza Residence site. The
//! page itself is reached only through the capability traits in [`host`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod host;
pub mod inquiry;
pub mod invariants;
pub mod layout;
pub mod listing;
pub mod models;
pub mod nav;
pub mod panel;
pub mod resolver;
pub mod site;
pub mod viewer;

pub use catalog::RoomCatalog;
pub use config::{SiteConfig, ViewerConfig};
pub use error::{Error, Result};
pub use host::{Page, Section};
pub use inquiry::{InquiryDraft, InquiryRequest};
pub use layout::{SplitLayoutEngine, SplitScope};
pub use listing::{RoomCard, RoomListRenderer};
pub use models::*;
pub use nav::NavController;
pub use panel::{DetailsPanel, PanelStatus};
pub use resolver::MediaResolver;
pub use site::{Site, SiteServices};
pub use viewer::{ViewerBackend, ViewerLifecycle};
