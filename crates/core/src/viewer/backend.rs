//! Panorama library interface
//!
//! The core talks to the rendering library through three operations: load
//! it, construct a viewer bound to a container, and destroy that viewer.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::Result;

/// What to construct
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerSpec {
    /// Single equirectangular image
    Equirectangular {
        /// Absolute panorama URL
        panorama: String,
        hfov: f64,
        show_zoom_ctrl: bool,
        cross_origin: String,
    },
    /// Multi-scene tour; the scene graph is passed through untouched apart
    /// from `basePath` and `crossOrigin`
    Tour { config: Value },
}

impl ViewerSpec {
    /// Options object in the library's own format
    pub fn options(&self) -> Value {
        match self {
            ViewerSpec::Equirectangular {
                panorama,
                hfov,
                show_zoom_ctrl,
                cross_origin,
            } => json!({
                "type": "equirectangular",
                "panorama": panorama,
                "autoLoad": true,
                "showZoomCtrl": show_zoom_ctrl,
                "hfov": hfov,
                "crossOrigin": cross_origin,
            }),
            ViewerSpec::Tour { config } => config.clone(),
        }
    }
}

/// A live viewer bound to one container
pub trait ViewerInstance {
    fn destroy(self: Box<Self>);
}

/// The external panorama rendering library
#[async_trait(?Send)]
pub trait ViewerBackend {
    /// Fetch the library script and stylesheet
    async fn load(&self, script_url: &str, stylesheet_url: &str) -> Result<()>;

    /// Create a viewer in `container_id`
    fn construct(&self, container_id: &str, spec: &ViewerSpec) -> Result<Box<dyn ViewerInstance>>;
}
