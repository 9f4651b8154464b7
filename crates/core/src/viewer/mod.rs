//! Viewer lifecycle
//!
//! Owns the single live panorama/tour viewer. Every `show_*` call starts by
//! destroying the current viewer, and `destroy` also bumps a display
//! generation: a show call still waiting for the library load compares its
//! generation when it resumes and gives up if something newer happened in
//! the meantime (another show, or the panel closing). That keeps the live
//! viewer count at zero or one no matter how calls interleave.

mod backend;
mod address;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use tokio::sync::OnceCell;

pub use backend::{ViewerBackend, ViewerInstance, ViewerSpec};
pub use address::{base_dir, resolve_url};

use crate::config::ViewerConfig;
use crate::host::{LocalTask, PanelView};
use crate::invariants;
use crate::models::{MediaItem, TourConfig};
use crate::resolver::poster_of_tour;

pub struct ViewerLifecycle {
    backend: Rc<dyn ViewerBackend>,
    panel: Rc<dyn PanelView>,
    config: ViewerConfig,
    base_url: String,
    placeholder: String,
    /// Load outcome, set once per page lifetime
    library: OnceCell<bool>,
    current: RefCell<Option<Box<dyn ViewerInstance>>>,
    generation: Cell<u64>,
}

impl ViewerLifecycle {
    pub fn new(
        backend: Rc<dyn ViewerBackend>,
        panel: Rc<dyn PanelView>,
        config: ViewerConfig,
        base_url: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            panel,
            config,
            base_url: base_url.into(),
            placeholder: placeholder.into(),
            library: OnceCell::new(),
            current: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    /// Load the library once; concurrent callers share the in-flight load.
    /// Returns whether the library is usable.
    pub async fn ensure_library_loaded(&self) -> bool {
        *self
            .library
            .get_or_init(|| async {
                match self
                    .backend
                    .load(&self.config.script_url, &self.config.stylesheet_url)
                    .await
                {
                    Ok(()) => {
                        tracing::debug!(script = %self.config.script_url, "Viewer library loaded");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Viewer library unavailable; showing still images");
                        false
                    }
                }
            })
            .await
    }

    /// `None` until the first load settles
    pub fn library_loaded(&self) -> Option<bool> {
        self.library.get().copied()
    }

    /// Number of viewers not yet destroyed (0 or 1)
    pub fn live_instances(&self) -> usize {
        usize::from(self.current.borrow().is_some())
    }

    /// Display any media item
    pub async fn show(&self, item: &MediaItem) {
        match item {
            MediaItem::Image { src } => self.show_image(src),
            MediaItem::Panorama { src } => self.show_panorama(src).await,
            MediaItem::Tour { poster, tour } => self.show_tour(poster, tour).await,
        }
    }

    pub fn show_image(&self, src: &str) {
        self.destroy();
        self.panel.set_pano_visible(false);
        self.panel.set_hero_source(src);
        self.panel.set_hero_visible(true);
    }

    pub async fn show_panorama(&self, src: &str) {
        let ticket = self.prepare();
        self.panorama_when_ready(ticket, src).await;
    }

    /// `poster` is the still shown when the viewer can't be built
    pub async fn show_tour(&self, poster: &str, tour: &TourConfig) {
        let ticket = self.prepare();
        self.tour_when_ready(ticket, poster, tour).await;
    }

    /// Start displaying `item`. The current viewer is torn down right away;
    /// for panoramas and tours the returned task finishes the job once the
    /// library is available and must be spawned by the caller.
    pub fn display(self: &Rc<Self>, item: MediaItem) -> Option<LocalTask> {
        match item {
            MediaItem::Image { src } => {
                self.show_image(&src);
                None
            }
            MediaItem::Panorama { src } => {
                let ticket = self.prepare();
                let viewer = self.clone();
                Some(Box::pin(async move {
                    viewer.panorama_when_ready(ticket, &src).await;
                }))
            }
            MediaItem::Tour { poster, tour } => {
                let ticket = self.prepare();
                let viewer = self.clone();
                Some(Box::pin(async move {
                    viewer.tour_when_ready(ticket, &poster, &tour).await;
                }))
            }
        }
    }

    /// Destroy the current viewer and take a ticket for the next one
    fn prepare(&self) -> u64 {
        self.destroy();
        self.generation.get()
    }

    async fn panorama_when_ready(&self, ticket: u64, src: &str) {
        let loaded = self.ensure_library_loaded().await;
        if self.generation.get() != ticket {
            tracing::debug!(src, "Panorama request superseded");
            return;
        }
        if !loaded {
            self.show_image(src);
            return;
        }

        let spec = ViewerSpec::Equirectangular {
            panorama: resolve_url(&self.base_url, src),
            hfov: self.config.hfov,
            show_zoom_ctrl: self.config.show_zoom_ctrl,
            cross_origin: self.config.cross_origin.clone(),
        };
        self.mount(&spec, src);
    }

    async fn tour_when_ready(&self, ticket: u64, poster: &str, tour: &TourConfig) {
        let still = Some(poster)
            .filter(|p| !p.trim().is_empty())
            .or_else(|| poster_of_tour(tour))
            .map(str::to_string)
            .unwrap_or_else(|| self.placeholder.clone());

        let loaded = self.ensure_library_loaded().await;
        if self.generation.get() != ticket {
            tracing::debug!("Tour request superseded");
            return;
        }
        if !loaded {
            self.show_image(&still);
            return;
        }

        let mut config = tour.as_map().clone();
        config.insert("basePath".to_string(), Value::String(base_dir(&self.base_url)));
        config.insert(
            "crossOrigin".to_string(),
            Value::String(self.config.cross_origin.clone()),
        );
        let spec = ViewerSpec::Tour {
            config: Value::Object(config),
        };
        self.mount(&spec, &still);
    }

    fn mount(&self, spec: &ViewerSpec, still: &str) {
        self.panel.set_hero_visible(false);
        self.panel.set_pano_visible(true);
        self.release_current();

        match self.backend.construct(&self.config.container_id, spec) {
            Ok(instance) => {
                *self.current.borrow_mut() = Some(instance);
                invariants::assert_viewer_invariants(self.live_instances());
            }
            Err(e) => {
                tracing::warn!(error = %e, still, "Viewer construction failed; showing still image");
                self.show_image(still);
            }
        }
    }

    /// Tear down the live viewer, if any, and invalidate pending shows
    pub fn destroy(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        self.release_current();
    }

    fn release_current(&self) {
        let instance = self.current.borrow_mut().take();
        if let Some(instance) = instance {
            instance.destroy();
            tracing::debug!("Viewer destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryPage;
    use crate::host::memory_viewer::MemoryViewerBackend;
    use crate::host::Page;
    use serde_json::json;
    use tokio::task::LocalSet;

    fn lifecycle(page: &MemoryPage, backend: &Rc<MemoryViewerBackend>) -> Rc<ViewerLifecycle> {
        Rc::new(ViewerLifecycle::new(
            backend.clone(),
            page.panel().unwrap(),
            ViewerConfig::default(),
            "https://cazza.test/site/index.html",
            "pngs/placeholder.png",
        ))
    }

    fn tour() -> TourConfig {
        TourConfig::from_value(&json!({
            "default": { "firstScene": "hall" },
            "scenes": { "hall": { "panorama": "pngs/hall.png", "hotSpots": [] } }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_destroy_without_instance_is_noop() {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::new());
        let viewer = lifecycle(&page, &backend);
        viewer.destroy();
        viewer.destroy();
        assert_eq!(viewer.live_instances(), 0);
        assert_eq!(backend.destroyed(), 0);
    }

    #[tokio::test]
    async fn test_panorama_resolves_absolute_url() {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::new());
        let viewer = lifecycle(&page, &backend);

        viewer.show_panorama("pngs/pano.jpg").await;
        assert_eq!(viewer.live_instances(), 1);
        assert_eq!(backend.live(), 1);

        let spec = backend.last_spec().unwrap();
        assert_eq!(spec.options()["panorama"], "https://cazza.test/site/pngs/pano.jpg");
        assert_eq!(spec.options()["type"], "equirectangular");
        assert_eq!(backend.last_container().as_deref(), Some("panoViewer"));
        assert!(page.state().pano_visible);
        assert!(!page.state().hero_visible);
    }

    #[tokio::test]
    async fn test_tour_gets_base_path() {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::new());
        let viewer = lifecycle(&page, &backend);

        viewer.show_tour("", &tour()).await;
        let options = backend.last_spec().unwrap().options();
        assert_eq!(options["basePath"], "https://cazza.test/site/");
        assert_eq!(options["crossOrigin"], "anonymous");
        assert_eq!(options["default"]["firstScene"], "hall");
    }

    #[tokio::test]
    async fn test_switching_media_keeps_one_viewer() {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::new());
        let viewer = lifecycle(&page, &backend);

        viewer.show_panorama("a.jpg").await;
        viewer.show_tour("", &tour()).await;
        assert_eq!(backend.live(), 1);
        assert_eq!(backend.destroyed(), 1);

        viewer.show_image("photo.png");
        assert_eq!(backend.live(), 0);
        assert_eq!(page.state().hero_src.as_deref(), Some("photo.png"));
        assert!(page.state().hero_visible);
        assert!(!page.state().pano_visible);
    }

    #[tokio::test]
    async fn test_load_failure_degrades_to_still() {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::failing_load());
        let viewer = lifecycle(&page, &backend);

        viewer.show_panorama("a.jpg").await;
        assert_eq!(viewer.library_loaded(), Some(false));
        assert_eq!(backend.live(), 0);
        assert_eq!(page.state().hero_src.as_deref(), Some("a.jpg"));

        viewer.show_tour("", &tour()).await;
        assert_eq!(page.state().hero_src.as_deref(), Some("pngs/hall.png"));
        assert_eq!(backend.loads(), 1);
    }

    #[tokio::test]
    async fn test_tour_without_poster_degrades_to_placeholder() {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::failing_load());
        let viewer = lifecycle(&page, &backend);

        viewer.show_tour("", &TourConfig::default()).await;
        assert_eq!(page.state().hero_src.as_deref(), Some("pngs/placeholder.png"));
    }

    #[tokio::test]
    async fn test_tour_failure_prefers_explicit_poster() {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::failing_load());
        let viewer = lifecycle(&page, &backend);
        let sceneless = TourConfig::from_value(&json!({ "scenes": { "a": {} } })).unwrap();

        viewer
            .show(&MediaItem::Tour {
                poster: "explicit.png".to_string(),
                tour: sceneless,
            })
            .await;
        assert_eq!(page.state().hero_src.as_deref(), Some("explicit.png"));

        viewer.show_tour("cover.png", &tour()).await;
        assert_eq!(page.state().hero_src.as_deref(), Some("cover.png"));
    }

    #[tokio::test]
    async fn test_construct_failure_degrades_to_still() {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::failing_construct());
        let viewer = lifecycle(&page, &backend);

        viewer.show_panorama("a.jpg").await;
        assert_eq!(viewer.library_loaded(), Some(true));
        assert_eq!(viewer.live_instances(), 0);
        assert_eq!(page.state().hero_src.as_deref(), Some("a.jpg"));
        assert!(page.state().hero_visible);
        assert!(!page.state().pano_visible);
    }

    #[tokio::test]
    async fn test_concurrent_shows_share_one_load() {
        LocalSet::new()
            .run_until(async {
                let page = MemoryPage::new();
                let backend = Rc::new(MemoryViewerBackend::gated());
                let viewer = lifecycle(&page, &backend);

                let first = viewer.clone();
                let a = tokio::task::spawn_local(async move { first.show_panorama("a.jpg").await });
                let second = viewer.clone();
                let b = tokio::task::spawn_local(async move { second.show_panorama("b.jpg").await });

                tokio::task::yield_now().await;
                assert_eq!(backend.loads(), 1);
                assert_eq!(backend.live(), 0);

                backend.release();
                a.await.unwrap();
                b.await.unwrap();

                assert_eq!(backend.loads(), 1);
                assert_eq!(backend.constructed(), 1);
                assert_eq!(backend.live(), 1);
                let spec = backend.last_spec().unwrap();
                assert_eq!(spec.options()["panorama"], "https://cazza.test/site/b.jpg");
            })
            .await;
    }

    #[tokio::test]
    async fn test_display_tears_down_before_task_runs() {
        LocalSet::new()
            .run_until(async {
                let page = MemoryPage::new();
                let backend = Rc::new(MemoryViewerBackend::new());
                let viewer = lifecycle(&page, &backend);

                viewer.show_panorama("a.jpg").await;
                assert_eq!(backend.live(), 1);

                // The old viewer goes away before the new task is even polled
                let task = viewer.display(MediaItem::Tour { poster: "p.png".into(), tour: tour() });
                assert_eq!(backend.live(), 0);

                // A later request wins over a task that never got to run
                assert!(viewer.display(MediaItem::image("still.png")).is_none());
                tokio::task::spawn_local(task.unwrap()).await.unwrap();
                assert_eq!(backend.constructed(), 1);
                assert_eq!(page.state().hero_src.as_deref(), Some("still.png"));
            })
            .await;
    }

    #[tokio::test]
    async fn test_destroy_cancels_pending_show() {
        LocalSet::new()
            .run_until(async {
                let page = MemoryPage::new();
                let backend = Rc::new(MemoryViewerBackend::gated());
                let viewer = lifecycle(&page, &backend);

                let pending = viewer.clone();
                let task = tokio::task::spawn_local(async move { pending.show_panorama("a.jpg").await });
                tokio::task::yield_now().await;

                viewer.destroy();
                backend.release();
                task.await.unwrap();

                assert_eq!(backend.constructed(), 0);
                assert_eq!(viewer.live_instances(), 0);
            })
            .await;
    }
}
