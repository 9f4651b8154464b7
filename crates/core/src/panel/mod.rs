//! Room details panel
//!
//! Opening a room populates the panel, starts its first media item, enters
//! split layout and moves focus to the close control. Closing undoes all of
//! it. Opening while already open runs the full close teardown first, so
//! listeners, observers and viewers never stack.

mod summary;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub use summary::{CtaState, OccupancyBar, PanelSummary, Thumbnail};

use crate::host::{Key, ListenerHandle, PanelView, RoomListView, WindowHost};
use crate::inquiry::InquiryLauncher;
use crate::invariants;
use crate::layout::{SplitLayoutEngine, SplitScope};
use crate::models::{MediaItem, Room};
use crate::resolver::MediaResolver;
use crate::viewer::ViewerLifecycle;

/// Observable panel state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelStatus {
    Closed,
    Open { room_id: String, media_index: usize },
}

struct OpenPanel {
    room: Room,
    media: Vec<MediaItem>,
    thumbnails: Vec<Thumbnail>,
    media_index: usize,
    source_card: Option<String>,
    thumb_listener: ListenerHandle,
    split: Option<SplitScope>,
}

pub struct DetailsPanel {
    view: Rc<dyn PanelView>,
    window: Rc<dyn WindowHost>,
    list: Option<Rc<dyn RoomListView>>,
    layout: Option<SplitLayoutEngine>,
    viewer: Rc<ViewerLifecycle>,
    resolver: MediaResolver,
    inquiry: Rc<InquiryLauncher>,
    open: RefCell<Option<OpenPanel>>,
    me: Weak<DetailsPanel>,
}

impl DetailsPanel {
    pub fn new(
        view: Rc<dyn PanelView>,
        window: Rc<dyn WindowHost>,
        list: Option<Rc<dyn RoomListView>>,
        layout: Option<SplitLayoutEngine>,
        viewer: Rc<ViewerLifecycle>,
        resolver: MediaResolver,
        inquiry: Rc<InquiryLauncher>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            view,
            window,
            list,
            layout,
            viewer,
            resolver,
            inquiry,
            open: RefCell::new(None),
            me: me.clone(),
        })
    }

    pub fn status(&self) -> PanelStatus {
        match self.open.borrow().as_ref() {
            Some(open) => PanelStatus::Open {
                room_id: open.room.id.clone(),
                media_index: open.media_index,
            },
            None => PanelStatus::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.borrow().is_some()
    }

    /// Room currently shown, if any
    pub fn room(&self) -> Option<Room> {
        self.open.borrow().as_ref().map(|open| open.room.clone())
    }

    pub fn viewer(&self) -> &Rc<ViewerLifecycle> {
        &self.viewer
    }

    pub fn open(&self, room: &Room, source_card: Option<&str>) {
        let previous = self.open.borrow_mut().take();
        if let Some(previous) = previous {
            self.teardown(previous, false);
        }
        tracing::debug!(room_id = %room.id, source = ?source_card, "Opening details panel");

        self.view.set_title(&room.name);
        self.view.set_summary(&PanelSummary::for_room(room));

        let cta = CtaState::for_room(room);
        self.view.set_cta(&cta);
        let launcher = self.inquiry.clone();
        let target = room.clone();
        let enabled = cta.enabled;
        self.view.set_cta_action(Some(Rc::new(move || {
            if enabled {
                launcher.launch(&target);
            }
        })));

        let media = self.resolver.normalize_all(&room.images);
        invariants::assert_media_invariants(&room.id, media.len());
        let thumbnails: Vec<Thumbnail> = media
            .iter()
            .enumerate()
            .map(|(i, item)| Thumbnail::new(i, item, self.resolver.cover_of(item)))
            .collect();
        self.display(&media[0]);
        self.view.set_thumbnails(&thumbnails);

        let me = self.me.clone();
        let thumb_listener = self.view.add_thumbnail_listener(Rc::new(move |index: usize| {
            if let Some(panel) = me.upgrade() {
                panel.select_media(index);
            }
        }));

        let source_card = source_card.map(str::to_string);
        self.view.set_grow_origin(self.grow_origin(source_card.as_deref()));
        if let (Some(list), Some(id)) = (&self.list, source_card.as_deref()) {
            list.set_card_active(id, true);
        }

        invariants::assert_thumbnail_invariants(&thumbnails, 0);
        *self.open.borrow_mut() = Some(OpenPanel {
            room: room.clone(),
            media,
            thumbnails,
            media_index: 0,
            source_card,
            thumb_listener,
            split: self.layout.as_ref().map(SplitLayoutEngine::enter),
        });

        self.view.set_open(true);
        self.view.focus_close();
    }

    pub fn close(&self) {
        let previous = self.open.borrow_mut().take();
        match previous {
            Some(open) => self.teardown(open, true),
            None => {
                if let Some(layout) = &self.layout {
                    layout.reset();
                }
            }
        }
    }

    /// Switch to another media item of the open room
    pub fn select_media(&self, index: usize) {
        let item = {
            let mut guard = self.open.borrow_mut();
            let Some(open) = guard.as_mut() else {
                return;
            };
            let Some(item) = open.media.get(index).cloned() else {
                tracing::debug!(index, count = open.media.len(), "Ignoring out-of-range media index");
                return;
            };
            open.media_index = index;
            for thumb in open.thumbnails.iter_mut() {
                thumb.active = thumb.index == index;
            }
            invariants::assert_thumbnail_invariants(&open.thumbnails, index);
            item
        };

        self.view.set_active_thumbnail(index);
        self.display(&item);
    }

    pub fn handle_key(&self, key: &Key) {
        if *key == Key::Escape && self.is_open() {
            self.close();
        }
    }

    fn display(&self, item: &MediaItem) {
        if let Some(task) = self.viewer.display(item.clone()) {
            self.window.spawn_local(task);
        }
    }

    /// Source card centre as document percentages
    fn grow_origin(&self, source_card: Option<&str>) -> Option<(f64, f64)> {
        let rect = self.list.as_ref()?.card_rect(source_card?)?;
        let doc = self.window.document_rect();
        if doc.width <= 0.0 || doc.height <= 0.0 {
            return None;
        }
        let (x, y) = rect.center();
        Some((
            (x - doc.left) / doc.width * 100.0,
            (y - doc.top) / doc.height * 100.0,
        ))
    }

    fn teardown(&self, open: OpenPanel, restore_focus: bool) {
        let OpenPanel {
            room,
            source_card,
            thumb_listener,
            split,
            ..
        } = open;

        self.viewer.destroy();
        self.view.set_pano_visible(false);
        self.view.set_hero_visible(true);
        self.view.set_grow_origin(None);
        self.view.set_cta_action(None);
        self.view.remove_listener(thumb_listener);
        self.view.set_open(false);

        if let (Some(list), Some(id)) = (&self.list, source_card.as_deref()) {
            list.set_card_active(id, false);
        }
        drop(split);

        if restore_focus {
            if let (Some(list), Some(id)) = (&self.list, source_card.as_deref()) {
                if list.has_card(id) {
                    list.focus_card(id);
                }
            }
        }
        tracing::debug!(room_id = %room.id, "Closed details panel");
    }
}

impl Drop for DetailsPanel {
    fn drop(&mut self) {
        let open = self.open.get_mut().take();
        if let Some(open) = open {
            self.teardown(open, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoomCatalog;
    use crate::config::ViewerConfig;
    use crate::host::memory::{Focus, ListenerKind, MemoryPage};
    use crate::host::memory_viewer::MemoryViewerBackend;
    use crate::host::{InquiryFlow, Page, SessionSource};
    use crate::inquiry::InquiryDraft;
    use crate::listing::RoomListRenderer;
    use crate::models::{FilterState, RoomType, TypeFilter, UserProfile};
    use serde_json::json;
    use std::cell::Cell;
    use tokio::task::LocalSet;

    struct Anonymous;

    impl SessionSource for Anonymous {
        fn current_user(&self) -> Option<UserProfile> {
            None
        }
    }

    #[derive(Default)]
    struct CountingFlow {
        inquiries: Cell<usize>,
        prompts: Cell<usize>,
    }

    impl InquiryFlow for CountingFlow {
        fn open_inquiry(&self, _draft: InquiryDraft) {
            self.inquiries.set(self.inquiries.get() + 1);
        }

        fn prompt_sign_in(&self) {
            self.prompts.set(self.prompts.get() + 1);
        }
    }

    struct Fixture {
        page: MemoryPage,
        backend: Rc<MemoryViewerBackend>,
        flow: Rc<CountingFlow>,
        catalog: Rc<RoomCatalog>,
        list: Rc<RoomListRenderer>,
        panel: Rc<DetailsPanel>,
    }

    fn fixture() -> Fixture {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::new());
        let flow = Rc::new(CountingFlow::default());
        let resolver = MediaResolver::new("pngs/placeholder.png");
        let catalog = Rc::new(RoomCatalog::fixtures());

        let viewer = Rc::new(ViewerLifecycle::new(
            backend.clone(),
            page.panel().unwrap(),
            ViewerConfig::default(),
            "https://cazza.test/",
            resolver.placeholder(),
        ));
        let panel = DetailsPanel::new(
            page.panel().unwrap(),
            page.window(),
            page.room_list(),
            Some(SplitLayoutEngine::new(page.split().unwrap(), page.window())),
            viewer,
            resolver.clone(),
            Rc::new(InquiryLauncher::new(Rc::new(Anonymous), flow.clone())),
        );
        let list = RoomListRenderer::new(page.room_list().unwrap(), catalog.clone(), resolver);
        list.render(catalog.all());

        Fixture {
            page,
            backend,
            flow,
            catalog,
            list,
            panel,
        }
    }

    impl Fixture {
        fn room(&self, id: &str) -> Room {
            self.catalog.get(id).unwrap().clone()
        }

        /// Let spawned viewer tasks run
        async fn settle(&self) {
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
        }
    }

    #[tokio::test]
    async fn test_open_populates_panel() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                f.panel.open(&f.room("R001"), Some("R001"));
                f.settle().await;

                let state = f.page.state();
                assert_eq!(state.title.as_deref(), Some("Room 001"));
                let summary = state.summary.unwrap();
                assert_eq!(summary.type_label, "Dorm");
                assert_eq!(summary.occupancy.percent, 50);
                assert_eq!(summary.occupancy.numbers, "2 / 4");
                assert!(state.cta.unwrap().enabled);
                assert_eq!(state.thumbnails[0].aria_label, "Media 1 - Tour");
                assert_eq!(state.active_thumbnail, Some(0));
                assert!(state.panel_open);
                assert!(state.split);
                assert_eq!(state.focus, Some(Focus::CloseControl));
                assert!(state.active_cards.contains("R001"));
                assert!(state.grow_origin.is_some());
                assert_eq!(f.backend.live(), 1);
                assert!(state.pano_visible);
                assert_eq!(
                    f.panel.status(),
                    PanelStatus::Open {
                        room_id: "R001".to_string(),
                        media_index: 0
                    }
                );
            })
            .await;
    }

    #[tokio::test]
    async fn test_grow_origin_is_card_centre() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                f.panel.open(&f.room("R002"), Some("R002"));
                // second card: left 24, top 360, 360x120 in a 1200x2400 document
                let (x, y) = f.page.state().grow_origin.unwrap();
                assert!((x - 17.0).abs() < 1e-9);
                assert!((y - 17.5).abs() < 1e-9);
            })
            .await;
    }

    #[tokio::test]
    async fn test_full_room_cta_disabled() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                f.panel.open(&f.room("S102"), Some("S102"));
                let cta = f.page.state().cta.unwrap();
                assert!(!cta.enabled);
                assert_eq!(cta.label, "Full");

                f.page.click_cta();
                assert_eq!(f.flow.prompts.get(), 0);

                f.panel.open(&f.room("S101"), Some("S101"));
                f.page.click_cta();
                assert_eq!(f.flow.prompts.get(), 1);
                assert_eq!(f.flow.inquiries.get(), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_close_tears_down() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                f.panel.open(&f.room("R001"), Some("R001"));
                f.settle().await;
                f.panel.close();

                let state = f.page.state();
                assert!(!state.panel_open);
                assert!(!state.split);
                assert!(state.tab_strip_visible);
                assert_eq!(state.list_height, None);
                assert!(state.active_cards.is_empty());
                assert!(!state.pano_visible);
                assert!(state.hero_visible);
                assert_eq!(state.grow_origin, None);
                assert_eq!(state.focus, Some(Focus::Card("R001".to_string())));
                assert_eq!(f.backend.live(), 0);
                assert_eq!(f.page.listener_count(ListenerKind::Thumbnail), 0);
                assert_eq!(f.page.listener_count(ListenerKind::WindowResize), 0);
                assert_eq!(f.page.observer_count(), 0);
                assert_eq!(f.panel.status(), PanelStatus::Closed);
            })
            .await;
    }

    #[tokio::test]
    async fn test_close_when_closed_is_harmless() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                f.panel.close();
                f.panel.close();
                assert!(!f.page.state().split);
                assert_eq!(f.page.state().focus, None);
            })
            .await;
    }

    #[tokio::test]
    async fn test_reopen_does_not_stack() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                for id in ["R001", "R002", "R001", "S101"] {
                    f.panel.open(&f.room(id), Some(id));
                    f.settle().await;
                    assert!(f.backend.live() <= 1);
                }
                assert_eq!(f.page.listener_count(ListenerKind::Thumbnail), 1);
                assert_eq!(f.page.listener_count(ListenerKind::WindowResize), 1);
                assert_eq!(f.page.observer_count(), 2);
                let state = f.page.state();
                assert_eq!(state.active_cards.len(), 1);
                assert!(state.active_cards.contains("S101"));
                assert_eq!(f.backend.live(), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_select_media_switches_viewer() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                f.panel.open(&f.room("R001"), Some("R001"));
                f.settle().await;
                assert_eq!(f.backend.live(), 1);

                f.page.click_thumbnail(1);
                let state = f.page.state();
                assert_eq!(state.active_thumbnail, Some(1));
                assert_eq!(state.thumbnails.iter().filter(|t| t.active).count(), 1);
                assert_eq!(f.backend.live(), 0);
                assert!(state.hero_visible);

                f.panel.select_media(99);
                assert_eq!(
                    f.panel.status(),
                    PanelStatus::Open {
                        room_id: "R001".to_string(),
                        media_index: 1
                    }
                );
            })
            .await;
    }

    #[tokio::test]
    async fn test_close_before_viewer_loads() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                f.panel.open(&f.room("R002"), Some("R002"));
                f.panel.close();
                f.settle().await;
                assert_eq!(f.backend.constructed(), 0);
                assert!(!f.page.state().pano_visible);
            })
            .await;
    }

    #[tokio::test]
    async fn test_escape_closes() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                f.panel.handle_key(&Key::Escape);
                f.panel.open(&f.room("S101"), Some("S101"));
                f.panel.handle_key(&Key::Enter);
                assert!(f.panel.is_open());
                f.panel.handle_key(&Key::Escape);
                assert!(!f.panel.is_open());
            })
            .await;
    }

    #[tokio::test]
    async fn test_room_without_images_shows_placeholder() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                let bare = Room::new("X1", RoomType::Studio, "Loft", 6000).with_images(vec![json!("")]);
                f.panel.open(&bare, None);
                let state = f.page.state();
                assert_eq!(state.hero_src.as_deref(), Some("pngs/placeholder.png"));
                assert_eq!(state.thumbnails.len(), 1);
                assert_eq!(state.grow_origin, None);
                assert!(state.active_cards.is_empty());

            })
            .await;
    }

    #[tokio::test]
    async fn test_close_skips_focus_when_card_gone() {
        LocalSet::new()
            .run_until(async {
                let f = fixture();
                f.panel.open(&f.room("R001"), Some("R001"));
                f.list.render(f.catalog.filter(&FilterState::new(TypeFilter::Studio, false)));
                f.panel.close();

                let state = f.page.state();
                assert!(!state.panel_open);
                assert_ne!(state.focus, Some(Focus::Card("R001".to_string())));
            })
            .await;
    }
}
