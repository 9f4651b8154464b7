//! Headless preview of the site
//!
//! Mounts the site on the in-memory page, replays a walkthrough and records
//! what the page looks like after every step.

use std::cell::RefCell;
use std::rc::Rc;

use cazza_core::host::memory::MemoryPage;
use cazza_core::host::memory_viewer::MemoryViewerBackend;
use cazza_core::host::{InquiryFlow, Key, SessionSource};
use cazza_core::{
    Error, FilterState, InquiryDraft, InquiryRequest, PanelStatus, Result, RoomCatalog, Section,
    SiteConfig, Site, SiteServices, UserProfile,
};
use serde::Serialize;

use crate::walkthrough::{Step, Walkthrough};

/// Scheduler turns granted to spawned viewer tasks after each step
const SETTLE_TURNS: usize = 8;

struct VisitorSession(Option<UserProfile>);

impl SessionSource for VisitorSession {
    fn current_user(&self) -> Option<UserProfile> {
        self.0.clone()
    }
}

/// Inquiry dialog stand-in: picks the earliest allowed date and submits
#[derive(Default)]
pub struct PreviewInquiries {
    submitted: RefCell<Vec<InquiryRequest>>,
    sign_in_prompts: RefCell<usize>,
}

impl PreviewInquiries {
    pub fn submitted(&self) -> Vec<InquiryRequest> {
        self.submitted.borrow().clone()
    }

    pub fn sign_in_prompts(&self) -> usize {
        *self.sign_in_prompts.borrow()
    }
}

impl InquiryFlow for PreviewInquiries {
    fn open_inquiry(&self, mut draft: InquiryDraft) {
        draft.date = draft.min_date.format("%Y-%m-%d").to_string();
        match draft.into_request() {
            Ok(request) => {
                tracing::info!(
                    id = %request.id,
                    room_id = %request.room_id,
                    date = %request.date,
                    "Inquiry submitted"
                );
                self.submitted.borrow_mut().push(request);
            }
            Err(e) => tracing::warn!(error = %e, "Inquiry rejected"),
        }
    }

    fn prompt_sign_in(&self) {
        tracing::info!("Visitor asked to sign in");
        *self.sign_in_prompts.borrow_mut() += 1;
    }
}

/// Page state after one step
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub step: usize,
    pub action: &'static str,
    pub section: Option<Section>,
    pub availability: &'static str,
    pub cards: Vec<String>,
    pub active_cards: Vec<String>,
    pub open_room: Option<String>,
    pub media_index: Option<usize>,
    pub hero: Option<String>,
    pub live_viewers: usize,
    pub split: bool,
    pub list_height: Option<f64>,
    pub inquiries: usize,
}

pub struct Preview {
    page: MemoryPage,
    backend: Rc<MemoryViewerBackend>,
    inquiries: Rc<PreviewInquiries>,
    site: Site,
}

impl Preview {
    pub fn mount(config: SiteConfig, catalog: RoomCatalog, visitor: Option<UserProfile>) -> Self {
        let page = MemoryPage::new();
        let backend = Rc::new(MemoryViewerBackend::new());
        let inquiries = Rc::new(PreviewInquiries::default());
        let site = Site::mount(
            &page,
            SiteServices {
                config,
                catalog: Rc::new(catalog),
                viewer_backend: backend.clone(),
                session: Rc::new(VisitorSession(visitor)),
                inquiry: inquiries.clone(),
            },
        );
        Self {
            page,
            backend,
            inquiries,
            site,
        }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn inquiries(&self) -> &PreviewInquiries {
        &self.inquiries
    }

    /// Replay every step; must run inside a `LocalSet`
    pub async fn run(&self, walkthrough: &Walkthrough) -> Result<Vec<Snapshot>> {
        let mut snapshots = Vec::with_capacity(walkthrough.steps.len());
        for (index, step) in walkthrough.steps.iter().enumerate() {
            self.apply(step)?;
            settle().await;

            let snapshot = self.snapshot(index + 1, step.name());
            tracing::info!(
                step = snapshot.step,
                action = snapshot.action,
                state = %serde_json::to_string(&snapshot)?,
                "Step applied"
            );
            snapshots.push(snapshot);
        }

        tracing::info!(
            steps = snapshots.len(),
            viewers_built = self.backend.constructed(),
            viewer_loads = self.backend.loads(),
            inquiries = self.inquiries.submitted().len(),
            "Walkthrough finished"
        );
        Ok(snapshots)
    }

    fn apply(&self, step: &Step) -> Result<()> {
        match step {
            Step::Navigate { section } => {
                let section = Section::from_name(section)
                    .ok_or_else(|| Error::Validation(format!("unknown section {}", section)))?;
                self.site.navigate(section);
            }
            Step::Next => self.site.next_section(),
            Step::Previous => self.site.previous_section(),
            Step::Filter {
                selected_type,
                available_only,
            } => self
                .site
                .set_filter(FilterState::new(*selected_type, *available_only)),
            Step::Open { room } => {
                if self.page.state().cards.iter().any(|card| &card.id == room) {
                    self.page.click_card(room);
                } else {
                    self.site.open_room(room)?;
                }
            }
            Step::Thumbnail { index } => self.page.click_thumbnail(*index),
            Step::Close => self.page.click_close(),
            Step::Key { key, card } => match card {
                Some(card) => self.page.key_on_card(card, Key::from_dom(key)),
                None => self.page.press_key(Key::from_dom(key)),
            },
            Step::Resize { viewport } => {
                self.page.resize_viewport(*viewport);
                self.page.run_frames();
            }
            Step::ResizePanel { height } => {
                self.page.resize_panel(*height);
                self.page.run_frames();
            }
            Step::Inquire => self.page.click_cta(),
        }
        Ok(())
    }

    pub fn snapshot(&self, step: usize, action: &'static str) -> Snapshot {
        let state = self.page.state();
        let (open_room, media_index) = match self.site.panel_status() {
            PanelStatus::Open {
                room_id,
                media_index,
            } => (Some(room_id), Some(media_index)),
            PanelStatus::Closed => (None, None),
        };

        Snapshot {
            step,
            action,
            section: self.site.current_section(),
            availability: self.site.availability_label(),
            cards: state.cards.iter().map(|card| card.id.clone()).collect(),
            active_cards: state.active_cards.iter().cloned().collect(),
            open_room,
            media_index,
            hero: state.hero_visible.then(|| state.hero_src.clone()).flatten(),
            live_viewers: self.site.live_viewers(),
            split: state.split,
            list_height: state.list_height,
            inquiries: self.inquiries.submitted().len(),
        }
    }
}

async fn settle() {
    for _ in 0..SETTLE_TURNS {
        tokio::task::yield_now().await;
    }
}
