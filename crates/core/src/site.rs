//! Site wiring
//!
//! [`Site::mount`] builds every component the page has elements for and
//! connects them: card activation opens the panel, the close control and
//! Escape close it, and navigation closes it when the rooms section goes
//! away. Dropping the site removes every listener it registered.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::catalog::RoomCatalog;
use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::host::{
    InquiryFlow, Key, ListenerHandle, Page, PanelView, RoomListView, Section, SessionSource,
    WindowHost,
};
use crate::inquiry::InquiryLauncher;
use crate::layout::SplitLayoutEngine;
use crate::listing::RoomListRenderer;
use crate::models::{FilterState, Room};
use crate::nav::NavController;
use crate::panel::{DetailsPanel, PanelStatus};
use crate::resolver::MediaResolver;
use crate::viewer::{ViewerBackend, ViewerLifecycle};

/// Collaborators owned outside the page
pub struct SiteServices {
    pub config: SiteConfig,
    pub catalog: Rc<RoomCatalog>,
    pub viewer_backend: Rc<dyn ViewerBackend>,
    pub session: Rc<dyn SessionSource>,
    pub inquiry: Rc<dyn InquiryFlow>,
}

pub struct Site {
    config: SiteConfig,
    catalog: Rc<RoomCatalog>,
    window: Rc<dyn WindowHost>,
    list_view: Option<Rc<dyn RoomListView>>,
    list: Option<Rc<RoomListRenderer>>,
    panel_view: Option<Rc<dyn PanelView>>,
    panel: Option<Rc<DetailsPanel>>,
    nav: Option<NavController>,
    filter: Rc<Cell<FilterState>>,
    close_listener: Option<ListenerHandle>,
    key_listener: Option<ListenerHandle>,
}

impl Site {
    pub fn mount(page: &dyn Page, services: SiteServices) -> Self {
        let SiteServices {
            config,
            catalog,
            viewer_backend,
            session,
            inquiry,
        } = services;

        let window = page.window();
        let resolver = MediaResolver::new(config.fallback_media.clone());
        let list_view = page.room_list();
        let list = list_view
            .clone()
            .map(|view| RoomListRenderer::new(view, catalog.clone(), resolver.clone()));
        let layout = page
            .split()
            .map(|split| SplitLayoutEngine::new(split, window.clone()));

        let panel_view = page.panel();
        let panel = panel_view.clone().map(|view| {
            let viewer = Rc::new(ViewerLifecycle::new(
                viewer_backend,
                view.clone(),
                config.viewer.clone(),
                config.base_url.clone(),
                config.fallback_media.clone(),
            ));
            DetailsPanel::new(
                view,
                window.clone(),
                list_view.clone(),
                layout,
                viewer,
                resolver,
                Rc::new(InquiryLauncher::new(session, inquiry)),
            )
        });

        let mut close_listener = None;
        let mut key_listener = None;
        if let Some(panel) = &panel {
            if let Some(list) = &list {
                let target = Rc::downgrade(panel);
                list.bind_activation(Rc::new(move |room: &Room, card: &str| {
                    if let Some(panel) = target.upgrade() {
                        panel.open(room, Some(card));
                    }
                }));
            }

            let target = Rc::downgrade(panel);
            close_listener = panel_view
                .as_ref()
                .map(|view| view.add_close_listener(close_callback(target.clone())));
            key_listener = Some(window.add_key_listener(Rc::new(move |key: &Key| {
                if let Some(panel) = target.upgrade() {
                    panel.handle_key(key);
                }
            })));
        }

        let filter = Rc::new(Cell::new(FilterState::default()));
        let nav = page.sections().map(|sections| {
            NavController::new(
                sections,
                panel.clone(),
                list.clone(),
                catalog.clone(),
                filter.clone(),
            )
        });
        match &nav {
            Some(nav) => nav.start(),
            // A rooms page without section tabs paints straight away
            None => {
                if let Some(list) = &list {
                    list.render(catalog.all());
                }
            }
        }

        tracing::info!(
            rooms = catalog.len(),
            list = list.is_some(),
            panel = panel.is_some(),
            nav = nav.is_some(),
            "Mounted site"
        );

        Self {
            config,
            catalog,
            window,
            list_view,
            list,
            panel_view,
            panel,
            nav,
            filter,
            close_listener,
            key_listener,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Rc<RoomCatalog> {
        &self.catalog
    }

    pub fn panel(&self) -> Option<&Rc<DetailsPanel>> {
        self.panel.as_ref()
    }

    pub fn panel_status(&self) -> PanelStatus {
        self.panel
            .as_ref()
            .map_or(PanelStatus::Closed, |panel| panel.status())
    }

    /// Live panorama/tour viewers (0 or 1)
    pub fn live_viewers(&self) -> usize {
        self.panel
            .as_ref()
            .map_or(0, |panel| panel.viewer().live_instances())
    }

    pub fn filter(&self) -> FilterState {
        self.filter.get()
    }

    /// Re-render the list for a new filter; unchanged filters are ignored
    pub fn set_filter(&self, filter: FilterState) {
        if self.filter.get() == filter {
            return;
        }
        self.filter.set(filter);
        let rooms = self.catalog.filter(&filter);
        tracing::debug!(filter = ?filter, matches = rooms.len(), "Applying room filter");
        if let Some(list) = &self.list {
            list.render(rooms);
        }
    }

    pub fn availability_label(&self) -> &'static str {
        self.filter.get().availability_label()
    }

    pub fn current_section(&self) -> Option<Section> {
        self.nav.as_ref().map(NavController::current)
    }

    pub fn navigate(&self, to: Section) {
        if let Some(nav) = &self.nav {
            nav.navigate(to);
        }
    }

    pub fn next_section(&self) {
        if let Some(nav) = &self.nav {
            nav.next();
        }
    }

    pub fn previous_section(&self) {
        if let Some(nav) = &self.nav {
            nav.previous();
        }
    }

    /// Open a room by id, as if its card had been activated
    pub fn open_room(&self, id: &str) -> Result<()> {
        let panel = self
            .panel
            .as_ref()
            .ok_or_else(|| Error::NotFound("details panel".to_string()))?;
        let room = self
            .catalog
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("room {}", id)))?;
        let source = self
            .list_view
            .as_ref()
            .filter(|view| view.has_card(id))
            .map(|_| id);
        panel.open(room, source);
        Ok(())
    }

    pub fn close_panel(&self) {
        if let Some(panel) = &self.panel {
            panel.close();
        }
    }
}

fn close_callback(target: Weak<DetailsPanel>) -> Rc<dyn Fn()> {
    Rc::new(move || {
        if let Some(panel) = target.upgrade() {
            panel.close();
        }
    })
}

impl Drop for Site {
    fn drop(&mut self) {
        if let (Some(view), Some(handle)) = (&self.panel_view, self.close_listener.take()) {
            view.remove_listener(handle);
        }
        if let Some(handle) = self.key_listener.take() {
            self.window.remove_listener(handle);
        }
        // The nav holds the last other references to the panel and list
        self.nav = None;
        if let Some(panel) = self.panel.take() {
            panel.close();
        }
    }
}
