//! Section navigation
//!
//! Exactly one of home, rooms and FAQs is visible. The room list is painted
//! lazily on the first visit to rooms, and the details panel never stays
//! open behind a section that does not show it.

use std::cell::Cell;
use std::rc::Rc;

use crate::catalog::RoomCatalog;
use crate::host::{Section, SectionView};
use crate::listing::RoomListRenderer;
use crate::models::FilterState;
use crate::panel::DetailsPanel;

pub struct NavController {
    sections: Rc<dyn SectionView>,
    panel: Option<Rc<DetailsPanel>>,
    list: Option<Rc<RoomListRenderer>>,
    catalog: Rc<RoomCatalog>,
    filter: Rc<Cell<FilterState>>,
    current: Cell<Section>,
    rooms_painted: Cell<bool>,
}

impl NavController {
    pub fn new(
        sections: Rc<dyn SectionView>,
        panel: Option<Rc<DetailsPanel>>,
        list: Option<Rc<RoomListRenderer>>,
        catalog: Rc<RoomCatalog>,
        filter: Rc<Cell<FilterState>>,
    ) -> Self {
        Self {
            sections,
            panel,
            list,
            catalog,
            filter,
            current: Cell::new(Section::Home),
            rooms_painted: Cell::new(false),
        }
    }

    pub fn current(&self) -> Section {
        self.current.get()
    }

    /// Show the current section without any transition
    pub fn start(&self) {
        let section = self.current.get();
        self.sections.show_section(section);
        self.sections.mark_tab(section);
        if section == Section::Rooms {
            self.paint_rooms_once();
        }
    }

    pub fn navigate(&self, to: Section) {
        if to == self.current.get() {
            self.sections.mark_tab(to);
            return;
        }

        if to != Section::Rooms {
            if let Some(panel) = &self.panel {
                panel.close();
            }
        }

        self.sections.show_section(to);
        self.sections.mark_tab(to);
        self.current.set(to);
        tracing::info!(section = ?to, "Switched section");

        if to == Section::Rooms {
            self.paint_rooms_once();
        }
    }

    /// Next section in tab order, staying put at the end
    pub fn next(&self) {
        let index = self.current.get().index();
        if let Some(section) = Section::ORDER.get(index + 1) {
            self.navigate(*section);
        }
    }

    pub fn previous(&self) {
        let index = self.current.get().index();
        if index > 0 {
            self.navigate(Section::ORDER[index - 1]);
        }
    }

    fn paint_rooms_once(&self) {
        if self.rooms_painted.replace(true) {
            return;
        }
        if let Some(list) = &self.list {
            let filter = self.filter.get();
            list.render(self.catalog.filter(&filter));
        }
    }
}
