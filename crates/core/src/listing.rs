//! Room list rendering and delegated activation
//!
//! The list container gets exactly one click listener and one keydown
//! listener for its whole lifetime, however often the list is re-rendered.
//! Each card carries a denormalized copy of its room so an activation can
//! still be served when the catalog lookup by id misses.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::catalog::RoomCatalog;
use crate::host::{ListClick, ListKey, ListenerHandle, RoomListView};
use crate::models::Room;
use crate::resolver::MediaResolver;

/// Availability badge of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardStatus {
    Available,
    Occupied,
}

impl CardStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::Available => "Available",
            CardStatus::Occupied => "Occupied",
        }
    }

    /// Style class
    pub fn class(&self) -> &'static str {
        match self {
            CardStatus::Available => "available",
            CardStatus::Occupied => "occupied",
        }
    }
}

/// View model of one list card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomCard {
    pub id: String,
    /// Fallback copy of the room
    pub snapshot: Room,
    pub aria_label: String,
    pub cover: String,
    pub type_label: &'static str,
    pub price_label: String,
    pub occupancy_label: String,
    pub status: CardStatus,
}

impl RoomCard {
    pub fn new(room: &Room, resolver: &MediaResolver) -> Self {
        let status = if room.is_available() {
            CardStatus::Available
        } else {
            CardStatus::Occupied
        };
        Self {
            id: room.id.clone(),
            snapshot: room.clone(),
            aria_label: format!("{} details", room.name),
            cover: resolver.cover_of_first(&room.images),
            type_label: room.room_type.card_label(),
            price_label: format_price(room.price),
            occupancy_label: format!("{} / {}", room.occupancy, room.capacity),
            status,
        }
    }
}

/// Price with a peso sign and thousands separators
pub fn format_price(price: u32) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('₱');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Called with the activated room and the id of the card it came from
pub type ActivationHandler = Rc<dyn Fn(&Room, &str)>;

pub struct RoomListRenderer {
    view: Rc<dyn RoomListView>,
    catalog: Rc<RoomCatalog>,
    resolver: MediaResolver,
    /// Card view models memoized by room id
    cards: RefCell<HashMap<String, RoomCard>>,
    handler: RefCell<Option<ActivationHandler>>,
    listeners: Cell<Option<(ListenerHandle, ListenerHandle)>>,
    me: Weak<RoomListRenderer>,
}

impl RoomListRenderer {
    pub fn new(
        view: Rc<dyn RoomListView>,
        catalog: Rc<RoomCatalog>,
        resolver: MediaResolver,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            view,
            catalog,
            resolver,
            cards: RefCell::new(HashMap::new()),
            handler: RefCell::new(None),
            listeners: Cell::new(None),
            me: me.clone(),
        })
    }

    fn card_for(&self, room: &Room) -> RoomCard {
        self.cards
            .borrow_mut()
            .entry(room.id.clone())
            .or_insert_with(|| RoomCard::new(room, &self.resolver))
            .clone()
    }

    /// Replace the list contents with one card per room
    pub fn render<'a>(&self, rooms: impl IntoIterator<Item = &'a Room>) {
        let cards: Vec<RoomCard> = rooms.into_iter().map(|room| self.card_for(room)).collect();
        tracing::debug!(count = cards.len(), "Rendering room list");
        self.view.replace_cards(&cards);
    }

    /// Install the activation handler. The delegated listeners are
    /// registered on the first call only; later calls swap the handler.
    pub fn bind_activation(&self, handler: ActivationHandler) {
        *self.handler.borrow_mut() = Some(handler);
        if self.listeners.get().is_some() {
            return;
        }

        let me = self.me.clone();
        let click = self.view.add_click_listener(Rc::new(move |event: &ListClick| {
            if let (Some(list), Some(card)) = (me.upgrade(), event.card.as_ref()) {
                list.activate(card);
            }
        }));

        let me = self.me.clone();
        let keydown = self.view.add_keydown_listener(Rc::new(move |event: &ListKey| {
            if !event.key.activates() {
                return;
            }
            if let (Some(list), Some(card)) = (me.upgrade(), event.card.as_ref()) {
                list.activate(card);
            }
        }));

        self.listeners.set(Some((click, keydown)));
    }

    pub fn is_bound(&self) -> bool {
        self.listeners.get().is_some()
    }

    fn activate(&self, card: &RoomCard) {
        let room = match self.catalog.get(&card.id) {
            Some(room) => room.clone(),
            None => {
                tracing::debug!(room_id = %card.id, "Room missing from catalog; using card snapshot");
                card.snapshot.clone()
            }
        };
        let handler = self.handler.borrow().clone();
        if let Some(handler) = handler {
            handler(&room, &card.id);
        }
    }
}

impl Drop for RoomListRenderer {
    fn drop(&mut self) {
        if let Some((click, keydown)) = self.listeners.take() {
            self.view.remove_listener(click);
            self.view.remove_listener(keydown);
        }
    }
}
