//! Split layout
//!
//! While the details panel is open the rooms section is split into a list
//! pane and the panel. The list pane gets an explicit height so both panes
//! scroll independently under the sticky header. [`SplitLayoutEngine::enter`]
//! returns a [`SplitScope`]; dropping the scope undoes everything `enter`
//! did, including its listeners and observers.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::host::{ListenerHandle, ObservedElement, ObserverHandle, SplitHost, WindowHost};
use crate::invariants;

pub const STICKY_OFFSET_VAR: &str = "--sticky-offset";
pub const FILTERS_HEIGHT_VAR: &str = "--filters-h";

struct LayoutInner {
    split: Rc<dyn SplitHost>,
    window: Rc<dyn WindowHost>,
    sticky: Cell<f64>,
    filters: Cell<f64>,
    entered: Cell<bool>,
    frame_pending: Cell<bool>,
    recalc_pending: Cell<bool>,
}

impl LayoutInner {
    fn recalc(&self) {
        let sticky = self.split.header_height().unwrap_or(0.0);
        let filters = self.split.filter_bar_height().unwrap_or(0.0);
        self.sticky.set(sticky);
        self.filters.set(filters);
        self.split.set_layout_var(STICKY_OFFSET_VAR, Some(sticky.round() as i64));
        self.split.set_layout_var(FILTERS_HEIGHT_VAR, Some(filters.round() as i64));
    }

    fn target_height(&self) -> f64 {
        let available = self.window.viewport_height() - self.sticky.get();
        let panel = self.split.panel_height().round();
        (available.min(panel) - self.filters.get()).max(0.0)
    }

    fn sync_height(&self) {
        let target = self.target_height();
        invariants::assert_list_height_valid(target);
        self.split.set_list_height(Some(target));
    }

    fn restore_defaults(&self) {
        self.entered.set(false);
        self.recalc_pending.set(false);
        self.split.set_split(false);
        self.split.set_details_open(false);
        self.split.set_tab_strip_visible(true);
        self.split.set_layout_var(STICKY_OFFSET_VAR, None);
        self.split.set_layout_var(FILTERS_HEIGHT_VAR, None);
        self.split.set_list_height(None);
    }
}

/// Coalesce layout work into the next animation frame
fn schedule(inner: &Rc<LayoutInner>, recalc: bool) {
    if recalc {
        inner.recalc_pending.set(true);
    }
    if inner.frame_pending.replace(true) {
        return;
    }

    let weak = Rc::downgrade(inner);
    inner.window.request_frame(Box::new(move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.frame_pending.set(false);
        if !inner.entered.get() {
            return;
        }
        if inner.recalc_pending.replace(false) {
            inner.recalc();
        }
        inner.sync_height();
    }));
}

fn scheduler(inner: &Rc<LayoutInner>, recalc: bool) -> Rc<dyn Fn()> {
    let weak: Weak<LayoutInner> = Rc::downgrade(inner);
    Rc::new(move || {
        if let Some(inner) = weak.upgrade() {
            schedule(&inner, recalc);
        }
    })
}

pub struct SplitLayoutEngine {
    inner: Rc<LayoutInner>,
}

impl SplitLayoutEngine {
    pub fn new(split: Rc<dyn SplitHost>, window: Rc<dyn WindowHost>) -> Self {
        Self {
            inner: Rc::new(LayoutInner {
                split,
                window,
                sticky: Cell::new(0.0),
                filters: Cell::new(0.0),
                entered: Cell::new(false),
                frame_pending: Cell::new(false),
                recalc_pending: Cell::new(false),
            }),
        }
    }

    /// Switch to split mode until the returned scope is dropped
    pub fn enter(&self) -> SplitScope {
        let inner = &self.inner;
        if inner.entered.replace(true) {
            tracing::debug!("Split layout entered while already split");
        }

        inner.split.set_split(true);
        inner.split.set_details_open(true);
        inner.split.set_tab_strip_visible(false);
        inner.recalc();
        inner.sync_height();

        let resize = inner.window.add_resize_listener(scheduler(inner, true));
        let observers = vec![
            inner
                .split
                .observe_resize(ObservedElement::Panel, scheduler(inner, false)),
            inner
                .split
                .observe_resize(ObservedElement::FilterBar, scheduler(inner, true)),
        ];

        tracing::debug!(
            sticky = inner.sticky.get(),
            filters = inner.filters.get(),
            "Entered split layout"
        );

        SplitScope {
            inner: inner.clone(),
            resize: Some(resize),
            observers,
        }
    }

    /// Re-measure the header and filter bar
    pub fn recalc(&self) {
        self.inner.recalc();
    }

    pub fn sync_height(&self) {
        self.inner.sync_height();
    }

    /// Height the list pane would get right now
    pub fn target_height(&self) -> f64 {
        self.inner.target_height()
    }

    pub fn is_split(&self) -> bool {
        self.inner.entered.get()
    }

    /// Restore default layout without a scope (nothing was entered)
    pub fn reset(&self) {
        self.inner.restore_defaults();
    }
}

/// Live split layout; dropping it exits split mode
pub struct SplitScope {
    inner: Rc<LayoutInner>,
    resize: Option<ListenerHandle>,
    observers: Vec<ObserverHandle>,
}

impl SplitScope {
    pub fn exit(self) {}

    fn release(&mut self) {
        for observer in self.observers.drain(..) {
            self.inner.split.disconnect(observer);
        }
        if let Some(resize) = self.resize.take() {
            self.inner.window.remove_listener(resize);
        }
        self.inner.restore_defaults();
        tracing::debug!("Exited split layout");
    }
}

impl Drop for SplitScope {
    fn drop(&mut self) {
        self.release();
    }
}
