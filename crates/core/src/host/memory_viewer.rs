//! In-memory viewer library
//!
//! Counts loads, constructions and teardowns so callers can check that no
//! viewer outlives its panel. An instance dropped without `destroy` stays
//! counted as live.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::viewer::{ViewerBackend, ViewerInstance, ViewerSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    Ready,
    Fail,
    /// Load waits until [`MemoryViewerBackend::release`]
    Gated,
}

pub struct MemoryViewerBackend {
    mode: LoadMode,
    fail_construct: bool,
    gate: Notify,
    loads: Cell<usize>,
    constructed: Cell<usize>,
    live: Rc<Cell<usize>>,
    destroyed: Rc<Cell<usize>>,
    last_spec: RefCell<Option<ViewerSpec>>,
    last_container: RefCell<Option<String>>,
}

impl MemoryViewerBackend {
    fn with_mode(mode: LoadMode, fail_construct: bool) -> Self {
        Self {
            mode,
            fail_construct,
            gate: Notify::new(),
            loads: Cell::new(0),
            constructed: Cell::new(0),
            live: Rc::new(Cell::new(0)),
            destroyed: Rc::new(Cell::new(0)),
            last_spec: RefCell::new(None),
            last_container: RefCell::new(None),
        }
    }

    /// Library loads immediately and constructs succeed
    pub fn new() -> Self {
        Self::with_mode(LoadMode::Ready, false)
    }

    /// Library fetch fails
    pub fn failing_load() -> Self {
        Self::with_mode(LoadMode::Fail, false)
    }

    /// Library loads but every construction throws
    pub fn failing_construct() -> Self {
        Self::with_mode(LoadMode::Ready, true)
    }

    /// Library load stays in flight until released
    pub fn gated() -> Self {
        Self::with_mode(LoadMode::Gated, false)
    }

    /// Let a gated load finish
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn loads(&self) -> usize {
        self.loads.get()
    }

    pub fn constructed(&self) -> usize {
        self.constructed.get()
    }

    pub fn live(&self) -> usize {
        self.live.get()
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.get()
    }

    pub fn last_spec(&self) -> Option<ViewerSpec> {
        self.last_spec.borrow().clone()
    }

    pub fn last_container(&self) -> Option<String> {
        self.last_container.borrow().clone()
    }
}

impl Default for MemoryViewerBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl ViewerBackend for MemoryViewerBackend {
    async fn load(&self, script_url: &str, _stylesheet_url: &str) -> Result<()> {
        self.loads.set(self.loads.get() + 1);
        match self.mode {
            LoadMode::Ready => Ok(()),
            LoadMode::Fail => Err(Error::ViewerLoad(format!("failed to fetch {}", script_url))),
            LoadMode::Gated => {
                self.gate.notified().await;
                Ok(())
            }
        }
    }

    fn construct(&self, container_id: &str, spec: &ViewerSpec) -> Result<Box<dyn ViewerInstance>> {
        if self.fail_construct {
            return Err(Error::ViewerConstruct(format!(
                "container #{} rejected the viewer",
                container_id
            )));
        }
        self.constructed.set(self.constructed.get() + 1);
        self.live.set(self.live.get() + 1);
        *self.last_spec.borrow_mut() = Some(spec.clone());
        *self.last_container.borrow_mut() = Some(container_id.to_string());

        Ok(Box::new(MemoryViewer {
            live: self.live.clone(),
            destroyed: self.destroyed.clone(),
        }))
    }
}

struct MemoryViewer {
    live: Rc<Cell<usize>>,
    destroyed: Rc<Cell<usize>>,
}

impl ViewerInstance for MemoryViewer {
    fn destroy(self: Box<Self>) {
        self.live.set(self.live.get().saturating_sub(1));
        self.destroyed.set(self.destroyed.get() + 1);
    }
}
