//! The label service
//!
//! [`LabelService`] ties the registry, the context stack, a text renderer
//! and a clock together. Game code pushes a context when a screen opens,
//! adds labels by value, keeps the returned handles, and calls
//! [`draw_all`](LabelService::draw_all) / [`undraw_all`](LabelService::undraw_all)
//! around every presented frame:
//!
//! ```ignore
//! let mut labels = LabelService::new(BitmapFont::new(), SystemClock::new(), &config);
//! let _screen = labels.push_context();
//!
//! loop {
//!     render_world(&mut frame);
//!     labels.draw_all(&mut frame);
//!     present(&frame);
//!     labels.undraw_all(&mut frame);
//! }
//! ```
//!
//! Only the top context is ever drawn, undrawn or swept for expired labels.
//! Labels in lower contexts are frozen until their context is on top again.

use std::ops::{Deref, DerefMut};

use crate::clock::{Clock, SystemClock};
use crate::config::LabelConfig;
use crate::context::{ContextId, ContextStack};
use crate::label::{Anchor, FloatingLabel};
use crate::registry::{LabelHandle, LabelRegistry};
use crate::surface::{Rect, Surface};
use crate::text::TextRenderer;

pub struct LabelService<S, R, C = SystemClock> {
    registry: LabelRegistry<S>,
    contexts: ContextStack,
    renderer: R,
    clock: C,
    /// Clip rectangle for labels added without one
    viewport: Rect,
}

impl<S: Surface, R: TextRenderer<S>, C: Clock> LabelService<S, R, C> {
    pub fn new(renderer: R, clock: C, config: &LabelConfig) -> Self {
        LabelService {
            registry: LabelRegistry::new(),
            contexts: ContextStack::new(),
            renderer,
            clock,
            viewport: config.viewport(),
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ======================================================================
    // Labels
    // ======================================================================

    /// Registers a label in the active context
    ///
    /// Returns [`LabelHandle::INVALID`] and drops the label when no context
    /// is active. A label without a clip rectangle is clipped to the
    /// viewport, and one without a running timer starts it now.
    pub fn add(&mut self, mut label: FloatingLabel<S>) -> LabelHandle {
        let Some(context) = self.contexts.active() else {
            log::debug!("no label context, dropping floating label '{}'", label.text());
            return LabelHandle::INVALID;
        };

        label.clip_to_if_unset(self.viewport);
        label.start_timer_if_unset(self.clock.now());

        let handle = self.registry.insert(label, context);
        self.contexts.insert_active(handle);
        log::trace!("added floating label {} to context {:?}", handle, context);
        handle
    }

    pub fn move_label(&mut self, handle: LabelHandle, dx: f64, dy: f64) {
        if let Some(label) = self.registry.get_mut(handle) {
            label.move_by(dx, dy);
        }
    }

    pub fn show(&mut self, handle: LabelHandle, visible: bool) {
        if let Some(label) = self.registry.get_mut(handle) {
            label.show(visible);
        }
    }

    /// Gives the label a finite lifetime counted from now
    pub fn set_lifetime(&mut self, handle: LabelHandle, lifetime: u32) {
        let now = self.clock.now();
        if let Some(label) = self.registry.get_mut(handle) {
            label.set_lifetime(lifetime, now);
        }
    }

    /// Size of the label's surface, at the origin
    ///
    /// Builds the surface if needed. Empty when the handle is unknown or the
    /// text does not render.
    pub fn bounding_rect(&mut self, handle: LabelHandle) -> Rect {
        let renderer = &mut self.renderer;
        self.registry
            .get_mut(handle)
            .and_then(|label| label.create_surface(renderer))
            .map(|surface| Rect::new(0, 0, surface.width(), surface.height()))
            .unwrap_or_else(Rect::empty)
    }

    /// Deletes a label from the registry and from the context that owns it
    ///
    /// Unknown handles are a no-op apart from being dropped from the active
    /// context's set, in case one lingered there.
    pub fn remove(&mut self, handle: LabelHandle) {
        match self.registry.remove(handle) {
            Some((_, context)) => {
                self.contexts.forget(context, handle);
                log::trace!("removed floating label {} from context {:?}", handle, context);
            }
            None => {
                self.contexts.forget_active(handle);
            }
        }
    }

    /// Shifts every map-anchored label, whatever context it is in
    pub fn scroll(&mut self, dx: f64, dy: f64) {
        for (_, label) in self.registry.iter_mut() {
            if label.anchor() == Anchor::Map {
                label.move_by(dx, dy);
            }
        }
    }

    pub fn label(&self, handle: LabelHandle) -> Option<&FloatingLabel<S>> {
        self.registry.get(handle)
    }

    pub fn contains(&self, handle: LabelHandle) -> bool {
        self.registry.contains(handle)
    }

    /// Whether the label belongs to the context on top of the stack
    pub fn is_active(&self, handle: LabelHandle) -> bool {
        self.contexts.is_active(handle)
    }

    /// Labels across all contexts
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // ======================================================================
    // Contexts
    // ======================================================================

    pub fn context_depth(&self) -> usize {
        self.contexts.depth()
    }

    /// Opens a new, empty context on top of the stack
    pub fn push_context(&mut self) -> ContextId {
        let id = self.contexts.push();
        log::debug!("pushed label context {:?} (depth {})", id, self.contexts.depth());
        id
    }

    /// Closes the active context, removing every label it still holds
    ///
    /// Returns `false` when there was no context to close.
    pub fn pop_context(&mut self) -> bool {
        let Some(id) = self.contexts.active() else {
            return false;
        };

        let mut removed = 0;
        while let Some(handle) = self.contexts.first_active() {
            self.remove(handle);
            // Guarantees progress even if the registry disagrees about the owner
            self.contexts.forget_active(handle);
            removed += 1;
        }
        self.contexts.pop();

        log::debug!("popped label context {:?}, removed {} labels", id, removed);
        true
    }

    /// Pushes a context that is popped again when the guard drops
    pub fn scoped_context(&mut self) -> LabelContext<'_, S, R, C> {
        let id = self.push_context();
        LabelContext { service: self, id }
    }

    /// Pops contexts until `id` is gone
    fn close_context(&mut self, id: ContextId) {
        if !self.contexts.is_open(id) {
            log::warn!("label context {:?} was already popped", id);
            return;
        }

        while let Some(active) = self.contexts.active() {
            self.pop_context();
            if active == id {
                break;
            }
            log::warn!("label context {:?} was still open above {:?}", active, id);
        }
    }

    // ======================================================================
    // Frame passes
    // ======================================================================

    /// Paints the active context's labels onto `frame`, oldest first
    pub fn draw_all(&mut self, frame: &mut S) {
        if self.contexts.is_empty() {
            return;
        }

        let now = self.clock.now();
        let contexts = &self.contexts;
        let renderer = &mut self.renderer;

        for (handle, label) in self.registry.iter_mut() {
            if contexts.is_active(handle) {
                label.draw(now, frame, renderer);
            }
        }
    }

    /// Takes the active context's labels back off `frame`, newest first,
    /// then removes the ones whose lifetime has run out
    pub fn undraw_all(&mut self, frame: &mut S) {
        if self.contexts.is_empty() {
            return;
        }

        let now = self.clock.now();

        for (handle, label) in self.registry.iter().rev() {
            if self.contexts.is_active(handle) {
                label.undraw(frame);
            }
        }

        let expired: Vec<LabelHandle> = self
            .registry
            .iter()
            .filter(|(handle, label)| self.contexts.is_active(*handle) && label.expired(now))
            .map(|(handle, _)| handle)
            .collect();

        for handle in expired {
            self.contexts.forget_active(handle);
            self.registry.remove(handle);
            log::trace!("floating label {} expired", handle);
        }
    }
}

/// A context that lives as long as this guard
///
/// Derefs to the service, so labels added through the guard land in its
/// context. Dropping the guard pops its context, along with any context
/// left open above it.
pub struct LabelContext<'a, S: Surface, R: TextRenderer<S>, C: Clock> {
    service: &'a mut LabelService<S, R, C>,
    id: ContextId,
}

impl<S: Surface, R: TextRenderer<S>, C: Clock> LabelContext<'_, S, R, C> {
    pub fn id(&self) -> ContextId {
        self.id
    }
}

impl<S: Surface, R: TextRenderer<S>, C: Clock> Deref for LabelContext<'_, S, R, C> {
    type Target = LabelService<S, R, C>;

    fn deref(&self) -> &Self::Target {
        self.service
    }
}

impl<S: Surface, R: TextRenderer<S>, C: Clock> DerefMut for LabelContext<'_, S, R, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.service
    }
}

impl<S: Surface, R: TextRenderer<S>, C: Clock> Drop for LabelContext<'_, S, R, C> {
    fn drop(&mut self) {
        self.service.close_context(self.id);
    }
}
