//! Floating labels
//!
//! A floating label is a piece of text painted over the finished frame:
//! damage numbers rising off a unit, a tooltip box next to the cursor, a
//! "+2" heal that fades away. It owns everything needed to paint itself and
//! to take the paint back off again.
//!
//! # Lifecycle of one frame
//!
//! 1. `draw` copies the frame pixels under the label into a backup buffer,
//!    then blends the label surface on top
//! 2. the frame is presented
//! 3. `undraw` copies the backup buffer back over the exact rectangle the
//!    last draw used, leaving the frame as it was before step 1
//!
//! # Animation
//!
//! Position and fade are pure functions of "time alive", the milliseconds
//! since the label's timer started. A label with a finite lifetime stops
//! moving at expiry and, with fade-out on, reaches full transparency there.
//!
//! # Example
//!
//! ```ignore
//! let label = FloatingLabel::new("-12")
//!     .with_color(Color::rgb(255, 60, 60))
//!     .with_position(unit_x, unit_y)
//!     .with_velocity(0.0, -0.05) // rise 50 px per second
//!     .with_lifetime(1_000, clock.now());
//! ```

mod compose;

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::config::LabelConfig;
use crate::surface::{Color, Rect, Surface};
use crate::text::{Alignment, FontSize, TextRenderer};

/// Default text color
pub const NORMAL_COLOR: Color = Color::rgb(221, 221, 221);

/// What a label's position is relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Fixed on screen
    #[default]
    Screen,
    /// Follows the game world when the map scrolls
    Map,
}

/// Frame pixels saved by the last draw
struct Backup<S> {
    buffer: S,
    rect: Rect,
}

/// Surface to paint this frame: the cached one, or a faded copy of it
pub enum LabelSurface<'a, S> {
    Cached(&'a S),
    Faded(S),
}

impl<S> Deref for LabelSurface<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        match self {
            LabelSurface::Cached(surface) => surface,
            LabelSurface::Faded(surface) => surface,
        }
    }
}

/// One text overlay
///
/// Built with the `with_*` methods, then usually handed to a
/// [`LabelService`](crate::LabelService). The composited surface is created
/// lazily on first use and never rebuilt: style changes made after that
/// point have no visible effect.
pub struct FloatingLabel<S> {
    text: String,
    font_size: FontSize,
    color: Color,
    bg_color: Color,
    /// 0 = shadow style, anything else = boxed style
    bg_alpha: u8,
    border: u32,

    x: f64,
    y: f64,
    /// Pixels per millisecond
    xmove: f64,
    ymove: f64,

    /// Milliseconds, `None` = lives until removed
    lifetime: Option<u32>,
    time_start: Option<u32>,

    /// Max text width/height, `None` = take it from the clip rectangle
    width: Option<u32>,
    height: Option<u32>,
    clip_rect: Option<Rect>,

    visible: bool,
    align: Alignment,
    fadeout: bool,
    anchor: Anchor,
    use_markup: bool,

    surface: Option<S>,
    backup: Option<Backup<S>>,
}

impl<S> fmt::Debug for FloatingLabel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatingLabel")
            .field("text", &self.text)
            .field("position", &(self.x, self.y))
            .field("velocity", &(self.xmove, self.ymove))
            .field("lifetime", &self.lifetime)
            .field("time_start", &self.time_start)
            .field("visible", &self.visible)
            .field("anchor", &self.anchor)
            .field("has_surface", &self.surface.is_some())
            .field("has_backup", &self.backup.is_some())
            .finish()
    }
}

impl<S: Surface> FloatingLabel<S> {
    /// Creates a label with the stock look: small light-grey centered text
    /// with a drop shadow, fading out, living forever
    pub fn new(text: impl Into<String>) -> Self {
        FloatingLabel {
            text: text.into(),
            font_size: FontSize::Small,
            color: NORMAL_COLOR,
            bg_color: Color::BLACK,
            bg_alpha: 0,
            border: 0,
            x: 0.0,
            y: 0.0,
            xmove: 0.0,
            ymove: 0.0,
            lifetime: None,
            time_start: None,
            width: None,
            height: None,
            clip_rect: None,
            visible: true,
            align: Alignment::Center,
            fadeout: true,
            anchor: Anchor::Screen,
            use_markup: true,
            surface: None,
            backup: None,
        }
    }

    /// Creates a label that paints `surface` instead of rendering its text
    pub fn from_surface(text: impl Into<String>, surface: S) -> Self {
        FloatingLabel {
            surface: Some(surface),
            ..Self::new(text)
        }
    }

    /// Creates a label with the configured default style
    pub fn from_config(text: impl Into<String>, config: &LabelConfig) -> Self {
        Self::new(text)
            .with_font_size(config.font_size)
            .with_color(config.color)
            .with_background(config.background_color, config.background_alpha)
            .with_border(config.border)
            .with_alignment(config.alignment)
            .with_fadeout(config.fadeout)
            .with_markup(config.markup)
    }

    // ======================================================================
    // Builders
    // ======================================================================

    pub fn with_font_size(mut self, size: FontSize) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Background box color; `alpha == 0` selects the drop-shadow look
    pub fn with_background(mut self, color: Color, alpha: u8) -> Self {
        self.bg_color = color;
        self.bg_alpha = alpha;
        self
    }

    /// Padding between the text and the edge of its box
    pub fn with_border(mut self, border: u32) -> Self {
        self.border = border;
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Movement in pixels per millisecond
    pub fn with_velocity(mut self, xmove: f64, ymove: f64) -> Self {
        self.xmove = xmove;
        self.ymove = ymove;
        self
    }

    /// Finite lifetime, measured from `started_at`
    pub fn with_lifetime(mut self, lifetime: u32, started_at: u32) -> Self {
        self.set_lifetime(lifetime, started_at);
        self
    }

    /// Maximum text box size; `None` falls back to the clip rectangle
    pub fn with_max_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_clip_rect(mut self, clip_rect: Rect) -> Self {
        self.clip_rect = Some(clip_rect);
        self
    }

    pub fn with_alignment(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn with_fadeout(mut self, fadeout: bool) -> Self {
        self.fadeout = fadeout;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_markup(mut self, use_markup: bool) -> Self {
        self.use_markup = use_markup;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    // ======================================================================
    // Accessors
    // ======================================================================

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn lifetime(&self) -> Option<u32> {
        self.lifetime
    }

    pub fn time_start(&self) -> Option<u32> {
        self.time_start
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn clip_rect(&self) -> Option<Rect> {
        self.clip_rect
    }

    /// The composited surface, if it has been built
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// Where the last draw painted, while a backup of it is held
    pub fn last_drawn_rect(&self) -> Option<Rect> {
        self.backup.as_ref().map(|backup| backup.rect)
    }

    /// Fills in the clip rectangle unless the label already has one
    pub(crate) fn clip_to_if_unset(&mut self, viewport: Rect) {
        self.clip_rect.get_or_insert(viewport);
    }

    /// Starts the timer unless a lifetime already started it
    pub(crate) fn start_timer_if_unset(&mut self, now: u32) {
        self.time_start.get_or_insert(now);
    }

    // ======================================================================
    // Operations
    // ======================================================================

    /// Shifts the base position; also used for map scrolling
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Sets a finite lifetime and restarts the timer at `now`
    pub fn set_lifetime(&mut self, lifetime: u32, now: u32) {
        self.lifetime = Some(lifetime);
        self.time_start = Some(now);
    }

    /// Hiding drops the backup, so a hidden label has nothing to undraw
    pub fn show(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.backup = None;
        }
    }

    /// Milliseconds since the timer started
    fn time_alive(&self, now: u32) -> u32 {
        now.saturating_sub(self.time_start.unwrap_or(0))
    }

    /// Time alive, stopped at the end of a finite lifetime
    fn animation_time(&self, now: u32) -> u32 {
        let alive = self.time_alive(now);
        match self.lifetime {
            Some(lifetime) => alive.min(lifetime),
            None => alive,
        }
    }

    pub fn expired(&self, now: u32) -> bool {
        self.lifetime.is_some_and(|lifetime| self.time_alive(now) >= lifetime)
    }

    /// Left edge for a surface `width` pixels wide, honoring alignment
    pub fn xpos(&self, width: u32) -> i32 {
        // `as` clamps positions beyond the i32 range
        let x = self.x as i32;
        match self.align {
            Alignment::Left => x,
            Alignment::Center => x.saturating_sub_unsigned(width / 2),
            Alignment::Right => x.saturating_sub_unsigned(width),
        }
    }

    /// Top-left corner the label paints at, at time `now`
    pub fn get_loc(&self, now: u32) -> (i32, i32) {
        let time = self.animation_time(now) as f64;
        let width = self.surface.as_ref().map_or(0, |surface| surface.width());

        (
            (time * self.xmove + self.xpos(width) as f64) as i32,
            (time * self.ymove + self.y) as i32,
        )
    }

    /// Builds the composited surface on first call, then returns the cache
    ///
    /// `None` when the text could not be rendered; the next call tries again.
    pub fn create_surface<R: TextRenderer<S>>(&mut self, renderer: &mut R) -> Option<&S> {
        if self.surface.is_none() {
            self.surface = self.compose(renderer);
        }
        self.surface.as_ref()
    }

    /// The surface as it should look at `now`
    ///
    /// Fading labels get a fresh copy with alpha lowered linearly towards
    /// zero at expiry; the cache itself is never touched.
    pub fn get_surface(&self, now: u32) -> Option<LabelSurface<'_, S>> {
        let surface = self.surface.as_ref()?;

        let Some(lifetime) = self.lifetime.filter(|_| self.fadeout) else {
            return Some(LabelSurface::Cached(surface));
        };

        let alpha_add = if lifetime == 0 {
            -255
        } else {
            (-255 * self.animation_time(now) as i64 / lifetime as i64) as i32
        };

        match surface.duplicate() {
            Ok(mut faded) => {
                faded.add_alpha(alpha_add);
                Some(LabelSurface::Faded(faded))
            }
            Err(e) => {
                log::error!("could not copy floating label '{}' for fading: {}", self.text, e);
                Some(LabelSurface::Cached(surface))
            }
        }
    }

    /// Paints the label onto `frame`, saving what it covers first
    pub fn draw<R: TextRenderer<S>>(&mut self, now: u32, frame: &mut S, renderer: &mut R) {
        if !self.visible {
            self.backup = None;
            return;
        }

        let Some(surface) = self.create_surface(renderer) else {
            return;
        };
        let (width, height) = (surface.width(), surface.height());

        let (x, y) = self.get_loc(now);
        let rect = Rect::new(x, y, width, height);

        let mut buffer = match self.backup.take() {
            Some(backup) => backup.buffer,
            None => match S::create(width, height) {
                Ok(buffer) => buffer,
                Err(e) => {
                    log::error!("could not allocate backup for floating label '{}': {}", self.text, e);
                    return;
                }
            },
        };

        if let Err(e) = frame.copy_region_into(x, y, &mut buffer) {
            log::error!("could not save frame under floating label '{}': {}", self.text, e);
            return;
        }
        self.backup = Some(Backup { buffer, rect });

        if let Some(surface) = self.get_surface(now) {
            if let Err(e) = surface.blend_onto(frame, x, y, self.clip_rect) {
                log::error!("could not draw floating label '{}': {}", self.text, e);
            }
        }
    }

    /// Restores the frame pixels covered by the last draw
    pub fn undraw(&self, frame: &mut S) {
        let Some(backup) = &self.backup else {
            return;
        };

        if let Err(e) = backup.buffer.copy_onto(frame, backup.rect.x, backup.rect.y, self.clip_rect) {
            log::error!("could not undraw floating label '{}': {}", self.text, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::limited::LimitedSurface;
    use crate::surface::PixelBuffer;
    use crate::text::BitmapFont;

    fn label(text: &str) -> FloatingLabel<PixelBuffer> {
        FloatingLabel::new(text)
            .with_font_size(FontSize::Tiny)
            .with_color(Color::WHITE)
    }

    fn frame() -> PixelBuffer {
        let mut frame = PixelBuffer::filled(64, 48, Color::rgb(30, 90, 40));
        // Some texture so a sloppy restore would show
        for i in 0..48 {
            frame.set_pixel(i, i, Color::rgba(200, 10, i as u8, 200));
        }
        frame
    }

    #[test]
    fn test_defaults() {
        let label: FloatingLabel<PixelBuffer> = FloatingLabel::new("hi");
        assert_eq!(label.text(), "hi");
        assert_eq!(label.lifetime(), None);
        assert_eq!(label.anchor(), Anchor::Screen);
        assert!(label.is_visible());
        assert!(label.surface().is_none());
        assert!(!label.has_backup());
        assert_eq!(label.xpos(10), -5);
    }

    #[test]
    fn test_xpos_alignment() {
        let left = label("x").with_position(100.7, 0.0).with_alignment(Alignment::Left);
        let center = label("x").with_position(100.7, 0.0).with_alignment(Alignment::Center);
        let right = label("x").with_position(100.7, 0.0).with_alignment(Alignment::Right);

        assert_eq!(left.xpos(31), 100);
        assert_eq!(center.xpos(31), 85);
        assert_eq!(right.xpos(31), 69);
    }

    #[test]
    fn test_xpos_saturates_far_off_screen() {
        let center = label("x").with_position(-3.0e9, 0.0).with_alignment(Alignment::Center);
        let right = label("x").with_position(-3.0e9, 0.0).with_alignment(Alignment::Right);

        assert_eq!(center.xpos(31), i32::MIN);
        assert_eq!(right.xpos(u32::MAX), i32::MIN);
    }

    #[test]
    fn test_move_accumulates_fractions() {
        let mut label = label("x").with_alignment(Alignment::Left);
        for _ in 0..4 {
            label.move_by(0.25, -0.5);
        }
        assert_eq!(label.position(), (1.0, -2.0));
        assert_eq!(label.get_loc(0), (1, -2));
    }

    #[test]
    fn test_get_loc_moves_with_time() {
        let label = label("x")
            .with_alignment(Alignment::Left)
            .with_position(10.0, 50.0)
            .with_velocity(0.125, -0.25);

        assert_eq!(label.get_loc(0), (10, 50));
        assert_eq!(label.get_loc(100), (22, 25));
    }

    #[test]
    fn test_get_loc_stops_at_lifetime() {
        let label = label("x")
            .with_alignment(Alignment::Left)
            .with_position(0.0, 0.0)
            .with_velocity(1.0, 0.0)
            .with_lifetime(200, 1_000);

        assert_eq!(label.get_loc(1_100), (100, 0));
        assert_eq!(label.get_loc(1_200), (200, 0));
        assert_eq!(label.get_loc(5_000), (200, 0));
        // Before the timer started nothing has moved
        assert_eq!(label.get_loc(500), (0, 0));
    }

    #[test]
    fn test_expiry_boundary() {
        let label = label("x").with_lifetime(1_000, 0);
        assert!(!label.expired(0));
        assert!(!label.expired(999));
        assert!(label.expired(1_000));
        assert!(label.expired(1_001));

        assert!(!self::label("x").expired(u32::MAX));
    }

    #[test]
    fn test_set_lifetime_restarts_timer() {
        let mut label = label("x").with_lifetime(100, 0);
        assert!(label.expired(150));

        label.set_lifetime(100, 120);
        assert!(!label.expired(150));
        assert!(label.expired(220));
        assert_eq!(label.time_start(), Some(120));
    }

    #[test]
    fn test_fade_lowers_alpha_towards_expiry() {
        let mut font = BitmapFont::new();
        let mut label = label("I")
            .with_background(Color::BLACK, 255)
            .with_lifetime(100, 0);
        label.create_surface(&mut font);

        let alpha_at = |now: u32| label.get_surface(now).unwrap().get_pixel(1, 1).unwrap().a;

        assert_eq!(alpha_at(0), 255);
        let mut previous = 255;
        for now in [20, 40, 60, 80] {
            let alpha = alpha_at(now);
            assert!(alpha < previous, "alpha {} at {} not below {}", alpha, now, previous);
            previous = alpha;
        }
        assert_eq!(alpha_at(100), 0);
        assert_eq!(alpha_at(500), 0);

        // The cache itself never fades
        assert_eq!(label.surface().unwrap().get_pixel(1, 1).unwrap().a, 255);
    }

    #[test]
    fn test_fade_uses_cached_surface_when_copy_fails() {
        let mut font = BitmapFont::new();
        let mut label: FloatingLabel<LimitedSurface> = FloatingLabel::new("I")
            .with_font_size(FontSize::Tiny)
            .with_color(Color::WHITE)
            .with_lifetime(1_000, 0);
        label.create_surface(&mut font);

        let faded_alpha = label.get_surface(500).unwrap().0.get_pixel(2, 2).unwrap().a;
        assert!(faded_alpha < 255);

        LimitedSurface::fail_duplicates(true);
        let surface = label.get_surface(500);
        LimitedSurface::fail_duplicates(false);

        let surface = surface.unwrap();
        assert!(matches!(surface, LabelSurface::Cached(_)));
        assert_eq!(surface.0.get_pixel(2, 2).unwrap().a, 255);
    }

    #[test]
    fn test_no_fade_without_lifetime_or_flag() {
        let mut font = BitmapFont::new();

        let mut forever = label("I").with_background(Color::BLACK, 255);
        forever.create_surface(&mut font);
        assert!(matches!(forever.get_surface(10_000), Some(LabelSurface::Cached(_))));

        let mut steady = label("I")
            .with_background(Color::BLACK, 255)
            .with_fadeout(false)
            .with_lifetime(100, 0);
        steady.create_surface(&mut font);
        assert!(matches!(steady.get_surface(50), Some(LabelSurface::Cached(_))));
    }

    #[test]
    fn test_zero_lifetime_fades_completely() {
        let mut label = label("I").with_background(Color::BLACK, 255).with_lifetime(0, 0);
        label.create_surface(&mut BitmapFont::new());
        assert_eq!(label.get_surface(0).unwrap().get_pixel(0, 0).unwrap().a, 0);
    }

    #[test]
    fn test_surface_is_built_once() {
        let mut font = BitmapFont::new();
        let mut label = label("AB");
        let first = label.create_surface(&mut font).cloned().unwrap();

        // Restyling after the first build does not rebuild
        let mut label = label.with_color(Color::rgb(255, 0, 0)).with_font_size(FontSize::XLarge);
        let second = label.create_surface(&mut font).cloned().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_surface_skips_rendering() {
        let surface = PixelBuffer::filled(3, 2, Color::WHITE);
        let mut label = FloatingLabel::from_surface("ignored", surface.clone());
        assert_eq!(label.create_surface(&mut BitmapFont::new()), Some(&surface));
    }

    #[test]
    fn test_draw_then_undraw_restores_frame() {
        let mut font = BitmapFont::new();
        let mut label = label("HELLO").with_position(20.0, 10.0).with_velocity(0.01, 0.02);
        let original = frame();
        let mut target = original.clone();

        label.draw(100, &mut target, &mut font);
        assert_ne!(target, original);
        assert!(label.has_backup());

        label.undraw(&mut target);
        assert_eq!(target, original);
    }

    #[test]
    fn test_undraw_uses_last_drawn_rect() {
        let mut font = BitmapFont::new();
        let mut label = label("HI").with_alignment(Alignment::Left).with_position(5.0, 5.0);
        let original = frame();
        let mut target = original.clone();

        label.draw(0, &mut target, &mut font);
        let drawn_at = label.last_drawn_rect().unwrap();
        assert_eq!((drawn_at.x, drawn_at.y), (5, 5));

        // Moving after the draw must not change what undraw restores
        label.move_by(17.0, 9.0);
        label.undraw(&mut target);
        assert_eq!(target, original);
        assert_eq!(label.last_drawn_rect(), Some(drawn_at));
    }

    #[test]
    fn test_draw_partly_off_frame_round_trips() {
        let mut font = BitmapFont::new();
        let mut label = label("EDGE")
            .with_alignment(Alignment::Left)
            .with_position(50.0, -3.0)
            .with_clip_rect(Rect::new(0, 0, 60, 40));
        let original = frame();
        let mut target = original.clone();

        label.draw(0, &mut target, &mut font);
        // Clip rectangle keeps column 60+ untouched
        for y in 0..48 {
            for x in 60..64 {
                assert_eq!(target.get_pixel(x, y), original.get_pixel(x, y));
            }
        }
        label.undraw(&mut target);
        assert_eq!(target, original);
    }

    #[test]
    fn test_hidden_label_draws_nothing() {
        let mut font = BitmapFont::new();
        let mut label = label("HI").with_position(20.0, 20.0);
        let original = frame();
        let mut target = original.clone();

        label.draw(0, &mut target, &mut font);
        assert!(label.has_backup());

        label.show(false);
        assert!(!label.has_backup());

        let mut second = original.clone();
        label.draw(0, &mut second, &mut font);
        assert_eq!(second, original);
        assert!(!label.has_backup());

        // Nothing to restore either
        label.undraw(&mut second);
        assert_eq!(second, original);
    }

    #[test]
    fn test_failed_render_draws_nothing() {
        let mut font = BitmapFont::new();
        let mut label = label("");
        let original = frame();
        let mut target = original.clone();

        label.draw(0, &mut target, &mut font);

        assert_eq!(target, original);
        assert!(!label.has_backup());
        assert!(label.surface().is_none());
    }
}
