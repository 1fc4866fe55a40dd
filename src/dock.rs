use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::state::Delta;
use crate::timer::Slot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockState {
    Visible,
    HiddenAtEdge(Edge),
    Transitioning,
}

/// Timer purposes sharing the controller's single timer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockTimer {
    Hide(Edge),
    Show,
}

#[derive(Debug, Clone, Copy)]
pub struct DockConfig {
    pub edge_threshold: i32,
    pub sliver: i32,
    pub inset: i32,
    pub width: i32,
    pub collapsed_height: i32,
    pub expanded_height: i32,
    pub initial_right_margin: i32,
    pub initial_top: i32,
    pub hide_delay: Duration,
    pub show_delay: Duration,
    pub hide_duration: Duration,
    pub show_duration: Duration,
    pub resize_duration: Duration,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 30,
            sliver: 15,
            inset: 40,
            width: 400,
            collapsed_height: 360,
            expanded_height: 620,
            initial_right_margin: 20,
            initial_top: 100,
            hide_delay: Duration::from_millis(1200),
            show_delay: Duration::from_millis(100),
            hide_duration: Duration::from_millis(300),
            show_duration: Duration::from_millis(400),
            resize_duration: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    pub from: Geometry,
    pub to: Geometry,
    pub started: Instant,
    pub duration: Duration,
}

impl Animation {
    pub fn ends_at(&self) -> Instant {
        self.started + self.duration
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now >= self.ends_at()
    }

    pub fn sample(&self, now: Instant) -> Geometry {
        if self.duration.is_zero() || self.is_finished(now) {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        let t = ease_out_cubic(elapsed / self.duration.as_secs_f64());
        let lerp = |a: i32, b: i32| a + ((b - a) as f64 * t).round() as i32;
        Geometry {
            x: lerp(self.from.x, self.to.x),
            y: lerp(self.from.y, self.to.y),
            width: lerp(self.from.width, self.to.width),
            height: lerp(self.from.height, self.to.height),
        }
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    settle: DockState,
    ends_at: Instant,
}

/// Geometry is the target: during a transition it already holds the
/// destination and the presentation layer animates towards it.
pub struct EdgeDockController {
    config: DockConfig,
    display: Geometry,
    geometry: Geometry,
    state: DockState,
    edge: Option<Edge>,
    drag_anchor: Option<Point>,
    expanded: bool,
    timer: Slot<DockTimer>,
    motion: Option<Motion>,
    tx: Sender<Delta>,
}

impl EdgeDockController {
    pub fn new(config: DockConfig, display: Geometry, tx: Sender<Delta>) -> Self {
        let geometry = Geometry {
            x: display.right() - config.width - config.initial_right_margin,
            y: display.y + config.initial_top,
            width: config.width,
            height: config.collapsed_height,
        };
        Self {
            config,
            display,
            geometry,
            state: DockState::Visible,
            edge: None,
            drag_anchor: None,
            expanded: false,
            timer: Slot::default(),
            motion: None,
            tx,
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn state(&self) -> DockState {
        self.state
    }

    pub fn edge(&self) -> Option<Edge> {
        self.edge
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn pending_timer(&self) -> Option<DockTimer> {
        self.timer.pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        crate::timer::earliest([self.timer.deadline(), self.motion.map(|m| m.ends_at)])
    }

    pub fn drag_start(&mut self, pos: Point, now: Instant) {
        if self.is_hidden_or_hiding() {
            self.arm(DockTimer::Show, now);
            return;
        }
        if self.state != DockState::Visible {
            return;
        }
        self.drag_anchor = Some(Point::new(pos.x - self.geometry.x, pos.y - self.geometry.y));
        self.timer.cancel();
    }

    pub fn drag_move(&mut self, pos: Point) {
        let Some(anchor) = self.drag_anchor else {
            return;
        };
        let (x, y) = self.clamp_origin(pos.x - anchor.x, pos.y - anchor.y);
        if x == self.geometry.x && y == self.geometry.y {
            return;
        }
        self.geometry.x = x;
        self.geometry.y = y;
        self.emit_geometry(None);
    }

    pub fn drag_end(&mut self, pos: Point, now: Instant) {
        if self.drag_anchor.is_none() {
            if self.is_hidden_or_hiding() {
                self.arm(DockTimer::Show, now);
            }
            return;
        }
        self.drag_move(pos);
        self.drag_anchor = None;
        if self.state != DockState::Visible {
            return;
        }
        if let Some(edge) = self.edge_within_threshold() {
            debug!(?edge, "panel released near edge");
            self.arm(DockTimer::Hide(edge), now);
        }
    }

    pub fn hover_enter(&mut self, now: Instant) {
        if self.is_hidden_or_hiding() {
            self.begin_show(now);
        }
    }

    pub fn restore_requested(&mut self, now: Instant) {
        if self.is_hidden_or_hiding() {
            self.arm(DockTimer::Show, now);
        }
    }

    pub fn poll(&mut self, now: Instant) {
        if let Some(motion) = self.motion
            && now >= motion.ends_at
        {
            self.motion = None;
            self.state = motion.settle;
            if self.state == DockState::Visible {
                self.edge = None;
            }
            let _ = self.tx.send(Delta::DockState(self.state));
        }

        if self.drag_anchor.is_some() {
            return;
        }
        match self.timer.fire_if_due(now) {
            Some(DockTimer::Hide(edge)) => {
                if self.state == DockState::Visible {
                    self.begin_hide(edge, now);
                }
            }
            Some(DockTimer::Show) => {
                if self.is_hidden_or_hiding() {
                    self.begin_show(now);
                }
            }
            None => {}
        }
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
        self.geometry.height = if self.expanded {
            self.config.expanded_height
        } else {
            self.config.collapsed_height
        };
        match self.hidden_edge() {
            Some(Edge::Top) => self.geometry.y = self.display.y - self.geometry.height + self.config.sliver,
            Some(_) => {}
            None => {
                // Mid-show: re-aim at the inset position for the new height.
                if self.state == DockState::Transitioning
                    && let Some(edge) = self.edge
                {
                    self.geometry = self.shown_geometry(edge);
                }
                let (x, y) = self.clamp_origin(self.geometry.x, self.geometry.y);
                self.geometry.x = x;
                self.geometry.y = y;
            }
        }
        self.emit_geometry(Some(self.config.resize_duration));
    }

    pub fn set_display(&mut self, display: Geometry) {
        if display == self.display {
            return;
        }
        self.display = display;
        match self.hidden_edge() {
            Some(edge) => self.geometry = self.hidden_geometry(edge),
            None => {
                let (x, y) = self.clamp_origin(self.geometry.x, self.geometry.y);
                self.geometry.x = x;
                self.geometry.y = y;
            }
        }
        self.emit_geometry(None);
    }

    fn arm(&mut self, purpose: DockTimer, now: Instant) {
        let after = match purpose {
            DockTimer::Hide(_) => self.config.hide_delay,
            DockTimer::Show => self.config.show_delay,
        };
        self.timer.arm(purpose, now, after);
    }

    fn begin_hide(&mut self, edge: Edge, now: Instant) {
        self.edge = Some(edge);
        self.geometry = self.hidden_geometry(edge);
        self.start_motion(DockState::HiddenAtEdge(edge), self.config.hide_duration, now);
    }

    fn begin_show(&mut self, now: Instant) {
        let Some(edge) = self.edge else {
            return;
        };
        self.timer.cancel();
        self.geometry = self.shown_geometry(edge);
        self.start_motion(DockState::Visible, self.config.show_duration, now);
    }

    fn start_motion(&mut self, settle: DockState, duration: Duration, now: Instant) {
        self.state = DockState::Transitioning;
        self.motion = Some(Motion {
            settle,
            ends_at: now + duration,
        });
        let _ = self.tx.send(Delta::DockState(self.state));
        self.emit_geometry(Some(duration));
    }

    fn emit_geometry(&self, animate: Option<Duration>) {
        let _ = self.tx.send(Delta::DockGeometry {
            rect: self.geometry,
            animate,
        });
    }

    fn is_hidden_or_hiding(&self) -> bool {
        self.hidden_edge().is_some()
    }

    /// Edge the panel is hidden at or currently sliding into.
    fn hidden_edge(&self) -> Option<Edge> {
        match (self.state, self.motion) {
            (DockState::HiddenAtEdge(edge), _) => Some(edge),
            (DockState::Transitioning, Some(motion)) => match motion.settle {
                DockState::HiddenAtEdge(edge) => Some(edge),
                _ => None,
            },
            _ => None,
        }
    }

    // Checked right, left, top, bottom; a corner release records the first hit.
    fn edge_within_threshold(&self) -> Option<Edge> {
        let g = self.geometry;
        let d = self.display;
        let t = self.config.edge_threshold;
        if g.right() >= d.right() - t {
            Some(Edge::Right)
        } else if g.x <= d.x + t {
            Some(Edge::Left)
        } else if g.y <= d.y + t {
            Some(Edge::Top)
        } else if g.bottom() >= d.bottom() - t {
            Some(Edge::Bottom)
        } else {
            None
        }
    }

    fn hidden_geometry(&self, edge: Edge) -> Geometry {
        let mut g = self.geometry;
        let d = self.display;
        let sliver = self.config.sliver;
        match edge {
            Edge::Right => g.x = d.right() - sliver,
            Edge::Left => g.x = d.x - g.width + sliver,
            Edge::Top => g.y = d.y - g.height + sliver,
            Edge::Bottom => g.y = d.bottom() - sliver,
        }
        g
    }

    fn shown_geometry(&self, edge: Edge) -> Geometry {
        let mut g = self.geometry;
        let d = self.display;
        let inset = self.config.inset;
        match edge {
            Edge::Right => g.x = d.right() - g.width - inset,
            Edge::Left => g.x = d.x + inset,
            Edge::Top => g.y = d.y + inset,
            Edge::Bottom => g.y = d.bottom() - g.height - inset,
        }
        g
    }

    fn clamp_origin(&self, x: i32, y: i32) -> (i32, i32) {
        let d = self.display;
        let max_x = (d.right() - self.geometry.width).max(d.x);
        let max_y = (d.bottom() - self.geometry.height).max(d.y);
        (x.clamp(d.x, max_x), y.clamp(d.y, max_y))
    }
}
