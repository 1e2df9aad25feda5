//! Debug overlay
//!
//! A text node anchored to a screen corner that shows frame statistics
//! collected by the engine. Only built when `EngineConfig::debug` is on.

use crate::config::DebugOverlayConfig;
use crate::display::{ContainerId, DisplayTree};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

bitflags! {
    /// Which statistics the overlay shows
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct OverlayStats: u32 {
        /// Smoothed frames per second
        const FPS = 1 << 0;
        /// Live entity count
        const ENTITIES = 1 << 1;
        /// Active scene name
        const SCENE = 1 << 2;
        /// Viewport size and classification
        const VIEWPORT = 1 << 3;
        /// Display tree node count
        const NODES = 1 << 4;
    }
}

/// Screen corner the overlay anchors to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    /// Top left corner
    #[default]
    TopLeft,
    /// Top right corner
    TopRight,
    /// Bottom left corner
    BottomLeft,
    /// Bottom right corner
    BottomRight,
}

/// Per-frame statistics gathered by the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Smoothed frames per second
    pub fps: f32,
    /// Frames since start
    pub frame_count: u64,
    /// Live entities
    pub entity_count: usize,
    /// Active scene
    pub scene: Option<String>,
    /// Viewport summary
    pub viewport: Option<String>,
    /// Containers in the display tree
    pub node_count: usize,
}

const MARGIN: f32 = 8.0;
const BOX_WIDTH: f32 = 240.0;
const LINE_HEIGHT: f32 = 16.0;

/// On-screen statistics panel
pub struct DebugOverlay {
    display: DisplayTree,
    container: ContainerId,
    position: OverlayPosition,
    stats: OverlayStats,
    refresh_interval: f32,
    since_refresh: Option<f32>,
    screen_size: (f32, f32),
    text: String,
}

impl DebugOverlay {
    /// Create the overlay container and anchor it for `screen_size`
    pub fn new(display: &DisplayTree, config: &DebugOverlayConfig, screen_size: (f32, f32)) -> Self {
        let container = display.create("debug_overlay");
        display.set_visible(container, config.visible);

        let mut overlay = Self {
            display: display.clone(),
            container,
            position: config.position,
            stats: config.stats,
            refresh_interval: config.refresh_interval,
            since_refresh: None,
            screen_size,
            text: String::new(),
        };
        overlay.anchor();
        log::debug!("Debug overlay created at {:?}", config.position);
        overlay
    }

    /// Overlay container
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Text currently shown
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Selected statistics
    pub fn stats(&self) -> OverlayStats {
        self.stats
    }

    /// Change the selected statistics; the next update refreshes the text
    pub fn set_stats(&mut self, stats: OverlayStats) {
        self.stats = stats;
        self.since_refresh = None;
        self.anchor();
    }

    /// Whether the overlay is drawn
    pub fn is_visible(&self) -> bool {
        self.display.is_visible(self.container)
    }

    /// Show or hide the overlay
    pub fn set_visible(&mut self, visible: bool) {
        self.display.set_visible(self.container, visible);
    }

    /// Flip visibility
    pub fn toggle(&mut self) {
        let visible = !self.is_visible();
        self.set_visible(visible);
    }

    /// Refresh the text once `refresh_interval` has elapsed
    pub fn update(&mut self, delta_time: f32, stats: &FrameStats) {
        let elapsed = match self.since_refresh {
            Some(elapsed) => elapsed + delta_time,
            None => f32::INFINITY,
        };
        if elapsed < self.refresh_interval {
            self.since_refresh = Some(elapsed);
            return;
        }
        self.since_refresh = Some(0.0);
        self.text = Self::format(self.stats, stats);
        self.display.set_text(self.container, Some(self.text.clone()));
    }

    /// Re-anchor for a new screen size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.screen_size = (width, height);
        self.anchor();
    }

    /// Release the overlay container
    pub fn destroy(&mut self) {
        self.display.destroy(self.container);
    }

    /// Render the selected statistics, one per line
    pub fn format(selected: OverlayStats, stats: &FrameStats) -> String {
        let mut text = String::new();
        if selected.contains(OverlayStats::FPS) {
            let _ = writeln!(text, "FPS: {:.1}", stats.fps);
        }
        if selected.contains(OverlayStats::ENTITIES) {
            let _ = writeln!(text, "Entities: {}", stats.entity_count);
        }
        if selected.contains(OverlayStats::SCENE) {
            let _ = writeln!(text, "Scene: {}", stats.scene.as_deref().unwrap_or("-"));
        }
        if selected.contains(OverlayStats::VIEWPORT) {
            let _ = writeln!(text, "Viewport: {}", stats.viewport.as_deref().unwrap_or("-"));
        }
        if selected.contains(OverlayStats::NODES) {
            let _ = writeln!(text, "Nodes: {}", stats.node_count);
        }
        text.truncate(text.trim_end().len());
        text
    }

    fn anchor(&self) {
        let lines = self.stats.iter().count().max(1) as f32;
        let box_height = lines * LINE_HEIGHT;
        let (width, height) = self.screen_size;
        let right = (width - BOX_WIDTH - MARGIN).max(MARGIN);
        let bottom = (height - box_height - MARGIN).max(MARGIN);

        let (x, y) = match self.position {
            OverlayPosition::TopLeft => (MARGIN, MARGIN),
            OverlayPosition::TopRight => (right, MARGIN),
            OverlayPosition::BottomLeft => (MARGIN, bottom),
            OverlayPosition::BottomRight => (right, bottom),
        };
        self.display.set_position(self.container, x, y);
        self.display.set_size(self.container, BOX_WIDTH, box_height);
    }
}

impl std::fmt::Debug for DebugOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugOverlay")
            .field("position", &self.position)
            .field("stats", &self.stats)
            .field("visible", &self.is_visible())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;

    fn config(position: OverlayPosition, stats: OverlayStats) -> DebugOverlayConfig {
        DebugOverlayConfig {
            position,
            stats,
            visible: true,
            refresh_interval: 0.5,
        }
    }

    fn stats() -> FrameStats {
        FrameStats {
            fps: 59.94,
            frame_count: 10,
            entity_count: 3,
            scene: Some("reels".to_string()),
            viewport: None,
            node_count: 12,
        }
    }

    #[test]
    fn test_format_only_selected_stats() {
        let text = DebugOverlay::format(OverlayStats::FPS | OverlayStats::SCENE, &stats());
        assert_eq!(text, "FPS: 59.9\nScene: reels");
    }

    #[test]
    fn test_refresh_interval_throttles_text() {
        let display = DisplayTree::new();
        let mut overlay = DebugOverlay::new(
            &display,
            &config(OverlayPosition::TopLeft, OverlayStats::ENTITIES),
            (800.0, 600.0),
        );

        overlay.update(0.016, &stats());
        assert_eq!(overlay.text(), "Entities: 3");

        let mut more = stats();
        more.entity_count = 9;
        overlay.update(0.2, &more);
        assert_eq!(overlay.text(), "Entities: 3");
        overlay.update(0.35, &more);
        assert_eq!(overlay.text(), "Entities: 9");
        assert_eq!(display.text(overlay.container()).as_deref(), Some("Entities: 9"));
    }

    #[test]
    fn test_anchors_to_corner_and_follows_resize() {
        let display = DisplayTree::new();
        let mut overlay = DebugOverlay::new(
            &display,
            &config(OverlayPosition::BottomRight, OverlayStats::FPS | OverlayStats::NODES),
            (800.0, 600.0),
        );
        let position = display.transform(overlay.container()).position;
        assert_eq!(position, Vec2::new(800.0 - 240.0 - 8.0, 600.0 - 32.0 - 8.0));

        overlay.resize(1000.0, 700.0);
        let position = display.transform(overlay.container()).position;
        assert_eq!(position, Vec2::new(1000.0 - 248.0, 700.0 - 40.0));
    }

    #[test]
    fn test_toggle_visibility() {
        let display = DisplayTree::new();
        let mut overlay = DebugOverlay::new(
            &display,
            &config(OverlayPosition::TopLeft, OverlayStats::FPS),
            (800.0, 600.0),
        );
        assert!(overlay.is_visible());
        overlay.toggle();
        assert!(!overlay.is_visible());
        overlay.set_visible(true);
        assert!(overlay.is_visible());
    }
}
