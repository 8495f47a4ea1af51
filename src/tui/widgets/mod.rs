pub mod channel_display;
pub mod controls;
pub mod guide;
pub mod hub;
pub mod menu;
pub mod osd;
pub mod screen;
pub mod visualizer;

use ratatui::layout::Rect;

/// Rectangle of at most `width` x `height` centred in `area`
pub fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
