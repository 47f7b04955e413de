use crate::session::SessionFlags;
use macroquad::prelude::*;
use shared::PickupRecord;

/// Drawing sink used by the screens and overlays.
///
/// Coordinates are in window pixels with the origin top left. Text is placed
/// by its top edge, the way the screen layouts are specified; the macroquad
/// implementation shifts it onto the font baseline.
pub trait Canvas {
    fn clear(&mut self, color: Color);
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn rect_lines(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: Color);
    fn circle(&mut self, x: f32, y: f32, radius: f32, color: Color);
    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Canvas backed by the macroquad window.
pub struct MacroquadCanvas;

impl Canvas for MacroquadCanvas {
    fn clear(&mut self, color: Color) {
        clear_background(color);
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        draw_rectangle(x, y, w, h, color);
    }

    fn rect_lines(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: Color) {
        draw_rectangle_lines(x, y, w, h, thickness, color);
    }

    fn circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        draw_circle(x, y, radius, color);
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        draw_text(text, x, y + size * 0.8, size, color);
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        measure_text(text, None, size as u16, 1.0).width
    }
}

pub fn background_color() -> Color {
    Color::from_rgba(245, 245, 245, 255)
}

const PICKUP_RADIUS: f32 = 12.0;

/// Draws the overlays that sit on top of whichever screen is active.
pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: i32, height: i32) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn draw_pickups(&self, canvas: &mut dyn Canvas, pickups: &[PickupRecord]) {
        for pickup in pickups {
            let x = pickup.x as f32;
            let y = pickup.y as f32;

            canvas.circle(x, y, PICKUP_RADIUS, MAROON);
            canvas.text(&pickup.kind, x - 20.0, y - 28.0, 10.0, BLACK);
            canvas.text(&pickup.value.to_string(), x - 8.0, y + 16.0, 10.0, DARKGRAY);
        }
    }

    pub fn draw_score(&self, canvas: &mut dyn Canvas, score: i64) {
        let text = format!("Score: {}", score);
        let width = canvas.text_width(&text, 24.0);
        canvas.text(&text, self.width - width - 20.0, 20.0, 24.0, DARKBLUE);
    }

    pub fn draw_connection_status(
        &self,
        canvas: &mut dyn Canvas,
        flags: &SessionFlags,
        identity: Option<i32>,
    ) {
        let y = self.height - 20.0;
        let color = if flags.connected { GREEN } else { RED };
        canvas.rect(self.width - 110.0, y, 8.0, 8.0, color);

        let label = match (flags.connected, identity) {
            (true, Some(id)) => format!("ONLINE #{}", id),
            (true, None) => "ONLINE".to_string(),
            (false, _) => "OFFLINE".to_string(),
        };
        canvas.text(&label, self.width - 96.0, y - 1.0, 10.0, GRAY);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        Clear,
        Rect { x: f32, y: f32, w: f32, h: f32 },
        RectLines { x: f32, y: f32, w: f32, h: f32 },
        Circle { x: f32, y: f32, radius: f32 },
        Text { text: String, x: f32, y: f32 },
    }

    /// Canvas that records what would have been drawn.
    #[derive(Default)]
    pub struct RecordingCanvas {
        pub ops: Vec<DrawOp>,
    }

    impl RecordingCanvas {
        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn has_text(&self, needle: &str) -> bool {
            self.texts().iter().any(|text| text.contains(needle))
        }

        pub fn circles(&self) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, DrawOp::Circle { .. }))
                .count()
        }
    }

    impl Canvas for RecordingCanvas {
        fn clear(&mut self, _color: Color) {
            self.ops.push(DrawOp::Clear);
        }

        fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, _color: Color) {
            self.ops.push(DrawOp::Rect { x, y, w, h });
        }

        fn rect_lines(&mut self, x: f32, y: f32, w: f32, h: f32, _thickness: f32, _color: Color) {
            self.ops.push(DrawOp::RectLines { x, y, w, h });
        }

        fn circle(&mut self, x: f32, y: f32, radius: f32, _color: Color) {
            self.ops.push(DrawOp::Circle { x, y, radius });
        }

        fn text(&mut self, text: &str, x: f32, y: f32, _size: f32, _color: Color) {
            self.ops.push(DrawOp::Text {
                text: text.to_string(),
                x,
                y,
            });
        }

        fn text_width(&self, text: &str, size: f32) -> f32 {
            text.chars().count() as f32 * size * 0.5
        }
    }
}
