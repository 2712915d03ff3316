//! Visualizer widget - replays a recorded display list onto a braille canvas
//!
//! The terminal has no alpha channel, so translucent colours are darkened in
//! proportion to their alpha instead, and the background fill just sets the
//! canvas colour.

use ratatui::{
    layout::Rect,
    style::Color,
    symbols,
    widgets::{
        canvas::{Canvas, Circle, Context, Line, Rectangle},
        Block, Borders,
    },
    Frame,
};

use shoegaze_fx::visual::{DisplayList, DrawOp, Hsla, Surface};

/// Rings drawn for a radial glow, outermost faintest
const GLOW_RINGS: usize = 4;

pub fn render_scene(frame: &mut Frame, area: Rect, scene: Option<&DisplayList>) {
    let block = Block::default().title(" Visualizer ").borders(Borders::ALL);

    let Some(scene) = scene else {
        frame.render_widget(block, area);
        return;
    };

    let (width, height) = scene.size();
    let background = scene
        .ops()
        .iter()
        .rev()
        .find_map(|op| match op {
            DrawOp::Background(color) => Some(rgb(color.with_alpha(1.0))),
            _ => None,
        })
        .unwrap_or(Color::Reset);

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .background_color(background)
        .x_bounds([0.0, width as f64])
        .y_bounds([0.0, height as f64])
        .paint(|ctx| {
            for op in scene.ops() {
                paint_op(ctx, op, height);
            }
        });

    frame.render_widget(canvas, area);
}

fn paint_op(ctx: &mut Context, op: &DrawOp, height: f32) {
    // Surface y grows downward, canvas y grows upward
    let flip = |y: f32| (height - y) as f64;

    match op {
        DrawOp::Background(_) | DrawOp::Clear => {}
        DrawOp::Rect {
            x,
            y,
            width,
            height: h,
            color,
        } => ctx.draw(&Rectangle {
            x: *x as f64,
            y: flip(y + h),
            width: *width as f64,
            height: *h as f64,
            color: rgb(*color),
        }),
        DrawOp::Polyline { points, color, .. } => {
            for pair in points.windows(2) {
                ctx.draw(&Line {
                    x1: pair[0].0 as f64,
                    y1: flip(pair[0].1),
                    x2: pair[1].0 as f64,
                    y2: flip(pair[1].1),
                    color: rgb(*color),
                });
            }
        }
        DrawOp::Glow {
            center,
            radius,
            color,
        } => {
            for ring in 1..=GLOW_RINGS {
                let t = ring as f32 / GLOW_RINGS as f32;
                ctx.draw(&Circle {
                    x: center.0 as f64,
                    y: flip(center.1),
                    radius: (radius * t) as f64,
                    color: rgb(color.with_alpha(color.alpha * (1.0 - t) + 0.1)),
                });
            }
        }
        DrawOp::Circle {
            center,
            radius,
            color,
        } => ctx.draw(&Circle {
            x: center.0 as f64,
            y: flip(center.1),
            radius: *radius as f64,
            color: rgb(*color),
        }),
    }
}

fn rgb(color: Hsla) -> Color {
    let (r, g, b) = color.to_rgb();
    let fade = |c: u8| (c as f32 * color.alpha).round() as u8;
    Color::Rgb(fade(r), fade(g), fade(b))
}
