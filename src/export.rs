use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};

use crate::color::color_or_fallback;
use crate::data::model::WavenumberRange;
use crate::data::spectrum_set::TraceView;

pub const DEFAULT_PNG_FILE: &str = "IR_spectrum.png";

pub const CHART_TITLE: &str = "IR Spectrum";
const X_LABEL: &str = "Wavenumber (cm⁻¹)";
const Y_LABEL: &str = "Transmission (%T)";

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BORDER: Rgb<u8> = Rgb([100, 100, 110]);
const GRID: Rgb<u8> = Rgb([230, 230, 235]);
const TEXT: Rgb<u8> = Rgb([40, 40, 40]);

// ---------------------------------------------------------------------------
// Chart rasterisation
// ---------------------------------------------------------------------------

/// Draw the overlaid traces onto a white canvas, wavenumber decreasing
/// left to right, with title, axis labels and a legend. Peak markers and
/// their wavenumbers are drawn when `show_peaks` is set.
pub fn render_chart(
    views: &[TraceView],
    range: WavenumberRange,
    show_peaks: bool,
    width: u32,
    height: u32,
) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let frame = Frame::new(width, height, range, views);
    let scale = text_scale(height);

    frame.draw_grid(&mut img);
    frame.draw_border(&mut img);
    frame.draw_labels(&mut img, scale);

    let stroke = (width / 1000).max(1) as i32;
    for view in views {
        let color = trace_color(view);

        let mut prev: Option<(i32, i32)> = None;
        for (x, y) in view.series.points() {
            let p = frame.to_pixel(x, y);
            if let Some(q) = prev {
                draw_thick_line(&mut img, q, p, color, stroke);
            }
            prev = Some(p);
        }

        if show_peaks {
            for peak in &view.peaks {
                let p = frame.to_pixel(peak.wavenumber as f64, peak.transmission);
                let radius = 3 * stroke;
                draw_marker(&mut img, p, color, radius);
                // Centred under the marker.
                let label = peak.label();
                let x = p.0 - text_width(&label, scale) / 2;
                draw_text(&mut img, &label, (x, p.1 + radius + scale), color, scale);
            }
        }
    }

    if !views.is_empty() {
        Legend::new(&frame, views, scale).draw(&mut img, views);
    }
    img
}

fn trace_color(view: &TraceView) -> Rgb<u8> {
    let c = color_or_fallback(&view.color);
    Rgb([c.r(), c.g(), c.b()])
}

/// Pixel size of one font dot.
fn text_scale(height: u32) -> i32 {
    (height / 200).max(1) as i32
}

/// Render and write a PNG.
pub fn save_png(
    path: &Path,
    views: &[TraceView],
    range: WavenumberRange,
    show_peaks: bool,
    width: u32,
    height: u32,
) -> Result<()> {
    let img = render_chart(views, range, show_peaks, width, height);
    img.save(path)
        .with_context(|| format!("writing chart to {}", path.display()))?;
    log::info!("Saved {width}×{height} chart to {}", path.display());
    Ok(())
}

/// Data-to-pixel mapping for the plotting area.
struct Frame {
    left: i32,
    top: i32,
    plot_w: i32,
    plot_h: i32,
    x_hi: f64,
    x_span: f64,
    y_min: f64,
    y_span: f64,
    width: i32,
}

impl Frame {
    fn new(width: u32, height: u32, range: WavenumberRange, views: &[TraceView]) -> Self {
        let margin_x = (width / 12) as i32;
        let margin_y = (height / 12) as i32;

        let (mut y_min, mut y_max) = views
            .iter()
            .flat_map(|v| v.series.y().iter().copied())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
        if !y_min.is_finite() {
            (y_min, y_max) = (0.0, 100.0);
        } else if y_max - y_min < f64::EPSILON {
            (y_min, y_max) = (y_min - 1.0, y_max + 1.0);
        }
        let pad = (y_max - y_min) * 0.05;

        let x_span = range.hi() - range.lo();
        Self {
            left: margin_x,
            top: margin_y,
            plot_w: width as i32 - 2 * margin_x,
            plot_h: height as i32 - 2 * margin_y,
            x_hi: range.hi(),
            x_span: if x_span > 0.0 { x_span } else { 1.0 },
            y_min: y_min - pad,
            y_span: (y_max - y_min) + 2.0 * pad,
            width: width as i32,
        }
    }

    fn to_pixel(&self, x: f64, y: f64) -> (i32, i32) {
        let fx = (self.x_hi - x) / self.x_span;
        let fy = 1.0 - (y - self.y_min) / self.y_span;
        (
            self.left + (fx * self.plot_w as f64).round() as i32,
            self.top + (fy * self.plot_h as f64).round() as i32,
        )
    }

    fn draw_border(&self, img: &mut RgbImage) {
        let (l, t) = (self.left, self.top);
        let (r, b) = (self.left + self.plot_w, self.top + self.plot_h);
        draw_line(img, (l, t), (r, t), BORDER);
        draw_line(img, (l, b), (r, b), BORDER);
        draw_line(img, (l, t), (l, b), BORDER);
        draw_line(img, (r, t), (r, b), BORDER);
    }

    fn draw_grid(&self, img: &mut RgbImage) {
        for i in 1..10 {
            let x = self.left + self.plot_w * i / 10;
            draw_line(img, (x, self.top), (x, self.top + self.plot_h), GRID);
        }
        for i in 1..5 {
            let y = self.top + self.plot_h * i / 5;
            draw_line(img, (self.left, y), (self.left + self.plot_w, y), GRID);
        }
    }

    /// Title above the plot, tick values and axis names around it.
    fn draw_labels(&self, img: &mut RgbImage, scale: i32) {
        let bottom = self.top + self.plot_h;
        let glyph_h = GLYPH_ROWS * scale;

        let title_x = (self.width - text_width(CHART_TITLE, scale)) / 2;
        draw_text(img, CHART_TITLE, (title_x, (self.top - glyph_h) / 2), TEXT, scale);

        for i in 0..=10 {
            let value = self.x_hi - self.x_span * i as f64 / 10.0;
            let tick = format!("{value:.0}");
            let x = self.left + self.plot_w * i / 10 - text_width(&tick, scale) / 2;
            draw_text(img, &tick, (x, bottom + 2 * scale), TEXT, scale);
        }
        let label_x = self.left + (self.plot_w - text_width(X_LABEL, scale)) / 2;
        draw_text(img, X_LABEL, (label_x, bottom + 9 * scale), TEXT, scale);

        let decimals = if self.y_span < 5.0 { 1 } else { 0 };
        for i in 0..=5 {
            let value = self.y_min + self.y_span * (5 - i) as f64 / 5.0;
            let tick = format!("{value:.decimals$}");
            let x = self.left - 2 * scale - text_width(&tick, scale);
            let y = self.top + self.plot_h * i / 5 - glyph_h / 2;
            draw_text(img, &tick, (x, y), TEXT, scale);
        }
        let label_y = self.top + (self.plot_h + text_width(Y_LABEL, scale)) / 2;
        draw_text_upwards(img, Y_LABEL, (scale, label_y), TEXT, scale);
    }
}

// ---------------------------------------------------------------------------
// Legend
// ---------------------------------------------------------------------------

/// Boxed legend in the top-right corner of the plot: one colour swatch and
/// label per trace.
struct Legend {
    left: i32,
    top: i32,
    width: i32,
    scale: i32,
}

impl Legend {
    fn new(frame: &Frame, views: &[TraceView], scale: i32) -> Self {
        let widest = views
            .iter()
            .map(|v| text_width(&v.label, scale))
            .max()
            .unwrap_or(0);
        let width = 9 * scale + widest + 2 * scale;
        Self {
            left: frame.left + frame.plot_w - width - 2 * scale,
            top: frame.top + 2 * scale,
            width,
            scale,
        }
    }

    fn row_height(&self) -> i32 {
        (GLYPH_ROWS + 3) * self.scale
    }

    /// Top-left corner and size of the swatch for row `i`.
    fn swatch(&self, i: usize) -> ((i32, i32), (i32, i32)) {
        let s = self.scale;
        let y = self.top + 2 * s + i as i32 * self.row_height();
        ((self.left + 2 * s, y + s), (5 * s, 3 * s))
    }

    fn draw(&self, img: &mut RgbImage, views: &[TraceView]) {
        let s = self.scale;
        let height = views.len() as i32 * self.row_height() + 3 * s;
        fill_rect(img, (self.left, self.top), (self.width, height), BACKGROUND);
        let (r, b) = (self.left + self.width, self.top + height);
        draw_line(img, (self.left, self.top), (r, self.top), BORDER);
        draw_line(img, (self.left, b), (r, b), BORDER);
        draw_line(img, (self.left, self.top), (self.left, b), BORDER);
        draw_line(img, (r, self.top), (r, b), BORDER);

        for (i, view) in views.iter().enumerate() {
            let (at, size) = self.swatch(i);
            fill_rect(img, at, size, trace_color(view));
            draw_text(img, &view.label, (at.0 + 7 * s, at.1 - s), TEXT, s);
        }
    }
}

fn put(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line, clipped to the image.
fn draw_line(img: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>) {
    let (x0, y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut cx, mut cy) = (x0, y0);
    loop {
        put(img, cx, cy, color);
        if cx == x1 && cy == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cx += sx;
        }
        if e2 <= dx {
            err += dx;
            cy += sy;
        }
    }
}

fn draw_thick_line(img: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>, stroke: i32) {
    let half = stroke / 2;
    for o in -half..=half {
        draw_line(img, (from.0, from.1 + o), (to.0, to.1 + o), color);
    }
}

fn fill_rect(img: &mut RgbImage, at: (i32, i32), size: (i32, i32), color: Rgb<u8>) {
    for y in at.1..at.1 + size.1 {
        for x in at.0..at.0 + size.0 {
            put(img, x, y, color);
        }
    }
}

/// Filled square centred on `at`.
fn draw_marker(img: &mut RgbImage, at: (i32, i32), color: Rgb<u8>, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            put(img, at.0 + dx, at.1 + dy, color);
        }
    }
}

// ---------------------------------------------------------------------------
// 3×5 bitmap font
// ---------------------------------------------------------------------------

const GLYPH_ROWS: i32 = 5;
/// Horizontal advance per character, in font dots (3 wide + 1 gap).
const ADVANCE: i32 = 4;

/// Rows of a character, top first; bit 2 is the leftmost column. Letters
/// ignore case and anything unknown renders as a centred dot.
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        ' ' => [0; 5],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '-' | '_' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        // Superscripts sit in the upper rows.
        '⁻' => [0b111, 0b000, 0b000, 0b000, 0b000],
        '¹' => [0b010, 0b110, 0b010, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    (n * ADVANCE - 1).max(0) * scale
}

/// Left-to-right text with its top-left corner at `at`.
fn draw_text(img: &mut RgbImage, text: &str, at: (i32, i32), color: Rgb<u8>, scale: i32) {
    for (i, c) in text.chars().enumerate() {
        let origin_x = at.0 + i as i32 * ADVANCE * scale;
        for_each_dot(c, |col, row| {
            fill_rect(img, (origin_x + col * scale, at.1 + row * scale), (scale, scale), color);
        });
    }
}

/// Text rotated a quarter turn anticlockwise, reading bottom to top from
/// its bottom-left corner at `at`.
fn draw_text_upwards(img: &mut RgbImage, text: &str, at: (i32, i32), color: Rgb<u8>, scale: i32) {
    for (i, c) in text.chars().enumerate() {
        let origin_y = at.1 - i as i32 * ADVANCE * scale;
        for_each_dot(c, |col, row| {
            fill_rect(img, (at.0 + row * scale, origin_y - (col + 1) * scale), (scale, scale), color);
        });
    }
}

fn for_each_dot(c: char, mut dot: impl FnMut(i32, i32)) {
    for (row, bits) in glyph(c).into_iter().enumerate() {
        for col in 0..3 {
            if (bits >> (2 - col)) & 1 == 1 {
                dot(col, row as i32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Peak;

    fn view() -> TraceView {
        TraceView {
            name: "a.csv".into(),
            label: "a".into(),
            color: "blue".into(),
            series: [(4000.0, 100.0), (3000.0, 80.0), (2000.0, 20.0), (1000.0, 90.0)]
                .into_iter()
                .collect(),
            peaks: vec![Peak {
                wavenumber: 2000,
                transmission: 20.0,
            }],
        }
    }

    fn count(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn draws_traces_in_their_colour() {
        let img = render_chart(&[view()], WavenumberRange::new(4000.0, 600.0), false, 600, 400);
        assert_eq!(img.dimensions(), (600, 400));
        assert!(count(&img, Rgb([0, 0, 255])) > 100);
    }

    #[test]
    fn high_wavenumbers_are_on_the_left() {
        let frame = Frame::new(1200, 600, WavenumberRange::new(600.0, 4000.0), &[view()]);
        let (x_left, _) = frame.to_pixel(4000.0, 50.0);
        let (x_right, _) = frame.to_pixel(600.0, 50.0);
        assert!(x_left < x_right);
        let (_, y_low) = frame.to_pixel(2000.0, 20.0);
        let (_, y_high) = frame.to_pixel(2000.0, 100.0);
        assert!(y_high < y_low);
    }

    #[test]
    fn peak_markers_only_when_requested() {
        let range = WavenumberRange::new(4000.0, 600.0);
        let without = render_chart(&[view()], range, false, 600, 400);
        let with = render_chart(&[view()], range, true, 600, 400);
        assert!(count(&with, Rgb([0, 0, 255])) > count(&without, Rgb([0, 0, 255])));
    }

    #[test]
    fn empty_chart_is_just_the_frame() {
        let img = render_chart(&[], WavenumberRange::new(4000.0, 4000.0), true, 200, 100);
        assert!(count(&img, BORDER) > 0);
        assert_eq!(count(&img, Rgb([0, 0, 255])), 0);
    }

    fn count_in(img: &RgbImage, color: Rgb<u8>, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| *img.get_pixel(x, y) == color)
            .count()
    }

    #[test]
    fn legend_has_a_swatch_per_trace() {
        let mut green = view();
        green.label = "second".into();
        green.color = "lime".into();
        let views = [view(), green];
        let range = WavenumberRange::new(4000.0, 600.0);
        let img = render_chart(&views, range, false, 600, 400);

        let frame = Frame::new(600, 400, range, &views);
        let legend = Legend::new(&frame, &views, text_scale(400));
        for (i, expected) in [Rgb([0, 0, 255]), Rgb([0, 255, 0])].into_iter().enumerate() {
            let ((x, y), (w, h)) = legend.swatch(i);
            let area = (w * h) as usize;
            let xs = x as u32..(x + w) as u32;
            let ys = y as u32..(y + h) as u32;
            assert_eq!(count_in(&img, expected, xs, ys), area, "swatch {i}");
        }
        // Legend labels sit to the right of the swatches.
        let ((x, y), (w, h)) = legend.swatch(0);
        let label_xs = (x + w) as u32..(legend.left + legend.width) as u32;
        assert!(count_in(&img, TEXT, label_xs, y as u32..(y + h + 4) as u32) > 0);
    }

    #[test]
    fn title_and_axis_labels_are_drawn() {
        let range = WavenumberRange::new(4000.0, 600.0);
        let img = render_chart(&[view()], range, false, 600, 400);
        let frame = Frame::new(600, 400, range, &[view()]);
        let (top, bottom, left) = (frame.top as u32, (frame.top + frame.plot_h) as u32, frame.left as u32);

        // Title band above the plot, centred.
        assert!(count_in(&img, TEXT, 200..400, 0..top) > 0);
        assert_eq!(count_in(&img, TEXT, 0..200, 0..20), 0);
        // Tick values and x label below, tick values and y label to the left.
        assert!(count_in(&img, TEXT, left..600, bottom + 1..400) > 0);
        assert!(count_in(&img, TEXT, 0..left, top..bottom) > 0);
    }

    #[test]
    fn text_width_counts_dots_and_gaps() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("1", 1), 3);
        assert_eq!(text_width("2000", 2), 30);
        assert_eq!(text_width("cm⁻¹", 1), 15);
    }

    #[test]
    fn peak_wavenumber_is_written_under_the_marker() {
        let range = WavenumberRange::new(4000.0, 600.0);
        let frame = Frame::new(600, 400, range, &[view()]);
        let (px, py) = frame.to_pixel(2000.0, 20.0);
        let xs = (px - 20) as u32..(px + 20) as u32;
        let ys = (py + 4) as u32..(py + 16) as u32;

        let without = render_chart(&[view()], range, false, 600, 400);
        let with = render_chart(&[view()], range, true, 600, 400);
        assert_eq!(count_in(&without, Rgb([0, 0, 255]), xs.clone(), ys.clone()), 0);
        assert!(count_in(&with, Rgb([0, 0, 255]), xs, ys) > 0);
    }

    #[test]
    fn unknown_colour_draws_grey() {
        let mut v = view();
        v.color = "???".into();
        let img = render_chart(&[v], WavenumberRange::new(4000.0, 600.0), false, 600, 400);
        assert!(count(&img, Rgb([160, 160, 160])) > 0);
    }
}
