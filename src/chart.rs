//! # Throughput Chart
//!
//! Renders a [`ThroughputSeries`] as a line chart with a filled area, a
//! dashed average-throughput reference line and a marker on the peak bucket.
//!
//! [`ThroughputChart`] is a plain value owned by the caller. Nothing is drawn
//! until one of the render or save methods is called, and each call renders
//! from scratch, so the same chart can be exported to several formats.
//!
//! - SVG (vector): full chart including title, axis labels, tick labels,
//!   peak annotation and legend.
//! - PNG (raster): the same geometry without text.

use crate::throughput::ThroughputSeries;
use crate::utils::{format_decimal, format_seconds};
use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const Y_TICKS: usize = 5;
const X_TICKS: usize = 6;
/// Headroom above the peak so the annotation stays inside the plot
const Y_HEADROOM: f64 = 1.25;
const PEAK_LABEL_LIFT: f64 = 0.15;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([200, 200, 200]);
const LINE: Rgb<u8> = Rgb([0, 0, 255]);
const PEAK: Rgb<u8> = Rgb([0, 0, 139]);
const AVERAGE: Rgb<u8> = Rgb([255, 0, 0]);

/// Size and labelling of a rendered chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl ChartOptions {
    /// Default 1200x600 layout titled after the bucket width of `series`
    pub fn for_series(series: &ThroughputSeries) -> Self {
        Self {
            width: 1200,
            height: 600,
            title: format!(
                "ChatFlow Load Test - Throughput Over Time ({}s buckets)",
                format_seconds(series.bucket_width_seconds)
            ),
        }
    }
}

/// Chart builder over a borrowed series
pub struct ThroughputChart<'a> {
    series: &'a ThroughputSeries,
    options: ChartOptions,
}

/// Data-to-pixel mapping for one render
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    x_max: f64,
    y_max: f64,
}

impl Frame {
    fn x(&self, seconds: f64) -> f64 {
        self.left + (seconds / self.x_max) * (self.right - self.left)
    }

    fn y(&self, throughput: f64) -> f64 {
        self.bottom - (throughput / self.y_max) * (self.bottom - self.top)
    }
}

impl<'a> ThroughputChart<'a> {
    pub fn new(series: &'a ThroughputSeries, options: ChartOptions) -> Self {
        Self { series, options }
    }

    pub fn with_defaults(series: &'a ThroughputSeries) -> Self {
        Self::new(series, ChartOptions::for_series(series))
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    fn frame(&self) -> Frame {
        let x_max = self.series.covered_seconds().max(self.series.bucket_width_seconds);
        let top = self.series.max_throughput();
        let y_max = if top > 0.0 { top * Y_HEADROOM } else { 1.0 };

        Frame {
            left: MARGIN_LEFT,
            right: self.options.width as f64 - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: self.options.height as f64 - MARGIN_BOTTOM,
            x_max,
            y_max,
        }
    }

    fn points(&self, frame: &Frame) -> Vec<(f64, f64)> {
        self.series
            .buckets
            .iter()
            .map(|b| (frame.x(b.start_seconds), frame.y(b.throughput_per_second)))
            .collect()
    }

    /// Render the chart as a standalone SVG document
    pub fn render_svg(&self) -> String {
        let frame = self.frame();
        let points = self.points(&frame);
        let (w, h) = (self.options.width, self.options.height);
        let mut svg = String::new();

        svg.push_str(&format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" \
             width=\"{w}\" height=\"{h}\" font-family=\"sans-serif\">\n\
             <rect width=\"{w}\" height=\"{h}\" fill=\"white\"/>\n"
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"32\" text-anchor=\"middle\" font-size=\"18\" font-weight=\"bold\">{}</text>\n",
            w as f64 / 2.0,
            escape(&self.options.title)
        ));

        let y_precision = tick_precision(frame.y_max);
        for i in 0..=Y_TICKS {
            let value = frame.y_max * i as f64 / Y_TICKS as f64;
            let y = frame.y(value);
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#cccccc\" stroke-dasharray=\"4,4\"/>\n",
                frame.left, frame.right
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\">{}</text>\n",
                frame.left - 8.0,
                y + 4.0,
                format_decimal(value, y_precision)
            ));
        }

        let x_precision = tick_precision(frame.x_max);
        for i in 0..=X_TICKS {
            let value = frame.x_max * i as f64 / X_TICKS as f64;
            let x = frame.x(value);
            svg.push_str(&format!(
                "<line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"#cccccc\" stroke-dasharray=\"4,4\"/>\n",
                frame.top, frame.bottom
            ));
            svg.push_str(&format!(
                "<text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\">{}</text>\n",
                frame.bottom + 18.0,
                format_decimal(value, x_precision)
            ));
        }

        svg.push_str(&format!(
            "<polyline points=\"{l:.1},{t:.1} {l:.1},{b:.1} {r:.1},{b:.1}\" fill=\"none\" stroke=\"black\"/>\n",
            l = frame.left,
            t = frame.top,
            b = frame.bottom,
            r = frame.right
        ));

        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            let mut area = format!("M{:.1},{:.1}", first.0, frame.bottom);
            for (x, y) in &points {
                area.push_str(&format!(" L{x:.1},{y:.1}"));
            }
            area.push_str(&format!(" L{:.1},{:.1} Z", last.0, frame.bottom));
            svg.push_str(&format!(
                "<path d=\"{area}\" fill=\"blue\" fill-opacity=\"0.15\" stroke=\"none\"/>\n"
            ));

            let line: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
            svg.push_str(&format!(
                "<polyline points=\"{}\" fill=\"none\" stroke=\"blue\" stroke-width=\"2\"/>\n",
                line.join(" ")
            ));
            for (x, y) in &points {
                svg.push_str(&format!(
                    "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"4\" fill=\"blue\"/>\n"
                ));
            }

            let avg_y = frame.y(self.series.average_throughput_per_second);
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{avg_y:.1}\" x2=\"{:.1}\" y2=\"{avg_y:.1}\" \
                 stroke=\"red\" stroke-opacity=\"0.5\" stroke-width=\"1.5\" stroke-dasharray=\"8,5\"/>\n",
                frame.left, frame.right
            ));

            if let Some(peak) = &self.series.peak {
                let px = frame.x(peak.start_seconds);
                let py = frame.y(peak.throughput_per_second);
                let ty = frame.y(peak.throughput_per_second * (1.0 + PEAK_LABEL_LIFT));
                svg.push_str(&format!(
                    "<line x1=\"{px:.1}\" y1=\"{:.1}\" x2=\"{px:.1}\" y2=\"{:.1}\" stroke=\"darkblue\" stroke-width=\"2\"/>\n\
                     <path d=\"M{px:.1},{:.1} l-5,-9 l10,0 Z\" fill=\"darkblue\"/>\n\
                     <text x=\"{px:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\" font-weight=\"bold\" fill=\"darkblue\">Peak: {} msg/s</text>\n",
                    ty,
                    py - 6.0,
                    py - 6.0,
                    ty - 4.0,
                    format_decimal(peak.throughput_per_second, 0)
                ));
            }

            let lx = frame.right - 230.0;
            let ly = frame.top + 20.0;
            svg.push_str(&format!(
                "<line x1=\"{lx:.1}\" y1=\"{ly:.1}\" x2=\"{:.1}\" y2=\"{ly:.1}\" stroke=\"blue\" stroke-width=\"2\"/>\n\
                 <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">Throughput</text>\n\
                 <line x1=\"{lx:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"red\" stroke-opacity=\"0.5\" stroke-dasharray=\"8,5\"/>\n\
                 <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">Average: {} msg/s</text>\n",
                lx + 30.0,
                lx + 38.0,
                ly + 4.0,
                ly + 20.0,
                lx + 30.0,
                ly + 20.0,
                lx + 38.0,
                ly + 24.0,
                format_decimal(self.series.average_throughput_per_second, 0)
            ));
        }

        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\">Time (seconds)</text>\n",
            (frame.left + frame.right) / 2.0,
            h as f64 - 22.0
        ));
        svg.push_str(&format!(
            "<text x=\"24\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\" transform=\"rotate(-90 24 {:.1})\">Throughput (messages/second)</text>\n",
            (frame.top + frame.bottom) / 2.0,
            (frame.top + frame.bottom) / 2.0
        ));
        svg.push_str("</svg>\n");
        svg
    }

    /// Render the chart geometry into an RGB raster
    pub fn render_png(&self) -> RgbImage {
        let frame = self.frame();
        let points = self.points(&frame);
        let mut img = RgbImage::from_pixel(self.options.width, self.options.height, WHITE);

        for i in 0..=Y_TICKS {
            let y = frame.y(frame.y_max * i as f64 / Y_TICKS as f64);
            draw_line(&mut img, (frame.left, y), (frame.right, y), GRID, 1.0, 1, Some((4, 4)));
        }
        for i in 0..=X_TICKS {
            let x = frame.x(frame.x_max * i as f64 / X_TICKS as f64);
            draw_line(&mut img, (x, frame.top), (x, frame.bottom), GRID, 1.0, 1, Some((4, 4)));
        }

        fill_under(&mut img, &points, frame.bottom, LINE, 0.15);

        draw_line(&mut img, (frame.left, frame.top), (frame.left, frame.bottom), BLACK, 1.0, 1, None);
        draw_line(&mut img, (frame.left, frame.bottom), (frame.right, frame.bottom), BLACK, 1.0, 1, None);

        for pair in points.windows(2) {
            draw_line(&mut img, pair[0], pair[1], LINE, 1.0, 2, None);
        }
        for &(x, y) in &points {
            fill_circle(&mut img, (x, y), 4.0, LINE);
        }

        if !points.is_empty() {
            let avg_y = frame.y(self.series.average_throughput_per_second);
            draw_line(&mut img, (frame.left, avg_y), (frame.right, avg_y), AVERAGE, 0.5, 2, Some((8, 5)));
        }

        if let Some(peak) = &self.series.peak {
            let px = frame.x(peak.start_seconds);
            let py = frame.y(peak.throughput_per_second);
            let ty = frame.y(peak.throughput_per_second * (1.0 + PEAK_LABEL_LIFT));
            draw_line(&mut img, (px, ty), (px, py - 8.0), PEAK, 1.0, 2, None);
            fill_circle(&mut img, (px, py), 6.0, PEAK);
        }

        img
    }

    pub fn save_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render_svg())
            .with_context(|| format!("failed to write SVG chart to {}", path.display()))?;
        debug!("Wrote SVG chart: {}", path.display());
        Ok(())
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.render_png()
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("failed to write PNG chart to {}", path.display()))?;
        debug!("Wrote PNG chart: {}", path.display());
        Ok(())
    }

    /// Write `<basename>.png` and `<basename>.svg` into `dir`
    pub fn save_all<P: AsRef<Path>>(&self, dir: P, basename: &str) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create chart directory {}", dir.display()))?;

        let png = dir.join(format!("{basename}.png"));
        let svg = dir.join(format!("{basename}.svg"));
        self.save_png(&png)?;
        self.save_svg(&svg)?;

        info!("Charts saved: {}, {}", png.display(), svg.display());
        Ok(vec![png, svg])
    }
}

fn tick_precision(max: f64) -> usize {
    if max >= 10.0 {
        0
    } else if max >= 1.0 {
        1
    } else {
        2
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn blend(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, alpha: f64) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        let mixed = pixel.0[c] as f64 * (1.0 - alpha) + color.0[c] as f64 * alpha;
        pixel.0[c] = mixed.round().clamp(0.0, 255.0) as u8;
    }
}

/// Straight line by uniform stepping; `dash` is an (on, off) pixel pattern
fn draw_line(
    img: &mut RgbImage,
    from: (f64, f64),
    to: (f64, f64),
    color: Rgb<u8>,
    alpha: f64,
    thickness: i64,
    dash: Option<(usize, usize)>,
) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

    for step in 0..=steps {
        if let Some((on, off)) = dash {
            if step % (on + off) >= on {
                continue;
            }
        }
        let t = step as f64 / steps as f64;
        let x = (from.0 + dx * t).round() as i64;
        let y = (from.1 + dy * t).round() as i64;
        for ox in 0..thickness {
            for oy in 0..thickness {
                blend(img, x + ox, y + oy, color, alpha);
            }
        }
    }
}

fn fill_circle(img: &mut RgbImage, center: (f64, f64), radius: f64, color: Rgb<u8>) {
    let r = radius.ceil() as i64;
    let (cx, cy) = (center.0.round() as i64, center.1.round() as i64);
    for oy in -r..=r {
        for ox in -r..=r {
            if ((ox * ox + oy * oy) as f64) <= radius * radius {
                blend(img, cx + ox, cy + oy, color, 1.0);
            }
        }
    }
}

/// Shade the area between the polyline and `baseline`, one column at a time
fn fill_under(img: &mut RgbImage, points: &[(f64, f64)], baseline: f64, color: Rgb<u8>, alpha: f64) {
    if points.len() < 2 {
        return;
    }

    let start = points[0].0.round() as i64;
    let end = points[points.len() - 1].0.round() as i64;
    let mut segment = 0;

    for x in start..=end {
        let xf = x as f64;
        while segment + 2 < points.len() && xf > points[segment + 1].0 {
            segment += 1;
        }
        let (a, b) = (points[segment], points[segment + 1]);
        let t = if b.0 > a.0 {
            ((xf - a.0) / (b.0 - a.0)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let top = (a.1 + (b.1 - a.1) * t).round() as i64;
        for y in top..=baseline.round() as i64 {
            blend(img, x, y, color, alpha);
        }
    }
}
