//! SVG rendering of a polygon and its kinks.
//!
//! Map coordinates are y-up, so y is negated on the way out.

use std::fmt::{self, Write};

use kinks_core::{validation::warning_message, Kink, Polygon};

/// SVG rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Canvas width in pixels
    pub width: f64,
    /// Canvas height in pixels
    pub height: f64,
    /// Padding around the polygon (fraction of its extent)
    pub padding: f64,
    /// Outline stroke width in pixels
    pub stroke_width: f64,
    /// Fill opacity (0.0 - 1.0)
    pub fill_opacity: f64,
    /// Kink marker radius in pixels
    pub marker_radius: f64,
    /// Whether to label vertices with their indices
    pub show_labels: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 0.1,
            stroke_width: 2.0,
            fill_opacity: 0.3,
            marker_radius: 12.0,
            show_labels: false,
        }
    }
}

const OUTLINE: &str = "#377eb8";
const MARKER: &str = "#dc3545";

/// Render `polygon` with a marker on each kink, plus the warning text when there are any.
pub fn render_svg(polygon: &Polygon, kinks: &[Kink], config: &RenderConfig) -> Result<String, fmt::Error> {
    let (min_x, max_x, min_y, max_y) = compute_bounds(polygon);

    // Add padding
    let width = max_x - min_x;
    let height = max_y - min_y;
    let pad_x = width * config.padding;
    let pad_y = height * config.padding;

    let view_min_x = min_x - pad_x;
    let view_min_y = -(max_y + pad_y);
    let view_width = width + 2.0 * pad_x;
    let view_height = height + 2.0 * pad_y;

    // View units per pixel, so strokes and markers keep their on-screen size
    let px = (view_width / config.width).max(view_height / config.height);

    let mut svg = String::new();

    writeln!(
        &mut svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        config.width, config.height, view_min_x, view_min_y, view_width, view_height
    )?;

    writeln!(
        &mut svg,
        r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="white"/>"#,
        view_min_x, view_min_y, view_width, view_height
    )?;

    let vertices = polygon.vertices();
    let mut path = format!("M {} {}", vertices[0].x, flip(vertices[0].y));
    for v in &vertices[1..] {
        write!(&mut path, " L {} {}", v.x, flip(v.y))?;
    }
    path.push_str(" Z");
    writeln!(
        &mut svg,
        r#"  <path d="{}" fill="{}" fill-opacity="{}" fill-rule="evenodd" stroke="{}" stroke-width="{}"/>"#,
        path,
        OUTLINE,
        config.fill_opacity,
        OUTLINE,
        config.stroke_width * px
    )?;

    if config.show_labels {
        for (idx, v) in vertices.iter().enumerate() {
            writeln!(
                &mut svg,
                r#"  <text x="{}" y="{}" font-size="{}" fill="{}">{}</text>"#,
                v.x,
                flip(v.y),
                config.stroke_width * 6.0 * px,
                OUTLINE,
                idx
            )?;
        }
    }

    for kink in kinks {
        writeln!(
            &mut svg,
            r#"  <circle cx="{}" cy="{}" r="{}" fill="{}" fill-opacity="0.9" stroke="white" stroke-width="{}"/>"#,
            kink.p.x,
            flip(kink.p.y),
            config.marker_radius * px,
            MARKER,
            3.0 * px
        )?;
    }

    if !kinks.is_empty() {
        writeln!(
            &mut svg,
            r#"  <text x="{}" y="{}" font-size="{}" font-weight="bold" fill="{}">{}</text>"#,
            view_min_x + 10.0 * px,
            view_min_y + 24.0 * px,
            14.0 * px,
            MARKER,
            warning_message(kinks.len())
        )?;
    }

    writeln!(&mut svg, "</svg>")?;

    Ok(svg)
}

/// SVG y for map y; `0 - y` rather than `-y` so zero prints as `0`, not `-0`.
fn flip(y: f64) -> f64 {
    0. - y
}

/// Compute bounding box of the polygon's vertices
fn compute_bounds(polygon: &Polygon) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for v in polygon.vertices() {
        min_x = min_x.min(v.x);
        max_x = max_x.max(v.x);
        min_y = min_y.min(v.y);
        max_y = max_y.max(v.y);
    }

    // Collinear rings have zero extent along one axis
    if max_x - min_x <= 0.0 {
        min_x -= 1.0;
        max_x += 1.0;
    }
    if max_y - min_y <= 0.0 {
        min_y -= 1.0;
        max_y += 1.0;
    }

    (min_x, max_x, min_y, max_y)
}
