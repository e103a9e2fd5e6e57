//! Standalone SVG export of a [`DrawList`].

use crate::draw::{DrawList, DrawPrimitive};
use narwhal_graph::NodeShape;
use orca::Point;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// Extra space around the drawn content.
    pub viewbox_padding: f64,
    /// Optional document `<title>`.
    pub title: Option<String>,
    pub font_size: f64,
    pub label_color: String,
    /// Opacity applied to dimmed nodes and edges.
    pub dim_opacity: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            viewbox_padding: 24.0,
            title: None,
            font_size: 12.0,
            label_color: "#e2e8f0".to_string(),
            dim_opacity: 0.25,
        }
    }
}

pub fn render_svg(list: &DrawList, options: &SvgOptions) -> String {
    let (min, max) = bounds(list);
    let pad = options.viewbox_padding.max(0.0);
    let (vx, vy) = (min.x - pad, min.y - pad);
    let (vw, vh) = (max.x - min.x + 2.0 * pad, max.y - min.y + 2.0 * pad);

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}">"#,
        x = fmt(vx),
        y = fmt(vy),
        w = fmt(vw),
        h = fmt(vh),
    );
    if let Some(title) = &options.title {
        let _ = write!(&mut out, "<title>{}</title>", escape_xml(title));
    }

    let mut section = "";
    for primitive in list.iter() {
        let wanted = match primitive {
            DrawPrimitive::Edge { .. } => "edges",
            DrawPrimitive::Node { .. } => "nodes",
            _ => "",
        };
        if wanted != section {
            if !section.is_empty() {
                out.push_str("</g>");
            }
            if !wanted.is_empty() {
                let _ = write!(&mut out, r#"<g class="{wanted}">"#);
            }
            section = wanted;
        }

        match primitive {
            DrawPrimitive::Background { color } => {
                let _ = write!(
                    &mut out,
                    r#"<rect class="background" x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                    fmt(vx),
                    fmt(vy),
                    fmt(vw),
                    fmt(vh),
                    escape_xml(color)
                );
            }
            DrawPrimitive::Edge {
                id,
                from,
                to,
                color,
                width,
                label,
                dimmed,
                ..
            } => {
                let _ = write!(
                    &mut out,
                    r#"<line data-id="{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"{}/>"#,
                    escape_xml(id),
                    fmt(from.x),
                    fmt(from.y),
                    fmt(to.x),
                    fmt(to.y),
                    escape_xml(color),
                    fmt(*width),
                    opacity_attr(*dimmed, options),
                );
                if let Some(label) = label {
                    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
                    write_text(&mut out, mid, label, options);
                }
            }
            DrawPrimitive::Node {
                id,
                position,
                radius,
                shape,
                fill,
                ring,
                label,
                dimmed,
                ..
            } => {
                let _ = write!(
                    &mut out,
                    r#"<g class="node" data-id="{}"{}>"#,
                    escape_xml(id),
                    opacity_attr(*dimmed, options)
                );
                write_shape(&mut out, *shape, *position, *radius, fill, ring.as_deref());
                if let Some(label) = label {
                    let anchor = Point::new(position.x, position.y + radius + options.font_size);
                    write_text(&mut out, anchor, label, options);
                }
                out.push_str("</g>");
            }
            DrawPrimitive::SelectionHighlight {
                id,
                position,
                radius,
                color,
            } => {
                let _ = write!(
                    &mut out,
                    r#"<circle class="selection" data-id="{}" cx="{}" cy="{}" r="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
                    escape_xml(id),
                    fmt(position.x),
                    fmt(position.y),
                    fmt(*radius),
                    escape_xml(color)
                );
            }
        }
    }
    if !section.is_empty() {
        out.push_str("</g>");
    }
    out.push_str("</svg>\n");
    out
}

fn write_shape(
    out: &mut String,
    shape: NodeShape,
    center: Point,
    radius: f64,
    fill: &str,
    ring: Option<&str>,
) {
    let stroke = match ring {
        Some(color) => format!(r#" stroke="{}" stroke-width="3""#, escape_xml(color)),
        None => String::new(),
    };
    let Some(corners) = shape.corners() else {
        let _ = write!(
            out,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"{stroke}/>"#,
            fmt(center.x),
            fmt(center.y),
            fmt(radius),
            escape_xml(fill)
        );
        return;
    };
    // Squares sit flat; the other polygons point up.
    let start = match shape {
        NodeShape::Square => -FRAC_PI_4,
        NodeShape::Hexagon => 0.0,
        _ => -FRAC_PI_2,
    };
    let mut points = String::new();
    for i in 0..corners {
        let a = start + TAU * i as f64 / corners as f64;
        if i > 0 {
            points.push(' ');
        }
        let _ = write!(
            &mut points,
            "{},{}",
            fmt(center.x + radius * a.cos()),
            fmt(center.y + radius * a.sin())
        );
    }
    let _ = write!(
        out,
        r#"<polygon points="{points}" fill="{}"{stroke}/>"#,
        escape_xml(fill)
    );
}

fn write_text(out: &mut String, at: Point, text: &str, options: &SvgOptions) {
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="{}" fill="{}">{}</text>"#,
        fmt(at.x),
        fmt(at.y),
        fmt(options.font_size),
        escape_xml(&options.label_color),
        escape_xml(text)
    );
}

fn opacity_attr(dimmed: bool, options: &SvgOptions) -> String {
    if dimmed {
        format!(r#" opacity="{}""#, fmt(options.dim_opacity))
    } else {
        String::new()
    }
}

fn bounds(list: &DrawList) -> (Point, Point) {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut include = |p: Point, r: f64| {
        min.x = min.x.min(p.x - r);
        min.y = min.y.min(p.y - r);
        max.x = max.x.max(p.x + r);
        max.y = max.y.max(p.y + r);
    };
    for primitive in list.iter() {
        match primitive {
            DrawPrimitive::Background { .. } => {}
            DrawPrimitive::Edge { from, to, .. } => {
                include(*from, 0.0);
                include(*to, 0.0);
            }
            DrawPrimitive::Node {
                position, radius, ..
            }
            | DrawPrimitive::SelectionHighlight {
                position, radius, ..
            } => include(*position, *radius),
        }
    }
    if min.x.is_finite() && max.x.is_finite() {
        (min, max)
    } else {
        (Point::ORIGIN, Point::ORIGIN)
    }
}

/// Shortest decimal form, without `-0` or float noise below a thousandth.
fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
