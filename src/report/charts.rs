//! Inline SVG charts
//!
//! Charts are plain SVG strings so reports stay self-contained.

use super::html::escape_html;
use crate::profile::Histogram;

const WIDTH: f64 = 400.0;
const HEIGHT: f64 = 160.0;
const AXIS_SPACE: f64 = 18.0;

/// Vertical bar chart of a histogram; `label` formats bin edges
pub fn histogram_svg(hist: &Histogram, label: impl Fn(f64) -> String) -> String {
    let max = hist.max_count().max(1) as f64;
    let bins = hist.counts.len().max(1) as f64;
    let bar_width = WIDTH / bins;
    let plot_height = HEIGHT - AXIS_SPACE;

    let mut bars = String::new();
    for (i, (lo, hi, count)) in hist.bins().enumerate() {
        let h = count as f64 / max * plot_height;
        let x = i as f64 * bar_width;
        bars.push_str(&format!(
            r#"<rect class="bar" x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}"><title>{range}: {count}</title></rect>"#,
            y = plot_height - h,
            w = (bar_width - 1.0).max(0.5),
            range = escape_html(&format!("[{}, {}]", label(lo), label(hi))),
        ));
    }

    let first = hist.edges.first().copied().map(&label).unwrap_or_default();
    let last = hist.edges.last().copied().map(&label).unwrap_or_default();
    format!(
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Histogram">{bars}<line class="axis" x1="0" y1="{plot_height}" x2="{WIDTH}" y2="{plot_height}"/><text x="0" y="{HEIGHT}">{first}</text><text x="{WIDTH}" y="{HEIGHT}" text-anchor="end">{last}</text></svg>"#,
        first = escape_html(&first),
        last = escape_html(&last),
    )
}

/// Horizontal bars, one per `(label, value)`, scaled to `max`
pub fn horizontal_bars_svg(rows: &[(String, usize)], max: usize) -> String {
    const ROW: f64 = 18.0;
    const LABEL: f64 = 140.0;

    let max = max.max(1) as f64;
    let height = ROW * rows.len().max(1) as f64;
    let plot = WIDTH - LABEL - 50.0;

    let mut body = String::new();
    for (i, (name, value)) in rows.iter().enumerate() {
        let y = i as f64 * ROW;
        let w = *value as f64 / max * plot;
        body.push_str(&format!(
            r#"<text x="{tx}" y="{ty:.1}" text-anchor="end">{name}</text><rect class="bar" x="{LABEL}" y="{ry:.1}" width="{w:.2}" height="{rh}"/><text x="{vx:.2}" y="{ty:.1}">{value}</text>"#,
            tx = LABEL - 6.0,
            ty = y + ROW * 0.7,
            ry = y + 2.0,
            rh = ROW - 4.0,
            vx = LABEL + w + 4.0,
            name = escape_html(&truncate(name, 22)),
        ));
    }

    format!(r#"<svg class="chart" viewBox="0 0 {WIDTH} {height}" role="img" aria-label="Bar chart">{body}</svg>"#)
}

/// Inline progress bar for a ratio in `[0, 1]`
pub fn progress_bar(ratio: f64) -> String {
    format!(
        r#"<div class="progress"><div class="progress-bar" style="width: {:.1}%"></div></div>"#,
        (ratio * 100.0).clamp(0.0, 100.0)
    )
}

/// Background colour for a correlation cell: blue for negative, orange for positive
pub fn correlation_color(r: f64) -> String {
    let t = r.abs().clamp(0.0, 1.0);
    let (tr, tg, tb) = if r < 0.0 {
        (59.0, 111.0, 182.0)
    } else {
        (233.0, 84.0, 32.0)
    };
    let mix = |target: f64| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel = (255.0 - (255.0 - target) * t).round() as u8;
        channel
    };
    format!("rgb({}, {}, {})", mix(tr), mix(tg), mix(tb))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max_chars - 1).collect();
        short.push('…');
        short
    }
}
