//! Report styling
//!
//! [`BASE_CSS`] is the light "united" look every report is rendered with.
//! [`DARK_THEME_CSS`] is injected afterwards so embedded reports match the
//! dashboard: it hides the navbar and darkens cards and tables.

/// Dark-theme override block inserted right after `<head>`
pub const DARK_THEME_CSS: &str = r"
        <style>
        /* Hide navbar */
        .navbar { display: none !important; }

        /* Dark theme overrides */
        body, html { background-color: #121212 !important; color: #e0e0e0 !important; }
        .container-fluid, .container { background-color: #121212 !important; }
        .card, .panel, .panel-default { background-color: #1e1e1e !important; border: 1px solid #333 !important; color: #e0e0e0 !important; }
        .table { background-color: #1e1e1e !important; color: #e0e0e0 !important; }
        .table th, .table td { border-color: #333 !important; }
        .progress-bar { background-color: #00d4aa !important; }
        a { color: #00d4aa !important; }
        a:hover { color: #00b894 !important; }
        pre, code { background-color: #2a2a2a !important; color: #e0e0e0 !important; }
        </style>
        ";

const HEAD_MARKER: &str = "<head>";

/// Insert `css` immediately after the first `<head>`
///
/// Documents without the marker are returned unchanged.
pub fn inject_style(html: &str, css: &str) -> String {
    html.replacen(HEAD_MARKER, &format!("{HEAD_MARKER}{css}"), 1)
}

/// Base stylesheet: orange accents, Ubuntu-style font stack, card layout
pub const BASE_CSS: &str = r"
*, *::before, *::after { box-sizing: border-box; }
html, body { margin: 0; padding: 0; }
body { font-family: Ubuntu, -apple-system, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; font-size: 0.9375rem; line-height: 1.5; color: #333; background-color: #fff; }
a { color: #e95420; text-decoration: none; }
a:hover { color: #ba431a; text-decoration: underline; }
h1, h2, h3, h4 { font-weight: 500; line-height: 1.2; margin: 0 0 0.75rem; }
.navbar { position: sticky; top: 0; z-index: 10; display: flex; align-items: center; gap: 1.5rem; padding: 0.6rem 1.25rem; background-color: #e95420; }
.navbar .navbar-brand { color: #fff; font-size: 1.15rem; font-weight: 500; }
.navbar .nav-link { color: rgba(255, 255, 255, 0.85); }
.navbar .nav-link:hover { color: #fff; }
.container-fluid { width: 100%; padding: 1.25rem; }
.section { margin-bottom: 2.5rem; }
.section-title { padding-bottom: 0.4rem; border-bottom: 2px solid #e95420; }
.row { display: flex; flex-wrap: wrap; gap: 1.25rem; }
.col { flex: 1 1 22rem; min-width: 0; }
.card { margin-bottom: 1.25rem; padding: 1rem 1.25rem; border: 1px solid rgba(0, 0, 0, 0.125); border-radius: 0.25rem; background-color: #fff; }
.card-title { display: flex; align-items: baseline; gap: 0.75rem; }
.badge { display: inline-block; padding: 0.2em 0.5em; font-size: 0.75rem; font-weight: 500; border-radius: 0.25rem; color: #fff; background-color: #aea79f; }
.badge-numeric { background-color: #e95420; }
.badge-categorical { background-color: #772953; }
.badge-boolean { background-color: #17a2b8; }
.badge-datetime { background-color: #38b44a; }
.badge-text { background-color: #868e96; }
.badge-warning { background-color: #efb73e; color: #333; }
.table { width: 100%; margin-bottom: 1rem; border-collapse: collapse; }
.table th, .table td { padding: 0.35rem 0.6rem; text-align: left; vertical-align: top; border-top: 1px solid #dee2e6; }
.table th { font-weight: 500; }
.table td.num { text-align: right; font-variant-numeric: tabular-nums; }
.table-sm th, .table-sm td { padding: 0.2rem 0.4rem; font-size: 0.85rem; }
.table-responsive { overflow-x: auto; }
.progress { display: flex; height: 0.8rem; overflow: hidden; border-radius: 0.2rem; background-color: #e9ecef; min-width: 6rem; }
.progress-bar { background-color: #e95420; }
.alerts li { margin-bottom: 0.25rem; }
.muted { color: #868e96; }
pre, code { font-family: SFMono-Regular, Menlo, Monaco, Consolas, monospace; font-size: 0.85em; background-color: #f8f9fa; }
svg.chart { width: 100%; max-width: 40rem; height: auto; }
svg.chart .bar { fill: #e95420; }
svg.chart .axis { stroke: #aea79f; stroke-width: 1; }
svg.chart text { font-size: 10px; fill: currentColor; }
footer { padding: 1rem 1.25rem; font-size: 0.8rem; color: #868e96; }
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_after_first_head_only() {
        let html = "<!DOCTYPE html><html><head><title>t</title></head><body><head></body></html>";
        let out = inject_style(html, DARK_THEME_CSS);
        assert!(out.starts_with(&format!("<!DOCTYPE html><html><head>{DARK_THEME_CSS}<title>")));
        assert_eq!(out.matches(DARK_THEME_CSS).count(), 1);
    }

    #[test]
    fn test_inject_without_marker() {
        assert_eq!(inject_style("<p>no head</p>", DARK_THEME_CSS), "<p>no head</p>");
    }

    #[test]
    fn test_dark_theme_hides_navbar() {
        assert!(DARK_THEME_CSS.contains(".navbar { display: none !important; }"));
        assert!(DARK_THEME_CSS.trim_start().starts_with("<style>"));
    }
}
