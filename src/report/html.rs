//! HTML report rendering
//!
//! Produces one self-contained document with inline CSS and SVG charts. Every
//! value that comes from the uploaded data goes through [`escape_html`].

use chrono::{DateTime, TimeDelta};

use super::charts::{correlation_color, histogram_svg, horizontal_bars_svg, progress_bar};
use super::theme::BASE_CSS;
use crate::profile::alerts::percent;
use crate::profile::correlation::Matrix;
use crate::profile::variable::{
    BooleanStats, DateTimeStats, NumericStats, TextStats, VariableKind,
};
use crate::profile::{Details, Profile, SampleRow, VariableSummary};

/// Render a profile as a complete HTML document
pub fn render_document(profile: &Profile) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta name="generator" content="{generator}">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
{navbar}
<div class="container-fluid">
{overview}
{variables}
{correlations}
{missing}
{sample}
{duplicates}
</div>
{footer}
</body>
</html>
"#,
        generator = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")),
        title = escape_html(&profile.title),
        css = BASE_CSS,
        navbar = render_navbar(&profile.title),
        overview = render_overview(profile),
        variables = render_variables(&profile.variables),
        correlations = render_correlations(profile),
        missing = render_missing(&profile.variables),
        sample = render_sample(profile),
        duplicates = render_duplicates(profile),
        footer = render_footer(profile),
    )
}

fn render_navbar(title: &str) -> String {
    let links: String = [
        ("overview", "Overview"),
        ("variables", "Variables"),
        ("correlations", "Correlations"),
        ("missing", "Missing values"),
        ("sample", "Sample"),
        ("duplicates", "Duplicate rows"),
    ]
    .iter()
    .map(|(id, label)| format!(r##"<a class="nav-link" href="#{id}">{label}</a>"##))
    .collect();

    format!(
        r##"<nav class="navbar"><a class="navbar-brand" href="#">{title}</a>{links}</nav>"##,
        title = escape_html(title),
    )
}

fn section(id: &str, title: &str, body: &str) -> String {
    format!(
        r#"<section class="section" id="{id}">
<h2 class="section-title">{title}</h2>
{body}
</section>"#
    )
}

fn render_overview(profile: &Profile) -> String {
    let ds = &profile.dataset;
    let avg_record = if ds.n_rows == 0 {
        0
    } else {
        ds.memory_bytes / ds.n_rows
    };

    let stats = table(&[
        ("Number of variables", ds.n_vars.to_string()),
        ("Number of observations", ds.n_rows.to_string()),
        ("Missing cells", ds.missing_cells.to_string()),
        ("Missing cells (%)", percent(ds.missing_cells_ratio)),
        ("Duplicate rows", ds.duplicate_rows.to_string()),
        ("Duplicate rows (%)", percent(ds.duplicate_ratio)),
        ("Total size in memory", format_bytes(ds.memory_bytes)),
        ("Average record size in memory", format_bytes(avg_record)),
    ]);

    let kinds: Vec<(&str, String)> = ds
        .kinds
        .iter()
        .map(|(kind, n)| (kind.label(), n.to_string()))
        .collect();

    let alerts = if profile.alerts.is_empty() {
        r#"<p class="muted">No alerts.</p>"#.to_string()
    } else {
        let items: String = profile
            .alerts
            .iter()
            .map(|alert| {
                format!(
                    r#"<li><span class="badge badge-warning">{kind}</span> {message}</li>"#,
                    kind = alert.kind,
                    message = escape_html(&alert.message),
                )
            })
            .collect();
        format!(r#"<ul class="alerts">{items}</ul>"#)
    };

    let body = format!(
        r#"<div class="row">
<div class="col card"><h3>Dataset statistics</h3>{stats}</div>
<div class="col card"><h3>Variable types</h3>{types}</div>
</div>
<div class="card"><h3>Alerts <span class="badge">{count}</span></h3>{alerts}</div>
<div class="card"><h3>Reproduction</h3>{repro}</div>"#,
        types = table(&kinds),
        count = profile.alerts.len(),
        repro = table(&[
            ("Source file", escape_html(&profile.source_name)),
            ("Source format", profile.format.to_string()),
            (
                "Analysis started",
                profile.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
            ),
        ]),
    );
    section("overview", "Overview", &body)
}

fn render_variables(variables: &[VariableSummary]) -> String {
    let cards: String = variables
        .iter()
        .enumerate()
        .map(|(index, var)| render_variable(index, var))
        .collect();
    section("variables", "Variables", &cards)
}

fn render_variable(index: usize, var: &VariableSummary) -> String {
    let common = &var.common;
    let mut rows = vec![
        ("Distinct", common.distinct.to_string()),
        ("Distinct (%)", percent(common.distinct_ratio)),
        ("Missing", common.missing.to_string()),
        ("Missing (%)", percent(common.missing_ratio)),
        ("Memory size", format_bytes(common.memory_bytes)),
    ];

    let (detail, chart) = match &var.details {
        Details::Numeric(stats) => {
            rows.extend(numeric_overview(stats));
            (numeric_details(stats), numeric_chart(stats))
        }
        Details::Categorical(text) | Details::Text(text) => {
            (text_details(text, common.count), text_chart(text))
        }
        Details::Boolean(stats) => (boolean_details(stats, common.count), String::new()),
        Details::DateTime(stats) => {
            rows.extend(datetime_overview(stats));
            (String::new(), datetime_chart(stats))
        }
        Details::Unsupported => (
            r#"<p class="muted">All values are missing.</p>"#.to_string(),
            String::new(),
        ),
    };

    format!(
        r#"<div class="card" id="var-{index}">
<h3 class="card-title">{name} {badge}{unique}</h3>
<div class="row"><div class="col">{table}</div><div class="col">{chart}</div></div>
{detail}
</div>"#,
        name = escape_html(&var.name),
        badge = kind_badge(var.kind()),
        unique = if common.is_unique && common.count > 1 {
            r#" <span class="badge badge-warning">Unique</span>"#
        } else {
            ""
        },
        table = table(&rows),
    )
}

fn numeric_overview(stats: &NumericStats) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    if let Some(s) = &stats.summary {
        rows.push(("Mean", format_number(s.mean)));
        rows.push(("Minimum", format_number(s.min)));
        rows.push(("Maximum", format_number(s.max)));
    }
    rows.push(("Zeros", stats.zeros.to_string()));
    rows.push(("Negative", stats.negatives.to_string()));
    rows.push(("Infinite", stats.infinite.to_string()));
    rows
}

fn numeric_details(stats: &NumericStats) -> String {
    let Some(s) = &stats.summary else {
        return r#"<p class="muted">No finite values.</p>"#.to_string();
    };
    let q = &s.quantiles;
    let quantiles = table(&[
        ("Minimum", format_number(s.min)),
        ("5-th percentile", format_number(q.p5)),
        ("Q1", format_number(q.p25)),
        ("Median", format_number(q.p50)),
        ("Q3", format_number(q.p75)),
        ("95-th percentile", format_number(q.p95)),
        ("Maximum", format_number(s.max)),
        ("Range", format_number(s.range)),
        ("Interquartile range (IQR)", format_number(s.iqr)),
    ]);
    let descriptive = table(&[
        ("Standard deviation", format_optional(s.std)),
        ("Coefficient of variation (CV)", format_optional(s.cv)),
        ("Kurtosis", format_optional(s.kurtosis)),
        ("Mean", format_number(s.mean)),
        ("Median Absolute Deviation (MAD)", format_number(s.mad)),
        ("Skewness", format_optional(s.skewness)),
        ("Sum", format_number(s.sum)),
        ("Variance", format_optional(s.variance)),
        ("Monotonicity", stats.monotonicity.to_string()),
    ]);
    format!(
        r#"<div class="row"><div class="col"><h4>Quantile statistics</h4>{quantiles}</div><div class="col"><h4>Descriptive statistics</h4>{descriptive}</div></div>"#
    )
}

fn numeric_chart(stats: &NumericStats) -> String {
    stats
        .histogram
        .as_ref()
        .map(|h| histogram_svg(h, format_number))
        .unwrap_or_default()
}

fn text_details(text: &TextStats, count: usize) -> String {
    let mut rows: Vec<String> = text
        .top
        .iter()
        .map(|(value, n)| frequency_row(&escape_html(value), *n, count))
        .collect();
    if text.other > 0 {
        rows.push(frequency_row(
            r#"<em>Other values</em>"#,
            text.other,
            count,
        ));
    }
    let lengths = table(&[
        ("Max length", text.max_length.to_string()),
        ("Median length", format_number(text.median_length)),
        ("Mean length", format_number(text.mean_length)),
        ("Min length", text.min_length.to_string()),
    ]);
    format!(
        r#"<div class="row"><div class="col"><h4>Common values</h4><table class="table table-sm"><tr><th>Value</th><th>Count</th><th>Frequency (%)</th><th></th></tr>{rows}</table></div><div class="col"><h4>Length</h4>{lengths}</div></div>"#,
        rows = rows.concat(),
    )
}

fn frequency_row(label_html: &str, n: usize, count: usize) -> String {
    let ratio = if count == 0 { 0.0 } else { n as f64 / count as f64 };
    format!(
        r#"<tr><td>{label_html}</td><td class="num">{n}</td><td class="num">{pct}</td><td>{bar}</td></tr>"#,
        pct = percent(ratio),
        bar = progress_bar(ratio),
    )
}

fn text_chart(text: &TextStats) -> String {
    text.length_histogram
        .as_ref()
        .map(|h| histogram_svg(h, format_number))
        .unwrap_or_default()
}

fn boolean_details(stats: &BooleanStats, count: usize) -> String {
    format!(
        r#"<h4>Common values</h4><table class="table table-sm"><tr><th>Value</th><th>Count</th><th>Frequency (%)</th><th></th></tr>{t}{f}</table>"#,
        t = frequency_row("True", stats.true_count, count),
        f = frequency_row("False", stats.false_count, count),
    )
}

fn datetime_overview(stats: &DateTimeStats) -> Vec<(&'static str, String)> {
    vec![
        ("Minimum", stats.min.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("Maximum", stats.max.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("Range", format_duration(stats.range)),
    ]
}

fn datetime_chart(stats: &DateTimeStats) -> String {
    stats
        .histogram
        .as_ref()
        .map(|h| histogram_svg(h, format_timestamp))
        .unwrap_or_default()
}

fn render_correlations(profile: &Profile) -> String {
    let Some(corr) = &profile.correlations else {
        return section(
            "correlations",
            "Correlations",
            r#"<p class="muted">Correlations need at least two numeric or boolean variables.</p>"#,
        );
    };
    let body = format!(
        r#"<div class="card"><h3>Pearson's r</h3>{pearson}</div>
<div class="card"><h3>Spearman's ρ</h3>{spearman}</div>"#,
        pearson = correlation_table(&corr.names, &corr.pearson),
        spearman = correlation_table(&corr.names, &corr.spearman),
    );
    section("correlations", "Correlations", &body)
}

fn correlation_table(names: &[String], matrix: &Matrix) -> String {
    let header: String = names
        .iter()
        .map(|n| format!("<th>{}</th>", escape_html(n)))
        .collect();
    let rows: String = names
        .iter()
        .zip(matrix)
        .map(|(name, row)| {
            let cells: String = row
                .iter()
                .map(|cell| match cell {
                    Some(r) => format!(
                        r#"<td class="num" style="background-color: {color}">{r:.3}</td>"#,
                        color = correlation_color(*r),
                    ),
                    None => "<td></td>".to_string(),
                })
                .collect();
            format!("<tr><th>{}</th>{cells}</tr>", escape_html(name))
        })
        .collect();
    format!(
        r#"<div class="table-responsive"><table class="table table-sm"><tr><th></th>{header}</tr>{rows}</table></div>"#
    )
}

fn render_missing(variables: &[VariableSummary]) -> String {
    let rows: Vec<(String, usize)> = variables
        .iter()
        .map(|v| (v.name.clone(), v.common.count))
        .collect();
    let n_rows = variables
        .first()
        .map_or(0, |v| v.common.count + v.common.missing);
    let body = format!(
        r#"<div class="card"><h3>Count of non-missing values</h3>{chart}</div>"#,
        chart = horizontal_bars_svg(&rows, n_rows),
    );
    section("missing", "Missing values", &body)
}

fn render_sample(profile: &Profile) -> String {
    let body = format!(
        r#"<div class="card"><h3>First rows</h3>{head}</div>
<div class="card"><h3>Last rows</h3>{tail}</div>"#,
        head = rows_table(&profile.columns, &profile.head),
        tail = rows_table(&profile.columns, &profile.tail),
    );
    section("sample", "Sample", &body)
}

fn rows_table(columns: &[String], rows: &[SampleRow]) -> String {
    let header: String = columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(c)))
        .collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .cells
                .iter()
                .map(|c| format!("<td>{}</td>", escape_html(c)))
                .collect();
            format!("<tr><th>{}</th>{cells}</tr>", row.index)
        })
        .collect();
    format!(
        r#"<div class="table-responsive"><table class="table table-sm"><tr><th></th>{header}</tr>{body}</table></div>"#
    )
}

fn render_duplicates(profile: &Profile) -> String {
    if profile.duplicates.is_empty() {
        return section(
            "duplicates",
            "Duplicate rows",
            r#"<p class="muted">Dataset has no duplicate rows.</p>"#,
        );
    }
    let header: String = profile
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(c)))
        .collect();
    let body: String = profile
        .duplicates
        .iter()
        .map(|dup| {
            let cells: String = dup
                .cells
                .iter()
                .map(|c| format!("<td>{}</td>", escape_html(c)))
                .collect();
            format!(r#"<tr>{cells}<td class="num">{}</td></tr>"#, dup.count)
        })
        .collect();
    let table = format!(
        r#"<div class="card"><h3>Most frequently occurring</h3><div class="table-responsive"><table class="table table-sm"><tr>{header}<th># duplicates</th></tr>{body}</table></div></div>"#
    );
    section("duplicates", "Duplicate rows", &table)
}

fn render_footer(profile: &Profile) -> String {
    format!(
        "<footer>Report generated {at} from {source} ({format}).</footer>",
        at = profile.generated_at.format("%Y-%m-%d %H:%M:%S %:z"),
        source = escape_html(&profile.source_name),
        format = profile.format,
    )
}

/// Two-column statistics table; values are already HTML
fn table<S: AsRef<str>>(rows: &[(&str, S)]) -> String {
    let body: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<tr><th>{label}</th><td class="num">{value}</td></tr>"#,
                value = value.as_ref()
            )
        })
        .collect();
    format!(r#"<table class="table table-sm">{body}</table>"#)
}

/// Escape text for element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Compact number: integers without decimals, others with up to six
pub fn format_number(v: f64) -> String {
    if !v.is_finite() {
        crate::frame::format_float(v)
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else if v.abs() >= 1e-4 && v.abs() < 1e15 {
        let fixed = format!("{v:.6}");
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        format!("{v:.4e}")
    }
}

fn format_optional(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), format_number)
}

/// Binary-prefixed size: `1536` -> `"1.5 KiB"`
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn format_duration(delta: TimeDelta) -> String {
    let days = delta.num_days();
    let rest = delta.num_seconds() - days * 86_400;
    format!(
        "{days} days {:02}:{:02}:{:02}",
        rest / 3600,
        rest % 3600 / 60,
        rest % 60
    )
}

fn format_timestamp(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let secs = seconds.round() as i64;
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn kind_badge(kind: VariableKind) -> String {
    format!(
        r#"<span class="badge badge-{}">{kind}</span>"#,
        kind.label().to_lowercase()
    )
}
