//! HTML rendering for the public pages.

use rust_decimal::Decimal;
use std::fmt::Write;
use temperature_db::{Page, RecordRow};

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the `record_list` page.
pub fn render_record_list(page: &Page<RecordRow>) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Temperature records</title>\n</head>\n<body>\n<h1>Temperature records</h1>\n",
    );

    if page.items.is_empty() {
        html.push_str("<p>No records yet.</p>\n");
    } else {
        html.push_str(
            "<table>\n<thead><tr><th>Country</th><th>Date</th>\
             <th>Average temperature (°C)</th><th>Uncertainty</th></tr></thead>\n<tbody>\n",
        );
        for record in &page.items {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&record.country),
                record.date,
                fmt_decimal(record.temperature),
                fmt_decimal(record.uncertainty),
            );
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str("<nav class=\"pagination\">\n");
    if page.has_previous() {
        let _ = writeln!(html, "<a href=\"?page=1\">&laquo; first</a>");
        let _ = writeln!(html, "<a href=\"?page={}\">previous</a>", page.page - 1);
    }
    let _ = writeln!(
        html,
        "<span class=\"current\">Page {} of {}.</span>",
        page.page, page.num_pages
    );
    if page.has_next() {
        let _ = writeln!(html, "<a href=\"?page={}\">next</a>", page.page + 1);
        let _ = writeln!(html, "<a href=\"?page=last\">last &raquo;</a>");
    }
    html.push_str("</nav>\n</body>\n</html>\n");
    html
}

/// Missing values render as an empty cell.
fn fmt_decimal(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
