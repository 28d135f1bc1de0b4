//! HTML page rendering: filter form, KPI cards, inline SVG charts, detail table

use super::data::FilterOptions;
use super::filter::DashboardFilter;
use super::metrics::{Bucket, Summary};
use std::fmt::Write;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn money(v: f64) -> String {
    let whole = v.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

const STYLE: &str = "body{font-family:sans-serif;margin:24px;color:#222}\
form{display:flex;flex-wrap:wrap;gap:12px;align-items:flex-end;margin-bottom:20px}\
label{display:flex;flex-direction:column;font-size:12px}\
.kpis{display:flex;gap:16px;margin-bottom:24px}\
.kpi{border:1px solid #ddd;border-radius:6px;padding:12px 18px;min-width:150px}\
.kpi b{display:block;font-size:22px}\
.charts{display:grid;grid-template-columns:repeat(2,1fr);gap:24px}\
table{border-collapse:collapse;font-size:12px;margin-top:16px}\
td,th{border:1px solid #ddd;padding:3px 6px;text-align:left}";

fn select(out: &mut String, name: &str, title: &str, values: &[String], selected: Option<&str>) {
    let _ = write!(out, "<label>{}<select name=\"{}\"><option value=\"\">All</option>", title, name);
    for v in values {
        let mark = if Some(v.as_str()) == selected { " selected" } else { "" };
        let v = escape_html(v);
        let _ = write!(out, "<option value=\"{}\"{}>{}</option>", v, mark, v);
    }
    out.push_str("</select></label>");
}

fn filter_form(out: &mut String, filter: &DashboardFilter, options: &FilterOptions) {
    out.push_str("<form method=\"get\" action=\"/\">");
    let years: Vec<String> = options.years.iter().map(|y| y.to_string()).collect();
    let year = filter.year.map(|y| y.to_string());
    select(out, "year", "Year", &years, year.as_deref());

    let from = filter.from.map(|d| d.to_string()).unwrap_or_default();
    let to = filter.to.map(|d| d.to_string()).unwrap_or_default();
    let _ = write!(
        out,
        "<label>From<input type=\"date\" name=\"from\" value=\"{}\" min=\"{}\" max=\"{}\"></label>",
        from,
        options.first_date.as_deref().unwrap_or(""),
        options.last_date.as_deref().unwrap_or("")
    );
    let _ = write!(out, "<label>To<input type=\"date\" name=\"to\" value=\"{}\"></label>", to);

    select(out, "country", "Country", &options.countries, filter.country.as_deref());
    select(out, "category", "Category", &options.categories, filter.category.as_deref());
    select(out, "employee", "Employee", &options.employees, filter.employee.as_deref());
    select(out, "shipper", "Shipper", &options.shippers, filter.shipper.as_deref());
    out.push_str("<button type=\"submit\">Apply</button><a href=\"/\">Reset</a></form>");
}

fn kpi_cards(out: &mut String, summary: &Summary) {
    let k = &summary.kpis;
    let _ = write!(
        out,
        "<div class=\"kpis\">\
         <div class=\"kpi\">Revenue<b>{}</b></div>\
         <div class=\"kpi\">Orders<b>{}</b></div>\
         <div class=\"kpi\">Active customers<b>{}</b></div>\
         <div class=\"kpi\">Average basket<b>{}</b></div></div>",
        money(k.revenue),
        k.orders,
        k.customers,
        money(k.average_basket)
    );
}

const CHART_W: f64 = 520.0;
const CHART_H: f64 = 220.0;

fn empty_chart(out: &mut String, title: &str) {
    let _ = write!(out, "<div><h3>{}</h3><p>No data for this selection.</p></div>", escape_html(title));
}

fn line_chart(out: &mut String, title: &str, points: &[Bucket]) {
    if points.is_empty() {
        return empty_chart(out, title);
    }
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max).max(1.0);
    let step = if points.len() > 1 { CHART_W / (points.len() - 1) as f64 } else { 0.0 };
    let coords: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.1},{:.1}", i as f64 * step, CHART_H - p.value / max * (CHART_H - 20.0)))
        .collect();

    let _ = write!(
        out,
        "<div><h3>{}</h3><svg width=\"{}\" height=\"{}\" viewBox=\"-10 -10 {} {}\">\
         <polyline fill=\"none\" stroke=\"#2a6fdb\" stroke-width=\"2\" points=\"{}\"/>",
        escape_html(title),
        CHART_W + 20.0,
        CHART_H + 40.0,
        CHART_W + 20.0,
        CHART_H + 40.0,
        coords.join(" ")
    );
    for (i, p) in points.iter().enumerate() {
        let _ = write!(
            out,
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"2\"><title>{}: {}</title></circle>",
            i as f64 * step,
            CHART_H - p.value / max * (CHART_H - 20.0),
            escape_html(&p.label),
            money(p.value)
        );
    }
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        let _ = write!(
            out,
            "<text x=\"0\" y=\"{}\" font-size=\"10\">{}</text>\
             <text x=\"{}\" y=\"{}\" font-size=\"10\" text-anchor=\"end\">{}</text>",
            CHART_H + 15.0,
            escape_html(&first.label),
            CHART_W,
            CHART_H + 15.0,
            escape_html(&last.label)
        );
    }
    out.push_str("</svg></div>");
}

fn bar_chart(out: &mut String, title: &str, bars: &[Bucket]) {
    if bars.is_empty() {
        return empty_chart(out, title);
    }
    let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max).max(1.0);
    let row = 20.0;
    let label_w = 160.0;
    let height = row * bars.len() as f64 + 10.0;
    let _ = write!(
        out,
        "<div><h3>{}</h3><svg width=\"{}\" height=\"{}\">",
        escape_html(title),
        CHART_W,
        height
    );
    for (i, b) in bars.iter().enumerate() {
        let y = i as f64 * row;
        let w = b.value / max * (CHART_W - label_w - 90.0);
        let _ = write!(
            out,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\">{}</text>\
             <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"14\" fill=\"#2a6fdb\"/>\
             <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>",
            label_w - 6.0,
            y + 12.0,
            escape_html(&b.label),
            label_w,
            y,
            w.max(0.0),
            label_w + w.max(0.0) + 4.0,
            y + 12.0,
            money(b.value)
        );
    }
    out.push_str("</svg></div>");
}

fn detail_table(out: &mut String, summary: &Summary) {
    let query = summary.filter.to_query();
    let _ = write!(
        out,
        "<h3>Latest order lines</h3><a href=\"/download/detail.csv{}{}\">Download CSV</a><table><tr>",
        if query.is_empty() { "" } else { "?" },
        escape_html(&query)
    );
    for c in &summary.detail.columns {
        let _ = write!(out, "<th>{}</th>", escape_html(c));
    }
    out.push_str("</tr>");
    for row in &summary.detail.rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape_html(cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
}

pub fn page(summary: &Summary, options: &FilterOptions) -> String {
    let mut out = String::with_capacity(64 * 1024);
    let _ = write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Northwind sales</title>\
         <style>{}</style></head><body><h1>Northwind sales</h1>",
        STYLE
    );
    filter_form(&mut out, &summary.filter, options);
    kpi_cards(&mut out, summary);
    out.push_str("<div class=\"charts\">");
    line_chart(&mut out, "Monthly revenue", &summary.monthly_revenue);
    bar_chart(&mut out, "Top countries", &summary.top_countries);
    bar_chart(&mut out, "Top customers", &summary.top_customers);
    bar_chart(&mut out, "Top employees", &summary.top_employees);
    bar_chart(&mut out, "Revenue by category", &summary.revenue_by_category);
    bar_chart(&mut out, "Freight by shipper", &summary.freight_by_shipper);
    out.push_str("</div>");
    detail_table(&mut out, summary);
    out.push_str("</body></html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom\" & Jerry's</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; Jerry&#39;s&lt;/b&gt;"
        );
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(1_265_793.039), "$1,265,793");
        assert_eq!(money(0.0), "$0");
        assert_eq!(money(999.5), "$1,000");
    }

    #[test]
    fn selected_option_is_marked() {
        let mut out = String::new();
        select(&mut out, "country", "Country", &["France".to_string(), "Germany".to_string()], Some("Germany"));
        assert!(out.contains("<option value=\"Germany\" selected>Germany</option>"));
        assert!(out.contains("<option value=\"France\">France</option>"));
    }
}
