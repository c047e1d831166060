//! Report rendering — one self-contained HTML document per comparison pass.
//!
//! The document carries its own minimal stylesheet and no external
//! references, so it can be dropped straight into an email body. Each diffed
//! item renders a header row and its changed fields; nested diff nodes
//! render as titled sub-sections, recursively.

use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::sync::OnceLock;

use crate::canon::NULL_SENTINEL;
use crate::collate;
use crate::diff::{DiffBatch, DiffNode, DiffedItem};
use crate::error::RenderError;
use crate::policy::Policy;
use crate::record::CanonicalRecord;
use crate::textdiff::{diff_words, DiffOp};

const STYLE: &str = "<head>\n<style>\n\
\ttable {border-collapse: collapse;}\n\
\ttd, th {border: 1px solid Black;}\n\
\tth {background: LightGray;}\n\
\ttr:nth-child(even) {background: #F3F3F3;}\n\
\ttr:nth-child(odd) {background: White;}\n\
\t.resource {background-color: RoyalBlue; color: White; font-weight: bold;}\n\
\t.blank {background-color: White; border: none;}\n\
\t.group {background-color: LightBlue;}\n\
\t.del {background-color: MistyRose; text-decoration: line-through;}\n\
\t.ins {background-color: Honeydew;}\n\
</style>\n</head>\n";

const BLANK_ROW: &str = "<tr><td class=\"blank\" colspan=4>&nbsp;</td></tr>\n";
const BLANK_COL: &str = "<td class=\"blank\">&nbsp;</td>";
const HEADER_ROW: &str =
    "<tr><td class=\"blank\">&nbsp;</td><th>Property</th><th>Previous</th><th>Current</th></tr>\n";
const INDENT: &str = "&nbsp;&nbsp;";

fn key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""(\w+)":"#).expect("static regex"))
}

/// The rendered report and the batch-level change signal.
#[derive(Debug)]
pub struct Report {
    /// Self-contained HTML, stylesheet included.
    pub html: String,
    /// `false` iff no real change exists anywhere in the batch — the
    /// caller's cue to skip notification entirely.
    pub any_changes: bool,
}

/// Render a diffed batch into a hierarchical HTML report.
pub fn render(batch: &DiffBatch, policy: &Policy) -> Result<Report, RenderError> {
    let mut body = String::new();
    for item in &batch.items {
        body.push_str(&render_item(item, policy)?);
    }

    let mut html = String::from(STYLE);
    html.push_str("<h1>Configuration Changes</h1>\n");
    html.push_str("<table>\n");
    if let Some(reference) = &batch.reference {
        html.push_str(&format!(
            "<tr><td class=\"resource\">Snapshot</td><td colspan=3>{}</td></tr>\n",
            escape_html(reference)
        ));
    }
    html.push_str(&body);
    html.push_str("</table>");

    Ok(Report {
        html,
        any_changes: !batch.items.is_empty(),
    })
}

fn render_item(item: &DiffedItem, policy: &Policy) -> Result<String, RenderError> {
    let name = escape_html(item.record.display_name());
    let kind = escape_html(item.record.resource_type());

    let mut out = String::from(BLANK_ROW);
    match &item.diff {
        Some(diffs) => {
            out.push_str(&format!(
                "<tr><td class=\"resource\" colspan=2>{name}</td><td class=\"resource\" colspan=2>{kind}</td></tr>\n"
            ));
            out.push_str(&render_diffs(diffs, item.record.fields(), "", policy)?);
        }
        None => {
            out.push_str(&format!(
                "<tr><td class=\"resource\" colspan=2>{name}</td><td class=\"resource\" colspan=2>{kind} (New Item)</td></tr>\n"
            ));
            out.push_str(&render_new_item(&item.record)?);
        }
    }
    Ok(out)
}

/// Dump a whole record: pretty-printed, keys strong-emphasized, newlines
/// and indentation translated to HTML.
fn render_new_item(record: &CanonicalRecord) -> Result<String, RenderError> {
    // Tab indent survives HTML escaping; translated to `&nbsp;` pairs after.
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    record.fields().serialize(&mut ser)?;
    let pretty = String::from_utf8_lossy(&buf).into_owned();

    let escaped = escape_html(&pretty);
    let emphasized = key_regex().replace_all(&escaped, "<strong>$0</strong>");
    let html = emphasized
        .replace('\n', "<br />\n")
        .replace('\t', INDENT);

    Ok(format!(
        "<tr><td>&nbsp;</td><td colspan=3>{html}</td></tr>\n"
    ))
}

fn render_diffs(
    diffs: &DiffNode,
    current: &serde_json::Map<String, Value>,
    group: &str,
    policy: &Policy,
) -> Result<String, RenderError> {
    let mut out = if group.is_empty() {
        format!("{BLANK_ROW}{HEADER_ROW}")
    } else {
        format!(
            "<tr>{BLANK_COL}<th class=\"group\" colspan=\"3\">{}</th></tr>\n",
            escape_html(group)
        )
    };

    // Flat fields first, then the titled sub-sections, so a group header is
    // never mistaken for its parent's next row.
    for (key, previous) in diffs.scalar_entries() {
        out.push_str(&field_row(key, previous, current.get(key), policy)?);
    }

    let empty = serde_json::Map::new();
    for (key, nested) in diffs.nested_entries() {
        let cur_obj = current
            .get(key)
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        out.push_str(&render_diffs(nested, cur_obj, key, policy)?);
    }

    Ok(out)
}

/// One changed field: side-by-side when short, inline word diff when
/// mid-sized, suppressed when long.
fn field_row(
    key: &str,
    previous: &Value,
    current: Option<&Value>,
    policy: &Policy,
) -> Result<String, RenderError> {
    let limit = policy.max_collation_depth;

    let mut prev_text = collate::stable_string(previous, limit)?;
    if prev_text == NULL_SENTINEL {
        // An absent previous value reads as an empty collection.
        prev_text = "[]".to_owned();
    }
    let cur_text = match current {
        Some(value) => collate::stable_string(value, limit)?,
        None => NULL_SENTINEL.to_owned(),
    };

    let key = escape_html(key);
    let row = if prev_text.len() <= policy.short_field_len
        && cur_text.len() <= policy.short_field_len
    {
        format!(
            "<tr>{BLANK_COL}<th>{key}</th><td>{}</td><td>{}</td></tr>\n",
            escape_html(&prev_text),
            escape_html(&cur_text)
        )
    } else if prev_text.len() <= policy.long_field_len && cur_text.len() <= policy.long_field_len {
        format!(
            "<tr>{BLANK_COL}<th>{key}</th><td colspan=2>{}</td></tr>\n",
            inline_diff(&prev_text, &cur_text)
        )
    } else {
        format!(
            "<tr>{BLANK_COL}<th>{key}</th><td colspan=2 align=\"center\"><em>long output suppressed</em></td></tr>\n"
        )
    };
    Ok(row)
}

fn inline_diff(prev_text: &str, cur_text: &str) -> String {
    let mut out = String::new();
    for (op, text) in diff_words(prev_text, cur_text) {
        let text = escape_html(&text);
        match op {
            DiffOp::Eql => out.push_str(&text),
            DiffOp::Del => out.push_str(&format!("<span class=\"del\">{text}</span>")),
            DiffOp::Ins => out.push_str(&format!("<span class=\"ins\">{text}</span>")),
        }
    }
    out
}

/// Minimal entity escaping. Quotes are left alone: output lands in element
/// content, never in attribute values.
fn escape_html(s: &str) -> String {
    if !s.contains(['&', '<', '>']) {
        return s.to_owned();
    }
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
