//! HTML rendering of a personal report.

use std::fmt::Write;

use crate::models::report::{ReportContent, ReportSummary};

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Page header fields.
#[derive(Debug, Clone)]
pub struct ReportHeader<'a> {
    pub event_name: &'a str,
    pub nickname: &'a str,
    pub team: &'a str,
}

fn list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "<section><h2>{}</h2><ul>", heading);
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape_html(item));
    }
    out.push_str("</ul></section>");
}

/// Renders the fixed report layout as a standalone HTML page.
pub fn render_report_html(
    header: &ReportHeader<'_>,
    content: &ReportContent,
    summary: &ReportSummary,
) -> String {
    let mut out = String::new();
    let title = format!("{} - {}", header.event_name, header.nickname);

    let _ = write!(
        out,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title></head><body>",
        escape_html(&title)
    );
    let _ = write!(
        out,
        "<header><h1>{}</h1><p>{} &middot; {}</p><p>{} answers &middot; {} tags</p></header>",
        escape_html(header.event_name),
        escape_html(header.nickname),
        escape_html(header.team),
        summary.total_answers,
        summary.total_tags,
    );

    if !content.timeline.is_empty() {
        out.push_str("<section><h2>Timeline</h2><ol>");
        for entry in &content.timeline {
            let _ = write!(
                out,
                "<li><strong>{}</strong> {}",
                escape_html(&entry.slot_title),
                escape_html(&entry.snap)
            );
            if let Some(photo) = &entry.photo {
                let _ = write!(out, "<img src=\"{}\" alt=\"\">", escape_html(photo));
            }
            out.push_str("</li>");
        }
        out.push_str("</ol></section>");
    }

    let _ = write!(
        out,
        "<section><h2>Story</h2><dl><dt>Problem</dt><dd>{}</dd><dt>Solution</dt><dd>{}</dd>\
         <dt>Validation</dt><dd>{}</dd></dl></section>",
        escape_html(&content.story.problem),
        escape_html(&content.story.solution),
        escape_html(&content.story.validation),
    );

    list(&mut out, "Mentoring highlights", &content.mentoring.highlights);
    list(&mut out, "Applied from mentoring", &content.mentoring.applied);
    list(&mut out, "Strengths", &content.strengths);
    list(&mut out, "Improvements", &content.improvements);

    if !content.next30.is_empty() {
        out.push_str("<section><h2>Next 30 days</h2><table><tr><th>Task</th><th>Due</th><th>Priority</th></tr>");
        for action in &content.next30 {
            let _ = write!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&action.task),
                escape_html(&action.due),
                action.priority
            );
        }
        out.push_str("</table></section>");
    }

    if !content.star.is_empty() {
        out.push_str("<section><h2>STAR</h2>");
        for item in &content.star {
            let _ = write!(
                out,
                "<dl><dt>Situation</dt><dd>{}</dd><dt>Task</dt><dd>{}</dd>\
                 <dt>Action</dt><dd>{}</dd><dt>Result</dt><dd>{}</dd></dl>",
                escape_html(&item.s),
                escape_html(&item.t),
                escape_html(&item.a),
                escape_html(&item.r),
            );
        }
        out.push_str("</section>");
    }

    if !summary.tag_frequency.is_empty() {
        out.push_str("<section><h2>Tags</h2><ul>");
        for (tag, count) in &summary.tag_frequency {
            let _ = write!(out, "<li>{} &times; {}</li>", escape_html(tag), count);
        }
        out.push_str("</ul></section>");
    }

    let _ = write!(
        out,
        "<section><h2>Share</h2><p>{}</p></section></body></html>",
        escape_html(&content.social.linkedin3).replace('\n', "<br>")
    );

    out
}
