//! HTML rendering for the admin pages.
//!
//! Every stored or caller-supplied string goes through [`escape_html`] before it is
//! placed in markup, attribute values included.

use crate::db::models::open_models::{format_timestamp, OpenEvent};
use url::form_urlencoded;

const STYLE: &str = r#"
      body { font-family: system-ui, -apple-system, Roboto, 'Segoe UI', Arial, sans-serif; padding: 1rem; }
      table { border-collapse: collapse; width: 100%; max-width: 1400px; }
      th, td { border: 1px solid #ddd; padding: 8px; text-align: left; font-size: 13px; }
      th { background: #f6f6f6; }
      tr:nth-child(even) { background: #fafafa; }
      .meta { margin-bottom: 1rem; }
      .danger { color: #b00020; }
"#;

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// `path?token=..&id=..` with URL-encoded values. Not yet HTML-escaped.
pub fn admin_url(path: &str, token: &str, subject_id: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("token", token);
    if let Some(subject_id) = subject_id {
        query.append_pair("id", subject_id);
    }
    format!("{}?{}", path, query.finish())
}

fn href(path: &str, token: &str, subject_id: Option<&str>) -> String {
    escape_html(&admin_url(path, token, subject_id))
}

/// Data shown on the event listing page
pub struct AdminPage<'a> {
    pub token: &'a str,
    pub filter: Option<&'a str>,
    pub events: &'a [OpenEvent],
    pub total: i64,
}

fn render_row(event: &OpenEvent, token: &str) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
         <td><a class=\"danger\" href=\"{}\">delete subject</a></td></tr>",
        event.id,
        escape_html(&event.subject_id),
        escape_html(&format_timestamp(&event.timestamp)),
        escape_html(&event.remote_address),
        escape_html(event.forwarded_for.as_deref().unwrap_or("")),
        escape_html(event.resolved_ip.as_deref().unwrap_or("")),
        escape_html(&event.user_agent),
        escape_html(&event.referrer),
        href("/admin/delete", token, Some(event.subject_id.as_str())),
    )
}

/// Event table with filter form, CSV link and purge link
pub fn admin_page(page: &AdminPage<'_>) -> String {
    let rows: String = page
        .events
        .iter()
        .map(|event| render_row(event, page.token))
        .collect();

    let filter_value = escape_html(page.filter.unwrap_or(""));
    let heading = match page.filter {
        Some(subject_id) => format!("Recent opens for {}", escape_html(subject_id)),
        None => "Recent opens".to_string(),
    };

    format!(
        r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>Pixel Tracker - Admin</title>
    <style>{style}</style>
  </head>
  <body>
    <h1>{heading}</h1>
    <div class="meta">
      Showing the latest {shown} of {total} records.
      <a href="{download}">Download CSV</a> |
      <a class="danger" href="{clear}">Delete all records</a>
    </div>
    <form method="GET" action="/admin">
      <input type="hidden" name="token" value="{token}" />
      Filter id: <input name="id" value="{filter_value}" />
      <button type="submit">Filter</button>
      <a href="{reset}">Reset</a>
    </form>
    <table>
      <thead>
        <tr>
          <th>#</th>
          <th>id</th>
          <th>timestamp (UTC)</th>
          <th>remote_addr</th>
          <th>x_forwarded_for</th>
          <th>resolved_ip</th>
          <th>user_agent</th>
          <th>referer</th>
          <th></th>
        </tr>
      </thead>
      <tbody>
        {rows}
      </tbody>
    </table>
  </body>
</html>
"#,
        style = STYLE,
        heading = heading,
        shown = page.events.len(),
        total = page.total,
        download = href("/admin/download", page.token, page.filter),
        clear = href("/admin/clear", page.token, None),
        token = escape_html(page.token),
        filter_value = filter_value,
        reset = href("/admin", page.token, None),
        rows = rows,
    )
}

/// Short page reporting a completed action, linking back to the listing
pub fn confirmation_page(message: &str, token: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>Pixel Tracker - Admin</title>
  </head>
  <body>
    <p>{message}</p>
    <p><a href="{back}">Back to admin</a></p>
  </body>
</html>
"#,
        message = escape_html(message),
        back = href("/admin", token, None),
    )
}
