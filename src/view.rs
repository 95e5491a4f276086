//! Owned view state for the results page.
//!
//! The rendered output is a small markup tree the crate owns outright rather
//! than a live DOM. `ResultsPage` is the whole view: two status lines and
//! the results container. Each completed search discards the container's
//! children and rebuilds the table from scratch, so the page never
//! accumulates state between searches.

use crate::error::RenderError;
use crate::models::{HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN, SearchHit, SearchResponse};

/// Element id of the hit-count status line.
pub const HITCOUNT_ID: &str = "hitcount";
/// Element id of the elapsed-time status line.
pub const TIME_ID: &str = "time";
/// Element id of the results container.
pub const RESULTS_ID: &str = "results";
/// Element id assigned to the generated results table.
pub const RESULT_TABLE_ID: &str = "resTable";

/// One child of an element: either a nested element or a pre-rendered markup
/// fragment (set wholesale, innerHTML-style).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Markup(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn append_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn has_child_nodes(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Remove and return the first child, shifting the rest down, as
    /// removing the head of a live child list does.
    pub fn remove_first_child(&mut self) -> Option<Node> {
        if self.children.is_empty() {
            None
        } else {
            Some(self.children.remove(0))
        }
    }

    /// Replace all children with a single pre-rendered markup fragment.
    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.children.clear();
        self.children.push(Node::Markup(markup.into()));
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_html(out),
                Node::Markup(markup) => out.push_str(markup),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Remove every child of `container`, first child first, re-checking the
/// live list after each removal rather than iterating a snapshot.
pub fn clear_children(container: &mut Element) {
    if container.has_child_nodes() {
        while container.child_count() >= 1 {
            container.remove_first_child();
        }
    }
}

/// Escape text for interpolation into markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape a fragment while letting the service's highlight spans through.
/// Fragments arrive as text with `<span class="hl">…</span>` wrapped around
/// matched terms; those exact tokens are markup, the rest is remote-supplied
/// text and gets escaped.
pub fn sanitize_fragment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    loop {
        let open = rest.find(HIGHLIGHT_OPEN);
        let close = rest.find(HIGHLIGHT_CLOSE);
        let (index, token) = match (open, close) {
            (Some(o), Some(c)) if o <= c => (o, HIGHLIGHT_OPEN),
            (_, Some(c)) => (c, HIGHLIGHT_CLOSE),
            (Some(o), None) => (o, HIGHLIGHT_OPEN),
            (None, None) => break,
        };
        out.push_str(&escape_html(&rest[..index]));
        out.push_str(token);
        rest = &rest[index + token.len()..];
    }
    out.push_str(&escape_html(rest));
    out
}

/// Format one hit as the inner markup of its table cell: the highlighted
/// fragment, then the attribution line (profile link, follower count,
/// relative age). Deterministic in the hit alone; `score` and `path` are
/// carried on the hit but not rendered.
pub fn render_hit(hit: &SearchHit) -> Result<String, RenderError> {
    let fields = &hit.fields;
    let fragment = fields
        .fragment
        .first()
        .ok_or(RenderError::MissingFragment)?;

    let user = escape_html(&fields.user);
    let name = format!(
        "<a class=\"hitlink\" href=\"http://www.twitter.com/{user}\">{user}</a>"
    );
    let frag = format!("<div class=\"frag\">{}</div>", sanitize_fragment(fragment));
    let followers = format!("(with {} followers) tweeted ", fields.num_followers);
    let age = format!(" {} ago</div>", escape_html(&fields.timestamp));
    Ok(format!("{frag}<div class=\"user\">{name}{followers}{age}"))
}

/// A status line that starts hidden and becomes visible the first time a
/// search result arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusLine {
    visible: bool,
    markup: String,
}

impl StatusLine {
    pub fn show_markup(&mut self, markup: impl Into<String>) {
        self.visible = true;
        self.markup = markup.into();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    fn write_html(&self, out: &mut String, id: &str) {
        out.push_str("<div id=\"");
        out.push_str(id);
        out.push('"');
        if !self.visible {
            out.push_str(" style=\"display: none\"");
        }
        out.push('>');
        out.push_str(&self.markup);
        out.push_str("</div>");
    }
}

/// The whole rendered page: hit-count and time status lines plus the results
/// container. Replaced wholesale on each completed search; the session's
/// render task is the single writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPage {
    hit_count: StatusLine,
    time: StatusLine,
    results: Element,
}

impl Default for ResultsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsPage {
    pub fn new() -> Self {
        Self {
            hit_count: StatusLine::default(),
            time: StatusLine::default(),
            results: Element::new("div").with_attr("id", RESULTS_ID),
        }
    }

    pub fn hit_count(&self) -> &StatusLine {
        &self.hit_count
    }

    pub fn time(&self) -> &StatusLine {
        &self.time
    }

    pub fn results(&self) -> &Element {
        &self.results
    }

    /// Serialized markup of the results container.
    pub fn results_html(&self) -> String {
        self.results.to_html()
    }

    /// Serialized markup of the whole page: both status lines (hidden until
    /// the first result arrives) and the results container.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.hit_count.write_html(&mut out, HITCOUNT_ID);
        self.time.write_html(&mut out, TIME_ID);
        out.push_str(&self.results.to_html());
        out
    }

    /// Apply one completed search: update both status lines, clear the
    /// container child by child, then rebuild the table with one row and one
    /// cell per hit, in response order.
    ///
    /// A hit without a fragment aborts the pass after the status lines have
    /// updated and the container has been cleared; no table is appended.
    pub fn handle_search_result(&mut self, result: &SearchResponse) -> Result<(), RenderError> {
        self.hit_count.show_markup(format!(
            "<b>{}</b> / <b>{}</b>",
            result.total_hits, result.total_docs
        ));
        self.time.show_markup(format!("<b>{}</b>", result.time));

        clear_children(&mut self.results);

        let mut table = Element::new("table")
            .with_attr("width", "100%")
            .with_attr("id", RESULT_TABLE_ID);
        for hit in &result.hits {
            let mut row = Element::new("tr");
            let mut cell = Element::new("td");
            cell.set_markup(render_hit(hit)?);
            row.append_child(cell);
            table.append_child(row);
        }
        self.results.append_child(table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HitFields;

    fn hit(user: &str, followers: u64, timestamp: &str, fragment: &[&str]) -> SearchHit {
        SearchHit {
            score: 0.5,
            fields: HitFields {
                user: user.to_string(),
                num_followers: followers,
                timestamp: timestamp.to_string(),
                content: String::new(),
                fragment: fragment.iter().map(|f| f.to_string()).collect(),
                path: "/".to_string(),
            },
        }
    }

    #[test]
    fn test_escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_sanitize_keeps_highlight_spans_and_escapes_the_rest() {
        let raw = r#"a <b> <span class="hl">rust</span> & more"#;
        assert_eq!(
            sanitize_fragment(raw),
            r#"a &lt;b&gt; <span class="hl">rust</span> &amp; more"#
        );
    }

    #[test]
    fn test_sanitize_handles_stray_close_token() {
        assert_eq!(
            sanitize_fragment("x</span>y<z"),
            "x</span>y&lt;z"
        );
    }

    #[test]
    fn test_element_serializes_attributes_in_insertion_order() {
        let mut table = Element::new("table")
            .with_attr("width", "100%")
            .with_attr("id", RESULT_TABLE_ID);
        table.append_child(Element::new("tr"));
        assert_eq!(
            table.to_html(),
            r#"<table width="100%" id="resTable"><tr></tr></table>"#
        );
    }

    #[test]
    fn test_remove_first_child_shifts_the_live_list() {
        let mut container = Element::new("div");
        container.append_child(Element::new("a"));
        container.append_child(Element::new("b"));
        let first = container.remove_first_child();
        assert!(matches!(first, Some(Node::Element(e)) if e.tag() == "a"));
        assert_eq!(container.child_count(), 1);
    }

    #[test]
    fn test_clear_children_empties_any_container() {
        for count in [0usize, 1, 2, 7] {
            let mut container = Element::new("div");
            for _ in 0..count {
                container.append_child(Element::new("span"));
            }
            clear_children(&mut container);
            assert_eq!(container.child_count(), 0);
            assert!(!container.has_child_nodes());
        }
    }

    #[test]
    fn test_render_hit_matches_the_page_markup() {
        let rendered = render_hit(&hit("alice", 10, "2h", &["hello world"])).unwrap();
        assert_eq!(
            rendered,
            "<div class=\"frag\">hello world</div><div class=\"user\">\
             <a class=\"hitlink\" href=\"http://www.twitter.com/alice\">alice</a>\
             (with 10 followers) tweeted  2h ago</div>"
        );
    }

    #[test]
    fn test_render_hit_is_deterministic() {
        let doc = hit("bob", 3, "5m", &["<span class=\"hl\">x</span> y"]);
        assert_eq!(render_hit(&doc).unwrap(), render_hit(&doc).unwrap());
    }

    #[test]
    fn test_render_hit_uses_only_the_first_fragment() {
        let rendered = render_hit(&hit("bob", 3, "5m", &["first", "second"])).unwrap();
        assert!(rendered.contains("first"));
        assert!(!rendered.contains("second"));
    }

    #[test]
    fn test_render_hit_escapes_hostile_user() {
        let rendered = render_hit(&hit("<script>alert(1)</script>", 1, "1m", &["x"])).unwrap();
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_render_hit_without_fragment_is_an_error() {
        assert_eq!(
            render_hit(&hit("carol", 2, "1d", &[])),
            Err(RenderError::MissingFragment)
        );
    }

    #[test]
    fn test_page_markup_hides_status_lines_until_the_first_result() {
        let page = ResultsPage::new();
        assert_eq!(
            page.to_html(),
            "<div id=\"hitcount\" style=\"display: none\"></div>\
             <div id=\"time\" style=\"display: none\"></div>\
             <div id=\"results\"></div>"
        );

        let mut page = page;
        let result = SearchResponse {
            total_hits: 1,
            total_docs: 4,
            time: 9,
            hits: vec![hit("alice", 10, "2h", &["hello"])],
        };
        page.handle_search_result(&result).unwrap();

        let html = page.to_html();
        assert!(html.starts_with("<div id=\"hitcount\"><b>1</b> / <b>4</b></div>"));
        assert!(html.contains("<div id=\"time\"><b>9</b></div>"));
        assert!(!html.contains("display: none"));
    }
}
