//! HTML helpers for note fields: run rendering, cloze redaction,
//! breadcrumbs and tags.
//!
//! Every function here is a pure `&str → String` transformation, so the
//! emitter stays a tree walk and each formatting rule is testable alone.

use crate::document::{ParagraphRecord, Run};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

// ── Runs ─────────────────────────────────────────────────────────────────────

/// Same number of underscores as `text` has characters.
pub fn redact(text: &str) -> String {
    "_".repeat(text.chars().count())
}

/// Render runs as HTML. Bold runs become `<b>…</b>`, italic runs `<i>…</i>`;
/// with `redact_emphasis` their text is replaced by underscores.
pub fn render_runs(runs: &[Run], redact_emphasis: bool) -> String {
    let mut out = String::new();
    for run in runs {
        let text = if redact_emphasis && run.is_emphasised() {
            Cow::Owned(redact(&run.text))
        } else {
            Cow::Borrowed(run.text.as_str())
        };
        let text = encode_inline(&text, "<br>");
        if run.bold {
            out.push_str(&format!("<b>{text}</b>"));
        } else if run.italic {
            out.push_str(&format!("<i>{text}</i>"));
        } else {
            out.push_str(&text);
        }
    }
    out
}

/// Drop the leading `token` (e.g. `©©2`) from `runs`, plus the whitespace
/// after it. Runs are returned untouched when they do not start with `token`.
pub fn strip_leading_token(runs: &[Run], token: &str) -> Vec<Run> {
    let joined: String = runs.iter().map(|r| r.text.as_str()).collect();
    if !joined.starts_with(token) {
        return runs.to_vec();
    }

    let mut to_drop = token.len();
    let mut trimming = true;
    let mut out = Vec::with_capacity(runs.len());
    for run in runs {
        let mut text = run.text.as_str();
        if to_drop > 0 {
            let cut = to_drop.min(text.len());
            to_drop -= cut;
            text = &text[cut..];
        }
        if trimming {
            text = text.trim_start();
            if text.is_empty() {
                continue;
            }
            trimming = false;
        }
        out.push(Run {
            text: text.to_string(),
            ..run.clone()
        });
    }
    out
}

/// Runs of a paragraph, or one plain run of its text when the adapter
/// supplied none.
pub fn paragraph_runs(paragraph: &ParagraphRecord) -> Cow<'_, [Run]> {
    if paragraph.runs.is_empty() && !paragraph.text.is_empty() {
        Cow::Owned(vec![Run::plain(paragraph.text.clone())])
    } else {
        Cow::Borrowed(paragraph.runs.as_slice())
    }
}

/// A code table's text as a preformatted block.
pub fn render_code(text: &str) -> String {
    format!("<pre><code>{}</code></pre>", html_escape::encode_text(text))
}

// ── Inline escaping ──────────────────────────────────────────────────────────

static RE_SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Escape `text`, then make its whitespace survive HTML rendering: tabs
/// become `&ensp;`, runs of spaces keep their width via `&nbsp;`, and line
/// breaks become `line_break`.
fn encode_inline(text: &str, line_break: &str) -> String {
    let escaped = html_escape::encode_text(text);
    let spaced = RE_SPACE_RUN.replace_all(&escaped, |caps: &regex::Captures<'_>| {
        format!(" {}", "&nbsp;".repeat(caps[0].len() - 1))
    });
    spaced.replace('\t', "&ensp;").replace('\n', line_break)
}

// ── Breadcrumbs ──────────────────────────────────────────────────────────────

const CRUMB_SEPARATOR: &str = "<br>";
const CRUMB_LINE_BREAK: &str = "<br/>";
const CRUMB_INDENT: &str = "&emsp;";

/// Render heading texts (root-most first) as a breadcrumb: one line per
/// heading, indented one `&emsp;` per level below the first.
pub fn encode_breadcrumb<S: AsRef<str>>(headings: &[S]) -> String {
    headings
        .iter()
        .enumerate()
        .map(|(depth, h)| {
            format!(
                "{}{}",
                CRUMB_INDENT.repeat(depth),
                encode_inline(h.as_ref(), CRUMB_LINE_BREAK)
            )
        })
        .collect::<Vec<_>>()
        .join(CRUMB_SEPARATOR)
}

/// Recover the heading texts from a breadcrumb made by [`encode_breadcrumb`].
pub fn parse_breadcrumb(breadcrumb: &str) -> Vec<String> {
    if breadcrumb.is_empty() {
        return Vec::new();
    }
    breadcrumb
        .split(CRUMB_SEPARATOR)
        .map(|line| {
            let mut line = line;
            while let Some(rest) = line.strip_prefix(CRUMB_INDENT) {
                line = rest;
            }
            let plain = line
                .replace(CRUMB_LINE_BREAK, "\n")
                .replace("&ensp;", "\t")
                .replace("&nbsp;", " ");
            html_escape::decode_html_entities(&plain).into_owned()
        })
        .collect()
}

// ── Tags ─────────────────────────────────────────────────────────────────────

static RE_NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z]+").unwrap());

/// Tag form of a text: every run of non-letters becomes `_`, lower-cased.
pub fn tag_for(text: &str) -> String {
    RE_NON_ALPHA.replace_all(text, "_").to_lowercase()
}

/// Tags for a sequence of ancestor texts, keeping first occurrences only.
pub fn collect_tags<'t>(texts: impl IntoIterator<Item = &'t str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for text in texts {
        let tag = tag_for(text);
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_and_italic_runs_are_wrapped() {
        let runs = vec![Run::plain("The "), Run::bold("cat"), Run::italic(" sat")];
        assert_eq!(render_runs(&runs, false), "The <b>cat</b><i> sat</i>");
    }

    #[test]
    fn front_redacts_emphasis_with_same_length() {
        let runs = vec![Run::plain("The "), Run::bold("cat"), Run::italic("naïve")];
        assert_eq!(render_runs(&runs, true), "The <b>___</b><i>_____</i>");
    }

    #[test]
    fn redaction_is_idempotent_and_length_preserving() {
        for text in ["", "a", "héllo wörld", "tab\there"] {
            let once = redact(text);
            assert_eq!(once.chars().count(), text.chars().count());
            assert_eq!(redact(&once), once);
        }
    }

    #[test]
    fn plain_runs_unchanged_by_redaction() {
        let runs = vec![Run::plain("nothing"), Run::plain(" emphasised")];
        assert_eq!(render_runs(&runs, true), render_runs(&runs, false));
    }

    #[test]
    fn run_text_is_escaped_and_whitespace_kept() {
        let runs = vec![Run::plain("a<b\tc  d\ne")];
        assert_eq!(render_runs(&runs, false), "a&lt;b&ensp;c &nbsp;d<br>e");
    }

    #[test]
    fn strip_token_across_runs() {
        let runs = vec![Run::plain("©©"), Run::plain("2  intro "), Run::bold("word")];
        let stripped = strip_leading_token(&runs, "©©2");
        assert_eq!(stripped, vec![Run::plain("intro "), Run::bold("word")]);
    }

    #[test]
    fn strip_token_drops_whitespace_only_runs() {
        let runs = vec![Run::plain("®®0"), Run::plain(" "), Run::italic("caption")];
        assert_eq!(
            strip_leading_token(&runs, "®®0"),
            vec![Run::italic("caption")]
        );
    }

    #[test]
    fn strip_token_leaves_other_runs_alone() {
        let runs = vec![Run::plain("no marker")];
        assert_eq!(strip_leading_token(&runs, "©©1"), runs);
    }

    #[test]
    fn paragraph_without_runs_uses_text() {
        let p = ParagraphRecord {
            text: "raw".into(),
            ..ParagraphRecord::default()
        };
        assert_eq!(paragraph_runs(&p).as_ref(), &[Run::plain("raw")]);
    }

    #[test]
    fn breadcrumb_layout() {
        let crumb = encode_breadcrumb(&["Chapter 1", "A & B"]);
        assert_eq!(crumb, "Chapter 1<br>&emsp;A &amp; B");
    }

    #[test]
    fn breadcrumb_round_trip() {
        let headings = vec![
            "Intro".to_string(),
            "Tabs\tand  spaces".to_string(),
            "<br> & &nbsp; literal".to_string(),
            "&emsp;leading".to_string(),
            "two\nlines".to_string(),
        ];
        assert_eq!(parse_breadcrumb(&encode_breadcrumb(&headings)), headings);
    }

    #[test]
    fn empty_breadcrumb_round_trip() {
        let none: Vec<String> = Vec::new();
        assert_eq!(encode_breadcrumb(&none), "");
        assert!(parse_breadcrumb("").is_empty());
    }

    #[test]
    fn tags_collapse_non_letters() {
        assert_eq!(tag_for("Chapter 1: Cells & Tissue"), "chapter_cells_tissue");
        assert_eq!(tag_for("Heading1"), "heading_");
    }

    #[test]
    fn tags_deduplicate() {
        assert_eq!(
            collect_tags(["Intro", "intro!", "Other"]),
            vec!["intro".to_string(), "intro_".to_string(), "other".to_string()]
        );
        assert_eq!(collect_tags(["A", "a"]), vec!["a".to_string()]);
    }

    #[test]
    fn code_is_preformatted_and_escaped() {
        assert_eq!(
            render_code("if a < b {\n}"),
            "<pre><code>if a &lt; b {\n}</code></pre>"
        );
    }
}
