// src/minify.rs
//
// The minifier is a fixed sequence of regex rewrites over the whole
// document. Stages 2, 3, 5 and 6 park protected regions in a per-call
// `Placeholders` table; the last stage puts them back.
//
// Whitespace classes are ASCII only: `(?-u:\s)` is space, tab, LF, VT, FF
// and CR. U+00A0 and other Unicode spaces are content.

use crate::placeholder::Placeholders;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::{debug, instrument, trace};

/* =============================== Patterns ================================ */

// Tag names and word boundaries are ASCII only (`(?i-u:…)`, `(?-u:\b)`):
// `<ſcript>` is not a script and `<pé>` still ends the name `p`.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid built-in pattern")
}

static SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?-u:\s)*((?i-u:<script)(?-u:\b)[^>]*?>)((?s:.)*?)(?i-u:</script>)(?-u:\s)*")
});

// Leading `<!--`, or trailing `-->` optionally preceded by a `//`.
static SCRIPT_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?-u:\s)*<!--(?-u:\s)*|(?-u:\s)*(?://)?(?-u:\s)*-->(?-u:\s)*$")
});

static STYLE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?-u:\s)*((?i-u:<style)(?-u:\b)[^>]*?>)((?s:.)*?)(?i-u:</style>)(?-u:\s)*")
});

static STYLE_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(?-u:\s)*<!--|-->(?-u:\s)*$"));

static COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"<!--((?s:.)*?)-->"));

static PRE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?-u:\s)*((?i-u:<pre)(?-u:\b)[^>]*?>(?s:.)*?(?i-u:</pre>))(?-u:\s)*")
});

static TEXTAREA: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?-u:\s)*((?i-u:<textarea)(?-u:\b)[^>]*?>(?s:.)*?(?i-u:</textarea>))(?-u:\s)*")
});

static LINE_EDGES: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^(?-u:\s)+|(?-u:\s)+$"));

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?-u:\s)+((?i-u:</?(?:area|base(?:font)?|blockquote|body",
        r"|caption|center|cite|col(?:group)?|dd|dir|div|dl|dt|fieldset|form",
        r"|frame(?:set)?|h[1-6]|head|hr|html|legend|li|link|map|menu|meta",
        r"|ol|opt(?:group|ion)|p|param|t(?:able|body|head|d|h|r|foot|itle)",
        r"|ul))(?-u:\b)[^>]*>)",
    ))
});

static TEXT_NODE: LazyLock<Regex> = LazyLock::new(|| compile(r">([^<]+)<"));

static TEXT_EDGES: LazyLock<Regex> = LazyLock::new(|| compile(r"^(?-u:\s)+|(?-u:\s)+$"));

static FIRST_ATTR: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(<(?i-u:[a-z\-])+)(?-u:\s)+([^>]+>)"));

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/* ============================== Entry point ============================== */

/// Minify an HTML document.
///
/// Never fails: markup the patterns cannot match (an unterminated
/// `<script>`, a comment without `-->`) is passed through as it is.
#[instrument(level = "debug", skip_all, fields(len = html.len()))]
pub fn minify(html: &str) -> String {
    let doc = normalize(html);
    let mut places = Placeholders::for_document(&doc);

    let doc = protect_scripts(&doc, &mut places);
    trace!(len = doc.len(), "scripts protected");
    let doc = protect_styles(&doc, &mut places);
    trace!(len = doc.len(), "styles protected");
    let doc = strip_comments(&doc);
    trace!(len = doc.len(), "comments stripped");
    let doc = protect_pre(&doc, &mut places);
    let doc = protect_textareas(&doc, &mut places);
    trace!(len = doc.len(), regions = places.len(), "verbatim blocks protected");
    let doc = trim_lines(&doc);
    let doc = collapse_before_blocks(&doc);
    let doc = collapse_text_edges(&doc);
    let doc = reflow_attributes(&doc);
    trace!(len = doc.len(), "whitespace collapsed");

    let out = places.restore(&doc);
    debug!(
        input = html.len(),
        output = out.len(),
        saved = html.len().saturating_sub(out.len()),
        "minified"
    );
    out
}

/* ================================ Stages ================================= */

// PHP's trim() set: no Unicode spaces, NUL included.
fn is_trim_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B')
}

pub(crate) fn normalize(html: &str) -> String {
    html.trim_matches(is_trim_char).replace("\r\n", "\n")
}

pub(crate) fn protect_scripts(doc: &str, places: &mut Placeholders) -> String {
    SCRIPT
        .replace_all(doc, |caps: &Captures<'_>| {
            let body = SCRIPT_WRAPPER.replace_all(&caps[2], "");
            let body = remove_cdata(&body);
            places.reserve(format!("{}{}</script>", &caps[1], body.trim_matches(is_trim_char)))
        })
        .into_owned()
}

pub(crate) fn protect_styles(doc: &str, places: &mut Placeholders) -> String {
    STYLE
        .replace_all(doc, |caps: &Captures<'_>| {
            let body = STYLE_WRAPPER.replace_all(&caps[2], "");
            let body = remove_cdata(&body);
            places.reserve(format!("{}{}</style>", &caps[1], body.trim_matches(is_trim_char)))
        })
        .into_owned()
}

fn remove_cdata(body: &str) -> String {
    if body.contains(CDATA_OPEN) {
        body.replace(CDATA_OPEN, "").replace(CDATA_CLOSE, "")
    } else {
        body.to_string()
    }
}

/// Conditional comments (`<!--[if IE]>`, `<![endif]-->`) survive.
fn is_conditional_comment(inner: &str) -> bool {
    inner.starts_with('[') || inner.contains("<![")
}

pub(crate) fn strip_comments(doc: &str) -> String {
    COMMENT
        .replace_all(doc, |caps: &Captures<'_>| {
            if is_conditional_comment(&caps[1]) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

pub(crate) fn protect_pre(doc: &str, places: &mut Placeholders) -> String {
    PRE.replace_all(doc, |caps: &Captures<'_>| places.reserve(caps[1].to_string()))
        .into_owned()
}

pub(crate) fn protect_textareas(doc: &str, places: &mut Placeholders) -> String {
    TEXTAREA
        .replace_all(doc, |caps: &Captures<'_>| places.reserve(caps[1].to_string()))
        .into_owned()
}

// TODO: attribute values spanning several lines get their continuation
// lines trimmed too.
pub(crate) fn trim_lines(doc: &str) -> String {
    LINE_EDGES.replace_all(doc, "").into_owned()
}

pub(crate) fn collapse_before_blocks(doc: &str) -> String {
    BLOCK_TAG.replace_all(doc, "$1").into_owned()
}

/// Leading and trailing whitespace of each text node becomes one space.
pub(crate) fn collapse_text_edges(doc: &str) -> String {
    TEXT_NODE
        .replace_all(doc, |caps: &Captures<'_>| {
            format!(">{}<", TEXT_EDGES.replace_all(&caps[1], " "))
        })
        .into_owned()
}

pub(crate) fn reflow_attributes(doc: &str) -> String {
    FIRST_ATTR.replace_all(doc, "${1}\n${2}").into_owned()
}

/* ================================= Tests ================================= */
