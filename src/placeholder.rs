// src/placeholder.rs
//
// Per-call placeholder table.
//
// A protected region is swapped for a token of the form
// `%squeeze<nonce>x<index>%`. The prefix is chosen so that it does not
// occur anywhere in the input document, and the index grows by one per
// reserved region, so every token of one call is distinct.

use memchr::memmem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static CALLS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub struct Placeholders {
    prefix: String,
    entries: Vec<String>,
}

impl Placeholders {
    /// Creates an empty table whose token prefix does not occur in `doc`.
    pub fn for_document(doc: &str) -> Self {
        let mut nonce = seed();
        let mut prefix = make_prefix(nonce);
        while memmem::find(doc.as_bytes(), prefix.as_bytes()).is_some() {
            nonce = nonce.wrapping_add(1);
            prefix = make_prefix(nonce);
        }
        Self {
            prefix,
            entries: Vec::new(),
        }
    }

    /// Stores `content` and returns the token that stands in for it.
    pub fn reserve(&mut self, content: String) -> String {
        let token = format!("{}{}%", self.prefix, self.entries.len());
        self.entries.push(content);
        token
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Token prefix, including the opening `%`.
    #[cfg(test)]
    fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Replaces every token in `doc` with its stored content, consuming
    /// the table. Tokens nested inside stored content are expanded as well.
    pub fn restore(self, doc: &str) -> String {
        self.expand(doc, self.entries.len())
    }

    // Content stored at index i can only hold tokens reserved before it,
    // so expansion bounded by `limit` always terminates.
    fn expand(&self, text: &str, limit: usize) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut last = 0usize;

        for start in memmem::find_iter(bytes, self.prefix.as_bytes()) {
            if start < last {
                continue;
            }
            let digits_at = start + self.prefix.len();
            let digits = bytes[digits_at..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            if digits == 0 || bytes.get(digits_at + digits) != Some(&b'%') {
                continue;
            }
            let Ok(index) = text[digits_at..digits_at + digits].parse::<usize>() else {
                continue;
            };
            debug_assert!(index < limit, "placeholder index {index} out of range");
            if index >= limit {
                continue;
            }

            out.push_str(&text[last..start]);
            out.push_str(&self.expand(&self.entries[index], index));
            last = digits_at + digits + 1;
        }

        out.push_str(&text[last..]);
        out
    }
}

fn seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ CALLS.fetch_add(1, Ordering::Relaxed).rotate_left(32)
}

fn make_prefix(nonce: u64) -> String {
    format!("%squeeze{nonce:016x}x")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_distinct_and_restore() {
        let mut table = Placeholders::for_document("<p>hi</p>");
        let a = table.reserve("<pre> a </pre>".to_string());
        let b = table.reserve("<pre> b </pre>".to_string());
        assert_ne!(a, b);
        assert!(a.starts_with(table.prefix()));
        assert!(a.ends_with('%'));
        assert_eq!(table.len(), 2);

        let doc = format!("<div>{a}{b}</div>");
        assert_eq!(table.restore(&doc), "<div><pre> a </pre><pre> b </pre></div>");
    }

    #[test]
    fn index_ten_does_not_shadow_index_one() {
        let mut table = Placeholders::for_document("");
        let tokens: Vec<String> = (0..12).map(|i| table.reserve(format!("[{i}]"))).collect();
        let doc = format!("{}|{}", tokens[1], tokens[10]);
        assert_eq!(table.restore(&doc), "[1]|[10]");
    }

    #[test]
    fn prefix_avoids_document_text() {
        let first = Placeholders::for_document("");
        let doc = format!("text {} more", first.prefix());
        let table = Placeholders::for_document(&doc);
        assert!(!doc.contains(table.prefix()));
    }

    #[test]
    fn nested_tokens_expand() {
        let mut table = Placeholders::for_document("");
        let inner = table.reserve("<script>x</script>".to_string());
        let outer = table.reserve(format!("<pre>a{inner}b</pre>"));
        assert_eq!(table.restore(&outer), "<pre>a<script>x</script>b</pre>");
    }

    #[test]
    fn malformed_tokens_pass_through() {
        let mut table = Placeholders::for_document("");
        table.reserve("X".to_string());
        let prefix = table.prefix().to_string();
        let doc = format!("{prefix}% {prefix}0 {prefix}0%");
        assert_eq!(table.restore(&doc), format!("{prefix}% {prefix}0 X"));
    }

    #[test]
    fn empty_table_is_identity() {
        let table = Placeholders::for_document("abc");
        assert_eq!(table.len(), 0);
        assert_eq!(table.restore("abc"), "abc");
    }
}
