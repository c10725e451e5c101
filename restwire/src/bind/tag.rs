//! Source-tag grammar
//!
//! A field declares its request sources as a sequence of `name:"key"` pairs
//! separated by whitespace, e.g. `path:"user_id" query:"id"`. Declaration
//! order is resolution order. The grammar follows conventional struct-tag
//! rules: the name runs up to a colon, the key is a double-quoted string with
//! backslash escapes.
//!
//! Parsing happens once, when a binding schema is built. A structurally
//! malformed pair ends parsing for that field; the already-parsed prefix is
//! kept and the caller flags the leftover at startup.

/// One declared source: provider name and lookup key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSource {
    /// Provider name, e.g. `path`, `query`, `header`
    pub source: String,
    /// Key passed to the provider
    pub key: String,
}

/// Parse result: declared sources in order, plus a malformed-tail marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedTag {
    pub sources: Vec<TagSource>,
    pub malformed: bool,
}

/// Parse a tag string into its declared sources
pub(crate) fn parse(tag: &str) -> ParsedTag {
    let mut sources = Vec::new();
    let bytes = tag.as_bytes();
    let mut rest = bytes;

    loop {
        // Skip leading spaces
        let mut i = 0;
        while i < rest.len() && rest[i] == b' ' {
            i += 1;
        }
        rest = &rest[i..];
        if rest.is_empty() {
            return ParsedTag {
                sources,
                malformed: false,
            };
        }

        // Scan the source name up to the colon
        let mut j = 0;
        while j < rest.len()
            && rest[j] > b' '
            && rest[j] != b':'
            && rest[j] != b'"'
            && rest[j] != 0x7f
        {
            j += 1;
        }
        if j == 0 || j + 1 >= rest.len() || rest[j] != b':' || rest[j + 1] != b'"' {
            return ParsedTag {
                sources,
                malformed: true,
            };
        }
        let name = &rest[..j];
        rest = &rest[j + 1..];

        // Scan the quoted key, honoring backslash escapes
        let mut j = 1;
        while j < rest.len() && rest[j] != b'"' {
            if rest[j] == b'\\' {
                j += 1;
            }
            j += 1;
        }
        if j >= rest.len() {
            return ParsedTag {
                sources,
                malformed: true,
            };
        }
        let quoted = &rest[..j + 1];
        rest = &rest[j + 1..];

        // An unquotable key skips this pair only
        if let Some(key) = unquote(quoted) {
            sources.push(TagSource {
                source: String::from_utf8_lossy(name).into_owned(),
                key,
            });
        }
    }
}

/// Strip surrounding quotes and resolve backslash escapes
fn unquote(quoted: &[u8]) -> Option<String> {
    if quoted.len() < 2 || quoted[0] != b'"' || quoted[quoted.len() - 1] != b'"' {
        return None;
    }
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        if inner[i] == b'\\' {
            if i + 1 >= inner.len() {
                return None;
            }
            match inner[i + 1] {
                b'"' | b'\\' => out.push(inner[i + 1]),
                _ => return None,
            }
            i += 2;
        } else {
            out.push(inner[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
