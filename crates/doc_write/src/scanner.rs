//! Markup completeness scanner.
//!
//! `document.write` callers routinely emit fragments that are not
//! individually well formed (one call writes `<scr`, the next completes
//! `ipt>...`). Before buffered text is handed to the parser, this scanner
//! decides whether it can be cut here safely: not mid-tag, not inside a
//! quoted attribute value, not inside a JavaScript string literal, and with
//! no `<script>` element left unterminated.
//!
//! The scan is a single left-to-right pass, recomputed from scratch over the
//! whole buffer on every call. Buffers are small; simplicity wins over
//! incrementality here.
//!
//! String tracking (`InString`) activates only while at least one `<script>`
//! is open: quotes in ordinary page text are irrelevant, and other raw-text
//! elements (`<style>`, `<textarea>`) are deliberately not given the same
//! treatment.

use memchr::{memchr, memchr2, memchr3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    /// Ordinary page text, or literal script body text.
    Outside,
    /// Just after `<`.
    TagStart,
    /// Accumulating a tag name.
    InTagName,
    /// Between the tag name and the closing `>`.
    InsideTag,
    /// Inside a string literal in script body text.
    InString,
}

/// True when `text` can be flushed to the parser as-is: the scan ends in
/// ordinary text with every `<script>` closed. Pure and linear in the input
/// length.
pub fn is_complete(text: &str) -> bool {
    let bytes = text.as_bytes();
    let len = bytes.len();

    let mut state = ScanState::Outside;
    let mut open_script_tags: u32 = 0;
    let mut quote = 0u8;
    let mut escape_next = false;
    let mut attr_quote: Option<u8> = None;
    let mut closing_tag = false;
    let mut name_start = 0usize;

    let mut i = 0usize;
    while i < len {
        match state {
            ScanState::Outside => {
                // Skip ahead to the next byte that can change state. Quotes
                // only matter while script body text is being scanned.
                let next = if open_script_tags == 0 {
                    memchr(b'<', &bytes[i..])
                } else {
                    memchr3(b'<', b'\'', b'"', &bytes[i..])
                };
                let Some(rel) = next else {
                    break;
                };
                i += rel;
                if bytes[i] == b'<' {
                    state = ScanState::TagStart;
                } else {
                    state = ScanState::InString;
                    quote = bytes[i];
                    escape_next = false;
                }
                i += 1;
            }
            ScanState::TagStart => {
                if bytes[i] == b'/' {
                    closing_tag = true;
                    name_start = i + 1;
                    i += 1;
                } else {
                    closing_tag = false;
                    name_start = i;
                }
                state = ScanState::InTagName;
            }
            ScanState::InTagName => {
                let b = bytes[i];
                if b == b'>' || b.is_ascii_whitespace() {
                    if tag_name_is_script(&bytes[name_start..i]) {
                        if closing_tag {
                            // floor at zero: a stray close never goes negative
                            open_script_tags = open_script_tags.saturating_sub(1);
                        } else {
                            open_script_tags += 1;
                        }
                    }
                    if b == b'>' {
                        state = ScanState::Outside;
                    } else {
                        state = ScanState::InsideTag;
                        attr_quote = None;
                    }
                    i += 1;
                } else if i == name_start && !b.is_ascii_alphabetic() {
                    // a bare '<' not starting a real tag; the byte is
                    // reprocessed as page text
                    state = ScanState::Outside;
                } else {
                    i += 1;
                }
            }
            ScanState::InsideTag => match attr_quote {
                Some(q) => {
                    let Some(rel) = memchr(q, &bytes[i..]) else {
                        i = len;
                        break;
                    };
                    i += rel + 1;
                    attr_quote = None;
                }
                None => {
                    let Some(rel) = memchr3(b'>', b'"', b'\'', &bytes[i..]) else {
                        i = len;
                        break;
                    };
                    i += rel;
                    if bytes[i] == b'>' {
                        state = ScanState::Outside;
                    } else {
                        attr_quote = Some(bytes[i]);
                    }
                    i += 1;
                }
            },
            ScanState::InString => {
                if escape_next {
                    escape_next = false;
                    i += 1;
                } else {
                    let Some(rel) = memchr2(quote, b'\\', &bytes[i..]) else {
                        i = len;
                        break;
                    };
                    i += rel;
                    if bytes[i] == quote {
                        state = ScanState::Outside;
                    } else {
                        escape_next = true;
                    }
                    i += 1;
                }
            }
        }
    }

    state == ScanState::Outside && open_script_tags == 0
}

fn tag_name_is_script(name: &[u8]) -> bool {
    name.eq_ignore_ascii_case(b"script")
}
