#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let verdict = doc_write::is_complete(text);
    // deterministic: rescanning the same buffer never changes the verdict
    assert_eq!(doc_write::is_complete(text), verdict);
    // a complete buffer stays complete when followed by complete markup
    if verdict {
        let mut extended = String::with_capacity(text.len() + 13);
        extended.push_str(text);
        extended.push_str("<div>x</div>");
        assert!(doc_write::is_complete(&extended));
    }
});
