#![no_main]

use doc_write::{ParseSink, ScriptWriteController, WriteMode, WriteOutcome};
use libfuzzer_sys::fuzz_target;

struct NullSink;

impl ParseSink for NullSink {
    fn feed(&mut self, fragment: &str) {
        // only scanner-approved text may reach the parser in direct mode
        assert!(doc_write::is_complete(fragment));
    }
}

const FRAGMENTS: &[&str] = &[
    "<p>x</p>",
    "<scr",
    "ipt>var s='</scr'",
    " + 'ipt>';</script>",
    "<a href=\"x>\">",
    "'",
    "\\",
    "plain text",
    "",
];

fuzz_target!(|data: &[u8]| {
    let mut sink = NullSink;
    let mut controller = if data.first().is_some_and(|b| b % 2 == 0) {
        ScriptWriteController::new_parsing()
    } else {
        ScriptWriteController::new_idle()
    };

    for &op in data.iter().skip(1).take(512) {
        match op % 5 {
            0 | 1 => {
                let fragment = FRAGMENTS[(op as usize / 5) % FRAGMENTS.len()];
                let outcome = controller.write(fragment, &mut sink);
                if let WriteOutcome::Flushed = outcome {
                    assert!(controller.buffered().is_empty());
                }
            }
            2 => {
                if controller.open(None, None, None, false) {
                    assert_eq!(controller.mode(), WriteMode::OpenBuffered);
                    assert!(controller.buffered().is_empty());
                } else {
                    assert_eq!(controller.mode(), WriteMode::Parsing);
                }
            }
            3 => {
                if controller.close().is_some() {
                    assert_eq!(controller.mode(), WriteMode::Parsing);
                    assert!(controller.buffered().is_empty());
                    assert!(!controller.close_scheduled());
                }
            }
            _ => {
                if controller.run_scheduled_close().is_some() {
                    assert_eq!(controller.mode(), WriteMode::Parsing);
                }
                assert!(!controller.close_scheduled());
            }
        }
    }
});
