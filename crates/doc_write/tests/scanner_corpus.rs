//! Golden corpus for the completeness scanner, driven by a TOML manifest so
//! new regressions can be added without touching test code.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Corpus {
    case: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    label: String,
    fragment: String,
    complete: bool,
}

fn corpus() -> Corpus {
    let raw = include_str!("fixtures/scanner_corpus.toml");
    toml::from_str(raw).expect("scanner corpus manifest parses")
}

#[test]
fn corpus_verdicts_match() {
    for case in corpus().case {
        assert_eq!(
            doc_write::is_complete(&case.fragment),
            case.complete,
            "case '{}' fragment {:?}",
            case.label,
            case.fragment
        );
    }
}

#[test]
fn complete_fragments_stay_complete_when_concatenated() {
    let complete: Vec<String> = corpus()
        .case
        .into_iter()
        .filter(|c| c.complete)
        .map(|c| c.fragment)
        .collect();
    let mut joined = String::new();
    for fragment in &complete {
        joined.push_str(fragment);
        assert!(
            doc_write::is_complete(&joined),
            "joined buffer ending with {fragment:?} must stay complete"
        );
    }
}

#[test]
fn incomplete_prefixes_of_complete_fragments_hold() {
    // cutting a complete fragment inside a tag, a quoted attribute value or
    // a script body must never look complete at the cut
    let cases = [
        ("<div>hi</div>", 2usize),
        ("<a href=\"x>\">link</a>", 10),
        ("<script>x='</scr' + 'ipt>'</script>", 14),
        ("<script>alert(1)</script>", 12),
    ];
    for (fragment, cut) in cases {
        let prefix = &fragment[..cut];
        assert!(
            !doc_write::is_complete(prefix),
            "prefix {prefix:?} of {fragment:?} must be held"
        );
        assert!(doc_write::is_complete(fragment));
    }
}
