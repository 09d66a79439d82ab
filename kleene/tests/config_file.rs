use std::io::Write;

use kleene::{load_config, run_batch, ShowOptions};
use tempfile::NamedTempFile;

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn runs_cases_from_file() {
    let file = write_config(r#"
[compile]
max_dfa_states = 100

[[case]]
regex = "a*b"
accept = ["b", "ab", "aab"]
reject = ["", "a", "ba"]

[[case]]
regex = "(a|b)*abb(a|b)*"
accept = ["abb", "aabba", "ababb"]
reject = ["ab", "aa", ""]

[[case]]
regex = "[a-c]d"
accept = ["ad", "bd", "cd"]
reject = ["dd", "ad d"]
"#);

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.compile.max_dfa_states, Some(100));

    let mut out = Vec::new();
    let outcomes = run_batch(&mut out, &config, ShowOptions::default()).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(outcomes.iter().all(|x| x.passed()), "{}", text);
    assert!(text.ends_with("3 of 3 cases passed\n"), "{}", text);
}

#[test]
fn state_limit_from_file() {
    let file = write_config(r#"
[compile]
max_dfa_states = 3

[[case]]
regex = "(a|b)*a(a|b)(a|b)"
accept = ["abb"]

[[case]]
regex = "ab"
accept = ["ab"]
"#);

    let config = load_config(file.path()).unwrap();
    let mut out = Vec::new();
    let outcomes = run_batch(&mut out, &config, ShowOptions::default()).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(!outcomes[0].compiled);
    assert!(text.contains("error: Too many DFA states, the limit is 3!"), "{}", text);
    assert!(outcomes[1].passed(), "{}", text);
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().starts_with("Cannot read"), "{}", err);
}

#[test]
fn malformed_file() {
    let file = write_config("[[case]]\nregex = 3\n");
    assert!(load_config(file.path()).is_err());
}
