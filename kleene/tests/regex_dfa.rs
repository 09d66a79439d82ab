use kleene_automata::automata::{minimize, validate_dfa};
use kleene_automata::{compile, CompileConfig};
use kleene_codegen::regex_dfa;

#[test]
fn compiled_at_build_time() {
    let dfa = regex_dfa!("(a|b)*abb(a|b)*");
    assert_eq!(dfa.state_count(), 4);
    for s in &["abb", "aabba", "ababb"] {
        assert!(dfa.simulate(s), "{}", s);
    }
    for s in &["ab", "aa", ""] {
        assert!(!dfa.simulate(s), "{}", s);
    }
}

#[test]
fn same_as_runtime_compilation() {
    let built = regex_dfa!("a?b+", max_states = 64);
    let runtime = compile("a?b+", &CompileConfig::default()).unwrap().minimized;
    assert_eq!(built.state_count(), runtime.state_count());
    assert_eq!(built.edges(), runtime.edges());
    assert!(validate_dfa(&built).is_valid());
    assert_eq!(minimize(&built).state_count(), built.state_count());
}

#[test]
fn classes_and_escapes() {
    let dfa = regex_dfa!(r"[a-c]d\*");
    assert!(dfa.simulate("bd*"));
    assert!(!dfa.simulate("bd"));
    assert!(!dfa.simulate("dd*"));
}
