extern crate proc_macro;

use proc_macro::TokenStream;

use kleene_automata::{compile, CompileConfig};
use quote::{quote, quote_spanned};
use syn::parse_macro_input;

use crate::parse::RegexDfaInput;

mod parse;

fn generate_dfa_code(input: &RegexDfaInput) -> proc_macro2::TokenStream {
    let span = input.regex.span();
    let regex = input.regex.value();

    let mut config = CompileConfig::default();
    if let Some(max_states) = &input.max_states {
        match max_states.base10_parse::<usize>() {
            Ok(x) => config.max_dfa_states = Some(x).filter(|x| *x != 0),
            Err(e) => return e.to_compile_error(),
        }
    }

    let compiled = match compile(&regex, &config) {
        Ok(x) => x,
        Err(e) => {
            let error_span = e.span(&regex);
            let msg = format!("{} (at {})", e.summarize(), error_span);
            return quote_spanned!(
                span =>
                compile_error!(#msg)
            )
        },
    };

    if !compiled.issues.is_valid() {
        let errors = compiled.issues.messages().into_iter().map(|msg| {
            quote_spanned!(
                span =>
                compile_error!(#msg);
            )
        });
        return quote! {
            {
                #(#errors)*
                unimplemented!()
            }
        }
    }

    compiled.minimized.to_raw_code(&quote!(kleene_automata))
}

/// Compiles a regex at build time into the minimized DFA recognizing it.
///
/// ```ignore
/// let dfa = regex_dfa!("(a|b)*abb");
/// assert!(dfa.simulate("babb"));
/// ```
///
/// The expansion builds a `kleene_automata::automata::DFA` from its raw tables, a regex that
/// doesn't parse becomes a compile error on the literal.
#[proc_macro]
pub fn regex_dfa(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as RegexDfaInput);

    generate_dfa_code(&input).into()
}

#[cfg(test)]
mod tests {
    use crate::generate_dfa_code;
    use crate::parse::RegexDfaInput;

    fn expand(input: &str) -> String {
        let input: RegexDfaInput = syn::parse_str(input).unwrap();
        generate_dfa_code(&input).to_string()
    }

    #[test]
    fn builds_from_raw_tables() {
        let code = expand("\"a*b\"");
        assert!(code.contains("from_raw"), "{}", code);
        assert!(!code.contains("compile_error"), "{}", code);
    }

    #[test]
    fn syntax_error_becomes_compile_error() {
        let code = expand("\"(ab\"");
        assert!(code.contains("compile_error"), "{}", code);
        assert!(code.contains("Unbalanced parenthesis"), "{}", code);
    }

    #[test]
    fn state_limit_option() {
        let code = expand("\"(a|b)*a(a|b)(a|b)\", max_states = 3");
        assert!(code.contains("compile_error"), "{}", code);
        assert!(expand("\"(a|b)*a(a|b)(a|b)\", max_states = 100,").contains("from_raw"));
    }

    #[test]
    fn unknown_option() {
        assert!(syn::parse_str::<RegexDfaInput>("\"a\", speed = 3").is_err());
    }
}
