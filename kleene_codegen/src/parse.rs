use syn::parse::{Parse, ParseStream};
use syn::{Error, Ident, LitInt, LitStr, Result, Token};

/// `"regex"` optionally followed by `, max_states = N`
pub struct RegexDfaInput {
    pub regex: LitStr,
    pub max_states: Option<LitInt>,
}

impl Parse for RegexDfaInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let regex: LitStr = input.parse()?;
        let mut max_states = None;

        while input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break
            }
            let name: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match name.to_string().as_str() {
                "max_states" => max_states = Some(input.parse()?),
                _ => return Err(Error::new(name.span(), format!("Unknown option {}", name))),
            }
        }

        Ok(RegexDfaInput {
            regex,
            max_states,
        })
    }
}
