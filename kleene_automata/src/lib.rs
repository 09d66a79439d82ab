pub mod automata;
pub mod loc;
pub mod observer;
pub mod pipeline;
pub mod regex;
pub mod util;

pub use pipeline::{compile, compile_batch, compile_batch_observed, compile_observed, CompileConfig, CompileError, CompiledRegex, Verdicts};
