mod directive;
mod processor;
mod prompts;

pub use directive::{
    DirectiveKind, LineToken, Marker, collect_content_block, lex_line, strip_code_fences,
};
pub use processor::{NO_CONTENT_SENTINEL, ResponseProcessor};
pub use prompts::system_prompt;
