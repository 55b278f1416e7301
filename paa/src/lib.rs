pub mod commands;
pub mod handlers;

pub use commands::command_argument_builder;
pub use handlers::{
    SearchSettings, build_explorer, collection_exit_code, format_related, handle_answer,
    handle_answers, handle_collect, handle_related, handle_summarize, init_tracing, resolve_path,
};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
