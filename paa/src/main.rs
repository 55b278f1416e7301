use paa::{
    SearchSettings, build_explorer, command_argument_builder, handle_answer, handle_answers,
    handle_collect, handle_related, handle_summarize, init_tracing,
};
use paa_scanner::CancellationToken;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing();

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let settings = SearchSettings::from_matches(&chosen_command);
    let explorer = match build_explorer(&settings, token) {
        Ok(explorer) => explorer,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            std::process::exit(1);
        }
    };

    let code = match chosen_command.subcommand() {
        Some(("collect", primary_command)) => {
            handle_collect(primary_command, &explorer, quiet).await
        }
        Some(("related", primary_command)) => handle_related(primary_command, &explorer).await,
        Some(("answer", primary_command)) => handle_answer(primary_command, &explorer).await,
        Some(("answers", primary_command)) => handle_answers(primary_command, &explorer).await,
        Some(("summarize", primary_command)) => {
            handle_summarize(primary_command, &explorer, quiet).await
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    std::process::exit(code);
}
