use varscout::commands::command_argument_builder;
use varscout::handlers::{handle_inspect, handle_scrape, init_tracing};
use varscout_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    init_tracing(chosen_command.get_flag("verbose"));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("scrape", sub_matches)) => handle_scrape(sub_matches, quiet).await,
        Some(("inspect", sub_matches)) => handle_inspect(sub_matches),
        // No subcommand provided, just show the banner
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
