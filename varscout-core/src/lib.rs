use colored::Colorize;

pub mod links;
pub mod run;
pub mod sheet;

pub fn print_banner() {
    println!(
        "{} {}",
        "varscout".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!("{}", "listing variant scraper".bright_black());
    println!();
}
