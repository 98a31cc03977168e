use clap::Parser;
use commands::update::{exit_code, Update};
use config::Config;

mod artifact;
mod commands;
mod config;
mod core;
mod errors;
mod git;
mod github;
mod repository;
#[cfg(test)]
mod test_support;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "dependabot-automerge")]
#[command(
    about = "Open a pull request enabling dependabot auto-merge on a GitHub repository",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    update: Update,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    // Fail before touching anything remote.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error ({}): {}", e.kind(), e);
            std::process::exit(exit_code(&e));
        }
    };

    match args.update.execute(&config) {
        Ok(pull_request) => {
            log::info!("✅ Pull request #{} created", pull_request.number);
            println!("{}", pull_request.url);
        }
        Err(failure) => {
            eprintln!("Error ({}): {}", failure.error.kind(), failure);
            if let Some(branch) = failure.pushed_branch() {
                eprintln!(
                    "   Branch '{}' was pushed to the remote without a finished pull request; delete it by hand if needed.",
                    branch
                );
            }
            std::process::exit(exit_code(&failure.error));
        }
    }
}
