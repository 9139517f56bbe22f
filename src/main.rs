mod aggregate;
mod config;
mod db;
mod models;
mod report;
mod run;
mod telegram;

use anyhow::Result;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        run::print_usage();
        return Ok(());
    }

    run::dispatch(&args)
}
