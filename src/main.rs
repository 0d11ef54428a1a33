use clap::Parser;
use log::debug;
use snafu::ErrorCompat;

mod analysis;
mod args;

fn main() {
    let args = args::Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();
    debug!("args: {:?}", args);

    if let Err(e) = analysis::run_command(&args) {
        eprintln!("{}: {}", e.kind(), e);
        for cause in ErrorCompat::iter_chain(&*e).skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}
