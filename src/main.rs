use std::process::ExitCode;
use clap::Parser as ClapParser;
use tengri_lang::Config;

fn main() -> ExitCode {
    let config: Config = Config::parse();
    tengri_lang::init_tracing(config.verbose);

    match tengri_lang::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        },
    }
}
