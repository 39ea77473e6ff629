// src/main.rs

use supervise::errors::SuperviseError;
use supervise::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run_main().await {
        report(&err);
        std::process::exit(1);
    }
}

async fn run_main() -> supervise::errors::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}

fn report(err: &SuperviseError) {
    match err {
        SuperviseError::Validation(errors) => {
            for message in errors.messages() {
                eprintln!("{message}");
            }
        }
        other => eprintln!("supervise error: {other}"),
    }
}
