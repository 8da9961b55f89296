use super::super::args::*;
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => super::run::run(args).await,
        Command::Validate(args) => super::execution::cmd_validate(args).await,
        Command::Status(args) => super::execution::cmd_status(args).await,
        Command::Results(args) => super::execution::cmd_results(args).await,
        Command::Cancel(args) => super::execution::cmd_cancel(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
