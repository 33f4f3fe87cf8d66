use crate::reports::{
    run_cascade, run_confidence, run_half_life, run_portfolio, run_resistance, run_trajectory,
    CascadeArgs, ConfidenceArgs, HalfLifeArgs, PortfolioArgs, ResistanceArgs, TrajectoryArgs,
};
use crate::server;
use career_risk::config::AppConfig;
use career_risk::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Career Risk",
    about = "Serve or run the automation-risk and career-trajectory models from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score how well a task resists automation
    Resistance(ResistanceArgs),
    /// Estimate how fresh a skill still is under exponential decay
    HalfLife(HalfLifeArgs),
    /// Weight a set of skills by return over risk
    Portfolio(PortfolioArgs),
    /// Simulate time-to-transition and salary outcomes
    Trajectory(TrajectoryArgs),
    /// Combine upstream occupation risk into a cascade score
    Cascade(CascadeArgs),
    /// Wrap a point score with a sampled 90% interval
    Confidence(ConfidenceArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Resistance(args) => run_resistance(args),
        Command::HalfLife(args) => run_half_life(args),
        Command::Portfolio(args) => run_portfolio(args),
        Command::Trajectory(args) => run_trajectory(args),
        Command::Cascade(args) => run_cascade(args),
        Command::Confidence(args) => {
            let config = AppConfig::load()?;
            run_confidence(args, config.models.ci_iterations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeatable_model_arguments() {
        let cli = Cli::try_parse_from([
            "career-risk-api",
            "portfolio",
            "--item",
            "rust:0.12:0.2",
            "--item",
            "sql:0.06:0.1",
            "--correlation",
            "-0.2",
        ])
        .expect("valid arguments");
        match cli.command {
            Some(Command::Portfolio(args)) => {
                assert_eq!(args.items.len(), 2);
                assert_eq!(args.correlation, Some(-0.2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["career-risk-api"]).expect("valid arguments");
        assert!(cli.command.is_none());
    }
}
