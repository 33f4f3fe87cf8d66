mod cli;
mod infra;
mod reports;
mod routes;
mod server;

use career_risk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
