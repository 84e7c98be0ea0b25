mod assess;
mod catalog;
mod cli;
mod infra;
mod profile;

use cefr_speak::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
