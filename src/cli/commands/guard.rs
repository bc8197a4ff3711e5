//! Single guard cycle command.

use anyhow::Result;
use std::path::Path;

use crate::cli::app;

pub async fn run(config_path: &Path) -> Result<()> {
    let app = app::build(config_path)?;
    app.guard_once().await
}
