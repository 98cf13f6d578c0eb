use anyhow::Context;
use serde::Serialize;

use crate::cli::StatusArgs;
use crate::context::AppContext;

#[derive(Debug, Serialize)]
struct StatusResponse {
    store: String,
    packages: u64,
    last_sync: Option<String>,
}

/// Handle `npmlb status`.
pub async fn handle(args: &StatusArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let response = StatusResponse {
        store: ctx.config.store.path.clone(),
        packages: ctx.store.count().await.context("failed to count packages")?,
        last_sync: ctx
            .store
            .last_sync()
            .await
            .context("failed to read last sync time")?
            .map(|at| at.to_rfc3339()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("store:     {}", response.store);
        println!("packages:  {}", response.packages);
        println!(
            "last sync: {}",
            response.last_sync.as_deref().unwrap_or("never")
        );
    }
    Ok(())
}
