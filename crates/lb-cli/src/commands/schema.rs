use lb_core::failure::FailureEntry;
use lb_core::record::PackageRecord;
use schemars::schema_for;

use crate::cli::{SchemaArgs, SchemaKind};

fn render(kind: SchemaKind) -> anyhow::Result<String> {
    let schema = match kind {
        SchemaKind::Record => schema_for!(PackageRecord),
        SchemaKind::Failure => schema_for!(FailureEntry),
    };
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// Handle `npmlb schema`.
pub fn handle(args: &SchemaArgs) -> anyhow::Result<()> {
    println!("{}", render(args.kind)?);
    Ok(())
}
