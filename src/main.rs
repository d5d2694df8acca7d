use std::{env, fs};

use anyhow::Context as _;

const SCHEMA_PATH: &str = "schema.json";
const CLIENT_PATH: &str = "client.ts";
const RUNTIME_PATH: &str = "BaseApiClient.ts";
const RUNTIME_SOURCE: &str = include_str!("../resources/BaseApiClient.ts");

/// One-shot build driver: schema.json in, client.ts (plus the static runtime
/// base client) out. Any failure exits non-zero with nothing written.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let raw = fs::read_to_string(SCHEMA_PATH)
        .with_context(|| format!("reading {SCHEMA_PATH}"))?;
    let schema = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {SCHEMA_PATH}"))?;
    let base_dir = env::current_dir()?;

    let source = schema2client::generate_client(&schema, &base_dir)?;

    fs::write(CLIENT_PATH, source).with_context(|| format!("writing {CLIENT_PATH}"))?;
    fs::write(RUNTIME_PATH, RUNTIME_SOURCE)
        .with_context(|| format!("writing {RUNTIME_PATH}"))?;
    log::info!("wrote {CLIENT_PATH} and {RUNTIME_PATH}");
    Ok(())
}
