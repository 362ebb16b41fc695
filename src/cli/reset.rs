//! `ssort reset` command implementation

use anyhow::Result;

use crate::engine::{Engine, EngineClient};

pub async fn run(engine_command: &[String]) -> Result<()> {
    let (client, _connection, _child) = EngineClient::spawn(engine_command)?;
    client.reset_everything().await?;
    println!("✓ Engine session state cleared");
    Ok(())
}
