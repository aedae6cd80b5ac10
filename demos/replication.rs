use mysql_ops::{Engine, EngineOptions, ExecContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("MYSQL_OPS_URL")?;
    let db = Engine::connect(&url, EngineOptions::from_env()?)?;

    let read_only = db
        .query_show(ExecContext::Pool, "GLOBAL VARIABLES", "read_only")
        .await?;
    println!("read_only = {read_only}");

    match db.query_master_status().await {
        Ok(master) => println!("{}", serde_json::to_string_pretty(&master)?),
        Err(err) if err.is_no_rows() => println!("binary logging is disabled"),
        Err(err) => return Err(err.into()),
    }

    match db.inspect_slave_status().await? {
        Some(decoded) => {
            println!("decode status: {:?}", decoded.status);
            println!("{}", serde_json::to_string_pretty(&decoded.record)?);
        }
        None => println!("not a replica"),
    }

    db.close().await?;
    Ok(())
}
