use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    relay_server::run().await
}
