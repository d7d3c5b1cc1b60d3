#[tokio::main]
async fn main() -> anyhow::Result<()> {
    soulfarm_lib::run().await
}
