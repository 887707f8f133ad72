#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hsk_tutor_server::run().await
}
