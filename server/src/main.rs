#[tokio::main]
async fn main() -> anyhow::Result<()> {
    jobmesh_server::run().await
}
