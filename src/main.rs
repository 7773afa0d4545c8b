#[tokio::main]
async fn main() {
    gamenight_backend::run().await;
}
