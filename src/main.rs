#[tokio::main]
async fn main() {
    ranklist::start_server().await;
}
