use c2client::services::ServiceId;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    c2client::cli::execute(ServiceId::AutoScaling).await
}
