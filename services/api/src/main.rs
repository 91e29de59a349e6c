use test_prioritizer_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("test prioritizer error: {err}");
        std::process::exit(1);
    }
}
