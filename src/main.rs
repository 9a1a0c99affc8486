use blog_writer::{environment, logging, router};

#[tokio::main]
async fn main() {
    logging::init_tracing();

    let bind_address = environment::get_bind_address();
    let app = router::create_router();

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .expect("should bind server address");
    tracing::info!(address = %bind_address, "starting blog writer server");
    axum::serve(listener, app).await.expect("server should keep running");
}
