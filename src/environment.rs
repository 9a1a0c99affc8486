extern crate dotenv;

use dotenv::dotenv;

pub fn get_bind_address() -> String {
    dotenv().ok();
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
}

pub fn get_store_dir() -> String {
    dotenv().ok();
    std::env::var("STORE_DIR").unwrap_or_else(|_| "data".to_string())
}

pub fn get_openai_api_base_url() -> String {
    dotenv().ok();
    std::env::var("OPENAI_API_BASE_URL")
        .unwrap_or_else(|_| "https://api.openai.com".to_string())
}

pub fn get_gemini_api_base_url() -> String {
    dotenv().ok();
    std::env::var("GEMINI_API_BASE_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string())
}
