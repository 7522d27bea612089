use anyhow::Result;

fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply
    let _ = dotenvy::dotenv();
    corpus_admin::cli::run()
}
