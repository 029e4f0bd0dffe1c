// Entrypoint for the provisioning CLI.
// - Loads a local `.env` so WORKATO_API_TOKEN can live there.
// - Logs to stderr; RUST_LOG overrides the default `warn` level.

use workato_provision::ui;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    ui::run()
}
