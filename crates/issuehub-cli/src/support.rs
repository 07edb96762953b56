use issuehub_kernel::RepoRef;
use issuehub_transport::GithubClientSource;
use serde_json::Value;
use std::fmt::Display;
use std::process;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::config::Settings;

pub fn fail(message: impl Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

pub fn settings_or_exit(args: &GlobalArgs) -> Settings {
    let settings = Settings::load(args).unwrap_or_else(|e| fail(e));
    if let Some(path) = &settings.source {
        debug!(config = %path.display(), "loaded config file");
    }
    settings
}

pub fn client_source_or_exit(args: &GlobalArgs) -> GithubClientSource {
    let settings = settings_or_exit(args);
    GithubClientSource::new(settings.transport, settings.token)
}

pub fn repo_or_exit(raw: &str) -> RepoRef {
    RepoRef::parse(raw).unwrap_or_else(|e| fail(e))
}

pub fn runtime_or_exit() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")))
}

pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(format!("failed to render JSON: {e}")),
    }
}
