use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::types::Environment;

/// Installs the global tracing subscriber
///
/// JSON output for staging/production, human-readable output for development.
/// `RUST_LOG` directives take precedence over the environment's default level.
pub fn init(environment: &Environment) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(env_filter).init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(env_filter).init();
        }
    }
}
