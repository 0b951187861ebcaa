use clap::{Parser, Subcommand};

// Display order for API key option (placed at top of help text)
const API_KEY_DISPLAY_ORDER: usize = 0;
// Display order for log level option (placed at end of help text)
const LOG_LEVEL_DISPLAY_ORDER: usize = 100;

/// CLI arguments
#[derive(Parser)]
#[command(name = "code-sherlock", version, about = "AI code review service", long_about = None)]
pub struct Cli {
    /// Log level (see https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
    /// [env: CODE_SHERLOCK_LOG=] [default: info]
    #[arg(
        long,
        env = "CODE_SHERLOCK_LOG",
        default_value = "info",
        global = true,
        hide_default_value = true,
        hide_env = true,
        display_order = LOG_LEVEL_DISPLAY_ORDER,
        verbatim_doc_comment
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a default code-sherlock.toml config file
    Init(InitArgs),
    /// Run the review service
    Serve(ServeArgs),
}

/// Arguments for the init command
#[derive(Parser)]
pub struct InitArgs {
    /// Path to config file
    #[arg(long, default_value = "code-sherlock.toml")]
    pub config: String,

    /// Override existing config file
    #[arg(long)]
    pub r#override: bool,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Path to config file (initialize with `code-sherlock init`)
    #[arg(long, default_value = "code-sherlock.toml")]
    pub config: String,

    /// LLM API key
    #[arg(long, env = "CODE_SHERLOCK_LLM_API_KEY", display_order = API_KEY_DISPLAY_ORDER)]
    pub api_key: String,

    /// Bind address, overrides the config value (e.g. 0.0.0.0:4310)
    #[arg(long)]
    pub bind: Option<String>,
}
