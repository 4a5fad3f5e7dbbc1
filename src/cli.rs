// cli.rs - Command-line interface configuration
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "casement")]
#[command(about = "Windowing demo", long_about = None)]
pub struct Cli {
    /// Window title
    #[arg(long, default_value = "Hello World")]
    pub title: String,

    /// Logical window width
    #[arg(long, default_value_t = 600.0)]
    pub width: f64,

    /// Logical window height
    #[arg(long, default_value_t = 400.0)]
    pub height: f64,

    /// Print a dispatch count on exit
    #[arg(long, default_value = "false")]
    pub count_events: bool,
}
