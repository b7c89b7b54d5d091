use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tick_bridge::{
    initialize_with, BridgeError, MemoryPage, ModuleLoader, RunOptions, MODULE_LOCATOR, NUMBER1_ID,
    NUMBER2_ID, RESULT_ID,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tick-cli")]
#[command(about = "Run a tick module against a headless page and click its add button")]
struct Args {
    /// Directory the module locator is resolved against
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    #[arg(long, default_value = MODULE_LOCATOR)]
    module: String,

    #[arg(long, default_value_t = 1)]
    clicks: u64,

    /// Value typed into the first numeric input
    #[arg(long, default_value = "")]
    number1: String,

    /// Value typed into the second numeric input
    #[arg(long, default_value = "")]
    number2: String,

    /// Collect module output in this element instead of the log
    #[arg(long)]
    console: Option<String>,
}

/// Reads modules from disk, relative to a root directory.
struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ModuleLoader for FileLoader {
    async fn load(&self, locator: &str) -> Result<Vec<u8>, BridgeError> {
        let path = self.root.join(locator);
        tokio::fs::read(&path)
            .await
            .map_err(|e| BridgeError::load(locator, format!("{}: {}", path.display(), e)))
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let page = MemoryPage::new()
        .with_value(NUMBER1_ID, args.number1)
        .with_value(NUMBER2_ID, args.number2);
    let options = RunOptions {
        console: args.console.clone(),
        extra_imports: None,
    };

    let loader = FileLoader::new(&args.dir);
    let mut bridge = initialize_with(&loader, &args.module, page, options)
        .await
        .with_context(|| format!("initializing {}", args.module))?;

    for click in 1..=args.clicks {
        bridge
            .on_add_clicked()
            .with_context(|| format!("click {click}"))?;
    }

    println!("{}", bridge.page().text(RESULT_ID).unwrap_or_default());
    if let Some(console) = &args.console {
        print!("{}", bridge.page().text(console).unwrap_or_default());
    }

    Ok(())
}
