use catalogapp::model::ProductId;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Returns the version string, with the git hash appended for non-release builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{} (dev: {})", VERSION, GIT_HASH)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "catalog",
    bin_name = "catalog",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Manage a local product catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the database (overrides config and CATALOG_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Config file to load instead of the default location
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List products as a card grid
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Only products in this category (case-insensitive)
        #[arg(long)]
        category: Option<String>,

        /// Only products whose name, description or category contains this text
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Add a new product
    #[command(alias = "a", display_order = 2)]
    Add {
        #[arg(long)]
        name: String,

        /// Digits and dots are kept, everything else is dropped
        #[arg(long)]
        price: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        category: String,

        /// Image file, stored inline as a data URI
        #[arg(long, value_name = "FILE")]
        image: PathBuf,
    },

    /// Edit fields of an existing product
    #[command(alias = "e", display_order = 3)]
    Edit {
        /// Product id (e.g. 3 or #3)
        id: ProductId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Replace the image with this file
        #[arg(long, value_name = "FILE", conflicts_with = "clear_image")]
        image: Option<PathBuf>,

        /// Remove the stored image
        #[arg(long)]
        clear_image: bool,
    },

    /// Delete products by id
    #[command(alias = "rm", display_order = 4)]
    Delete {
        /// Product ids (e.g. 1 3 #7)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<ProductId>,
    },

    /// Show one product in full
    #[command(alias = "v", display_order = 5)]
    Show {
        id: ProductId,

        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Open (creating if needed) the database and report where it lives
    #[command(display_order = 10)]
    Init,

    /// Print the effective configuration
    #[command(display_order = 11)]
    Config,
}
