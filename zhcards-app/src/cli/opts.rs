use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_TRANSLATOR_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";

#[derive(Debug, Parser, Clone)]
#[command(name = "zhcards", version, about = "Chinese flashcard sets: CLI, study loop and share API")]
pub struct Cli {
    /// Directory holding the card store (defaults to the app data dir)
    #[arg(long, env = "ZHCARDS_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep cards in memory only; nothing is written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// SQLite DB path for share snapshots (defaults to app data dir)
    #[arg(long, env = "ZHCARDS_SHARE_DB", global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Card set operations
    #[command(subcommand)]
    Set(SetCmd),
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Study loop
    Study(StudyCmd),
    /// Export data
    #[command(subcommand)]
    Export(ExportCmd),
    /// Import data
    #[command(subcommand)]
    Import(ImportCmd),
    /// Publish or fetch shared card sets
    #[command(subcommand)]
    Share(ShareCmd),
    /// Launch Axum HTTP API
    Api(ApiCmd),
}

#[derive(Debug, Subcommand, Clone)]
pub enum SetCmd {
    Add { name: String },
    List,
    Rename { set: String, name: String },
    Rm { set: String },
    Select { set: String },
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List {
        #[arg(long)]
        set: Option<String>,
    },
    Rm {
        card_id: String,
        #[arg(long)]
        set: Option<String>,
    },
    Edit(CardEdit),
    /// Put the set's cards in the given order
    Reorder(CardReorder),
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    /// Target set (id or name); defaults to the selected set
    #[arg(long)]
    pub set: Option<String>,
    #[arg(long)]
    pub chinese: String,
    #[arg(long, default_value = "")]
    pub pinyin: String,
    #[arg(long, default_value = "")]
    pub english: String,
}

#[derive(Debug, Args, Clone)]
pub struct CardEdit {
    pub card_id: String,
    #[arg(long)]
    pub set: Option<String>,
    #[arg(long)]
    pub chinese: Option<String>,
    #[arg(long)]
    pub pinyin: Option<String>,
    #[arg(long)]
    pub english: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CardReorder {
    #[arg(long)]
    pub set: Option<String>,
    /// Card ids in the new order
    #[arg(required = true)]
    pub ids: Vec<String>,
    /// Accept a partial list; cards not listed are deleted
    #[arg(long)]
    pub allow_drop: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StudyMode {
    Sequential,
    Random,
}

#[derive(Debug, Args, Clone)]
pub struct StudyCmd {
    #[arg(long)]
    pub set: Option<String>,
    #[arg(long, value_enum, default_value_t = StudyMode::Sequential)]
    pub mode: StudyMode,
    #[arg(long, default_value_t = 50)]
    pub max: usize,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ExportCmd {
    Json { path: PathBuf },
    Csv { path: PathBuf, #[arg(long)] set: Option<String> },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ImportCmd {
    Json { path: PathBuf },
    Csv { path: PathBuf, #[arg(long)] set: Option<String> },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ShareCmd {
    /// Store a snapshot of a set and print its share id
    Publish { set: String },
    /// Add a shared set to the local collection
    Fetch { id: String },
    List,
}

#[derive(Debug, Args, Clone)]
pub struct ApiCmd {
    /// Bind address (host:port)
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: String,

    #[command(flatten)]
    pub translator: TranslatorOpts,
}

#[derive(Debug, Args, Clone)]
pub struct TranslatorOpts {
    /// Azure Translator subscription key; /api/translate is disabled without it
    #[arg(long, env = "AZ_TRANSLATOR_API_KEY", hide_env_values = true)]
    pub translator_key: Option<String>,
    #[arg(long, env = "AZ_REGION")]
    pub translator_region: Option<String>,
    #[arg(long, env = "AZ_TRANSLATOR_ENDPOINT", default_value = DEFAULT_TRANSLATOR_ENDPOINT)]
    pub translator_endpoint: String,
}
