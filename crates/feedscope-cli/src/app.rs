//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "feedscope")]
#[command(
    author,
    version,
    about = "Search and analyze customer feedback with hybrid search and AI insights"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a piece of feedback
    Submit(SubmitArgs),

    /// List feedback for a partition, newest first
    List(ListArgs),

    /// Hybrid semantic and keyword search
    Search(SearchArgs),

    /// Analytics plus an AI-written (or statistical) report
    Insights(InsightsArgs),

    /// Ask a question about a partition's feedback
    Ask(AskArgs),

    /// Generate embeddings for feedback that has none
    Embed(EmbedArgs),

    /// Show database status
    Status,
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Partition code (store, product or tenant)
    pub code: String,

    /// Name of the customer
    #[arg(long)]
    pub author: String,

    /// Star rating, 1-5
    #[arg(long)]
    pub rating: u8,

    /// Feedback text
    #[arg(required = true)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Partition code
    pub code: String,

    /// Maximum number of records
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Partition code
    pub code: String,

    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct InsightsArgs {
    /// Partition code
    pub code: String,

    /// Analysis window in days
    #[arg(long, default_value = "30")]
    pub days: u32,

    /// Focus the analysis on a topic
    #[arg(long)]
    pub query: Option<String>,

    /// Skip the second-pass enhancement
    #[arg(long)]
    pub no_enhance: bool,
}

#[derive(Args)]
pub struct AskArgs {
    /// Partition code
    pub code: String,

    /// Question, e.g. "anything similar to 'late delivery'?"
    #[arg(required = true)]
    pub question: Vec<String>,
}

#[derive(Args)]
pub struct EmbedArgs {
    /// Partition code
    pub code: String,

    /// Maximum records to embed in this run
    #[arg(long, default_value = "100")]
    pub limit: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
