use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "td", about = concat!("td v", env!("CARGO_PKG_VERSION"), " - a small persisted to-do list"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use the .todos/ directory under this path instead of searching upward
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a .todos/ directory here
    Init(InitArgs),
    /// Show the list, newest first
    List(ListArgs),
    /// Add an item to the top of the list
    Add(AddArgs),
    /// Mark an item done, or not done again
    Toggle(IdArgs),
    /// Delete an item
    Rm(IdArgs),
    /// Show a single item
    Show(IdArgs),
    /// Change an item's title
    Edit(EditArgs),
    /// Show or change the color theme
    Theme(ThemeArgs),
    /// Forget the saved list (the bundled starter list comes back)
    Reset,
    /// View or clear the recovery log
    Recovery(RecoveryArgs),
}

impl Commands {
    /// Whether the command loads, changes and saves stored values.
    pub fn writes_store(&self) -> bool {
        match self {
            Commands::Add(_)
            | Commands::Toggle(_)
            | Commands::Rm(_)
            | Commands::Edit(_)
            | Commands::Reset => true,
            Commands::Theme(args) => args.choice.is_some(),
            Commands::Init(_) | Commands::List(_) | Commands::Show(_) | Commands::Recovery(_) => {
                false
            }
        }
    }
}

#[derive(Args)]
pub struct InitArgs {
    /// Rewrite config.toml even if .todos/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only items not yet done
    #[arg(long, conflicts_with = "done")]
    pub open: bool,
    /// Only completed items
    #[arg(long)]
    pub done: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Item title
    pub title: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Item id
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Item id
    pub id: String,
    /// New title
    pub title: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// New theme (omit to show the current one)
    pub choice: Option<ThemeChoice>,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Show at most this many entries
    #[arg(long, default_value = "20")]
    pub limit: usize,
    /// Delete the recovery log
    #[arg(long)]
    pub clear: bool,
}
