use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, ConfigError};
use crate::io::lock::DataDirLock;
use crate::io::recovery;
use crate::io::worker::WriteReceipt;
use crate::model::item::Item;
use crate::model::theme::ThemePreference;
use crate::ops::context::AppContext;
use crate::ops::controller::ListController;
use crate::ops::detail::DetailEditor;
use crate::ops::list_ops;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.data_dir.as_deref())?;

    if let Commands::Init(args) = &cli.command {
        return cmd_init(&start, args);
    }

    let data_dir = config_io::discover_data_dir(&start)?;

    if let Commands::Recovery(args) = &cli.command {
        return cmd_recovery(&data_dir, args, json);
    }

    // Held from the first read to the last write. Declared before `ctx` so the
    // store worker is joined before the lock is released.
    let _lock = if cli.command.writes_store() {
        Some(DataDirLock::acquire_default(&data_dir)?)
    } else {
        None
    };
    let mut ctx = AppContext::open(&data_dir)?;
    match cli.command {
        Commands::List(args) => cmd_list(&ctx, args, json),
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Toggle(args) => cmd_toggle(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args, json),
        Commands::Edit(args) => cmd_edit(&ctx, args),
        Commands::Theme(args) => cmd_theme(&mut ctx, args, json),
        Commands::Reset => cmd_reset(&ctx),
        Commands::Init(_) | Commands::Recovery(_) => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn start_dir(data_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match data_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir().map_err(ConfigError::IoError)?),
    }
}

/// Wait for a write so the process never exits with it still queued, and
/// report a failed one. The details are already in the recovery log.
fn finish_write(receipt: WriteReceipt) -> CmdResult {
    receipt
        .wait()
        .map_err(|e| format!("change was not saved: {}", e).into())
}

fn list_style(ctx: &AppContext) -> Style {
    if std::io::stdout().is_terminal() {
        Style::Themed(ctx.palette())
    } else {
        Style::Plain
    }
}

fn check_length(ctx: &AppContext, title: &str) -> Result<(), list_ops::ValidationError> {
    list_ops::check_title_length(title, ctx.config.input.max_title_length)
}

fn existing_id(controller: &ListController, id_text: &str) -> Result<u64, String> {
    let id = parse_item_id(id_text)?;
    if controller.get(id).is_none() {
        return Err(format!("item not found: {}", id));
    }
    Ok(id)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_init(root: &Path, args: &InitArgs) -> CmdResult {
    let data_dir = config_io::init_data_dir(root, args.force)?;
    println!("Initialized {}", data_dir.display());
    Ok(())
}

fn cmd_list(ctx: &AppContext, args: ListArgs, json: bool) -> CmdResult {
    let controller = ListController::initialize(ctx);
    let items: Vec<Item> = controller
        .items()
        .iter()
        .filter(|item| {
            if args.open {
                !item.completed
            } else if args.done {
                item.completed
            } else {
                true
            }
        })
        .cloned()
        .collect();

    if json {
        let out = ListJson {
            theme: ctx.theme(),
            items: &items,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for line in format_list(&items, &list_style(ctx)) {
        println!("{}", line);
    }
    if !items.is_empty() {
        println!();
        println!("{}", format_summary(&items));
    }
    Ok(())
}

fn cmd_add(ctx: &AppContext, args: AddArgs) -> CmdResult {
    check_length(ctx, &args.title)?;
    let mut controller = ListController::initialize(ctx);
    let added = controller.add(&args.title)?;
    finish_write(added.receipt)?;
    println!("{}", added.id);
    Ok(())
}

fn cmd_toggle(ctx: &AppContext, args: IdArgs) -> CmdResult {
    let mut controller = ListController::initialize(ctx);
    let id = existing_id(&controller, &args.id)?;
    finish_write(controller.toggle_completed(id))?;

    let done = controller.get(id).is_some_and(|item| item.completed);
    println!("{} {}", id, if done { "done" } else { "not done" });
    Ok(())
}

fn cmd_rm(ctx: &AppContext, args: IdArgs) -> CmdResult {
    let mut controller = ListController::initialize(ctx);
    let id = existing_id(&controller, &args.id)?;
    finish_write(controller.remove(id))?;
    println!("{} removed", id);
    Ok(())
}

fn cmd_show(ctx: &AppContext, args: IdArgs, json: bool) -> CmdResult {
    let editor = DetailEditor::new(ctx);
    let item = editor
        .load(&args.id)
        .ok_or_else(|| format!("item not found: {}", args.id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        for line in format_item_detail(&item) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_edit(ctx: &AppContext, args: EditArgs) -> CmdResult {
    check_length(ctx, &args.title)?;
    let editor = DetailEditor::new(ctx);
    let renamed = editor
        .rename(&args.id, &args.title)?
        .ok_or_else(|| format!("item not found: {}", args.id))?;
    finish_write(renamed.receipt)?;
    println!("{} title updated", renamed.id);
    Ok(())
}

fn cmd_theme(ctx: &mut AppContext, args: ThemeArgs, json: bool) -> CmdResult {
    if let Some(choice) = args.choice {
        let receipt = match choice {
            ThemeChoice::Light => ctx.set_theme(ThemePreference::Light),
            ThemeChoice::Dark => ctx.set_theme(ThemePreference::Dark),
            ThemeChoice::Toggle => ctx.toggle_theme(),
        };
        finish_write(receipt)?;
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&ThemeJson { theme: ctx.theme() })?
        );
    } else {
        println!("{}", ctx.theme());
    }
    Ok(())
}

fn cmd_reset(ctx: &AppContext) -> CmdResult {
    let mut controller = ListController::initialize(ctx);
    finish_write(controller.clear())?;
    println!("list reset");
    Ok(())
}

fn cmd_recovery(data_dir: &Path, args: &RecoveryArgs, json: bool) -> CmdResult {
    if args.clear {
        let removed = recovery::clear_recovery_log(data_dir)?;
        println!("removed {} recovery entries", removed);
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(data_dir, Some(args.limit));
    if json {
        let out: Vec<RecoveryEntryJson> = entries.iter().map(recovery_entry_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if entries.is_empty() {
        println!("recovery log is empty");
    } else {
        for entry in &entries {
            for line in format_recovery_entry(entry) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
