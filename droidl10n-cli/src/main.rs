mod changed;
mod check;
mod config;
mod edit;
mod unused;
mod validation;
mod view;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use droidl10n::{CheckMode, ResDir};
use tracing_subscriber::filter::LevelFilter;

use crate::{
    changed::run_changed_command,
    check::{CheckOutput, run_check_command},
    config::Config,
    edit::{
        run_add_command, run_add_plural_command, run_get_command, run_get_plurals_command,
        run_remove_command, run_set_command, run_set_plurals_command, run_sort_command,
    },
    unused::run_unused_command,
    validation::validate_res_dir,
    view::print_languages,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Android resource directory (default: app/src/main/res)
    #[arg(long, global = true)]
    res_dir: Option<PathBuf>,

    /// Settings file (default: ./l10n.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check translations for all languages or a single one.
    Check {
        /// Language qualifier such as ru-rRU; shows every issue for that language
        lang: Option<String>,
        /// Also report untranslated copies, obsolete entries and English variant drift
        #[arg(long)]
        full: bool,
        /// Flag translations within N characters of the English value (0 disables)
        #[arg(long, value_name = "N")]
        near: Option<usize>,
        /// Print only the summary
        #[arg(long, conflicts_with = "json")]
        summary: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Exit with status 1 when critical issues are found
        #[arg(long)]
        strict: bool,
    },

    /// List all available language qualifiers.
    List,

    /// Print a string value.
    Get {
        lang: String,
        id: String,
        /// Print the stored XML text without unescaping
        #[arg(long)]
        raw: bool,
    },

    /// Print every quantity of a plurals resource.
    GetPlurals { lang: String, id: String },

    /// Set one or more existing string values in one language.
    Set {
        /// Store values as given, without escaping
        #[arg(long)]
        raw: bool,
        /// Create strings that don't exist yet in this language file
        #[arg(long)]
        create: bool,
        lang: String,
        /// <ID> <VALUE> [<ID> <VALUE> ...]
        #[arg(
            required = true,
            num_args = 2..,
            allow_hyphen_values = true,
            value_name = "ID VALUE"
        )]
        pairs: Vec<String>,
    },

    /// Set quantities of a plurals resource in one language.
    SetPlurals {
        #[arg(long)]
        raw: bool,
        lang: String,
        id: String,
        /// <QUANTITY> <VALUE> [<QUANTITY> <VALUE> ...]
        #[arg(
            required = true,
            num_args = 2..,
            allow_hyphen_values = true,
            value_name = "QUANTITY VALUE"
        )]
        pairs: Vec<String>,
    },

    /// Add a new string to every language file.
    Add {
        #[arg(long)]
        raw: bool,
        /// Add to values/strings.xml only
        #[arg(long)]
        source_only: bool,
        id: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Add a new plurals resource to every language file.
    AddPlural {
        #[arg(long)]
        raw: bool,
        #[arg(long)]
        source_only: bool,
        id: String,
        /// <QUANTITY> <VALUE> [<QUANTITY> <VALUE> ...]
        #[arg(
            required = true,
            num_args = 2..,
            allow_hyphen_values = true,
            value_name = "QUANTITY VALUE"
        )]
        pairs: Vec<String>,
    },

    /// Remove strings from every language file.
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Sort entries in source order (one language, or every translation).
    Sort { lang: Option<String> },

    /// Find source strings never referenced from code or layouts.
    Unused {
        /// Source tree to scan (default: app/src)
        #[arg(long)]
        src: Option<PathBuf>,
    },

    /// Show source strings changed since the English reference variant was synced.
    Changed {
        /// Reference variant qualifier (default: en-rUS)
        #[arg(long)]
        variant: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), String> {
    let config = Config::load(args.config.as_deref())?;
    let res_dir = args.res_dir.unwrap_or_else(|| config.res_dir.clone());
    validate_res_dir(&res_dir)?;
    let res = ResDir::new(&res_dir);
    tracing::info!(res_dir = %res_dir.display(), "using resource directory");

    match args.commands {
        Commands::Check {
            lang,
            full,
            near,
            summary,
            json,
            strict,
        } => {
            if let Some(lang) = &lang {
                validation::validate_language(lang)?;
            }
            let mode = if full {
                CheckMode::Full
            } else {
                CheckMode::Incremental
            };
            let output = if json {
                CheckOutput::Json
            } else if summary {
                CheckOutput::Summary
            } else {
                CheckOutput::Text
            };
            let options = config.check_options(mode, near);
            run_check_command(&res, lang.as_deref(), &options, output, strict)
        }
        Commands::List => print_languages(&res),
        Commands::Get { lang, id, raw } => run_get_command(&res, &lang, &id, raw),
        Commands::GetPlurals { lang, id } => run_get_plurals_command(&res, &lang, &id),
        Commands::Set {
            raw,
            create,
            lang,
            pairs,
        } => run_set_command(&res, &lang, &pairs, raw, create),
        Commands::SetPlurals {
            raw,
            lang,
            id,
            pairs,
        } => run_set_plurals_command(&res, &lang, &id, &pairs, raw),
        Commands::Add {
            raw,
            source_only,
            id,
            value,
        } => run_add_command(&res, &id, &value, raw, source_only),
        Commands::AddPlural {
            raw,
            source_only,
            id,
            pairs,
        } => run_add_plural_command(&res, &id, &pairs, raw, source_only),
        Commands::Remove { ids } => run_remove_command(&res, &ids),
        Commands::Sort { lang } => run_sort_command(&res, lang.as_deref()),
        Commands::Unused { src } => {
            let src = src.unwrap_or_else(|| config.source_dir.clone());
            run_unused_command(&res, &src)
        }
        Commands::Changed { variant, json } => {
            let variant = variant.unwrap_or_else(|| config.reference_variant.clone());
            run_changed_command(&res, &variant, json)
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}
