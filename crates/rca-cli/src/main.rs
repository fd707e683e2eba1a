mod driver;
mod error;

use compact_str::CompactString;
use facet::Facet;
use figue as args;
use std::path::PathBuf;

#[derive(Facet, Debug)]
struct Cli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    #[facet(args::subcommand)]
    command: Command,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Runs one RCA step: event table + snapshot + rules -> incident files.
    Run {
        #[facet(args::named)]
        events: CompactString,
        #[facet(args::named)]
        snapshot: CompactString,
        #[facet(args::named, default)]
        rules: Option<CompactString>,
        #[facet(args::named, default)]
        out: Option<CompactString>,
        #[facet(args::named, default)]
        window_secs: Option<u64>,
    },
}

const DEFAULT_RULES_PATH: &str = "rules/rules.yaml";
const DEFAULT_OUT_DIR: &str = "incidents";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let figue_config = args::builder::<Cli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("rca")
                .description("Runs automated root-cause analysis over a batch of cluster events")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();
    let cli = args::Driver::new(figue_config).run().into_result().map_err(|e| e.to_string())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.value.command {
        Command::Run { events, snapshot, rules, out, window_secs } => {
            let run_args = driver::RunArgs {
                events_path: PathBuf::from(events.as_str()),
                snapshot_path: PathBuf::from(snapshot.as_str()),
                rules_path: PathBuf::from(rules.as_deref().unwrap_or(DEFAULT_RULES_PATH)),
                out_dir: PathBuf::from(out.as_deref().unwrap_or(DEFAULT_OUT_DIR)),
                window_secs: driver::RunArgs::window_secs_or_default(window_secs),
            };
            driver::run(&run_args).map(|_| ()).map_err(|e| e.to_string())
        }
    }
}
