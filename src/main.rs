use clap::Parser;
use commit_suggest::{
   api::ProviderSet,
   config::SuggestConfig,
   error::{Result, SuggestError},
   generator::{Suggestion, render_detailed_stats, suggest},
   git::collect_staged,
   perf_log::PerfLogger,
   style::{self, icons},
   types::{Args, StagedChanges},
};
use tracing_subscriber::{EnvFilter, fmt};

/// Diagnostics go to stderr, filtered by `COMMIT_SUGGEST_LOG` (default `warn`)
fn init_tracing() {
   let filter = EnvFilter::try_from_env("COMMIT_SUGGEST_LOG")
      .unwrap_or_else(|_| EnvFilter::new("warn"));
   let _ = fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .with_target(false)
      .try_init();
}

/// Load config from args or default
fn load_config_from_args(args: &Args) -> Result<SuggestConfig> {
   if let Some(ref config_path) = args.config {
      SuggestConfig::from_file(config_path)
   } else {
      SuggestConfig::load()
   }
}

fn main() -> Result<()> {
   dotenvy::dotenv().ok();
   init_tracing();

   let args = Args::parse();
   let config = load_config_from_args(&args)?;

   if args.interactive {
      style::print_info("Interactive mode is not available yet, continuing without it.");
   }

   let preferred = args.provider.unwrap_or(config.default_provider);

   let snapshot = match collect_staged(&args.dir) {
      StagedChanges::Collected(snapshot) => snapshot,
      StagedChanges::NotARepository(reason) => return Err(SuggestError::NotARepository(reason)),
   };

   let providers = ProviderSet::from_config(&config)?;
   let logger = if args.no_log || !config.performance_log {
      PerfLogger::disabled()
   } else {
      PerfLogger::open(&config.log_path, &args.dir)
   };

   let suggestion = if snapshot.summary.is_empty() {
      Suggestion::NoStagedChanges
   } else {
      style::with_spinner(
         &format!("{} Generating commit message with {preferred}...", icons::ROBOT),
         || suggest(&snapshot, &providers, preferred, &config, &logger),
         |result| matches!(result, Ok(Suggestion::Message(_))),
      )?
   };
   logger.finish();

   match suggestion {
      Suggestion::NoStagedChanges => {
         println!("No staged changes found. Please stage your changes using git add first.");
         return Ok(());
      },
      Suggestion::Message(message) => {
         println!("\n{}", style::success("Suggested commit message:"));
         println!("{message}");
      },
      Suggestion::Failed => {
         println!(
            "{}",
            style::error(
               "Failed to generate commit message. Please try again or write your message manually."
            )
         );
      },
   }

   if args.detailed {
      print!("{}", render_detailed_stats(&snapshot));
   }

   Ok(())
}
