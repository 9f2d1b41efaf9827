use anyhow::Result;
use clap::Parser;

use dexls::cli::{Cli, Commands};
use dexls::paths::resolve_dex_sources;
use dexls::{ClassLister, ContextProvider, FsContextProvider, LogSink};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classes(cmd) => {
            let cfg = cmd.to_config();
            let provider = FsContextProvider::new(&cfg);
            let lister =
                ClassLister::new(provider, LogSink).verify_checksums(cfg.verify_checksum);

            let classes = lister.all_classes(cfg.use_cache)?;
            if cmd.count {
                println!("{}", classes.len());
            } else {
                for name in &classes {
                    println!("{name}");
                }
            }
            Ok(())
        }
        Commands::Sources(cmd) => {
            let cfg = cmd.to_config();
            let ctx = FsContextProvider::new(&cfg).target_context()?;
            for source in resolve_dex_sources(&ctx, &LogSink) {
                println!("{:<12} {}", source.kind.to_string(), source.path.display());
            }
            Ok(())
        }
    }
}
