use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::{Config, DEFAULT_APP_ROOT, DEFAULT_DATA_ROOT};

#[derive(Parser, Debug)]
#[command(
    name = "dexls",
    about = "List the classes packed in an Android application's dex files",
    version,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enumerate every class name, multidex included.
    Classes(ClassesCommand),
    /// Show the resolved dex source files without opening them.
    Sources(SourcesCommand),
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Android application package name to target.
    pub package: String,

    /// Explicit path to the application package instead of searching the app root.
    #[arg(long, value_name = "PATH")]
    pub apk: Option<PathBuf>,

    /// Directory that holds installed application packages.
    #[arg(long = "app-root", value_name = "DIR", default_value = DEFAULT_APP_ROOT)]
    pub app_root: PathBuf,

    /// Root of per-application private data directories.
    #[arg(long = "data-root", value_name = "DIR", default_value = DEFAULT_DATA_ROOT)]
    pub data_root: PathBuf,
}

impl TargetArgs {
    fn to_config(&self) -> Config {
        let mut cfg = Config::new(&self.package);
        cfg.apk = self.apk.clone();
        cfg.app_root = self.app_root.clone();
        cfg.data_root = self.data_root.clone();
        cfg
    }
}

#[derive(Args, Debug, Clone)]
pub struct ClassesCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Skip the class list cache entirely: never read it, never write it.
    #[arg(long = "no-cache", action = ArgAction::SetTrue)]
    pub no_cache: bool,

    /// Verify each container's header checksum while enumerating.
    #[arg(long = "verify-checksum", action = ArgAction::SetTrue)]
    pub verify_checksum: bool,

    /// Print only the number of classes found.
    #[arg(long, action = ArgAction::SetTrue)]
    pub count: bool,
}

impl ClassesCommand {
    pub fn to_config(&self) -> Config {
        let mut cfg = self.target.to_config();
        cfg.use_cache = !self.no_cache;
        cfg.verify_checksum = self.verify_checksum;
        cfg
    }
}

#[derive(Args, Debug, Clone)]
pub struct SourcesCommand {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl SourcesCommand {
    pub fn to_config(&self) -> Config {
        self.target.to_config()
    }
}
