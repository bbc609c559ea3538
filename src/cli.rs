use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use patch_dataset_builder::config::BuildConfig;
use patch_dataset_builder::core::{
    patched_to_dataset, raw_img_to_patches, AssemblyMode, BuildError, BuildResult, DatasetType,
    Thresholds,
};

/// Turn raw microscopy acquisitions into a patch-based training dataset.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory for log files.
    #[arg(long, global = true, default_value = "logs")]
    pub log_dir: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resample, label and tile every raw acquisition into patch folders.
    Patches(PatchesArgs),
    /// Assemble patch folders into one flat dataset.
    Dataset(DatasetArgs),
    /// Print the effective configuration as JSON.
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PatchesArgs {
    /// Folder with one sub-folder per raw acquisition.
    #[arg(long)]
    pub raw: Option<PathBuf>,
    /// Folder receiving the patch folders.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Three increasing class thresholds in [0, 1], e.g. 0,0.2,0.8.
    #[arg(long, value_delimiter = ',')]
    pub thresholds: Option<Vec<f64>>,
    /// Patch side length in pixels.
    #[arg(long)]
    pub patch_size: Option<u32>,
    /// Target pixel size in micrometers per pixel.
    #[arg(long)]
    pub resolution: Option<f64>,
    /// Continue past failing acquisitions and report them at the end.
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Folder with the patch folders (SEM/ and TEM/ for mixed datasets).
    #[arg(long)]
    pub patched: Option<PathBuf>,
    /// Folder receiving the dataset.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Dataset type.
    #[arg(long = "type", value_enum)]
    pub dataset_type: Option<DatasetTypeArg>,
    /// Seed for mixed datasets.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Also write it to the --config path, or the platform config file.
    #[arg(long, default_value_t = false)]
    pub save: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetTypeArg {
    Unique,
    Mixed,
}

impl From<DatasetTypeArg> for DatasetType {
    fn from(arg: DatasetTypeArg) -> Self {
        match arg {
            DatasetTypeArg::Unique => DatasetType::Unique,
            DatasetTypeArg::Mixed => DatasetType::Mixed,
        }
    }
}

impl PatchesArgs {
    fn apply(&self, config: &mut BuildConfig) -> BuildResult<()> {
        if let Some(raw) = &self.raw {
            config.raw_data_path = Some(raw.clone());
        }
        if let Some(out) = &self.out {
            config.patched_data_path = Some(out.clone());
        }
        if let Some(values) = &self.thresholds {
            config.thresholds = Thresholds::try_from(values.as_slice())?;
        }
        if let Some(size) = self.patch_size {
            config.patch_size = size;
        }
        if let Some(resolution) = self.resolution {
            config.resampling_resolution = resolution;
        }
        Ok(())
    }
}

impl DatasetArgs {
    fn apply(&self, config: &mut BuildConfig) {
        if let Some(patched) = &self.patched {
            config.patched_data_path = Some(patched.clone());
        }
        if let Some(out) = &self.out {
            config.dataset_path = Some(out.clone());
        }
        if let Some(dataset_type) = self.dataset_type {
            config.dataset_type = dataset_type.into();
        }
        if let Some(seed) = self.seed {
            config.random_seed = Some(seed);
        }
    }
}

/// Load the config, apply the command line on top and run the command.
pub fn run(cli: Cli) -> BuildResult<()> {
    let mut config = match &cli.config {
        Some(path) => BuildConfig::load_from(path)?,
        None => BuildConfig::load(),
    };

    match &cli.command {
        Command::Patches(args) => {
            args.apply(&mut config)?;
            config.validate()?;
            let raw = require(&config.raw_data_path, "--raw")?;
            let out = require(&config.patched_data_path, "--out")?;

            let summary = raw_img_to_patches(&raw, &out, &config.patch_params(args.keep_going))?;
            print_json(&summary)
        }
        Command::Dataset(args) => {
            args.apply(&mut config);
            let patched = require(&config.patched_data_path, "--patched")?;
            let out = require(&config.dataset_path, "--out")?;

            let summary = patched_to_dataset(&patched, &out, assembly_mode(&config))?;
            print_json(&summary)
        }
        Command::Config(args) => {
            if args.save {
                let path = match &cli.config {
                    Some(path) => path.clone(),
                    None => BuildConfig::get_config_path().ok_or_else(|| {
                        BuildError::InvalidParameter(
                            "no platform config directory: pass --config".to_string(),
                        )
                    })?,
                };
                config.save_to(&path)?;
            }
            print_json(&config)
        }
    }
}

/// Mixed mode without a configured seed draws one and logs it, so the run
/// can be repeated.
fn assembly_mode(config: &BuildConfig) -> AssemblyMode {
    match config.dataset_type {
        DatasetType::Unique => AssemblyMode::Unique,
        DatasetType::Mixed => {
            let seed = config.random_seed.unwrap_or_else(|| {
                let seed = rand::random::<u64>();
                info!("No seed configured, using random seed {}", seed);
                seed
            });
            AssemblyMode::Mixed { seed }
        }
    }
}

fn require(value: &Option<PathBuf>, flag: &str) -> BuildResult<PathBuf> {
    value.clone().ok_or_else(|| {
        BuildError::InvalidParameter(format!("missing path: pass {} or set it in the config", flag))
    })
}

fn print_json<T: Serialize>(value: &T) -> BuildResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| BuildError::IoError(e.into()))?;
    println!("{}", json);
    Ok(())
}
