use clap::Parser;
use imgseq::collect::OrderingPolicy;
use imgseq::{config, output, process};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "imgseq")]
#[command(about = "Normalize a tree of images into sequentially numbered PNGs")]
#[command(long_about = "\
Normalize a tree of images into sequentially numbered PNGs

Every image under the input directory is converted to RGB PNG, optionally
resized and padded, and written as <output_dir>/<N>.png with N = 1, 2, 3, ...
A caption sidecar next to an image (cat.jpg + cat.txt) is copied to <N>.txt.

Sizing:
  --width and --height    exact size, aspect ratio may change
  --width or --height     the other side follows the aspect ratio
  --resolution            cap on the longest side, never enlarges
  --square                pad onto a centered square canvas

Images that fail to decode or write are reported and skipped; they do not
use up a number.")]
#[command(version = version_string())]
struct Cli {
    /// Root of the directory tree to scan
    #[arg(
        short = 'i',
        long = "input_dir",
        visible_alias = "source_dir",
        visible_short_alias = 's'
    )]
    input_dir: PathBuf,

    /// Destination directory, created if absent
    #[arg(short = 'o', long = "output_dir")]
    output_dir: PathBuf,

    /// Target width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Cap on the longest side in pixels
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..))]
    resolution: Option<u32>,

    /// Pad output to a square canvas
    #[arg(long)]
    square: bool,

    /// Order in which images are numbered [default: folder]
    #[arg(short = 'm', long, value_enum)]
    mode: Option<OrderingPolicy>,

    /// Seed for random mode
    #[arg(long, value_parser = clap::value_parser!(u64).range(..=i64::MAX as u64))]
    seed: Option<u64>,

    /// TOML config file, overridden by the flags above
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Sparse config table holding only the flags that were passed.
    fn config_overlay(&self) -> toml::Value {
        let mut collect = toml::Table::new();
        if let Some(mode) = self.mode {
            collect.insert(
                "order".into(),
                toml::Value::String(mode.to_string()),
            );
        }
        if let Some(seed) = self.seed.and_then(|s| i64::try_from(s).ok()) {
            collect.insert("seed".into(), toml::Value::Integer(seed));
        }

        let mut resize = toml::Table::new();
        for (key, value) in [
            ("width", self.width),
            ("height", self.height),
            ("max_side", self.resolution),
        ] {
            if let Some(v) = value {
                resize.insert(key.into(), toml::Value::Integer(i64::from(v)));
            }
        }
        if self.square {
            resize.insert("square".into(), toml::Value::Boolean(true));
        }

        let mut root = toml::Table::new();
        root.insert("collect".into(), toml::Value::Table(collect));
        root.insert("resize".into(), toml::Value::Table(resize));
        toml::Value::Table(root)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref(), cli.config_overlay())?;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });

    let result = process::process(&cli.input_dir, &cli.output_dir, &config, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let summary = result?;
    output::print_summary(&summary);

    Ok(())
}
