// model-blob: encode, decode, inspect and classify with model blob files.
//
// Subcommands:
//   encode    - JSON description of the five sections -> binary blob
//   decode    - binary blob -> JSON
//   inspect   - section offsets and sizes of a blob
//   classify  - language identification with a blob as the model

mod commands;
mod config;

use std::io;
use std::path::PathBuf;

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use log::info;
use model_blob::{ByteOrder, ElementKind, Framing};

use crate::config::{CliConfig, LayoutConfig};

#[derive(Parser)]
#[command(name = "model-blob", about = "Encode, decode and inspect model blob files")]
struct Cli {
    /// TOML file with the default output path and layout
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(flatten)]
    layout: LayoutArgs,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Args)]
struct LayoutArgs {
    /// Byte order of prefixes and payloads: little, big or native
    #[arg(long, global = true)]
    byte_order: Option<ByteOrder>,
    /// raw (legacy, no header) or tagged (self-describing header)
    #[arg(long, global = true)]
    framing: Option<Framing>,
    /// Element type of the matrix and vector: f32 or f64
    #[arg(long, global = true)]
    float: Option<ElementKind>,
    /// Element type of the integer vector: i16, u16, i32, u32 or i64
    #[arg(long, global = true)]
    int: Option<ElementKind>,
}

impl LayoutArgs {
    /// Language models are f32 / u16; other explicit element types are an error.
    fn check_langid(&self) -> anyhow::Result<()> {
        if let Some(float) = self.float.filter(|kind| *kind != ElementKind::F32) {
            bail!("classify reads f32 models, --float {} does not apply", float);
        }
        if let Some(int) = self.int.filter(|kind| *kind != ElementKind::U16) {
            bail!("classify reads u16 transition tables, --int {} does not apply", int);
        }
        Ok(())
    }

    fn apply(&self, mut layout: LayoutConfig) -> LayoutConfig {
        if let Some(byte_order) = self.byte_order {
            layout.byte_order = byte_order;
        }
        if let Some(framing) = self.framing {
            layout.framing = framing;
        }
        if let Some(float) = self.float {
            layout.float = float;
        }
        if let Some(int) = self.int {
            layout.int = int;
        }
        layout
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Write a blob from a JSON file holding the five sections
    Encode {
        /// JSON with matrix, vector, int_vector, strings and sparse
        #[arg(long)]
        input: PathBuf,
        /// Output path (defaults to the configured one, model.bin)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print a blob as JSON
    Decode {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Print the offset and size of every section
    Inspect { file: PathBuf },
    /// Print the most likely language of each text
    ///
    /// The model is always read as f32 / u16; --float and --int other than
    /// f32 and u16 are rejected.
    Classify {
        #[arg(long)]
        model: PathBuf,
        /// Comma-separated subset of languages to choose from
        #[arg(long, value_delimiter = ',')]
        langs: Vec<String>,
        /// Report normalised probabilities instead of raw scores
        #[arg(long)]
        norm: bool,
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if matches!(cli.command, Cmd::Classify { .. }) {
        cli.layout.check_langid()?;
    }
    let config = CliConfig::load(cli.config.as_deref())?;
    let layout = cli.layout.apply(config.layout);
    info!(
        "layout: {} endian, {} framing, {} / {}",
        layout.byte_order, layout.framing, layout.float, layout.int
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Cmd::Encode { input, output } => {
            let output = output.unwrap_or(config.output);
            commands::encode(&input, &output, &layout)
        }
        Cmd::Decode { file, pretty } => commands::decode(&file, &layout, pretty, &mut out),
        Cmd::Inspect { file } => commands::inspect(&file, &layout, &mut out),
        Cmd::Classify {
            model,
            langs,
            norm,
            text,
        } => commands::classify(&model, &layout, &langs, norm, &text, &mut out),
    }
}
