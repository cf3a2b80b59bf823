use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fs, io};

use anyhow::{Context, Result};
use arith_coder::config::CoderConfig;
use arith_coder::Coder;
use clap::{Parser, Subcommand};

/// Static arithmetic coder for text files
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON coder configuration
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model on a text file and save it
    Train {
        #[clap(short, long)]
        input: PathBuf,
        #[clap(short, long)]
        model: PathBuf,
    },
    /// Encode a text file into packed code words
    Encode {
        #[clap(short, long)]
        input: PathBuf,
        #[clap(short, long)]
        model: PathBuf,
        #[clap(short, long)]
        output: PathBuf,
        /// Train the model on the input first and save it
        #[clap(long)]
        train: bool,
    },
    /// Decode packed code words back into text
    Decode {
        #[clap(short, long)]
        input: PathBuf,
        #[clap(short, long)]
        model: PathBuf,
        /// Defaults to stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a model's intervals
    Info {
        #[clap(short, long)]
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => CoderConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => CoderConfig::default(),
    };
    let coder = Coder::new(config);

    match args.command {
        Command::Train { input, model } => {
            let text = read_text(&input)?;
            let trained = coder.train(&text);
            coder
                .save_model(&trained, &model)
                .with_context(|| format!("saving model {}", model.display()))?;
            println!("trained {} symbols into {}", trained.len(), model.display());
        }
        Command::Encode {
            input,
            model,
            output,
            train,
        } => {
            let text = read_text(&input)?;
            let model_value = if train {
                let trained = coder.train(&text);
                coder
                    .save_model(&trained, &model)
                    .with_context(|| format!("saving model {}", model.display()))?;
                trained
            } else {
                coder
                    .load_model(&model)
                    .with_context(|| format!("loading model {}", model.display()))?
            };
            let code = coder.encode(&text, &model_value)?;
            coder
                .write_code(&code, &output)
                .with_context(|| format!("writing code {}", output.display()))?;
            println!(
                "encoded {} chars into {} bits ({})",
                text.chars().count(),
                code.len(),
                output.display()
            );
        }
        Command::Decode {
            input,
            model,
            output,
        } => {
            let model = coder
                .load_model(&model)
                .with_context(|| format!("loading model {}", model.display()))?;
            let code = coder
                .read_code(&input)
                .with_context(|| format!("reading code {}", input.display()))?;
            let text = coder.decode(&code, &model)?;
            match output {
                Some(path) => fs::write(&path, text)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    handle.write_all(text.as_bytes())?;
                    handle.flush()?;
                }
            }
        }
        Command::Info { model } => {
            let model = coder
                .load_model(&model)
                .with_context(|| format!("loading model {}", model.display()))?;
            let stdout = io::stdout();
            let mut handle = io::BufWriter::new(stdout.lock());
            writeln!(handle, "Terminator: {:?}", model.terminator())?;
            writeln!(handle, "Entries: {}", model.len())?;
            for (symbol, interval) in model.entries() {
                writeln!(handle, "\t{:?}\t{}", symbol, interval)?;
            }
            handle.flush()?;
        }
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
