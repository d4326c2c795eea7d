use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use cpu16_asm::{AsmConfig, Assembler, OutputMode, PcAdvance};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble cpu16 source into a hex word stream"
)]
struct Opts {
    /// Prefix each instruction with its address, one instruction per line
    /// (text format only)
    #[arg(short, long)]
    debug: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Address (in words) of the first instruction
    #[arg(long, default_value_t = 0u32)]
    origin: u32,
    /// How label addresses advance past each instruction
    #[arg(long, value_enum, default_value_t = PcArg::Legacy)]
    pc_advance: PcArg,
    /// Export labels to JSON (Vec<{ name, addr }>)
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
    /// Source file (default: stdin)
    #[arg(value_name = "ASMFILE")]
    input: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PcArg {
    Legacy,
    Encoded,
}

impl From<PcArg> for PcAdvance {
    fn from(arg: PcArg) -> Self {
        match arg {
            PcArg::Legacy => PcAdvance::Legacy,
            PcArg::Encoded => PcAdvance::Encoded,
        }
    }
}

fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(p) => Box::new(BufReader::new(
            File::open(p).with_context(|| format!("opening {}", p.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    })
}

impl Opts {
    fn validate(&self) -> Result<(), clap::Error> {
        if self.debug && matches!(self.format, Format::Json) {
            return Err(Opts::command().error(
                ErrorKind::ArgumentConflict,
                "--debug only applies to --format text",
            ));
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let opts = Opts::parse();
    if let Err(e) = opts.validate() {
        e.exit();
    }
    let cfg = AsmConfig {
        origin: opts.origin,
        pc_advance: opts.pc_advance.into(),
        ..AsmConfig::default()
    };

    let mut asm = Assembler::new(cfg);
    for line in open_input(opts.input.as_ref())?.lines() {
        asm.feed_line(&line.context("reading source")?)?;
    }
    let program = asm.finish()?;

    // render everything first so a failure leaves stdout empty
    let text = match opts.format {
        Format::Json => program.render_json()? + "\n",
        Format::Text if opts.debug => program.render(OutputMode::Debug),
        Format::Text => program.render(OutputMode::Compact),
    };

    if let Some(path) = &opts.labels_out {
        let json = serde_json::to_string_pretty(&program.labels)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(args: &[&str]) -> Opts {
        Opts::try_parse_from(std::iter::once("cpu16-asm").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn debug_with_json_is_rejected() {
        let err = opts(&["-d", "--format", "json"]).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn debug_with_text_is_accepted() {
        assert!(opts(&["-d"]).validate().is_ok());
        assert!(opts(&["-d", "--format", "text"]).validate().is_ok());
        assert!(opts(&["--format", "json"]).validate().is_ok());
    }
}
