//! CLI tool to compile dwo source files to JavaScript.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use dwoc_rs::{Compiler, Target};
use log::{LevelFilter, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source file path
    input: PathBuf,

    /// Output file; the target's extension is appended when missing
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// What to produce
    #[arg(short, long, value_enum, default_value_t = TargetArg::Js)]
    target: TargetArg,

    #[arg(long, action)]
    /// Print the result instead of writing a file
    stdout: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TargetArg {
    /// JavaScript program
    Js,
    /// Syntax tree dump
    Ir,
    /// Token stream dump
    Tokens,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Js => Self::JavaScript,
            TargetArg::Ir => Self::Ir,
            TargetArg::Tokens => Self::Tokens,
        }
    }
}

fn output_path(output: &Path, target: Target) -> PathBuf {
    let extension = target.extension();
    if output.extension().is_some_and(|e| e == extension) {
        output.to_path_buf()
    } else {
        let mut name = output.as_os_str().to_owned();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}

fn write_output(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
    {
        eprintln!("failed to initialize logging: {e}");
    }

    let path = cli.input.display().to_string();
    let source = match fs::read_to_string(&cli.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::from(2);
        }
    };

    let target = Target::from(cli.target);
    let mut compiler = Compiler::new(path.as_str(), &source);
    let result = compiler.run(target);

    for warning in compiler.warnings() {
        warning.emit();
    }

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            e.diagnostic().emit();
            return ExitCode::FAILURE;
        }
    };

    if cli.stdout {
        print!("{output}");
        return ExitCode::SUCCESS;
    }

    let destination = output_path(&cli.output, target);
    if let Err(e) = write_output(&destination, &output) {
        eprintln!("{}: {e}", destination.display());
        return ExitCode::from(2);
    }
    info!("wrote {}", destination.display());
    ExitCode::SUCCESS
}
