use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// CLI arguments for the `conec` binary.
#[derive(Parser, Debug)]
#[command(name = "conec", version, about = "Cone compiler front end")]
pub struct CliArgs {
    /// Source file to compile.
    pub source: PathBuf,

    /// Print the post-lowering IR after a successful compile.
    #[arg(long = "print-ir")]
    pub print_ir: bool,

    /// Format used by `--print-ir`.
    #[arg(long = "ir-format", value_enum, default_value_t = IrFormat::Text)]
    pub ir_format: IrFormat,

    /// Increase diagnostic verbosity. Repeatable (`-v`, `-vv`, `-vvv`).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Directory the (stubbed) codegen sink writes its output listing to.
    #[arg(long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Controls whether diagnostics are colorized.
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum IrFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for IrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrFormat::Text => write!(f, "text"),
            IrFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorChoice::Auto => write!(f, "auto"),
            ColorChoice::Always => write!(f, "always"),
            ColorChoice::Never => write!(f, "never"),
        }
    }
}
