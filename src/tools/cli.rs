use std::fmt::{Display, Formatter};

use clap::Parser;
use log::{info, warn};

/// Zip, Unzip, Test
#[derive(Debug, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define all user settable options to control program behavior
#[derive(Debug)]
pub struct HzOpts {
    /// Names of files to read for input
    pub files: Vec<String>,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Send output to the terminal instead of a file
    pub stdout: bool,
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    name = "huffzip",
    version,
    about = "A byte-oriented Huffman file compressor",
    long_about = "
    Huffzip compresses files with a classical Huffman code: a frequency count
    of the input bytes, an optimal prefix-free code built from it, and the
    input recoded into a packed bitstream. The payload is self-describing, so
    decompression needs nothing but the .hfz file.

    It is done in the spirit of learning, both learning Rust and learning
    compression techniques."
)]
struct Args {
    /// Files to process
    #[clap()]
    files: Vec<String>,

    /// Perform compression on the input files (the default)
    #[clap(short = 'z', long = "zip")]
    compress: bool,

    /// Perform decompression on the input files
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity without writing anything
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Keep input files
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Force overwriting output files
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Sets verbosity. -v1 shows very little, -v5 is chatty
    #[clap(short = 'v', default_value_t = 3)]
    v: u8,
}

/// Put command line information from CLAP into our internal structure.
pub fn hzopts_init() -> HzOpts {
    let args = Args::parse();

    // Decompression and testing must be asked for; compressing is the
    // default, and -z wins over -d when both are given.
    let op_mode = if args.test {
        Mode::Test
    } else if args.decompress && !args.compress {
        Mode::Unzip
    } else {
        Mode::Zip
    };

    // Set the log level
    match args.v {
        0 => log::set_max_level(log::LevelFilter::Off),
        1 => log::set_max_level(log::LevelFilter::Error),
        2 => log::set_max_level(log::LevelFilter::Warn),
        3 => log::set_max_level(log::LevelFilter::Info),
        4 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    };

    let opts = HzOpts {
        files: args.files,
        op_mode,
        keep_input_files: args.keep,
        force_overwrite: args.force,
        stdout: args.stdout,
    };

    // Below we report initialization status to the user
    info!("---- Huffzip Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    if opts.files.is_empty() {
        warn!("No input files were given.");
    }
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.keep_input_files {
        info!("Keeping input files")
    };
    info!("---- Huffzip Initialization End ----\n");

    opts
}
