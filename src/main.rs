//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use log::{info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode};

use huffzip::compression::compress::compress;
use huffzip::compression::decompress::{decompress, test};
use huffzip::tools::cli::{hzopts_init, Mode};

fn main() -> Result<(), std::io::Error> {
    // Available log levels are Error, Warn, Info, Debug, Trace
    TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stdout,
        simplelog::ColorChoice::AlwaysAnsi,
    )
    .unwrap();

    let options = hzopts_init();

    //----- Figure out what we need to do and go do it
    let result = match options.op_mode {
        Mode::Zip => compress(&options),
        Mode::Unzip => decompress(&options),
        Mode::Test => test(&options),
    };

    info!("Done.\n");
    result
}
