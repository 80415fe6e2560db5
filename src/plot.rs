use super::{DEFAULT_SKIP_PREFIXES, VERSION};
use clap::{App, Arg};
use std::ffi::OsString;
use std::path::PathBuf;

/// Settings for one plotting run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub login: PathBuf,
    pub imgout: PathBuf,
    pub title: String,
    pub skip_prefixes: Vec<String>,
}

/// Takes the CLI arguments that control the plotting of the write speed time series.
/// Exits with code 1 on usage errors.
pub fn parse_cli() -> PlotConfig {
    parse_cli_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
}

pub fn parse_cli_from<I, T>(args: I) -> clap::Result<PlotConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let arg_login = Arg::with_name("log_file")
        .help("benchmark log, epoch seconds in the first field and MB/s in the third")
        .index(1)
        .required(true);
    let arg_imgout = Arg::with_name("output_image")
        .help("name of the output image, e.g. output.jpg")
        .index(2)
        .required(true);
    let arg_title = Arg::with_name("title")
        .help("chart title, defaults to 'Write speed: <log_file>'")
        .short("t")
        .long("title")
        .takes_value(true);
    let arg_skip = Arg::with_name("skip_prefix")
        .help("skip lines starting with this prefix, replaces the defaults")
        .long_help(
            "skip lines starting with this prefix; can be repeated and replaces \
            the defaults 'monitor start' and '[iostat]'",
        )
        .short("s")
        .long("skip-prefix")
        .takes_value(true)
        .multiple(true)
        .number_of_values(1);
    let cli_args = App::new("write_speed_plot")
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to plot the write speed time series of a benchmark log")
        .arg(arg_login)
        .arg(arg_imgout)
        .arg(arg_title)
        .arg(arg_skip)
        .get_matches_from_safe(args)?;

    let login = PathBuf::from(cli_args.value_of_os("log_file").unwrap_or_default());
    let imgout = PathBuf::from(cli_args.value_of_os("output_image").unwrap_or_default());
    let title = match cli_args.value_of("title") {
        Some(t) => String::from(t),
        None => format!("Write speed: {}", login.display()),
    };
    let skip_prefixes: Vec<String> = match cli_args.values_of("skip_prefix") {
        Some(v) => v.filter(|p| !p.is_empty()).map(String::from).collect(),
        None => DEFAULT_SKIP_PREFIXES.iter().map(|p| p.to_string()).collect(),
    };
    Ok(PlotConfig {
        login,
        imgout,
        title,
        skip_prefixes,
    })
}
