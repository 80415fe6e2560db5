use log::info;
use std::process;
use write_speed_plot::plot::{parse_cli, PlotConfig};
use write_speed_plot::{Error, Result, TimeSpeed};

fn run(config: &PlotConfig) -> Result<()> {
    let ts = TimeSpeed::from_log(&config.login, &config.skip_prefixes[..])?;
    if ts.is_empty() {
        return Err(Error::NoData);
    }
    ts.plot_datetime(&config.title, &config.imgout)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = parse_cli();
    info!(
        "read data from {} and plot to {}",
        config.login.display(),
        config.imgout.display()
    );
    match run(&config) {
        Ok(()) => println!("Wrote {}", config.imgout.display()),
        Err(Error::NoData) => {
            eprintln!("No data points found.");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
