use chrono::prelude::*;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{ColorType, ImageError};
use log::{debug, info, warn};
use plotters::coord::ranged1d::BoldPoints;
use plotters::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
pub mod plot;

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

pub const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Line starts written by the benchmark monitor that carry no sample.
pub const DEFAULT_SKIP_PREFIXES: [&str; 2] = ["monitor start", "[iostat]"];

/// 10 x 4 inches at `DPI`.
pub const FIGURE_SIZE: (u32, u32) = (1500, 600);
pub const DPI: u16 = 150;
pub const JPEG_QUALITY: u8 = 90;

const MIN_TIME_MARGIN_SECS: i64 = 30;
const MIN_SPEED_MARGIN: f64 = 1.;
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const X_LABELS: usize = 10;
const Y_LABELS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error, {0}")]
    Io(#[from] std::io::Error),
    #[error("could not render the chart, {0}")]
    Render(String),
    #[error("no data points found")]
    NoData,
}

pub type Result<T> = std::result::Result<T, Error>;

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

fn encode_err(e: ImageError) -> Error {
    match e {
        ImageError::IoError(e) => Error::Io(e),
        e => render_err(e),
    }
}

/// The write speed time series of one benchmark log
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSpeed {
    pub time: Vec<DateTime<Utc>>,
    pub speed: Vec<f64>,
}

impl TimeSpeed {
    pub fn new(capacity: usize) -> TimeSpeed {
        let time: Vec<DateTime<Utc>> = Vec::with_capacity(capacity);
        let speed: Vec<f64> = Vec::with_capacity(capacity);
        TimeSpeed { time, speed }
    }

    /// appends one sample, keeping time and speed aligned
    pub fn push(&mut self, time: DateTime<Utc>, speed: f64) {
        self.time.push(time);
        self.speed.push(speed);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Init a TimeSpeed from the benchmark log at the given path.
    /// Malformed and sentinel lines are skipped, only IO errors are returned.
    pub fn from_log<P: AsRef<Path>, S: AsRef<str>>(
        fin: P,
        skip_prefixes: &[S],
    ) -> Result<TimeSpeed> {
        let file = File::open(fin.as_ref())?;
        info!("reading benchmark log {}", fin.as_ref().display());
        TimeSpeed::from_reader(BufReader::new(file), skip_prefixes)
    }

    /// Same as `from_log`, for any buffered reader.
    /// Lines that are not valid UTF-8 are skipped like any other bad line.
    pub fn from_reader<R: BufRead, S: AsRef<str>>(
        buf: R,
        skip_prefixes: &[S],
    ) -> Result<TimeSpeed> {
        let mut timespeed = TimeSpeed::new(1024);
        let mut skipped: usize = 0;
        for (i, l) in buf.lines().enumerate() {
            let l_ok = match l {
                Ok(l_ok) => l_ok,
                Err(l_err) if l_err.kind() == ErrorKind::InvalidData => {
                    warn!("could not read line {}, {}", i + 1, l_err);
                    skipped += 1;
                    continue;
                }
                Err(l_err) => return Err(l_err.into()),
            };
            match parse_line(&l_ok, skip_prefixes) {
                Some((t, s)) => timespeed.push(t, s),
                None => {
                    debug!("skipping line {}: {:?}", i + 1, l_ok);
                    skipped += 1;
                }
            }
        }
        info!(
            "parsed {} samples, skipped {} lines",
            timespeed.len(),
            skipped
        );
        Ok(timespeed)
    }

    /// plots the write speed time series as a JPEG at `DPI`,
    /// whatever the extension of fout
    pub fn plot_datetime<P: AsRef<Path>>(&self, title: &str, fout: P) -> Result<()> {
        let (width, height) = FIGURE_SIZE;
        let mut buf = vec![0u8; (width * height * 3) as usize];
        self.draw_chart(title, &mut buf)?;

        let mut writer = BufWriter::new(File::create(fout.as_ref())?);
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            encoder.set_pixel_density(PixelDensity::dpi(DPI));
            encoder
                .encode(&buf, width, height, ColorType::Rgb8)
                .map_err(encode_err)?;
        }
        writer.flush()?;
        info!("saved chart to {}", fout.as_ref().display());
        Ok(())
    }

    /// draws the chart into an RGB buffer of `FIGURE_SIZE`
    fn draw_chart(&self, title: &str, buf: &mut [u8]) -> Result<()> {
        let ((xmindt, xmaxdt), (ymin, ymax)) =
            match (min_and_max(&self.time[..]), min_and_max(&self.speed[..])) {
                (Some(x), Some(y)) => (x, y),
                _ => return Err(Error::NoData),
            };
        let xspan: chrono::Duration = xmaxdt - xmindt;
        let xmargin = if xspan > chrono::Duration::zero() {
            xspan / 20
        } else {
            chrono::Duration::seconds(MIN_TIME_MARGIN_SECS)
        };
        let xmindt = xmindt - xmargin;
        let xmaxdt = xmaxdt + xmargin;
        let xfmt = suitable_xfmt(xspan);
        let ymargin = if ymax > ymin {
            (ymax - ymin) / 10f64
        } else {
            MIN_SPEED_MARGIN.max(ymax.abs() / 10f64)
        };
        let ymin = ymin - ymargin;
        let ymax = ymax + ymargin;

        {
            let root = BitMapBackend::with_buffer(buf, FIGURE_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 28))
                .margin(20)
                .x_label_area_size(60)
                .y_label_area_size(90)
                .build_cartesian_2d(xmindt..xmaxdt, ymin..ymax)
                .map_err(render_err)?;
            chart
                .configure_mesh()
                .disable_mesh()
                .label_style(("sans-serif", 18))
                .x_labels(X_LABELS)
                .y_labels(Y_LABELS)
                .x_label_formatter(&|x: &DateTime<Utc>| x.format(xfmt).to_string())
                .y_label_formatter(&|y: &f64| format!("{:.1}", y))
                .x_desc("Time (UTC)")
                .y_desc("Write speed (MB/s)")
                .draw()
                .map_err(render_err)?;

            // dashed grid on the same key points as the axis labels
            let grid_style = BLACK.mix(0.4).stroke_width(1);
            let xgrid = chart.as_coord_spec().x_spec().key_points(BoldPoints(X_LABELS));
            let ygrid = chart.as_coord_spec().y_spec().key_points(BoldPoints(Y_LABELS));
            for x in xgrid {
                let dashes = DashedLineSeries::new(vec![(x, ymin), (x, ymax)], 6, 4, grid_style);
                chart.draw_series(dashes).map_err(render_err)?;
            }
            for y in ygrid {
                let dashes =
                    DashedLineSeries::new(vec![(xmindt, y), (xmaxdt, y)], 6, 4, grid_style);
                chart.draw_series(dashes).map_err(render_err)?;
            }

            let line = LineSeries::new(
                self.time.iter().zip(self.speed.iter()).map(|(x, y)| (*x, *y)),
                LINE_COLOR.stroke_width(1),
            );
            chart.draw_series(line).map_err(render_err)?;
            let points = self
                .time
                .iter()
                .zip(self.speed.iter())
                .map(|(x, y)| Circle::new((*x, *y), 3, LINE_COLOR.filled()));
            chart.draw_series(points).map_err(render_err)?;
            root.present().map_err(render_err)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for TimeSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "datetime, speed [MB/s]")?;
        for (t, s) in self.time.iter().zip(self.speed.iter()) {
            writeln!(f, "{},{}", t.format(DT_FORMAT), s)?
        }
        Ok(())
    }
}

/// Extracts one sample from a log line:
/// field 0 is the epoch in seconds (float epochs are truncated),
/// field 2 is the write speed in MB/s.
/// Returns None for blank, sentinel, short and non-numeric lines;
/// nan and inf count as non-numeric, so such lines never reach the chart.
pub fn parse_line<S: AsRef<str>>(line: &str, skip_prefixes: &[S]) -> Option<(DateTime<Utc>, f64)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if skip_prefixes.iter().any(|p| line.starts_with(p.as_ref())) {
        return None;
    }
    let mut fields = line.split_whitespace();
    let epoch = fields.next()?;
    let speed = fields.nth(1)?;
    let epoch = epoch.parse::<f64>().ok().filter(|e| e.is_finite())?;
    let speed = speed.parse::<f64>().ok().filter(|s| s.is_finite())?;
    let time = Utc.timestamp_opt(epoch.trunc() as i64, 0).single()?;
    Some((time, speed))
}

fn min_and_max<T: PartialOrd + Copy>(s: &[T]) -> Option<(T, T)> {
    let (first, rest) = s.split_first()?;
    Some(rest.iter().fold((*first, *first), |(lo, hi), &v| {
        (if v < lo { v } else { lo }, if v > hi { v } else { hi })
    }))
}

pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    if d > chrono::Duration::weeks(1) {
        "%y-%m-%d"
    } else if d > chrono::Duration::days(1) {
        "%m-%d %H:%M"
    } else if d > chrono::Duration::hours(1) {
        "%H:%M"
    } else {
        "%H:%M:%S"
    }
}
