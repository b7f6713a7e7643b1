use std::path::PathBuf;

use clap::Parser;

/// Interactive explorer for hourly bike-sharing demand.
#[derive(Debug, Clone, Parser)]
#[command(name = "bike-demand-dash", version)]
#[command(about = "Explore bike rental demand by time, season and weather", long_about = None)]
pub struct Config {
    /// Dataset to open at startup (CSV or Parquet)
    #[arg(short, long, env = "BIKE_DASH_DATA", default_value = "train.csv")]
    pub data: PathBuf,

    /// Initial window width in points
    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,

    /// Initial window height in points
    #[arg(long, default_value_t = 860.0)]
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments() {
        let cfg = Config::try_parse_from(["bike-demand-dash", "--data", "rides.parquet", "--width", "900"]).unwrap();
        assert_eq!(cfg.data, PathBuf::from("rides.parquet"));
        assert_eq!(cfg.width, 900.0);
        assert_eq!(cfg.height, 860.0);
    }

    #[test]
    fn test_rejects_bad_size() {
        assert!(Config::try_parse_from(["bike-demand-dash", "--height", "tall"]).is_err());
    }
}
