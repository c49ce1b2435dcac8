use clap::{ArgGroup, Parser};

/// Weather lookup with caching and request history.
#[derive(Debug, Parser)]
#[command(name = "skycast", version)]
#[command(group = ArgGroup::new("mode").required(true).args(["city", "coords", "history", "stats", "clear_history"]))]
pub struct Args {
    /// City name to look up
    #[arg(long)]
    pub city: Option<String>,

    /// Coordinates to look up: latitude longitude
    #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_negative_numbers = true)]
    pub coords: Option<Vec<f64>>,

    /// Show recent request history
    #[arg(long)]
    pub history: bool,

    /// Show aggregate statistics over the history
    #[arg(long)]
    pub stats: bool,

    /// Delete the whole request history
    #[arg(long)]
    pub clear_history: bool,

    /// Number of history records to show
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_mode_parses() {
        let args = Args::parse_from(["skycast", "--city", "Moscow"]);
        assert_eq!(args.city.as_deref(), Some("Moscow"));
        assert_eq!(args.limit, 10);
    }

    #[test]
    fn test_coords_mode_parses_negative_values() {
        let args = Args::parse_from(["skycast", "--coords", "-33.8688", "151.2093"]);
        assert_eq!(args.coords, Some(vec![-33.8688, 151.2093]));
    }

    #[test]
    fn test_modes_are_mutually_exclusive() {
        let parsed = Args::try_parse_from(["skycast", "--city", "Moscow", "--history"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_some_mode_is_required() {
        assert!(Args::try_parse_from(["skycast"]).is_err());
        assert!(Args::try_parse_from(["skycast", "--limit", "5"]).is_err());
    }

    #[test]
    fn test_history_with_limit() {
        let args = Args::parse_from(["skycast", "--history", "--limit", "3"]);
        assert!(args.history);
        assert_eq!(args.limit, 3);
    }
}
