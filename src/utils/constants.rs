/// Upstream marker for "no valid reading" on any metric
pub const SENTINEL: f64 = -99.0;

/// Leaderboard size used by every board unless configured otherwise
pub const DEFAULT_LIMIT: usize = 4;

/// Upstream endpoints
pub const DEFAULT_SOURCE_URL: &str =
    "https://www.ipma.pt/pt/otempo/obs.superficie/table-top-stations-all.jsp";
pub const DEFAULT_DIRECTORY_URL: &str = "https://api.fogos.pt";

/// Marker preceding the embedded observations JSON in the source page
pub const OBSERVATIONS_MARKER: &str = "var observations";

/// Network defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration
pub const DEFAULT_CONFIG_FILE: &str = "resumo-meteo.toml";
pub const ENV_PREFIX: &str = "RESUMO_METEO";

/// Rendering defaults
pub const DEFAULT_FONT_PATH: &str = "assets/Lato-Bold.ttf";
pub const DEFAULT_FONT_SIZE: f32 = 22.0;
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_ROW_HEIGHT: i32 = 24;
