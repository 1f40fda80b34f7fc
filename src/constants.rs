// Port configuration
pub const DEFAULT_PORT: u16 = 3001;

// Data source
pub const DEFAULT_DATA_SOURCE: &str = "data.json";
pub const DETAILS_PLACEHOLDER: &str = "Detailed information for this site is not yet available.";

// Year slider
pub const DEFAULT_YEAR: f64 = 2025.0;
pub const DEFAULT_MIN_YEAR: f64 = -3000.0;
pub const DEFAULT_MAX_YEAR: f64 = 2025.0;

// Timing (milliseconds unless noted)
pub const SEARCH_DEBOUNCE_MS: u64 = 300;
pub const NOTICE_SECS: u64 = 5;
pub const RESIZE_SETTLE_MS: u64 = 200;
pub const SIDEBAR_SETTLE_MS: u64 = 360;
pub const INITIAL_SETTLE_MS: u64 = 500;
pub const SSE_HEARTBEAT_SECS: u64 = 30;

// Map view
pub const MAP_CENTER: [f64; 2] = [20.5937, 78.9629];
pub const MAP_ZOOM: u8 = 5;
pub const MAP_MAX_ZOOM: u8 = 18;
pub const TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors, © CARTO";

// Marker icon geometry
pub const ICON_SIZE: [u32; 2] = [32, 37];
pub const ICON_ANCHOR: [i32; 2] = [16, 37];
pub const POPUP_ANCHOR: [i32; 2] = [0, -28];
pub const DOT_ICON_SIZE: [u32; 2] = [24, 24];
pub const DOT_ICON_ANCHOR: [i32; 2] = [12, 12];
