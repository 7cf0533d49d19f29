//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// SESSION DEFAULTS
// =============================================================================

/// Default session lifetime in days
pub const DEFAULT_SESSION_MAX_AGE_DAYS: i64 = 30;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "rimappa.session-token";

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: u64 = 8;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: u64 = 128;

/// Maximum display name length
pub const MAX_NAME_LENGTH: u64 = 100;

// =============================================================================
// GEOCODING DEFAULTS
// =============================================================================

/// MapTiler geocoding API base URL
pub const DEFAULT_GEOCODING_BASE_URL: &str = "https://api.maptiler.com";

/// Language requested from the geocoder
pub const DEFAULT_GEOCODING_LANGUAGE: &str = "es";

/// Country filter requested from the geocoder
pub const DEFAULT_GEOCODING_COUNTRY: &str = "ar";

/// Timeout for a single geocoding lookup, in seconds
pub const DEFAULT_GEOCODING_TIMEOUT_SECS: u64 = 10;

/// Minimum relevance for a preferred candidate
pub const GEOCODING_MIN_RELEVANCE: f64 = 0.8;

/// Place types preferred when picking a candidate
pub const GEOCODING_PREFERRED_PLACE_TYPES: &[&str] = &["address", "poi"];

/// Buenos Aires city center, used as the optional import fallback
pub const CITY_CENTER_LATITUDE: f64 = -34.6037;
pub const CITY_CENTER_LONGITUDE: f64 = -58.3815;

// =============================================================================
// COMPETITION SETTINGS
// =============================================================================

/// Minimum competition capacity
pub const MIN_PARTICIPANTS: i32 = 2;

/// Maximum competition capacity
pub const MAX_PARTICIPANTS: i32 = 64;

/// Capacity assigned to rows of the legacy CSV schema
pub const LEGACY_DEFAULT_MAX_PARTICIPANTS: i32 = 32;

/// Maximum competition title length
pub const MAX_COMPETITION_TITLE_LENGTH: u64 = 256;

/// Minimum competition title length (HTTP create)
pub const MIN_COMPETITION_TITLE_LENGTH: u64 = 3;

/// Minimum competition description length (HTTP create)
pub const MIN_COMPETITION_DESCRIPTION_LENGTH: u64 = 10;

/// Maximum competition description length
pub const MAX_COMPETITION_DESCRIPTION_LENGTH: u64 = 65535;

/// Minimum location length (HTTP create)
pub const MIN_LOCATION_LENGTH: u64 = 3;

/// Rating bounds
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Default competitions per page when a page is requested
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum competitions per page
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// IMPORT SETTINGS
// =============================================================================

/// CSV field delimiter
pub const CSV_DELIMITER: u8 = b';';

/// Default maximum size of an uploaded import file in megabytes
pub const DEFAULT_MAX_IMPORT_SIZE_MB: usize = 5;

/// Multipart field carrying the CSV file
pub const IMPORT_FILE_FIELD: &str = "file";

// =============================================================================
// DASHBOARD
// =============================================================================

/// Default number of recent activity entries
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 5;

/// Maximum number of recent activity entries
pub const MAX_ACTIVITY_LIMIT: i64 = 50;

// =============================================================================
// MAP
// =============================================================================

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// API
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api";

/// Response header carrying the number of matches across all pages
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";
