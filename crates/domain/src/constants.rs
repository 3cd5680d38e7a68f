//! Application constants
//!
//! Endpoint paths, redirect routes, and timing defaults shared by the
//! authentication flow.

// Application auth API / BFF endpoints
pub const BFF_LOGIN_PATH: &str = "/api/auth/login";
pub const PASSWORD_LOGIN_PATH: &str = "/api/auth/login";
pub const CURRENT_USER_PATH: &str = "/api/auth/user/me";
pub const STATUS_PATH: &str = "/api/auth/status";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const EXTERNAL_LOGIN_PATH: &str = "/api/auth/external-login";

// Authorization server endpoints (direct PKCE variant)
pub const AUTHORIZE_PATH: &str = "/oauth2/authorize";
pub const TOKEN_PATH: &str = "/oauth2/token";

// Local development defaults
pub const DEFAULT_AUTH_SERVER_URL: &str = "http://localhost:9090";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:9091";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const DEFAULT_CLIENT_ID: &str = "frontend-client";
pub const DEFAULT_CLIENT_SECRET: &str = "frontend-secret";
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "profile", "email"];
pub const DEFAULT_EXTERNAL_PROVIDER: &str = "google";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: u32 = 1;
pub const DEFAULT_HTTP_RETRY_BACKOFF_MS: u64 = 200;

// Routes
pub const CALLBACK_ROUTE: &str = "/callback";
pub const DEFAULT_LANDING_ROUTE: &str = "/dashboard";
pub const LOGIN_ROUTE: &str = "/login";

// Callback handler timing
pub const STATUS_CHECK_ATTEMPTS: u32 = 3;
pub const STATUS_CHECK_DELAY_MS: u64 = 1_000;
pub const SUCCESS_DISPLAY_MS: u64 = 2_000;

// Redirect query parameters
pub const PARAM_CODE: &str = "code";
pub const PARAM_STATE: &str = "state";
pub const PARAM_ERROR: &str = "error";
pub const PARAM_ERROR_DESCRIPTION: &str = "error_description";
pub const PARAM_LOGIN: &str = "login";

// User normalization
pub const DEFAULT_USER_NAME: &str = "User";
pub const PROVIDER_OAUTH2: &str = "oauth2";
pub const PROVIDER_BFF: &str = "bff";
pub const PROVIDER_LOCAL: &str = "local";

// Durable storage
pub const USER_CACHE_FILE: &str = "user.json";
pub const DEFAULT_LOGIN_FAILURE_MESSAGE: &str = "Login failed. Please try again.";
