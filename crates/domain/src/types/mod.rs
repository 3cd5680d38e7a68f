//! Domain types and models

pub mod api;
pub mod params;
pub mod request;
pub mod session;
pub mod user;

pub use api::{
    Credentials, ExternalLoginRequest, ExternalLoginResponse, PasswordLoginResponse,
    StatusResponse,
};
pub use params::{CallbackParams, LandingOutcome, LandingParams, LoginSignal};
pub use request::{HttpMethod, OutgoingRequest, TransportResponse};
pub use session::{AuthMode, AuthSession, CallbackResolution, LogoutPolicy, PendingAuthorization};
pub use user::{LoginMethod, UserInfo, UserInfoEnvelope, UserRecord};
