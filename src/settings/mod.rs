pub mod endpoint;
pub mod token;

pub use endpoint::{
    get_api_origin, get_request_timeout, set_api_origin, set_request_timeout, DEFAULT_API_ORIGIN,
    MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS,
};
pub use token::{clear_token, get_token, set_token, TOKEN_KEY};
