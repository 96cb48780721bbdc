mod client;
pub mod envelope;
mod notify;
mod token;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    ApiClient, ApiRequest, ClientOptions, DEFAULT_BASE_PATH, DEFAULT_TIMEOUT, UPLOAD_TIMEOUT,
};
pub(crate) use notify::recover_lock;
pub use notify::{Notifier, Toast, ToastCenter, ToastLevel, TracingNotifier};
pub use token::{SettingsTokenSource, StaticToken, TokenSource};
pub use transport::{
    Method, MultipartBody, PreparedRequest, ProgressFn, RawResponse, RequestBody,
    ReqwestTransport, Transport, TransportError,
};
