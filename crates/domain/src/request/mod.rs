//! Outbound request description.

mod body;
mod method;
mod spec;

pub use body::{FormPart, FormValue, RequestBody};
pub use method::HttpMethod;
pub use spec::{ApiRequest, AUTHORIZATION, LOGIN_PATH, REFRESH_PATH, REGISTER_PATH};
