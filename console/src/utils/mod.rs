pub mod url_validation;
pub use url_validation::{UrlValidationError, validate_http_url, validate_livekit_url};
pub mod validation;
pub use validation::{is_valid_email, normalize_phone_number, validate_phone_number};
