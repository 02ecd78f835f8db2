//! Pure string and header transformations used by the enhancers.
//!
//! Nothing in here performs I/O; every function is a plain transformation
//! of its input.

mod headers;
mod html;
mod label;
mod url;

pub use self::headers::{
    ContentDisposition, content_disposition, content_length, content_type, is_html, is_structured,
    is_text,
};
pub use self::html::meta_refresh_target;
pub use self::label::normalize_label;
pub use self::url::strip_tracking_params;
