//! I/O boundary of the traversal pipeline.
//!
//! Network access goes through [`Transport`], content output through
//! [`ByteSink`]. Everything the enhancers do on top of these is expressed
//! against the traits so tests can swap in [`MockTransport`].

mod body;
mod http;
mod mock;
mod sink;

pub use self::body::{BoxStream, ByteStream, ResponseBody};
pub use self::http::{HttpResponse, Transport};
pub use self::mock::{MockResponse, MockTransport};
pub use self::sink::{ByteSink, FileSink};

#[cfg(feature = "reqwest")]
pub use self::http::ReqwestTransport;
