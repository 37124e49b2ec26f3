#![deny(non_snake_case)]

#[macro_use]
mod macros;

pub mod charset;
pub mod component;
pub mod error;
pub mod event;
pub mod util;
pub mod value;

pub use component::codec::{Codec, CodecProvider, New};
pub use component::registry;
pub use error::{Error, ErrorId, Result};
pub use event::{Event, EventFactory, LegacyEventFactory, StdEventFactory};
pub use value::{Map, Spanned, Value};
