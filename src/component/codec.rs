pub mod json;

use std::sync::Arc;

use super::*;
use crate::error::*;
use crate::event::*;
use crate::value::*;

pub struct New {
    pub config: Spanned<Value>,
    pub events: Arc<dyn EventFactory>,
}

impl Default for New {
    fn default() -> Self {
        Self {
            config: value!{{}}.into(),
            events: Arc::new(StdEventFactory),
        }
    }
}

pub trait CodecProvider: Provider {
    fn new(&self, ctx: New) -> Result<Arc<dyn Codec>>;
}

pub trait Codec: 'static + Send + Sync {
    /// Decodes raw input bytes. Never fails: input that can't be decoded is reported
    /// through `out` as a fallback event or logged.
    fn decode(&self, data: &[u8], out: &mut dyn FnMut(Event));

    /// Same as `decode()` but for text that's already been charset-normalized.
    fn decode_text(&self, text: &str, out: &mut dyn FnMut(Event));

    /// Emits exactly one serialized unit for `event` through `out`.
    fn encode(&self, event: &Event, out: &mut dyn FnMut(&Event, String)) -> Result<()>;

    fn encode_as_string(&self, event: &Event) -> Result<String> {
        let mut r = String::new();
        self.encode(event, &mut |_, s| r = s)?;
        Ok(r)
    }

    fn decode_to_vec(&self, data: &[u8]) -> Vec<Event> {
        let mut r = Vec::new();
        self.decode(data, &mut |e| r.push(e));
        r
    }
}
