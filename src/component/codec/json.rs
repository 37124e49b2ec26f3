//! JSON codec.
//!
//! Decodes a JSON object into a single event, or a JSON array of objects into an event per
//! element. Input that isn't valid JSON is never dropped: it becomes an event with the original
//! text in the `message` field, tagged with `_jsonparsefailure`.
//!
//! Encodes an event as a single JSON document terminated by a newline.
//!
//! Which decoding algorithm is used depends on what the event factory can do. When it can
//! build events from JSON text directly, that is used. Otherwise the text is parsed into a
//! generic value which is then turned into events here.

use backtrace::Backtrace;
use log::{error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::*;
use crate::charset::{Charset, DEFAULT_CHARSET};
use crate::component::{ComponentKind, Metadata, Provider as CProvider};

pub const NAME: &'static str = "json";

pub const PARSE_FAILURE_TAG: &'static str = "_jsonparsefailure";
pub const MESSAGE: &'static str = "message";

const CHARSET: &'static str = "charset";
const PRETTY: &'static str = "pretty";
const METADATA: &'static str = "metadata";

pub fn provider() -> Box<dyn CodecProvider> {
    Box::new(ProviderImpl)
}

struct ProviderImpl;

impl CProvider for ProviderImpl {
    fn metadata(&self) -> Metadata {
        Metadata {
            kind: ComponentKind::Codec,
            name: NAME,
        }
    }
}

impl CodecProvider for ProviderImpl {
    fn new(&self, ctx: New) -> Result<Arc<dyn Codec>> {
        let config = Config::parse(ctx.config)?;
        let parse: Box<dyn Parse> = match ctx.events.from_json_fn() {
            Some(from_json) => Box::new(FromJsonParse { from_json }),
            None => Box::new(LegacyParse { events: ctx.events }),
        };
        Ok(Arc::new(JsonCodec {
            config,
            parse,
        }))
    }
}

#[derive(Clone, Debug)]
struct Config {
    charset: Charset,
    pretty: bool,
    metadata: bool,
}

impl Config {
    pub fn parse(mut value: Spanned<Value>) -> Result<Config> {
        let charset = match value.remove_opt(CHARSET)? {
            Some(v) => Charset::new(v.as_str()?)
                .context("parsing `charset` option")?,
            None => Charset::new(DEFAULT_CHARSET)?,
        };
        let pretty = Self::parse_bool(&mut value, PRETTY)?;
        let metadata = Self::parse_bool(&mut value, METADATA)?;

        if let Some(key) = value.as_map()?.keys().next() {
            return Err(value.new_error(format!("unknown option `{}`", key)));
        }

        Ok(Config {
            charset,
            pretty,
            metadata,
        })
    }

    fn parse_bool(value: &mut Spanned<Value>, key: &str) -> Result<bool> {
        Ok(match value.remove_opt(key)? {
            Some(v) => *v.as_bool()?,
            None => false,
        })
    }
}

struct JsonCodec {
    config: Config,
    parse: Box<dyn Parse>,
}

impl Codec for JsonCodec {
    fn decode(&self, data: &[u8], out: &mut dyn FnMut(Event)) {
        self.decode_text(&self.config.charset.convert(data), out);
    }

    fn decode_text(&self, text: &str, out: &mut dyn FnMut(Event)) {
        self.parse.parse(text, out);
    }

    fn encode(&self, event: &Event, out: &mut dyn FnMut(&Event, String)) -> Result<()> {
        let map = if self.config.metadata {
            event.to_map_with_metadata()
        } else {
            event.to_map()
        };
        let mut s = to_json(&Value::Map(map), self.config.pretty)
            .context("encoding event as JSON")?;
        s.push('\n');
        out(event, s);
        Ok(())
    }
}

/// Decoding algorithm bound when the codec is created.
trait Parse: Send + Sync {
    fn parse(&self, json: &str, out: &mut dyn FnMut(Event));
}

/// Builds events straight from the text using the event factory's JSON constructor.
struct FromJsonParse {
    from_json: FromJsonFn,
}

impl Parse for FromJsonParse {
    fn parse(&self, json: &str, out: &mut dyn FnMut(Event)) {
        match (self.from_json)(json) {
            Ok(events) => events.into_iter().for_each(out),
            Err(e) => {
                error!("JSON parse error, original data now in message field: {}; data: {:?}",
                    e, json);
                out(parse_failure(json));
            }
        }
    }
}

/// Parses the text into a generic value first and builds events from it.
struct LegacyParse {
    events: Arc<dyn EventFactory>,
}

enum Parsed {
    Events(Vec<Event>),
    /// Valid JSON with a root that is neither array nor object.
    Unexpected(ValueKind),
}

impl LegacyParse {
    fn parse0(&self, json: &str) -> Result<Parsed> {
        Ok(match parse_json(json)? {
            Value::List(items) => {
                let mut events = Vec::with_capacity(items.len());
                for item in items {
                    let fields = match item {
                        Value::Map(v) => v,
                        v => return Err(Error::new(ErrorId::InvalidEvent,
                            format!("array item must be a Map but {:?} found", v.kind()))),
                    };
                    events.push(self.events.new_event(fields)?);
                }
                Parsed::Events(events)
            }
            Value::Map(fields) => Parsed::Events(vec![self.events.new_event(fields)?]),
            v => Parsed::Unexpected(v.kind()),
        })
    }
}

impl Parse for LegacyParse {
    fn parse(&self, json: &str, out: &mut dyn FnMut(Event)) {
        let r = match panic::catch_unwind(AssertUnwindSafe(|| self.parse0(json))) {
            Ok(r) => r,
            Err(payload) => {
                warn!("An unexpected error occurred parsing JSON data: class: panic, message: {}, \
                    data: {:?}, backtrace:\n{:?}",
                    panic_message(&*payload), json, Backtrace::new());
                return;
            }
        };
        match r {
            Ok(Parsed::Events(events)) => events.into_iter().for_each(out),
            Ok(Parsed::Unexpected(kind)) => {
                error!("JSON codec is expecting array or object/map but {:?} found; data: {:?}",
                    kind, json);
                out(parse_failure(json));
            }
            Err(ref e) if *e.id() == ErrorId::Parse => {
                info!("JSON parse failure. Falling back to plain-text: {}; data: {:?}", e, json);
                out(parse_failure(json));
            }
            Err(e) => {
                warn!("An unexpected error occurred parsing JSON data: class: {}, message: {}, \
                    data: {:?}, backtrace:\n{}",
                    e.class_name(), e, json, e.backtrace());
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// Event carrying the undecodable text as is.
fn parse_failure(json: &str) -> Event {
    let mut event = Event::new();
    event.insert(MESSAGE, json);
    event.tag(PARSE_FAILURE_TAG);
    event
}
