use crate::error::*;
use crate::value::*;

pub const METADATA: &'static str = "@metadata";
pub const TAGS: &'static str = "tags";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    fields: Map,
    metadata: Map,
}

impl Event {
    pub fn new() -> Self {
        Self {
            fields: Map::new(),
            metadata: Map::new(),
        }
    }

    /// Builds event from a map of fields. The `@metadata` field, if present, must be a map and
    /// becomes the event metadata.
    pub fn from_map(mut fields: Map) -> Result<Self> {
        let metadata = match fields.shift_remove(METADATA) {
            Some(Value::Map(v)) => v,
            Some(v) => return Err(Error::new(ErrorId::InvalidEvent,
                format!("`{}` must be a Map but {:?} found", METADATA, v.kind()))),
            None => Map::new(),
        };
        Ok(Self {
            fields,
            metadata,
        })
    }

    /// Builds events from JSON text. Object root produces single event, array root produces
    /// an event per element. Blank text produces no events.
    pub fn from_json(json: &str) -> Result<Vec<Self>> {
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        match parse_json(json)? {
            Value::Map(v) => Ok(vec![Self::from_json_map(v)?]),
            Value::List(v) => {
                let mut r = Vec::with_capacity(v.len());
                for item in v {
                    match item {
                        Value::Map(v) => r.push(Self::from_json_map(v)?),
                        item => return Err(Error::new(ErrorId::Parse,
                            format!("incompatible inner json array object type={:?}", item.kind()))),
                    }
                }
                Ok(r)
            }
            v => Err(Error::new(ErrorId::Parse,
                format!("incompatible json object type={:?}", v.kind()))),
        }
    }

    fn from_json_map(fields: Map) -> Result<Self> {
        Self::from_map(fields).wrap_err_id(ErrorId::Parse)
    }

    pub fn fields(&self) -> &Map {
        &self.fields
    }

    pub fn metadata(&self) -> &Map {
        &self.metadata
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn tags(&self) -> Vec<&str> {
        match self.fields.get(TAGS) {
            Some(Value::List(v)) => v.iter().filter_map(|v| v.as_str().ok()).collect(),
            Some(Value::String(v)) => vec![v.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }

    /// Adds `tag` to the `tags` field unless it's already there. A scalar `tags` value is turned
    /// into a list.
    pub fn tag(&mut self, tag: &str) {
        let tags = self.fields.entry(TAGS.to_owned()).or_insert_with(|| Value::List(List::new()));
        match tags {
            Value::Null => *tags = Value::List(vec![tag.into()]),
            Value::List(v) => {
                if !v.iter().any(|t| t.as_str().ok() == Some(tag)) {
                    v.push(tag.into());
                }
            }
            v => {
                if v.as_str().ok() != Some(tag) {
                    let old = std::mem::replace(v, Value::Null);
                    *v = Value::List(vec![old, tag.into()]);
                }
            }
        }
    }

    /// User fields.
    pub fn to_map(&self) -> Map {
        self.fields.clone()
    }

    /// User fields plus the `@metadata` field when there's any metadata.
    pub fn to_map_with_metadata(&self) -> Map {
        let mut r = self.to_map();
        if !self.metadata.is_empty() {
            r.insert(METADATA.into(), Value::Map(self.metadata.clone()));
        }
        r
    }
}

pub type FromJsonFn = fn(&str) -> Result<Vec<Event>>;

/// Capability surface of the event type available to codecs.
pub trait EventFactory: 'static + Send + Sync {
    fn new_event(&self, fields: Map) -> Result<Event>;

    /// Direct construction of events from JSON text, if supported.
    fn from_json_fn(&self) -> Option<FromJsonFn> {
        None
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StdEventFactory;

impl EventFactory for StdEventFactory {
    fn new_event(&self, fields: Map) -> Result<Event> {
        Event::from_map(fields)
    }

    fn from_json_fn(&self) -> Option<FromJsonFn> {
        Some(Event::from_json)
    }
}

/// Factory that can only build events from maps.
#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyEventFactory;

impl EventFactory for LegacyEventFactory {
    fn new_event(&self, fields: Map) -> Result<Event> {
        Event::from_map(fields)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn event(v: Value) -> Event {
        Event::from_map(v.into_map().unwrap()).unwrap()
    }

    #[test]
    fn from_map_extracts_metadata() {
        let e = event(value!{{ "a" => 1, "@metadata" => { "m" => "x" } }});
        assert_eq!(Value::Map(e.to_map()), value!{{ "a" => 1 }});
        assert_eq!(Value::Map(e.metadata().clone()), value!{{ "m" => "x" }});
        assert_eq!(Value::Map(e.to_map_with_metadata()),
            value!{{ "a" => 1, "@metadata" => { "m" => "x" } }});
    }

    #[test]
    fn from_map_invalid_metadata() {
        let e = Event::from_map(value!{{ "@metadata" => 1 }}.into_map().unwrap()).unwrap_err();
        assert_eq!(*e.id(), ErrorId::InvalidEvent);
    }

    #[test]
    fn to_map_with_metadata_omits_empty() {
        let e = event(value!{{ "a" => 1 }});
        assert_eq!(e.to_map_with_metadata(), e.to_map());
    }

    mod from_json {
        use super::*;

        #[test]
        fn object() {
            let r = Event::from_json(r#"{"a":1,"b":"x"}"#).unwrap();
            assert_eq!(r, vec![event(value!{{ "a" => 1, "b" => "x" }})]);
        }

        #[test]
        fn array() {
            let r = Event::from_json(r#"[{"a":1},{"a":2}]"#).unwrap();
            assert_eq!(r, vec![event(value!{{ "a" => 1 }}), event(value!{{ "a" => 2 }})]);
        }

        #[test]
        fn blank() {
            assert!(Event::from_json("").unwrap().is_empty());
            assert!(Event::from_json(" \n").unwrap().is_empty());
        }

        #[test]
        fn syntax_error() {
            assert_eq!(*Event::from_json("not-json").unwrap_err().id(), ErrorId::Parse);
        }

        #[test]
        fn scalar_root() {
            let e = Event::from_json(r#""just-a-string""#).unwrap_err();
            assert_eq!(*e.id(), ErrorId::Parse);
            assert!(e.to_string().contains("incompatible json object type=String"));
        }

        #[test]
        fn scalar_array_item() {
            let e = Event::from_json(r#"[{"a":1}, 2]"#).unwrap_err();
            assert_eq!(*e.id(), ErrorId::Parse);
            assert!(e.to_string().contains("incompatible inner json array object type=Int"));
        }

        #[test]
        fn invalid_metadata() {
            let e = Event::from_json(r#"{"@metadata":[]}"#).unwrap_err();
            assert_eq!(*e.id(), ErrorId::Parse);
        }
    }

    mod tag {
        use super::*;

        #[test]
        fn new_field() {
            let mut e = Event::new();
            e.tag("t1");
            e.tag("t2");
            e.tag("t1");
            assert_eq!(e.get(TAGS), Some(&value!(["t1", "t2"])));
            assert!(e.has_tag("t2"));
            assert!(!e.has_tag("t3"));
        }

        #[test]
        fn scalar_field() {
            let mut e = Event::new();
            e.insert(TAGS, "old");
            assert_eq!(e.tags(), vec!["old"]);
            e.tag("old");
            assert_eq!(e.get(TAGS), Some(&Value::from("old")));
            e.tag("new");
            assert_eq!(e.get(TAGS), Some(&value!(["old", "new"])));
        }
    }

    #[test]
    fn factories() {
        assert!(StdEventFactory.from_json_fn().is_some());
        assert!(LegacyEventFactory.from_json_fn().is_none());
        let e = LegacyEventFactory.new_event(value!{{ "a" => 1 }}.into_map().unwrap()).unwrap();
        assert_eq!(e.get("a"), Some(&Value::Int(1)));
    }
}
