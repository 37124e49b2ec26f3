pub mod codec;

use lazy_static::lazy_static;
use std::collections::HashMap;

use codec::CodecProvider;

pub trait Provider: Send + Sync {
    fn metadata(&self) -> Metadata;
}

#[derive(Clone, Debug)]
pub struct Metadata {
    pub name: &'static str,
    pub kind: ComponentKind,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ComponentKind {
    Codec,
}

enum TypedProvider {
    Codec(Box<dyn CodecProvider>),
}

impl TypedProvider {
    pub fn as_codec(&self) -> Option<&Box<dyn CodecProvider>> {
        match self {
            TypedProvider::Codec(v) => Some(v),
        }
    }
}

pub struct Registry {
    components: HashMap<(ComponentKind, String), TypedProvider>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    pub fn codec<'a>(&'a self, name: &str) -> Option<&'a dyn CodecProvider> {
        self.components.get(&(ComponentKind::Codec, name.to_string()))
            .and_then(|v| v.as_codec())
            .map(|v| v.as_ref())
    }

    pub fn register_codec(&mut self, provider: Box<dyn CodecProvider>) {
        self.components.insert((ComponentKind::Codec, provider.metadata().name.into()),
            TypedProvider::Codec(provider));
    }
}

lazy_static! {
    static ref REGISTRY: Registry = {
        let mut r = Registry::new();

        r.register_codec(codec::json::provider());

        r
    };
}

pub fn registry() -> &'static Registry {
    &*REGISTRY
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup() {
        let p = registry().codec(codec::json::NAME).unwrap();
        assert_eq!(p.metadata().name, "json");
        assert_eq!(p.metadata().kind, ComponentKind::Codec);
        assert!(registry().codec("nope").is_none());
    }
}
