use backtrace::Backtrace;
use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;

pub trait Object: 'static + Any + fmt::Debug + fmt::Display + Send {
    /// Rust type name of the concrete object.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: 'static + Any + fmt::Debug + fmt::Display + Send> Object for T {}

/// Generic chained error type.
///
/// Consists of:
/// - Error ID - a lightweight type, likely a `Copy`able and `Eq`able enum, that can be used to
///   easily match the error kind.
/// - Optional details. This object provides context to the error and is written next
///   to the id when error is displayed.
/// - Optional cause. This object is assumed to be the logical cause of this error. Written below
///   the the error ID + details when error is displayed.
/// - Backtrace of the location where error was first created. Shown only when debug format is
///   requested.
/// - Arbitrary context stack. When error is propagated upwards different layers can push
///   context messages onto the context stack. This allows additional information to be stored
///   with the message for even better of understanding of the error reason and context.
pub struct Error<T>(Box<Inner<T>>);

impl<T> Error<T> {
    pub fn new(id: impl Into<T>, details: impl Object) -> Self {
        Self::new0(Inner::new(id, details))
    }

    pub fn without_details(id: impl Into<T>) -> Self {
        Self::new0(Inner::without_details(id))
    }

    pub fn with_cause(self, cause: impl Object) -> Self {
        Self::new0(self.0.with_cause(cause))
    }

    pub fn with_context(self, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new0(self.0.with_context(message))
    }

    pub fn id(&self) -> &T {
        &self.0.id
    }

    pub fn details(&self) -> Option<&dyn Object> {
        self.0.details.as_ref().map(|v| v.as_ref())
    }

    pub fn cause(&self) -> Option<&dyn Object> {
        self.0.cause.as_ref().map(|v| v.as_ref())
    }

    /// Best description of where the error came from: type name of the cause if there's one,
    /// otherwise the error ID.
    pub fn class_name(&self) -> String
        where T: fmt::Debug
    {
        match self.cause() {
            Some(cause) => cause.type_name().into(),
            None => format!("{:?}", self.0.id),
        }
    }

    /// Resolved backtrace of the location where the error was created.
    pub fn backtrace(&self) -> String {
        let mut bt = self.0.backtrace.borrow_mut();
        bt.resolve();
        format!("{:?}", bt)
    }

    fn new0(inner: Inner<T>) -> Self {
        Self(Box::new(inner))
    }
}

impl<T: fmt::Debug + fmt::Display> fmt::Debug for Error<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<T: fmt::Debug + fmt::Display> fmt::Display for Error<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

struct Inner<T> {
    id: T,
    details: Option<Box<dyn Object>>,
    cause: Option<Box<dyn Object>>,
    backtrace: RefCell<Backtrace>,
    context: Option<Context>,
}

impl<T> Inner<T> {
    pub fn new(id: impl Into<T>, details: impl Object) -> Self {
        Self::new0(id, Some(Box::new(details)), None)
    }

    pub fn without_details(id: impl Into<T>) -> Self {
        Self::new0(id, None, None)
    }

    pub fn with_cause(mut self, cause: impl Object) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_context(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        let new_ctx = Context {
            message: message.into(),
            next: None,
        };
        if self.context.is_some() {
            let mut ctx = self.context.as_mut();
            while let Some(m) = ctx {
                if m.next.is_none() {
                    m.next = Some(Box::new(new_ctx));
                    break;
                }
                ctx = m.next.as_mut().map(|v| v.as_mut());
            }
        } else {
            self.context = Some(new_ctx);
        }
        self
    }

    fn new0(id: impl Into<T>, details: Option<Box<dyn Object>>,
            cause: Option<Box<dyn Object>>) -> Self {
        Self {
            id: id.into(),
            details,
            cause,
            backtrace: RefCell::new(Backtrace::new_unresolved()),
            context: None,
        }
    }

    fn print_backtrace(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut bt = self.backtrace.borrow_mut();
        bt.resolve();
        write!(f, "{:?}", bt)
    }
}

impl<T: fmt::Debug + fmt::Display> fmt::Debug for Inner<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)?;
        writeln!(f)?;
        self.print_backtrace(f)
    }
}

impl<T: fmt::Debug + fmt::Display> fmt::Display for Inner<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if let Some(details) = self.details.as_ref() {
            write!(f, ": {}", details)?;
        }
        write!(f, " ({:?})", self.id)?;

        if let Some(cause) = self.cause.as_ref() {
            writeln!(f)?;
            write!(f, "   => caused by: {}", cause)?;
        }

        let mut ctx = self.context.as_ref();
        while let Some(c) = ctx {
            writeln!(f)?;
            write!(f, "   ...while {}", c.message)?;
            ctx = c.next.as_ref().map(|v| v.as_ref());
        }

        Ok(())
    }
}

struct Context {
    message: Cow<'static, str>,
    next: Option<Box<Self>>,
}

pub trait ErrorExt: Object {
    fn wrap_id<IdIn, IdOut>(self, id: IdIn) -> Error<IdOut>
        where IdOut: fmt::Debug + fmt::Display,
              IdIn: Into<IdOut>,
              Self: Sized,
    {
         Error::without_details(id).with_cause(self)
    }
}

impl<T: Object> ErrorExt for T {}

pub trait ResultExt<T, E> {
    fn wrap_err_id<IdIn, IdOut>(self, id: IdIn) -> Result<T, Error<IdOut>>
        where IdOut: fmt::Debug + fmt::Display,
              IdIn: Into<IdOut>;
}

impl<T, E: Object> ResultExt<T, E> for Result<T, E> {
    fn wrap_err_id<IdIn, IdOut>(self, id: IdIn) -> Result<T, Error<IdOut>>
        where IdOut: fmt::Debug + fmt::Display,
              IdIn: Into<IdOut>,
    {
        self.map_err(move |cause| cause.wrap_id(id))
    }
}

pub trait ResultErrorExt<T> {
    fn context(self, msg: impl Into<Cow<'static, str>>) -> Self
            where Self: Sized
    {
        self.context_with(|_| msg)
    }

    fn context_with<R, F>(self, f: F) -> Self
    where
        Self: Sized,
        F: FnOnce(&Error<T>) -> R,
        R: Into<Cow<'static, str>>;
}

impl<T, Id> ResultErrorExt<Id> for Result<T, Error<Id>> {
    fn context_with<R, F>(self, f: F) -> Self
    where
        F: FnOnce(&Error<Id>) -> R,
        R: Into<Cow<'static, str>>
    {
        self.map_err(|e| {
            let msg = f(&e);
            e.with_context(msg)
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorId;

    #[test]
    fn display_chain() {
        let e: Error<ErrorId> = Error::new(ErrorId::Parse, "bad input")
            .with_cause("unexpected `}`")
            .with_context("reading config")
            .with_context("starting codec");
        assert_eq!(e.to_string(), "Parse error: bad input (Parse)\n   \
            => caused by: unexpected `}`\n   \
            ...while reading config\n   \
            ...while starting codec");
    }

    #[test]
    fn wrap_result() {
        let r: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let e = r.wrap_err_id::<_, ErrorId>(ErrorId::Io)
            .context("reading stdin")
            .unwrap_err();
        assert_eq!(*e.id(), ErrorId::Io);
        assert!(e.details().is_none());
        assert_eq!(e.cause().unwrap().to_string(), "boom");
        assert!(e.class_name().starts_with("std::io::"));
        assert!(e.to_string().ends_with("...while reading stdin"));
    }

    #[test]
    fn class_name_without_cause() {
        let e: Error<ErrorId> = Error::new(ErrorId::InvalidEvent, "not a map");
        assert_eq!(e.class_name(), "InvalidEvent");
    }
}
