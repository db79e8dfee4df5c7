use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Untyped identity of a container binding.
#[derive(Clone, Eq)]
pub enum ServiceKey {
    /// Keyed by the Rust type of the stored service
    Type { id: TypeId, name: &'static str },
    /// Keyed by an explicit string
    Named(Cow<'static, str>),
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ServiceKey::Type { id: a, .. }, ServiceKey::Type { id: b, .. }) => a == b,
            (ServiceKey::Named(a), ServiceKey::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ServiceKey::Type { id, .. } => {
                0u8.hash(state);
                id.hash(state);
            }
            ServiceKey::Named(key) => {
                1u8.hash(state);
                key.hash(state);
            }
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKey::Type { name, .. } => write!(f, "type {}", name),
            ServiceKey::Named(key) => write!(f, "\"{}\"", key),
        }
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Typed handle used to bind and resolve a service of type `T`.
///
/// Two constructors exist: [`Token::of_type`] keys the binding by `T` itself,
/// [`Token::named`] / [`Token::from_static`] key it by an explicit string so
/// several values of the same type can live side by side.
pub struct Token<T> {
    key: ServiceKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Token<T> {
    pub fn of_type() -> Self {
        Self {
            key: ServiceKey::Type { id: TypeId::of::<T>(), name: type_name::<T>() },
            _marker: PhantomData,
        }
    }

    pub fn named(key: impl Into<String>) -> Self {
        Self { key: ServiceKey::Named(Cow::Owned(key.into())), _marker: PhantomData }
    }
}

impl<T> Token<T> {
    /// Usable in `const` items: `pub const CONFIG: Token<Config> = Token::from_static("CONFIG");`
    pub const fn from_static(key: &'static str) -> Self {
        Self { key: ServiceKey::Named(Cow::Borrowed(key)), _marker: PhantomData }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self { key: self.key.clone(), _marker: PhantomData }
    }
}

impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("key", &self.key)
            .field("value_type", &type_name::<T>())
            .finish()
    }
}

/// Explicit registration descriptor for services resolved by their own type.
///
/// Implementors pick the token the container uses for them; the default is
/// the type identity.
pub trait Service: Send + Sync + Sized + 'static {
    fn token() -> Token<Self> {
        Token::of_type()
    }
}
