use std::fmt;

/// Binary entry id of a mail store, as handed out by the host's store API.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreId(Vec<u8>);

impl StoreId {
    #[allow(missing_docs)]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a hexadecimal token. Both upper and lower case digits are accepted.
    pub fn from_hex(token: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(token).map(Self)
    }

    #[allow(missing_docs)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lower case hexadecimal form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Selects which store's settings trees are read and written.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Scope {
    /// The requesting user's own store.
    #[default]
    Default,
    /// A specific, successfully opened store.
    Store(StoreId),
}

impl Scope {
    #[allow(missing_docs)]
    pub fn is_default(&self) -> bool {
        matches!(self, Scope::Default)
    }

    /// The store id for [`Scope::Store`].
    pub fn store_id(&self) -> Option<&StoreId> {
        match self {
            Scope::Default => None,
            Scope::Store(id) => Some(id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Default => write!(f, "default store"),
            Scope::Store(id) => write!(f, "store {id}"),
        }
    }
}
