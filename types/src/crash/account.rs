use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DEMO_ACCOUNT, REAL_ACCOUNT};

/// Name of a balance held by the ledger (`demo`, `real`, ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn demo() -> Self {
        Self::new(DEMO_ACCOUNT)
    }

    pub fn real() -> Self {
        Self::new(REAL_ACCOUNT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_demo(&self) -> bool {
        self.0 == DEMO_ACCOUNT
    }
}

impl Borrow<str> for AccountId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
