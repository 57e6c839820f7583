use std::str::FromStr;
use crate::Error;

/// A registered request/response channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Test,
    AddItem,
    GetItems,
    DeleteItem,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Test => "db:test",
            Channel::AddItem => "db:add-item",
            Channel::GetItems => "db:get-items",
            Channel::DeleteItem => "db:delete-item",
        }
    }

    /// Every registered channel
    pub fn all() -> &'static [Channel] {
        &[
            Channel::Test,
            Channel::AddItem,
            Channel::GetItems,
            Channel::DeleteItem,
        ]
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownChannel(s.to_string()))
    }
}
