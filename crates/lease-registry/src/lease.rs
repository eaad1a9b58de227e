// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Lease records and their client-visible properties.

use crate::LeaseError;
use buddy_pool::{block_len, ChunkId};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Identifier of a lease: `<size class, 2 hex digits>_<start, 16 hex digits>`.
///
/// `(size_class, start)` names exactly one chunk at any instant, and a chunk
/// backs at most one live lease, so identifiers never collide.
///
/// # Examples
/// ```
/// use lease_registry::LeaseId;
///
/// let id = LeaseId::new(8, 0x8000_0000);
/// assert_eq!(id.as_str(), "08_0000000080000000");
/// assert_eq!(id.decode(), Some((8, 0x8000_0000)));
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct LeaseId(String);

impl LeaseId {
    /// Encodes a chunk's size class and start address.
    pub fn new(size_class: u32, start: u64) -> Self {
        Self(format!("{size_class:02x}_{start:016x}"))
    }

    /// The textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recovers `(size_class, start)` from a well-formed identifier.
    pub fn decode(&self) -> Option<(u32, u64)> {
        let (class, start) = self.0.split_once('_')?;
        if class.len() != 2 || start.len() != 16 {
            return None;
        }
        Some((
            u32::from_str_radix(class, 16).ok()?,
            u64::from_str_radix(start, 16).ok()?,
        ))
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LeaseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LeaseId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A live lease: one allocated chunk plus its names.
#[derive(Debug, Clone)]
pub struct Lease {
    pub(crate) id: LeaseId,
    pub(crate) alias: Option<String>,
    pub(crate) chunk: ChunkId,
    pub(crate) start: u64,
    pub(crate) size_class: u32,
    pub(crate) persistent: bool,
}

impl Lease {
    /// Generated identifier.
    pub fn id(&self) -> &LeaseId {
        &self.id
    }

    /// Client-chosen alias, if any.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// First id of the leased range.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last id of the leased range (inclusive).
    pub fn end(&self) -> u64 {
        self.start + (self.size() - 1)
    }

    /// Number of ids in the range.
    pub fn size(&self) -> u64 {
        block_len(self.size_class)
    }

    /// Size class of the backing chunk.
    pub fn size_class(&self) -> u32 {
        self.size_class
    }

    /// Flag passed by the client at allocation time. Carried, not acted on.
    pub fn persistent(&self) -> bool {
        self.persistent
    }

    /// Reads one client-visible property.
    pub fn property(&self, property: LeaseProperty) -> PropertyValue {
        match property {
            LeaseProperty::Start => PropertyValue::U64(self.start()),
            LeaseProperty::End => PropertyValue::U64(self.end()),
            LeaseProperty::Size => PropertyValue::U64(self.size()),
            LeaseProperty::Id => PropertyValue::Str(self.id.to_string()),
            LeaseProperty::Alias => PropertyValue::Str(self.alias.clone().unwrap_or_default()),
        }
    }

    /// Snapshot of every property, for replies and listings.
    pub fn info(&self) -> LeaseInfo {
        LeaseInfo {
            id: self.id.clone(),
            alias: self.alias.clone().unwrap_or_default(),
            start: self.start(),
            end: self.end(),
            size: self.size(),
            persistent: self.persistent,
        }
    }
}

/// Serializable view of a lease.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LeaseInfo {
    pub id: LeaseId,
    /// Empty when the lease has no alias.
    pub alias: String,
    pub start: u64,
    pub end: u64,
    pub size: u64,
    pub persistent: bool,
}

/// Read-only properties exposed on every lease object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaseProperty {
    Start,
    End,
    Size,
    Id,
    Alias,
}

impl LeaseProperty {
    /// All properties, in display order.
    pub const ALL: [LeaseProperty; 5] = [
        LeaseProperty::Id,
        LeaseProperty::Alias,
        LeaseProperty::Start,
        LeaseProperty::End,
        LeaseProperty::Size,
    ];

    /// Wire name of the property.
    pub fn name(self) -> &'static str {
        match self {
            LeaseProperty::Start => "Start",
            LeaseProperty::End => "End",
            LeaseProperty::Size => "Size",
            LeaseProperty::Id => "ID",
            LeaseProperty::Alias => "Alias",
        }
    }
}

impl fmt::Display for LeaseProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LeaseProperty {
    type Err = LeaseError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(LeaseProperty::Start),
            "end" => Ok(LeaseProperty::End),
            "size" => Ok(LeaseProperty::Size),
            "id" => Ok(LeaseProperty::Id),
            "alias" => Ok(LeaseProperty::Alias),
            _ => Err(LeaseError::UnknownProperty(s.to_string())),
        }
    }
}

/// Value of a lease property.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    U64(u64),
    Str(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::U64(v) => write!(f, "{v}"),
            PropertyValue::Str(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lease(alias: Option<&str>) -> Lease {
        Lease {
            id: LeaseId::new(8, 0x8000_0080),
            alias: alias.map(str::to_string),
            chunk: buddy_pool::ChunkTree::new().add_root(0, 1),
            start: 0x8000_0080,
            size_class: 8,
            persistent: false,
        }
    }

    #[test]
    fn test_id_format() {
        assert_eq!(LeaseId::new(1, 0).as_str(), "01_0000000000000000");
        assert_eq!(LeaseId::new(28, 1 << 31).as_str(), "1c_0000000080000000");
        assert_eq!(LeaseId::new(28, 1 << 31).to_string().len(), 19);
    }

    #[test]
    fn test_id_decode_rejects_garbage() {
        assert_eq!(LeaseId("nope".into()).decode(), None);
        assert_eq!(LeaseId("1_0".into()).decode(), None);
        assert_eq!(LeaseId("zz_0000000000000000".into()).decode(), None);
    }

    #[test]
    fn test_range_properties() {
        let l = lease(None);
        assert_eq!(l.start(), 0x8000_0080);
        assert_eq!(l.size(), 128);
        assert_eq!(l.end(), 0x8000_00ff);
        assert_eq!(l.property(LeaseProperty::End), PropertyValue::U64(0x8000_00ff));
        assert_eq!(l.property(LeaseProperty::Alias), PropertyValue::Str(String::new()));
    }

    #[test]
    fn test_info_snapshot() {
        let info = lease(Some("web")).info();
        assert_eq!(info.alias, "web");
        assert_eq!(info.id.as_str(), "08_0000000080000080");
        assert_eq!(info.size, 128);
    }

    #[test]
    fn test_property_parse() {
        assert_eq!("Start".parse::<LeaseProperty>().unwrap(), LeaseProperty::Start);
        assert_eq!("ID".parse::<LeaseProperty>().unwrap(), LeaseProperty::Id);
        assert_eq!("alias".parse::<LeaseProperty>().unwrap(), LeaseProperty::Alias);
        assert!(matches!(
            "Owner".parse::<LeaseProperty>(),
            Err(LeaseError::UnknownProperty(_))
        ));
        for p in LeaseProperty::ALL {
            assert_eq!(p.name().parse::<LeaseProperty>().unwrap(), p);
        }
    }

    #[test]
    fn test_property_value_json() {
        let v = serde_json::to_string(&PropertyValue::U64(42)).unwrap();
        assert_eq!(v, "42");
        let s: PropertyValue = serde_json::from_str("\"web\"").unwrap();
        assert_eq!(s, PropertyValue::Str("web".into()));
    }
}
