use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::wire::RouteLeg;

/// Routes sharing a transfer count, keyed as the backend keyed them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferGroup {
    pub transfers: String,
    pub legs: Vec<RouteLeg>,
}

impl TransferGroup {
    pub fn new(transfers: impl Into<String>, legs: Vec<RouteLeg>) -> Self {
        Self {
            transfers: transfers.into(),
            legs,
        }
    }

    /// Numeric transfer count when the key is an integer.
    pub fn transfer_count(&self) -> Option<u32> {
        self.transfers.trim().parse().ok()
    }
}

/// The `routes` object of a routes response.
///
/// Ordering contract: groups keep the key order of the JSON object, which is
/// also the order they render in. `null` decodes as no groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransferGroups(pub Vec<TransferGroup>);

impl TransferGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: TransferGroup) {
        self.0.push(group);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransferGroup> {
        self.0.iter()
    }

    /// Total number of itineraries across groups.
    pub fn leg_count(&self) -> usize {
        self.0.iter().map(|g| g.legs.len()).sum()
    }
}

impl<'a> IntoIterator for &'a TransferGroups {
    type Item = &'a TransferGroup;
    type IntoIter = std::slice::Iter<'a, TransferGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for TransferGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in &self.0 {
            map.serialize_entry(&group.transfers, &group.legs)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TransferGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(GroupsVisitor)
    }
}

struct GroupsVisitor;

impl<'de> Visitor<'de> for GroupsVisitor {
    type Value = TransferGroups;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping transfer counts to route lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut groups = TransferGroups(Vec::with_capacity(access.size_hint().unwrap_or(0)));
        while let Some((key, legs)) = access.next_entry::<String, Vec<RouteLeg>>()? {
            groups.push(TransferGroup::new(key, legs));
        }
        Ok(groups)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(TransferGroups::new())
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(TransferGroups::new())
    }
}
