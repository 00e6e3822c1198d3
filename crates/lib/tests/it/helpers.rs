use std::collections::BTreeMap;

use patchlog::{
    Marshal, Patch, Result, Snapshot,
    snapshot::Path,
    tree::{Record, Tree},
};
use serde::{Deserialize, Serialize};

// ==========================
// DOMAIN FIXTURES
// ==========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub email_addresses: Vec<String>,
    pub phones: Vec<String>,
}

impl Marshal for Person {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Record::new("Person")
            .field("firstName", &self.first_name)?
            .field("lastName", &self.last_name)?
            .field("emailAddresses", &self.email_addresses)?
            .field("phones", &self.phones)?
            .into())
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        Ok(Person {
            first_name: tree.field_as("firstName")?,
            last_name: tree.field_as("lastName")?,
            email_addresses: tree.field_as("emailAddresses")?,
            phones: tree.field_as("phones")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub zip: i32,
}

impl Marshal for Address {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Record::new("Address")
            .field("streetAddress", &self.street_address)?
            .field("city", &self.city)?
            .field("zip", &self.zip)?
            .into())
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        Ok(Address {
            street_address: tree.field_as("streetAddress")?,
            city: tree.field_as("city")?,
            zip: tree.field_as("zip")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub position: i32,
    pub user_id: String,
    pub person: Person,
    pub addresses: Vec<Address>,
    pub relations: BTreeMap<String, Person>,
}

impl Marshal for UserDetail {
    fn to_tree(&self) -> Result<Tree> {
        Ok(Record::new("UserDetail")
            .field("position", &self.position)?
            .field("userId", &self.user_id)?
            .field("person", &self.person)?
            .field("addresses", &self.addresses)?
            .field("relations", &self.relations)?
            .into())
    }

    fn from_tree(tree: &Tree) -> Result<Self> {
        Ok(UserDetail {
            position: tree.field_as("position")?,
            user_id: tree.field_as("userId")?,
            person: tree.field_as("person")?,
            addresses: tree.field_as("addresses")?,
            relations: tree.field_as("relations")?,
        })
    }
}

pub fn person(first_name: &str, last_name: &str) -> Person {
    Person {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        ..Person::default()
    }
}

pub fn address(street_address: &str, city: &str, zip: i32) -> Address {
    Address {
        street_address: street_address.to_string(),
        city: city.to_string(),
        zip,
    }
}

/// Bob Smith with one address and a brother.
pub fn bob() -> UserDetail {
    let mut relations = BTreeMap::new();
    relations.insert("brother".to_string(), person("Tom", "Smith"));

    UserDetail {
        position: 1,
        user_id: "bob.smith".to_string(),
        person: person("Bob", "Smith"),
        addresses: vec![address("1 Main St", "Seattle", 123)],
        relations,
    }
}

// ==========================
// SNAPSHOT ASSERTIONS
// ==========================

pub fn path(text: &str) -> Path {
    text.parse().expect("Failed to parse path")
}

/// Renders a snapshot as sorted `(path, value)` text pairs.
pub fn encoded(snapshot: &Snapshot) -> Vec<(String, String)> {
    snapshot
        .iter()
        .map(|(path, value)| (path.to_string(), value.encode()))
        .collect()
}

pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = items
        .iter()
        .map(|(path, value)| (path.to_string(), value.to_string()))
        .collect();
    pairs.sort_by(|a, b| path(&a.0).cmp(&path(&b.0)));
    pairs
}

/// Textual paths of a patch's additions.
pub fn addition_paths(patch: &Patch) -> Vec<String> {
    patch.additions().keys().map(ToString::to_string).collect()
}

/// Textual paths of a patch's deletions.
pub fn deletion_paths(patch: &Patch) -> Vec<String> {
    patch.deletions().keys().map(ToString::to_string).collect()
}
