//! Wire models for the monday.com query collaborator.
//!
//! The transport layer (GraphQL execution, auth) lives outside this crate;
//! these types model the already-decoded `data` payloads it hands over.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnDef;

/// `data` object of a boards query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardsResponse {
    #[serde(default)]
    pub boards: Vec<Board>,
}

/// One board from a boards query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Column definitions; empty when the query did not request them
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    /// Items; empty when the query did not request them
    #[serde(default)]
    pub items: Vec<Item>,
}

/// One item (row) on a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Item id; numeric on the wire but delivered as a string
    pub id: String,
    /// Item display name
    pub name: String,
    #[serde(default)]
    pub column_values: Vec<ColumnValue>,
}

/// Raw cell payload for one (item, column) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnValue {
    /// Column id, resolved through the catalog
    pub id: String,
    /// JSON-encoded cell value; null when the cell is empty
    #[serde(default)]
    pub value: Option<String>,
    /// Human-rendered display text
    #[serde(default)]
    pub text: Option<String>,
}

/// `data` object of a users query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<User>,
}

/// One account user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// User id to display name lookup, used to resolve journal owners.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<i64, String>,
}

impl UserDirectory {
    /// Builds a directory from a list of users.
    #[must_use]
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            names: users.into_iter().map(|user| (user.id, user.name)).collect(),
        }
    }

    /// Builds a directory from a users query response.
    #[must_use]
    pub fn from_response(response: UsersResponse) -> Self {
        Self::new(response.users)
    }

    /// Display name for a user id.
    #[must_use]
    pub fn display_name(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Number of known users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true when no users are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
