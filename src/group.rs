//! Name-indexed container node.
//!
//! A group hashes child names into a fixed number of buckets with the sdbm
//! string hash. Each bucket is a chain kept in insertion order. The table
//! never grows, which is fine for hand-written configuration files but
//! degrades linearly when many names share a bucket.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::tree::{AccessError, Array, Kind, Node, Scalar};

pub const BUCKET_COUNT: usize = 16;

#[derive(Debug, Error)]
pub enum InsertError {
    #[error("duplicate name `{0}`")]
    Duplicate(String),

    #[error("could not allocate memory")]
    OutOfMemory(#[from] TryReserveError),
}

#[derive(Debug)]
struct Entry {
    name: String,
    node: Node,
}

#[derive(Debug, Default)]
pub struct Group {
    buckets: [Vec<Entry>; BUCKET_COUNT],
    len: usize,
}

/// sdbm: `hash = c + (hash << 6) + (hash << 16) - hash` over the bytes.
pub fn sdbm_hash(name: &str) -> u64 {
    name.bytes().fold(0u64, |hash, c| {
        u64::from(c)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash)
    })
}

fn bucket_of(name: &str) -> usize {
    (sdbm_hash(name) % BUCKET_COUNT as u64) as usize
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `node` under `name`.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) -> Result<(), InsertError> {
        let name = name.into();
        let chain = &mut self.buckets[bucket_of(&name)];
        if chain.iter().any(|entry| entry.name == name) {
            return Err(InsertError::Duplicate(name));
        }
        chain.try_reserve(1)?;
        chain.push(Entry { name, node });
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.buckets[bucket_of(name)]
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.node)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of direct entries.
    pub fn count(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries in bucket order, then chain order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|entry| (entry.name.as_str(), &entry.node))
    }

    fn lookup(&self, name: &str) -> Result<&Node, AccessError> {
        self.get(name)
            .ok_or_else(|| AccessError::NotFound(name.to_string()))
    }

    pub fn get_group(&self, name: &str) -> Result<&Group, AccessError> {
        match self.lookup(name)? {
            Node::Group(g) => Ok(g),
            other => Err(mismatch(Kind::Group, other)),
        }
    }

    pub fn get_array(&self, name: &str) -> Result<&Array, AccessError> {
        match self.lookup(name)? {
            Node::Array(a) => Ok(a),
            other => Err(mismatch(Kind::Array, other)),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i32, AccessError> {
        match self.lookup(name)? {
            Node::Scalar(Scalar::Integer(n)) => Ok(*n),
            other => Err(mismatch(Kind::Integer, other)),
        }
    }

    pub fn get_float(&self, name: &str) -> Result<f32, AccessError> {
        match self.lookup(name)? {
            Node::Scalar(Scalar::Float(n)) => Ok(*n),
            other => Err(mismatch(Kind::Float, other)),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, AccessError> {
        match self.lookup(name)? {
            Node::Scalar(Scalar::Boolean(b)) => Ok(*b),
            other => Err(mismatch(Kind::Boolean, other)),
        }
    }

    pub fn get_str(&self, name: &str) -> Result<&str, AccessError> {
        match self.lookup(name)? {
            Node::Scalar(Scalar::String(s)) => Ok(s),
            other => Err(mismatch(Kind::String, other)),
        }
    }

    /// Detach every child group onto `pending`, dropping the other entries.
    fn drain_groups_into(&mut self, pending: &mut Vec<Group>) {
        for chain in &mut self.buckets {
            for entry in chain.drain(..) {
                if let Node::Group(child) = entry.node {
                    pending.push(child);
                }
            }
        }
        self.len = 0;
    }
}

/// Teardown walks the tree with an explicit stack, so nesting depth never
/// reaches the call stack.
impl Drop for Group {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.drain_groups_into(&mut pending);
        while let Some(mut group) = pending.pop() {
            group.drain_groups_into(&mut pending);
        }
    }
}

/// Two groups are equal when they hold the same names with equal nodes,
/// regardless of insertion order.
impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if left.len != right.len {
                return false;
            }
            for (ours, theirs) in left.buckets.iter().zip(&right.buckets) {
                if ours.len() != theirs.len() {
                    return false;
                }
                for entry in ours {
                    let Some(matching) = theirs.iter().find(|e| e.name == entry.name) else {
                        return false;
                    };
                    match (&entry.node, &matching.node) {
                        (Node::Group(a), Node::Group(b)) => pending.push((a, b)),
                        (a, b) if a == b => {}
                        _ => return false,
                    }
                }
            }
        }
        true
    }
}

fn mismatch(expected: Kind, node: &Node) -> AccessError {
    AccessError::TypeMismatch {
        expected,
        found: node.kind(),
    }
}
