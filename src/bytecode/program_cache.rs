use std::{
    collections::HashMap,
    rc::{Rc, Weak},
};

use sha2::{Digest, Sha256};

use crate::bytecode::bytecode::Bytecode;

/// Compiled programs keyed by the SHA-256 of their source text.
///
/// Lives on a heap; loading the same source twice into any lambda of that
/// heap shares one [`Bytecode`]. Entries are weak: a program stays cached
/// only while some lambda still holds it, and dead entries are pruned on
/// insert.
#[derive(Debug, Default)]
pub struct ProgramCache {
    entries: HashMap<[u8; 32], Weak<Bytecode>>,
    hits: usize,
    misses: usize,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, source_hash: &[u8; 32]) -> Option<Rc<Bytecode>> {
        match self.entries.get(source_hash).and_then(Weak::upgrade) {
            Some(program) => {
                self.hits += 1;
                Some(program)
            }
            None => {
                self.entries.remove(source_hash);
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, source_hash: [u8; 32], program: &Rc<Bytecode>) {
        self.entries.retain(|_, entry| entry.strong_count() > 0);
        self.entries.insert(source_hash, Rc::downgrade(program));
    }

    /// Programs still held by at least one lambda.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries kept in the table, dead ones included until the next prune.
    pub fn slots(&self) -> usize {
        self.entries.len()
    }

    /// `(hits, misses)` since the cache was created.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

pub fn hash_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

pub fn to_hex(bytes: &[u8; 32]) -> String {
    let mut out = String::with_capacity(64);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
