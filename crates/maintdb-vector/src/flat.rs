//! Exact inner-product index over dense `f32` rows.
//!
//! On-disk layout (little-endian):
//! `b"MXFLATIP"` | version `u32` | dim `u32` | count `u64` | `count * dim` `f32`
use anyhow::anyhow;

use maintdb_core::{Error, Result};

const MAGIC: &[u8; 8] = b"MXFLATIP";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 8 + 4 + 4 + 8;

#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self { dim, data: Vec::new() }
    }

    pub fn with_capacity(dim: usize, rows: usize) -> Self {
        Self { dim, data: Vec::with_capacity(dim * rows) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends one row; it becomes position `len() - 1`.
    pub fn add(&mut self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::Embedding(anyhow!(
                "vector has {} dimensions, index expects {}",
                vector.len(),
                self.dim
            )));
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    pub fn row(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dim)?;
        let end = start.checked_add(self.dim)?;
        self.data.get(start..end)
    }

    /// Top `k` `(position, score)` pairs by descending inner product. Equal
    /// scores keep the lower position first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(Error::Embedding(anyhow!(
                "query has {} dimensions, index expects {}",
                query.len(),
                self.dim
            )));
        }
        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(pos, row)| (pos, row.iter().zip(query).map(|(a, b)| a * b).sum()))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&(self.dim as u32).to_le_bytes());
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for value in &self.data {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[..8] != MAGIC {
            return Err(Error::CorruptIndex("vector index header is missing or invalid".to_string()));
        }
        let version = u32::from_le_bytes(le_array(&bytes[8..12]));
        if version != VERSION {
            return Err(Error::CorruptIndex(format!("unsupported vector index version {version}")));
        }
        let dim = u32::from_le_bytes(le_array(&bytes[12..16])) as usize;
        let count = u64::from_le_bytes(le_array(&bytes[16..24])) as usize;

        let body = &bytes[HEADER_LEN..];
        let expected = count.checked_mul(dim).and_then(|n| n.checked_mul(4));
        if expected != Some(body.len()) {
            return Err(Error::CorruptIndex(format!(
                "vector index holds {} bytes of rows, header declares {count} x {dim}",
                body.len()
            )));
        }
        let data = body
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes(le_array(b)))
            .collect();
        Ok(Self { dim, data })
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
