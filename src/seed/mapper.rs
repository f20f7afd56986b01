use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::foundation::error::{FractimeError, FractimeResult};
use crate::seed::resolver::LocalTime;

/// Julia-set constant used when no seed is available.
///
/// Keeps the pipeline rendering something stable and recognizable whenever
/// the time source is down.
pub const FALLBACK_PARAMS: FractalParameters = FractalParameters {
    real: 0.355,
    imaginary: 0.355,
};

/// The Julia-set constant `c = real + imaginary*i`.
///
/// Always drawn from the curated table (or the fixed fallback), so it stays
/// inside the bounded region where most starting points escape within the
/// iteration budget.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FractalParameters {
    /// Real component of the constant.
    pub real: f64,
    /// Imaginary component of the constant.
    pub imaginary: f64,
}

#[derive(Debug, Deserialize)]
struct TableEntry {
    a: f64,
    b: f64,
}

/// Curated table of Julia constants known to produce visually stable sets.
///
/// External static configuration: a JSON array of `{a, b}` pairs, loaded once
/// at startup and read-only afterwards. The built-in table ships as
/// `config/sets.json`.
#[derive(Clone, Debug)]
pub struct ConstantTable {
    entries: Vec<FractalParameters>,
}

const BUILTIN_TABLE_JSON: &str = include_str!("../../config/sets.json");

impl ConstantTable {
    /// Parse a table from its JSON configuration form.
    pub fn from_json_str(json: &str) -> FractimeResult<Self> {
        let raw: Vec<TableEntry> =
            serde_json::from_str(json).map_err(|e| FractimeError::serde(e.to_string()))?;
        if raw.is_empty() {
            return Err(FractimeError::validation("constant table must be non-empty"));
        }
        Ok(Self {
            entries: raw
                .into_iter()
                .map(|e| FractalParameters {
                    real: e.a,
                    imaginary: e.b,
                })
                .collect(),
        })
    }

    /// Load the table embedded at compile time from `config/sets.json`.
    pub fn builtin() -> FractimeResult<Self> {
        Self::from_json_str(BUILTIN_TABLE_JSON)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no entries (never, post-construction).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<FractalParameters> {
        self.entries.get(index).copied()
    }
}

/// Deterministically maps a time seed onto a curated Julia constant.
///
/// Identical seed always produces the identical `(a, b)`; a missing seed maps
/// to [`FALLBACK_PARAMS`].
#[derive(Clone, Debug)]
pub struct ParameterMapper {
    table: ConstantTable,
}

impl ParameterMapper {
    /// Build a mapper over a constant table.
    pub fn new(table: ConstantTable) -> Self {
        Self { table }
    }

    /// Build a mapper over the built-in table.
    pub fn builtin() -> FractimeResult<Self> {
        Ok(Self::new(ConstantTable::builtin()?))
    }

    /// Map a seed to fractal parameters.
    ///
    /// Two independent SHA-256 digests are taken over `date_time` and
    /// `date_time_second`, interpreted as 256-bit big-endian integers,
    /// combined with XOR, and reduced modulo the table length. XOR is the
    /// canonical combinator: unlike AND it preserves the uniformity of the
    /// digests, so every table entry is reachable with equal weight.
    pub fn map(&self, seed: Option<&LocalTime>) -> FractalParameters {
        let Some(seed) = seed else {
            return FALLBACK_PARAMS;
        };
        let h1 = sha256(&format!("{}_{}", seed.date, seed.time));
        let h2 = sha256(&format!("{}_{}_second", seed.date, seed.time));
        let index = xor_mod(&h1, &h2, self.table.len());
        // index < len by construction of xor_mod.
        self.table.get(index).unwrap_or(FALLBACK_PARAMS)
    }

    /// The table this mapper draws from.
    pub fn table(&self) -> &ConstantTable {
        &self.table
    }
}

fn sha256(input: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher.finalize().into()
}

/// `(h1 XOR h2) mod n` over 256-bit big-endian integers, without a bignum
/// dependency: fold bytes most-significant first, reducing as we go.
fn xor_mod(h1: &[u8; 32], h2: &[u8; 32], n: usize) -> usize {
    debug_assert!(n > 0);
    let n = n as u128;
    let mut acc: u128 = 0;
    for (a, b) in h1.iter().zip(h2.iter()) {
        acc = ((acc << 8) | u128::from(a ^ b)) % n;
    }
    acc as usize
}

#[cfg(test)]
#[path = "../../tests/unit/seed/mapper.rs"]
mod tests;
