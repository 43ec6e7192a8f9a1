use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DBParseError {
    #[error("missing sigil '{0}'")]
    MissingSigil(&'static str),
    #[error(transparent)]
    ParseIntError(#[from] std::num::ParseIntError),
}

fn db_parse(sigil: &'static str, s: &str) -> Result<usize, DBParseError> {
    let Some(digits) = s.strip_prefix(sigil) else {
        return Err(DBParseError::MissingSigil(sigil));
    };
    Ok(digits.parse()?)
}

/// A de Bruijn level: the number of binders between the outermost scope and
/// the binder, counting inward. Levels name variables stably while the
/// binding depth changes, which indices cannot do.
#[derive(Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Level(usize);

impl Level {
    pub fn new(x: usize) -> Level {
        Level(x)
    }

    /// Convert to the index that refers to this level from `depth`.
    ///
    /// # Panics
    ///
    /// If the level is not bound at `depth`. A level escaping its binder means
    /// a placeholder was read back outside the scope that created it.
    pub fn to_index(self, depth: usize) -> Index {
        assert!(
            self.0 < depth,
            "level {self} escapes its binder at depth {depth}"
        );
        Index(depth - self.0 - 1)
    }

    pub fn to_usize(self) -> usize {
        self.0
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl FromStr for Level {
    type Err = DBParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        db_parse("%", s).map(Level)
    }
}

impl From<usize> for Level {
    fn from(x: usize) -> Level {
        Level(x)
    }
}

impl From<Level> for usize {
    fn from(level: Level) -> usize {
        level.0
    }
}

/// A variable that is free in the whole term: `!0` is the first variable past
/// the outermost binder, `!1` the next, and so on.
#[derive(Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct NegativeLevel(usize);

impl NegativeLevel {
    pub fn new(x: usize) -> NegativeLevel {
        NegativeLevel(x)
    }

    pub fn to_index(self, depth: usize) -> Index {
        Index(depth + self.0)
    }
}

impl Display for NegativeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.0)
    }
}

impl FromStr for NegativeLevel {
    type Err = DBParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        db_parse("!", s).map(NegativeLevel)
    }
}

impl From<usize> for NegativeLevel {
    fn from(x: usize) -> NegativeLevel {
        NegativeLevel(x)
    }
}

/// A de Bruijn index: the number of binders between a variable occurrence
/// and its binder, counting outward.
#[derive(Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Index(pub usize);

impl Index {
    pub fn new(x: usize) -> Index {
        Index(x)
    }

    pub fn to_level(self, depth: usize) -> Level {
        Level(depth - self.0 - 1)
    }

    pub fn to_negative_level(self, depth: usize) -> NegativeLevel {
        NegativeLevel(self.0 - depth)
    }

    pub fn raise(self, amount: usize) -> Index {
        Index(self.0 + amount)
    }

    pub fn is_bound(self, depth: usize) -> bool {
        self.0 < depth
    }

    pub fn to_usize(self) -> usize {
        self.0
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl FromStr for Index {
    type Err = DBParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        db_parse("$", s).map(Index)
    }
}

impl From<usize> for Index {
    fn from(x: usize) -> Index {
        Index(x)
    }
}

impl From<Index> for usize {
    fn from(index: Index) -> usize {
        index.0
    }
}

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UniverseLevel(pub usize);

impl UniverseLevel {
    pub fn new(x: usize) -> UniverseLevel {
        UniverseLevel(x)
    }
}

impl Display for UniverseLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UniverseLevel {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(UniverseLevel)
    }
}
