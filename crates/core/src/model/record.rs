//! The lowest-level datum read from a trace: a single traced function call.

/// A single traced function call, immutable after load.
///
/// `func_id` indexes into a [`FuncTable`]; `call_depth` is `0` for a
/// top-level user call and increases for nested calls; `args` holds the
/// textual arguments recorded for the call (their meaning depends on
/// `func_id`, see [`crate::matcher`] and [`crate::model::accepted`]).
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub func_id: u32,
    pub call_depth: u8,
    pub args: Vec<String>,
}

impl Record {
    #[must_use]
    pub const fn new(func_id: u32, call_depth: u8, args: Vec<String>) -> Self {
        Self {
            func_id,
            call_depth,
            args,
        }
    }

    #[must_use]
    pub fn arg_count(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let count = self.args.len() as u8;
        count
    }

    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// Maps function ids (the position of a name in `recorder.mt`'s
/// newline-separated function list) to function names.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Default)]
pub struct FuncTable {
    names: Vec<String>,
}

impl FuncTable {
    #[must_use]
    pub const fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    #[must_use]
    pub fn name(&self, func_id: u32) -> Option<&str> {
        self.names.get(func_id as usize).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Per-rank dense record arrays, as exposed by the trace reader.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Default)]
pub struct PerRankRecords {
    pub ranks: Vec<Vec<Record>>,
}

impl PerRankRecords {
    #[must_use]
    pub const fn new(ranks: Vec<Vec<Record>>) -> Self {
        Self { ranks }
    }

    #[must_use]
    pub fn nprocs(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let n = self.ranks.len() as u32;
        n
    }

    #[must_use]
    pub fn num_records(&self, rank: u32) -> usize {
        self.ranks.get(rank as usize).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_arg_count() {
        let r = Record::new(3, 0, vec!["a".into(), "b".into()]);
        assert_eq!(r.arg_count(), 2);
        assert_eq!(r.arg(0), Some("a"));
        assert_eq!(r.arg(2), None);
    }

    #[test]
    fn test_func_table() {
        let table = FuncTable::new(vec!["MPI_Send".into(), "open".into()]);
        assert_eq!(table.name(0), Some("MPI_Send"));
        assert_eq!(table.name(1), Some("open"));
        assert_eq!(table.name(2), None);
        assert_eq!(table.len(), 2);
    }
}
