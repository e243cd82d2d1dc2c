//! Call chains: the sequence of enclosing user calls a violating
//! record sits under, walked back through `call_depth`.
//!
//! `Full` keeps every record down to the root; `Partial` keeps only the
//! first record seen at each distinct `call_depth`, de-duplicating
//! repeated frames at the same nesting level (loops, retries).

use hashbrown::HashSet;

use crate::model::record::{FuncTable, PerRankRecords};

#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallChain {
    Full(Vec<String>),
    Partial(Vec<String>),
}

impl CallChain {
    #[must_use]
    pub fn funcs(&self) -> &[String] {
        match self {
            Self::Full(v) | Self::Partial(v) => v,
        }
    }

    /// `"a-->b-->c"`, innermost call last, matching the reference's
    /// `build_call_chain_str`.
    #[must_use]
    pub fn join(&self) -> String {
        self.funcs().join("-->")
    }
}

/// Walks rank `rank`'s record stream backward from `seq_id`, collecting
/// the call chain up to the enclosing top-level call (`call_depth ==
/// 0`). Returns `None` if `rank`/`seq_id` is out of range.
#[must_use]
pub fn build_call_chain(records: &PerRankRecords, funcs: &FuncTable, rank: u32, seq_id: u64, full: bool) -> Option<CallChain> {
    let rank_records = records.ranks.get(rank as usize)?;
    let mut seq = usize::try_from(seq_id).ok()?;
    rank_records.get(seq)?;

    let name_of = |i: usize| funcs.name(rank_records[i].func_id).unwrap_or("?").to_string();

    if full {
        let mut chain = Vec::new();
        while rank_records[seq].call_depth > 0 {
            chain.push(name_of(seq));
            seq -= 1;
        }
        chain.push(name_of(seq));
        Some(CallChain::Full(chain))
    } else {
        let mut chain = Vec::new();
        let mut added_depths: HashSet<u8> = HashSet::new();
        while rank_records[seq].call_depth > 0 {
            let depth = rank_records[seq].call_depth;
            if added_depths.insert(depth) {
                chain.push(name_of(seq));
            }
            seq -= 1;
        }
        if added_depths.insert(rank_records[seq].call_depth) {
            chain.push(name_of(seq));
        }
        Some(CallChain::Partial(chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::Record;

    fn records_with_depths(depths: &[u8]) -> PerRankRecords {
        let ranks = vec![depths.iter().map(|&d| Record::new(0, d, vec![])).collect()];
        PerRankRecords::new(ranks)
    }

    #[test]
    fn test_full_chain_walks_to_root() {
        let records = records_with_depths(&[0, 1, 2]);
        let funcs = FuncTable::new(vec!["root".into(), "mid".into(), "leaf".into()]);
        let chain = build_call_chain(&records, &funcs, 0, 2, true).unwrap();
        assert_eq!(chain.funcs(), &["leaf", "mid", "root"]);
    }

    #[test]
    fn test_partial_chain_dedups_same_depth() {
        let records = records_with_depths(&[0, 1, 1, 2]);
        let funcs = FuncTable::new(vec!["root".into(), "mid_a".into(), "mid_b".into(), "leaf".into()]);
        let chain = build_call_chain(&records, &funcs, 0, 3, false).unwrap();
        // depth 2 (leaf), then first depth-1 frame seen walking backward (mid_b), then root.
        assert_eq!(chain.funcs(), &["leaf", "mid_b", "root"]);
    }

    #[test]
    fn test_out_of_range_returns_none() {
        let records = records_with_depths(&[0]);
        let funcs = FuncTable::new(vec!["root".into()]);
        assert!(build_call_chain(&records, &funcs, 5, 0, true).is_none());
        assert!(build_call_chain(&records, &funcs, 0, 9, true).is_none());
    }
}
