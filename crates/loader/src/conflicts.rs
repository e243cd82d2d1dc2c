//! Parses `conflicts.dat`: the conflict-detector's binary output.
//!
//! Each group is a header (`c1_rank: i32, c1_seq_id: i32, num_pairs: u64`)
//! followed by `num_pairs` pairs of `(c2_rank: i32, c2_seq_id: i32)`,
//! repeated until EOF.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use verifyio_core::{ConflictGroup, NodeId};

use crate::error::LoaderError;

const HEADER_BYTES: usize = 16;
const PAIR_BYTES: usize = 8;

fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..])? {
            0 if total == 0 => return Ok(false),
            0 => return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated conflict group")),
            n => total += n,
        }
    }
    Ok(true)
}

fn read_one_group<R: Read>(reader: &mut R) -> Result<Option<ConflictGroup>, LoaderError> {
    let mut header = [0u8; HEADER_BYTES];
    if !read_exact_or_eof(reader, &mut header)? {
        return Ok(None);
    }

    let c1_rank = i32::from_le_bytes(header[0..4].try_into().unwrap());
    let c1_seq_id = i32::from_le_bytes(header[4..8].try_into().unwrap());
    let num_pairs = u64::from_le_bytes(header[8..16].try_into().unwrap());

    if c1_rank < 0 || c1_seq_id < 0 {
        return Err(LoaderError::MalformedConflictFile(format!(
            "negative c1 coordinates ({c1_rank}, {c1_seq_id})"
        )));
    }

    let mut c2s = Vec::with_capacity(num_pairs as usize);
    for _ in 0..num_pairs {
        let mut pair = [0u8; PAIR_BYTES];
        if !read_exact_or_eof(reader, &mut pair)? {
            return Err(LoaderError::MalformedConflictFile(
                "group header promised more pairs than the file contains".to_string(),
            ));
        }
        let c2_rank = i32::from_le_bytes(pair[0..4].try_into().unwrap());
        let c2_seq_id = i32::from_le_bytes(pair[4..8].try_into().unwrap());
        if c2_rank < 0 || c2_seq_id < 0 {
            return Err(LoaderError::MalformedConflictFile(format!(
                "negative c2 coordinates ({c2_rank}, {c2_seq_id})"
            )));
        }
        #[allow(clippy::cast_sign_loss)]
        c2s.push(NodeId::new(c2_rank as u32, c2_seq_id as u64));
    }

    #[allow(clippy::cast_sign_loss)]
    let c1 = NodeId::new(c1_rank as u32, c1_seq_id as u64);
    Ok(Some(ConflictGroup::new(c1, c2s)))
}

/// Reads every conflict group out of `conflicts.dat`, in file order.
pub fn read_conflicts(path: &Path) -> Result<Vec<ConflictGroup>, LoaderError> {
    let mut file = File::open(path)?;
    let mut groups = Vec::new();
    while let Some(group) = read_one_group(&mut file)? {
        groups.push(group);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_group(buf: &mut Vec<u8>, c1: (i32, i32), c2s: &[(i32, i32)]) {
        buf.extend_from_slice(&c1.0.to_le_bytes());
        buf.extend_from_slice(&c1.1.to_le_bytes());
        buf.extend_from_slice(&(c2s.len() as u64).to_le_bytes());
        for &(rank, seq_id) in c2s {
            buf.extend_from_slice(&rank.to_le_bytes());
            buf.extend_from_slice(&seq_id.to_le_bytes());
        }
    }

    #[test]
    fn test_read_conflicts_roundtrip() {
        let dir = std::env::temp_dir().join("verifyio_loader_test_conflicts");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("conflicts.dat");

        let mut buf = Vec::new();
        write_group(&mut buf, (0, 3), &[(1, 5), (2, 1)]);
        write_group(&mut buf, (1, 7), &[(0, 0)]);
        File::create(&path).unwrap().write_all(&buf).unwrap();

        let groups = read_conflicts(&path).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].c1, NodeId::new(0, 3));
        assert_eq!(groups[0].c2s, vec![NodeId::new(1, 5), NodeId::new(2, 1)]);
        assert_eq!(groups[1].c1, NodeId::new(1, 7));
        assert_eq!(groups[1].c2s, vec![NodeId::new(0, 0)]);
    }

    #[test]
    fn test_read_conflicts_empty_file() {
        let dir = std::env::temp_dir().join("verifyio_loader_test_conflicts_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("conflicts.dat");
        File::create(&path).unwrap();

        let groups = read_conflicts(&path).unwrap();
        assert!(groups.is_empty());
    }
}
