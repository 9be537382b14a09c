//! 128-bit document and user identifiers
//!
//! MuopDB addresses documents and users with 128-bit ids that travel as two
//! `u64` halves on the wire. As bytes, an id is 16 bytes: the low half first,
//! then the high half, both little-endian. That is also the memory layout of
//! a little-endian `u128`, which is what the packed insert path expects.

use crate::error::{MuopDbError, MuopDbResult};

/// Length of an identifier in bytes
pub const ID_LEN: usize = 16;

pub type Id = [u8; ID_LEN];

/// The zero user id, used when a request names no user
pub const DEFAULT_USER_ID: Id = [0; ID_LEN];

fn halves(id: &Id) -> (u64, u64) {
    let mut low = [0u8; 8];
    let mut high = [0u8; 8];
    low.copy_from_slice(&id[..8]);
    high.copy_from_slice(&id[8..]);
    (u64::from_le_bytes(low), u64::from_le_bytes(high))
}

fn join(low: u64, high: u64) -> Id {
    let mut id = [0u8; ID_LEN];
    id[..8].copy_from_slice(&low.to_le_bytes());
    id[8..].copy_from_slice(&high.to_le_bytes());
    id
}

/// Check that every buffer is exactly 16 bytes
pub fn exact_ids<B: AsRef<[u8]>>(ids: &[B]) -> MuopDbResult<Vec<Id>> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            let bytes = id.as_ref();
            Id::try_from(bytes).map_err(|_| MuopDbError::InvalidIdLength {
                index,
                len: bytes.len(),
            })
        })
        .collect()
}

/// Split 16-byte ids into parallel low and high lists
///
/// Buffers of any other length are rejected, never truncated.
pub fn split_ids<B: AsRef<[u8]>>(ids: &[B]) -> MuopDbResult<(Vec<u64>, Vec<u64>)> {
    Ok(exact_ids(ids)?.iter().map(halves).unzip())
}

/// Rebuild ids from the low and high lists returned by the server
pub fn merge_ids(lows: &[u64], highs: &[u64]) -> MuopDbResult<Vec<Id>> {
    if lows.len() != highs.len() {
        return Err(MuopDbError::IdCountMismatch {
            lows: lows.len(),
            highs: highs.len(),
        });
    }
    Ok(lows
        .iter()
        .zip(highs)
        .map(|(&low, &high)| join(low, high))
        .collect())
}

/// Right-pad each id with zeros to 16 bytes
///
/// Used for user ids, which callers often supply as short tags.
pub fn pad_ids<B: AsRef<[u8]>>(ids: &[B]) -> MuopDbResult<Vec<Id>> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            let bytes = id.as_ref();
            if bytes.len() > ID_LEN {
                return Err(MuopDbError::InvalidIdLength {
                    index,
                    len: bytes.len(),
                });
            }
            let mut padded = [0u8; ID_LEN];
            padded[..bytes.len()].copy_from_slice(bytes);
            Ok(padded)
        })
        .collect()
}

/// The id for the `n`th document: `n` in the low half, zero high half
pub fn sequential_id(n: u64) -> Id {
    join(n, 0)
}

/// Low half of an id; recovers `n` from `sequential_id(n)`
pub fn id_ordinal(id: &Id) -> u64 {
    halves(id).0
}

/// Concatenate ids into one buffer for InsertPacked
pub fn pack_ids(ids: &[Id]) -> Vec<u8> {
    ids.iter().flatten().copied().collect()
}

/// Flatten vectors into little-endian f32 bytes for InsertPacked
pub fn pack_vectors(vectors: &[f32]) -> Vec<u8> {
    vectors.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_merge_round_trip() {
        let ids: Vec<Id> = (0..100).map(sequential_id).collect();
        let (lows, highs) = split_ids(&ids).unwrap();

        assert_eq!(lows.len(), 100);
        assert_eq!(highs.len(), 100);
        assert_eq!(merge_ids(&lows, &highs).unwrap(), ids);
    }

    #[test]
    fn test_split_uses_little_endian_halves() {
        let mut id = [0u8; ID_LEN];
        id[0] = 0x01;
        id[8] = 0x02;
        id[15] = 0x80;

        let (lows, highs) = split_ids(&[id]).unwrap();
        assert_eq!(lows, vec![1]);
        assert_eq!(highs, vec![0x8000_0000_0000_0002]);
    }

    #[test]
    fn test_round_trip_arbitrary_bytes() {
        let ids: Vec<Id> = (0u8..8)
            .map(|seed| std::array::from_fn(|i| seed.wrapping_mul(31).wrapping_add(i as u8 * 17)))
            .collect();
        let (lows, highs) = split_ids(&ids).unwrap();
        assert_eq!(merge_ids(&lows, &highs).unwrap(), ids);
    }

    #[test]
    fn test_layout_matches_u128() {
        let id = join(0x1122_3344_5566_7788, 0x99aa_bbcc_ddee_ff00);
        let as_u128 = u128::from_le_bytes(id);
        assert_eq!(as_u128 as u64, 0x1122_3344_5566_7788);
        assert_eq!((as_u128 >> 64) as u64, 0x99aa_bbcc_ddee_ff00);
    }

    #[test]
    fn test_split_rejects_wrong_length() {
        let ids: Vec<Vec<u8>> = vec![vec![0; 16], vec![0; 15]];
        let err = split_ids(&ids).unwrap_err();
        assert!(matches!(err, MuopDbError::InvalidIdLength { index: 1, len: 15 }));

        let ids: Vec<Vec<u8>> = vec![vec![0; 17]];
        assert!(matches!(
            split_ids(&ids),
            Err(MuopDbError::InvalidIdLength { index: 0, len: 17 })
        ));
    }

    #[test]
    fn test_split_empty() {
        let ids: Vec<Id> = vec![];
        let (lows, highs) = split_ids(&ids).unwrap();
        assert!(lows.is_empty());
        assert!(highs.is_empty());
    }

    #[test]
    fn test_merge_rejects_mismatched_halves() {
        let err = merge_ids(&[1, 2, 3], &[0, 0]).unwrap_err();
        assert!(matches!(err, MuopDbError::IdCountMismatch { lows: 3, highs: 2 }));
    }

    #[test]
    fn test_pad_short_ids() {
        let ids: Vec<Vec<u8>> = vec![vec![], vec![7, 8, 9], vec![1; 16]];
        let padded = pad_ids(&ids).unwrap();

        assert_eq!(padded[0], [0; 16]);
        assert_eq!(&padded[1][..3], &[7, 8, 9]);
        assert!(padded[1][3..].iter().all(|&b| b == 0));
        assert_eq!(padded[2], [1; 16]);
    }

    #[test]
    fn test_pad_rejects_long_ids() {
        let ids = vec![b"user".as_slice(), b"this-id-is-way-too-long".as_slice()];
        let err = pad_ids(&ids).unwrap_err();
        assert!(matches!(err, MuopDbError::InvalidIdLength { index: 1, len: 23 }));
    }

    #[test]
    fn test_sequential_ids_invert() {
        for n in [0, 1, 4, 99, u64::MAX] {
            let id = sequential_id(n);
            assert_eq!(id_ordinal(&id), n);
            assert_eq!(&id[8..], &[0; 8]);
        }
    }

    #[test]
    fn test_pack_ids_and_vectors() {
        let packed = pack_ids(&[sequential_id(1), sequential_id(2)]);
        assert_eq!(packed.len(), 32);
        assert_eq!(packed[0], 1);
        assert_eq!(packed[16], 2);

        let packed = pack_vectors(&[1.0, -2.5]);
        assert_eq!(packed.len(), 8);
        assert_eq!(&packed[..4], &1.0f32.to_le_bytes());
        assert_eq!(&packed[4..], &(-2.5f32).to_le_bytes());
    }
}
