//! The six concrete end-to-end scenarios from spec.md §8, run against the
//! exact config the spec names: total_buckets=16, max_hashmaps=4,
//! key_length=4, sector_key_bytes=8, primary bloom 64 bits / 3 hashes,
//! secondary bloom 32 bits / 2 hashes.

mod common;

use common::{scenario_config, unique_root};
use sector_keychain::{Keychain, KeychainError, SectorKey};

fn payload_range(start: u8) -> Vec<u8> {
    (start..start + 8).collect()
}

#[test]
fn scenario_1_put_then_get() {
    let root = unique_root("scenario-1");
    let kc = Keychain::open(scenario_config(&root)).unwrap();

    kc.put(SectorKey::new(vec![0xAA], payload_range(1))).unwrap();
    let got = kc.get(&[0xAA]).unwrap();
    assert_eq!(got.payload, payload_range(1));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn scenario_2_overwrite_is_last_writer_wins() {
    let root = unique_root("scenario-2");
    let kc = Keychain::open(scenario_config(&root)).unwrap();

    kc.put(SectorKey::new(b"abc".to_vec(), payload_range(0x10)))
        .unwrap();
    kc.put(SectorKey::new(b"abc".to_vec(), payload_range(0x20)))
        .unwrap();

    let got = kc.get(b"abc").unwrap();
    assert_eq!(got.payload, payload_range(0x20));

    let _ = std::fs::remove_dir_all(&root);
}

/// Four raw keys engineered so their compressed form collides in bucket 5,
/// each distinct so none is an overwrite of another. With key_length=4 the
/// compressed key *is* the raw key (a single XOR-fold chunk), and the
/// wrapping 8-byte bucket window reduces to `v mod total_buckets` for a
/// 4-byte little-endian `v` when `total_buckets` divides 2^32 — so any `v`
/// values congruent mod 16 collide.
fn colliding_keys_for_bucket(bucket: u32, total_buckets: u32, count: u32) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| (bucket + i * total_buckets).to_le_bytes().to_vec())
        .collect()
}

#[test]
fn scenario_3_bucket_fills_across_hashmap_files_then_keychain_full() {
    let root = unique_root("scenario-3");
    let cfg = scenario_config(&root); // max_hashmaps = 4
    let kc = Keychain::open(cfg).unwrap();

    let keys = colliding_keys_for_bucket(5, 16, 5);
    assert_eq!(keys.len(), 5);

    for (i, k) in keys.iter().take(4).enumerate() {
        kc.put(SectorKey::new(k.clone(), payload_range(i as u8)))
            .unwrap();
    }
    for (i, k) in keys.iter().take(4).enumerate() {
        let got = kc.get(k).unwrap();
        assert_eq!(got.payload, payload_range(i as u8));
    }

    let fifth = kc.put(SectorKey::new(keys[4].clone(), payload_range(9)));
    assert!(matches!(fifth, Err(KeychainError::KeychainFull)));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn scenario_4_erase_then_restore_round_trips() {
    let root = unique_root("scenario-4");
    let kc = Keychain::open(scenario_config(&root)).unwrap();

    kc.put(SectorKey::new(b"k".to_vec(), payload_range(3)))
        .unwrap();
    kc.erase(b"k").unwrap();
    assert!(matches!(kc.get(b"k"), Err(KeychainError::NotFound)));

    kc.restore(b"k").unwrap();
    let got = kc.get(b"k").unwrap();
    assert_eq!(got.payload, payload_range(3));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn scenario_5_erase_of_one_key_does_not_affect_a_colliding_sibling() {
    let root = unique_root("scenario-5");
    let kc = Keychain::open(scenario_config(&root)).unwrap();

    let keys = colliding_keys_for_bucket(5, 16, 2);
    kc.put(SectorKey::new(keys[0].clone(), payload_range(1)))
        .unwrap();
    kc.put(SectorKey::new(keys[1].clone(), payload_range(2)))
        .unwrap();

    kc.erase(&keys[0]).unwrap();
    assert!(matches!(kc.get(&keys[0]), Err(KeychainError::NotFound)));

    let got = kc.get(&keys[1]).unwrap();
    assert_eq!(got.payload, payload_range(2));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn scenario_6_reopen_preserves_all_prior_outcomes() {
    let root = unique_root("scenario-6");
    {
        let kc = Keychain::open(scenario_config(&root)).unwrap();
        kc.put(SectorKey::new(vec![0xAA], payload_range(1))).unwrap();
        kc.put(SectorKey::new(b"abc".to_vec(), payload_range(0x20)))
            .unwrap();
        kc.put(SectorKey::new(b"k".to_vec(), payload_range(3)))
            .unwrap();
        kc.erase(b"k").unwrap();
        kc.restore(b"k").unwrap();
        kc.flush().unwrap();
    }

    // Reopen against the same base_path.
    let kc = Keychain::open(scenario_config(&root)).unwrap();
    assert_eq!(kc.get(&[0xAA]).unwrap().payload, payload_range(1));
    assert_eq!(kc.get(b"abc").unwrap().payload, payload_range(0x20));
    assert_eq!(kc.get(b"k").unwrap().payload, payload_range(3));

    let _ = std::fs::remove_dir_all(&root);
}
