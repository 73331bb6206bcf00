//! Property-based and adversarial tests for the envelope protocol.
//!
//! 1. **Round-trip**: open(seal(m, R), any r ∈ R) == m
//! 2. **Tamper detection**: one flipped bit anywhere fails the open
//! 3. **Nonce uniqueness**: no nonce repeats across many seals
//! 4. **Cost scaling**: one body pass + one wrap per recipient

use std::collections::HashSet;

use ironkey_crypto::{
    Curve, DerivationPath, Fingerprint, Recipient, Role, SecretKey, derive_x25519,
    envelope::{CEK_SIZE, NONCE_SIZE},
    open, seal,
};
use proptest::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};

/// Derive a recipient keypair from a per-party seed byte.
fn party(seed_byte: u8) -> (Recipient, SecretKey) {
    let path = DerivationPath::new(Curve::X25519, 0, Role::Encryption, 0);
    let pair = derive_x25519(&[seed_byte; 32], &path).unwrap();
    let fingerprint = Fingerprint::of(&pair.public).short(Curve::X25519);
    (Recipient { public: pair.public, fingerprint }, pair.secret)
}

fn parties(count: u8) -> Vec<(Recipient, SecretKey)> {
    (1..=count).map(party).collect()
}

/// Resolver holding exactly one party's key.
fn resolver_for(
    holder: &(Recipient, SecretKey),
) -> impl FnMut(&ironkey_crypto::ShortFingerprint) -> Option<SecretKey> + '_ {
    move |to| (*to == holder.0.fingerprint).then(|| holder.1.clone())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_any_recipient(
        plaintext in prop::collection::vec(any::<u8>(), 0..1024),
        recipient_count in 1u8..8,
        holder_index in any::<prop::sample::Index>(),
        rng_seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
        let everyone = parties(recipient_count);
        let recipients: Vec<_> = everyone.iter().map(|(r, _)| r.clone()).collect();

        let envelope = seal(&mut rng, &plaintext, &recipients).unwrap();
        prop_assert_eq!(envelope.recipients.len(), recipients.len());

        let holder = &everyone[holder_index.index(everyone.len())];
        let opened = open(&envelope, resolver_for(holder)).unwrap();
        prop_assert_eq!(opened, plaintext);
    }

    #[test]
    fn prop_single_bit_flips_are_detected(
        rng_seed in any::<u64>(),
        flip_bit in 0usize..8,
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
        let everyone = parties(3);
        let recipients: Vec<_> = everyone.iter().map(|(r, _)| r.clone()).collect();
        let envelope = seal(&mut rng, b"tamper target", &recipients).unwrap();
        let mask = 1u8 << flip_bit;

        // Every byte of body_ct and body_nonce, and of each entry's
        // wrapped_cek and nonce, is a detection surface.
        for position in 0..envelope.body_ct.len() {
            let mut tampered = envelope.clone();
            tampered.body_ct[position] ^= mask;
            for holder in &everyone {
                prop_assert!(open(&tampered, resolver_for(holder)).is_err());
            }
        }
        for position in 0..NONCE_SIZE {
            let mut tampered = envelope.clone();
            tampered.body_nonce[position] ^= mask;
            prop_assert!(open(&tampered, resolver_for(&everyone[0])).is_err());
        }
        for entry_index in 0..envelope.recipients.len() {
            let holder = &everyone[entry_index];

            for position in 0..envelope.recipients[entry_index].wrapped_cek.len() {
                let mut tampered = envelope.clone();
                tampered.recipients[entry_index].wrapped_cek[position] ^= mask;
                prop_assert!(open(&tampered, resolver_for(holder)).is_err());
            }
            for position in 0..NONCE_SIZE {
                let mut tampered = envelope.clone();
                tampered.recipients[entry_index].nonce[position] ^= mask;
                prop_assert!(open(&tampered, resolver_for(holder)).is_err());
            }
        }
    }
}

#[test]
fn nonces_never_repeat_across_seals() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x6e6f_6e63);
    let everyone = parties(2);
    let recipients: Vec<_> = everyone.iter().map(|(r, _)| r.clone()).collect();

    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let envelope = seal(&mut rng, b"n", &recipients).unwrap();
        assert!(seen.insert(envelope.body_nonce), "body nonce repeated");
        for entry in &envelope.recipients {
            assert!(seen.insert(entry.nonce), "recipient nonce repeated");
        }
    }
    assert_eq!(seen.len(), 10_000 * 3);
}

/// RNG wrapper counting draw operations.
///
/// Sealing draws exactly once for the CEK, once for the body nonce, and —
/// per recipient — once for the ephemeral key and once for the wrap nonce.
/// The draw count therefore proves one body pass and one wrap per
/// recipient, without timing.
struct CountingRng<R> {
    inner: R,
    fills: usize,
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fills += 1;
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fills += 1;
        self.inner.try_fill_bytes(dest)
    }
}

impl<R: CryptoRng> CryptoRng for CountingRng<R> {}

#[test]
fn cost_scales_as_one_body_pass_plus_per_recipient_wraps() {
    let everyone = parties(5);
    let recipients: Vec<_> = everyone.iter().map(|(r, _)| r.clone()).collect();
    let body = vec![0x5a; 10 * 1024 * 1024];

    let mut rng = CountingRng { inner: ChaCha8Rng::seed_from_u64(1), fills: 0 };
    let envelope = seal(&mut rng, &body, &recipients).unwrap();

    // 1 CEK + 1 body nonce + 5 × (ephemeral key + wrap nonce).
    assert_eq!(rng.fills, 2 + 2 * 5);

    // Exactly one body-sized ciphertext; every wrap touches only the
    // 32-byte CEK.
    assert_eq!(envelope.body_ct.len(), body.len() + 16);
    assert_eq!(envelope.recipients.len(), 5);
    for entry in &envelope.recipients {
        assert_eq!(entry.wrapped_cek.len(), CEK_SIZE + 16);
    }

    // And the result still opens.
    let opened = open(&envelope, resolver_for(&everyone[4])).unwrap();
    assert_eq!(opened.len(), body.len());
}

#[test]
fn envelopes_for_disjoint_recipient_sets_do_not_cross_open() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let group_a = parties(2);
    let group_b: Vec<_> = (10u8..12).map(party).collect();

    let recipients_a: Vec<_> = group_a.iter().map(|(r, _)| r.clone()).collect();
    let envelope = seal(&mut rng, b"for group a", &recipients_a).unwrap();

    for outsider in &group_b {
        let result = open(&envelope, resolver_for(outsider));
        assert!(result.is_err());
    }
}
