// MIT License
//
// Copyright (c) 2019 Gregory Meyer
//
// Permission is hereby granted, free of charge, to any person
// obtaining a copy of this software and associated documentation files
// (the "Software"), to deal in the Software without restriction,
// including without limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of the Software,
// and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
// BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
// ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use super::*;

use crate::hash::{
    fnv1a_32, fnv1a_64, mul31_32, mul31_64, mul31_x4_32, mul31_x4_64, mul31_x8, Fnv1a, Mul31,
    Mul31x4, Mul31x8,
};

use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u64),
    InsertIfAbsent(Vec<u8>, u64),
    Remove(Vec<u8>),
    Get(Vec<u8>),
    RetainEven,
    Clear,
}

fn bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=96)
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // a narrow alphabet keeps keys colliding with earlier ones
    prop::collection::vec(b'a'..=b'd', 0..=6)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        40 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        20 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::InsertIfAbsent(k, v)),
        20 => key.clone().prop_map(Op::Remove),
        18 => key.clone().prop_map(Op::Get),
        1 => Just(Op::RetainEven),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1500)
}

fn check_model<H: StringHash>(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut t: FlatMap<Vec<u8>, u64, H> = FlatMap::default();
    let mut m: HashMap<Vec<u8>, u64> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(key, value) => {
                let old_t = t.insert(key.clone(), value);
                let old_m = m.insert(key, value);
                prop_assert_eq!(old_t, old_m);
            }
            Op::InsertIfAbsent(key, value) => {
                let inserted_t = t.insert_if_absent(key.clone(), value);
                let inserted_m = !m.contains_key(&key);
                m.entry(key).or_insert(value);
                prop_assert_eq!(inserted_t, inserted_m);
            }
            Op::Remove(key) => {
                let old_t = t.remove(key.as_slice());
                let old_m = m.remove(key.as_slice());
                prop_assert_eq!(old_t, old_m);
            }
            Op::Get(key) => {
                let got_t = t.get(key.as_slice()).copied();
                let got_m = m.get(key.as_slice()).copied();
                prop_assert_eq!(got_t, got_m);
            }
            Op::RetainEven => {
                t.retain(|_, v| *v % 2 == 0);
                m.retain(|_, v| *v % 2 == 0);
            }
            Op::Clear => {
                t.clear();
                m.clear();
            }
        }

        prop_assert_eq!(t.len(), m.len());
    }

    let got: HashMap<Vec<u8>, u64> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
    prop_assert_eq!(got, m);

    Ok(())
}

proptest! {
    #[test]
    fn mul31_family_agrees_at_64_bits(bytes in bytes_strategy()) {
        let reference = mul31_64(&bytes);

        prop_assert_eq!(mul31_x4_64(&bytes), reference);
        prop_assert_eq!(mul31_x8(&bytes), reference);
    }

    #[test]
    fn mul31_family_agrees_at_32_bits(bytes in bytes_strategy()) {
        prop_assert_eq!(mul31_x4_32(&bytes), mul31_32(&bytes));

        let truncated = bytes.iter().fold(mul31_x8(&[]) as u32, |h, &b| {
            h.wrapping_mul(31).wrapping_add(u32::from(b))
        });
        prop_assert_eq!(mul31_x8(&bytes) as u32, truncated);
    }

    #[test]
    fn word_sized_hashers_agree(bytes in bytes_strategy()) {
        let reference = Mul31.hash_bytes(&bytes);

        prop_assert_eq!(Mul31x4.hash_bytes(&bytes), reference);

        #[cfg(target_pointer_width = "64")]
        prop_assert_eq!(Mul31x8.hash_bytes(&bytes), reference);
        #[cfg(not(target_pointer_width = "64"))]
        prop_assert_eq!(Mul31x8.hash_bytes(&bytes), mul31_x8(&bytes) as usize);
    }

    #[test]
    fn fnv1a_first_step(byte in any::<u8>()) {
        prop_assert_eq!(
            fnv1a_32(&[byte]),
            (0x811C_9DC5 ^ u32::from(byte)).wrapping_mul(0x0100_0193)
        );
        prop_assert_eq!(
            fnv1a_64(&[byte]),
            (0xCBF2_9CE4_8422_2325 ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01B3)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn flat_map_matches_model_with_finalizer(ops in ops_strategy()) {
        check_model::<Mul31>(ops)?;
    }

    #[test]
    fn flat_map_matches_model_without_finalizer(ops in ops_strategy()) {
        check_model::<Fnv1a>(ops)?;
    }
}
