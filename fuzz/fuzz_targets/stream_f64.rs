#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate byteorder;
extern crate leveled_quantiles;

use std::io::Cursor;
use byteorder::{BigEndian, ReadBytesExt};
use leveled_quantiles::util::Xorshift;
use leveled_quantiles::Stream;

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);

    // unbounded, Stream rejects what it cannot size
    let epsilon: f64 = if let Ok(res) = cursor.read_f64::<BigEndian>() {
        res
    } else {
        return;
    };
    // bounded 2**20
    let expected: usize = if let Ok(res) = cursor.read_u32::<BigEndian>() {
        (res % 1_048_576) as usize
    } else {
        return;
    };
    // bounded 2**20, may overshoot the expected count
    let upper_bound: usize = if let Ok(res) = cursor.read_u32::<BigEndian>() {
        (res % 1_048_576) as usize
    } else {
        return;
    };
    // unbounded
    let seed: u64 = if let Ok(res) = cursor.read_u64::<BigEndian>() {
        res
    } else {
        return;
    };

    let mut stream = match Stream::new(epsilon, expected) {
        Ok(stream) => stream,
        Err(_) => return,
    };
    let mut xshft = Xorshift::new(seed);
    for _ in 0..upper_bound {
        stream.insert(f64::from(xshft.next_val()));
    }
    let quantiles = stream.finalize();
    assert_eq!(quantiles.summary().size(), upper_bound);
    for phi in &[0.0, 0.5, 0.99, 1.0] {
        if upper_bound > 0 {
            assert!(quantiles.query(*phi).is_some());
        }
    }
});
