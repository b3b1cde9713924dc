#![no_main]

use libfuzzer_sys::fuzz_target;
use rylv_statsd::Fragments;

// Splitting must never lose bytes other than the newlines it splits on
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let max = usize::from(data[0]);
    let packet = &data[1..];
    let fragments: Vec<&[u8]> = Fragments::new(packet, max).collect();

    assert!(!fragments.is_empty());
    let consumed: usize = fragments.iter().map(|f| f.len()).sum::<usize>() + fragments.len() - 1;
    assert!(consumed == packet.len() || consumed + 1 == packet.len());

    // every fragment except an unsplittable tail fits
    for fragment in &fragments[..fragments.len() - 1] {
        assert!(max == 0 || fragment.len() <= max);
    }
});
