#![no_main]

use libfuzzer_sys::fuzz_target;
use rylv_statsd::{BufferPool, CommandEncoder, Metric};

// Arbitrary names and set members are written verbatim with an exact length
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let (prefix, rest) = text.split_at(text.char_indices().nth(3).map_or(text.len(), |(i, _)| i));
    let (name, member) = rest.split_at(rest.char_indices().nth(rest.chars().count() / 2).map_or(rest.len(), |(i, _)| i));

    let pool = BufferPool::new(4);
    let encoder = CommandEncoder::new(prefix, pool.clone());
    {
        let command = encoder.encode_metric(name, &Metric::set(member));
        assert_eq!(command.as_str(), format!("{prefix}{name}:{member}|s"));

        let command = encoder.encode_metric(name, &Metric::counter(i64::MIN));
        assert_eq!(command.len(), prefix.len() + name.len() + ":-9223372036854775808|c".len());
    }
    assert_eq!(pool.outstanding(), 0);
});
