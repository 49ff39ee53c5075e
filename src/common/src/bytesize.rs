//! Human readable byte counts using binary (IEC) units.

const UNIT: u64 = 1024;
const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// Format a byte count as `512 B`, `1.50 KiB`, `3.00 GiB`, ...
pub fn byte_count_binary(bytes: u64) -> String {
    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.2} {}iB", bytes as f64 / div as f64, PREFIXES[exp])
}
