/// Province and territory codes offered by the region selector. The first
/// entry is the blank "no region" option.
pub const REGIONS: [&str; 14] = [
    "", "AB", "BC", "MB", "NB", "NL", "NS", "ON", "PE", "QC", "SK", "NT", "NU", "YT",
];

pub fn is_valid(code: &str) -> bool {
    REGIONS.contains(&code)
}

pub fn position(code: &str) -> Option<usize> {
    REGIONS.iter().position(|r| *r == code)
}

/// Step through the list from `current`, wrapping at either end. Unknown
/// codes start from the blank option.
pub fn cycle(current: &str, delta: isize) -> &'static str {
    let len = REGIONS.len() as isize;
    let index = position(current).unwrap_or(0) as isize;
    let next = (index + delta).rem_euclid(len);
    REGIONS[next as usize]
}

/// Codes without the blank option.
pub fn codes() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().copied().filter(|code| !code.is_empty())
}
