//! Debug helpers for printing octets as hex.

/// Formats up to `max` bytes as space-separated hex, noting how many were cut.
///
/// # Example
///
/// ```
/// use model_blob_buffers::print_octets;
///
/// assert_eq!(print_octets(&[0x01, 0x02, 0x0a, 0xff], 16), "01 02 0a ff");
/// assert_eq!(print_octets(&[1, 2, 3], 2), "01 02 ... (1 more)");
/// assert_eq!(print_octets(&[], 16), "");
/// ```
pub fn print_octets(octets: &[u8], max: usize) -> String {
    let mut result = octets
        .iter()
        .take(max)
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<_>>()
        .join(" ");
    if octets.len() > max {
        result.push_str(&format!(" ... ({} more)", octets.len() - max));
    }
    result
}

/// Formats a byte slice as hex with a default max of 16 bytes.
pub fn print_octets_default(octets: &[u8]) -> String {
    print_octets(octets, 16)
}
