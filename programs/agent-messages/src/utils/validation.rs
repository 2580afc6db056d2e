//! Character buffer validation shared by both submission paths
//!
//! Buffers hold one Unicode code point per position, so lengths count
//! characters, never UTF-8 bytes.

/// Returns the index of the first `0` position within `buffer[..cap]`, or
/// `cap` when no terminator is found before the limit.
///
/// This is the direct form of the circuit's flattened scan; both produce
/// the same length for every buffer.
///
/// # Examples
/// ```
/// use agent_messages::utils::validation::logical_length;
///
/// let mut buffer = [0_u32; 128];
/// buffer[0] = u32::from('j');
/// buffer[1] = u32::from('é');
/// assert_eq!(logical_length(&buffer, 128), 2);
/// assert_eq!(logical_length(&[u32::from('a'); 128], 128), 128);
/// ```
pub fn logical_length(buffer: &[u32], cap: usize) -> usize {
    let cap = cap.min(buffer.len());
    buffer[..cap]
        .iter()
        .position(|character| *character == 0)
        .unwrap_or(cap)
}

pub fn require_length(buffer: &[u32], cap: usize, target: usize) -> bool {
    logical_length(buffer, cap) == target
}

/// Exact comparison of two buffers' logical contents.
pub fn logical_contents_match(stored: &[u32], provided: &[u32], cap: usize) -> bool {
    stored[..logical_length(stored, cap)] == provided[..logical_length(provided, cap)]
}
