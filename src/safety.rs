//! Admission checks applied before any entry byte is decoded.
//!
//! The gate sits strictly between index lookup and decode: both checks run
//! on the sizes declared in the central directory, so a hostile entry is
//! rejected before a single byte of its data is read.

use crate::error::ExtractError;

/// Limits consulted for one extraction decision. Built fresh from settings
/// at each call so configuration changes apply to the next request.
#[derive(Debug, Clone, Copy)]
pub struct ExtractLimits {
    /// Largest permitted uncompressed size, in bytes.
    pub max_bytes: u64,
    /// Largest permitted uncompressed/compressed ratio.
    pub max_ratio: u64,
}

/// Decide whether an entry with the declared sizes may be extracted.
///
/// Rules, in order: an uncompressed size over `max_bytes` is `TooLarge`; a
/// zero compressed size with a nonzero uncompressed size is treated as a
/// bomb, as is a ratio over `max_ratio` (`SuspiciousRatio`).
pub fn check(
    compressed_size: u64,
    uncompressed_size: u64,
    limits: &ExtractLimits,
) -> Result<(), ExtractError> {
    if uncompressed_size > limits.max_bytes {
        return Err(ExtractError::TooLarge {
            size: uncompressed_size,
            limit: limits.max_bytes,
        });
    }

    if compressed_size == 0 {
        if uncompressed_size > 0 {
            return Err(ExtractError::SuspiciousRatio {
                compressed: compressed_size,
                uncompressed: uncompressed_size,
                limit: limits.max_ratio,
            });
        }
        return Ok(());
    }

    if uncompressed_size / compressed_size > limits.max_ratio {
        return Err(ExtractError::SuspiciousRatio {
            compressed: compressed_size,
            uncompressed: uncompressed_size,
            limit: limits.max_ratio,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: ExtractLimits = ExtractLimits {
        max_bytes: 10 * 1024 * 1024,
        max_ratio: 100,
    };

    #[test]
    fn empty_entry_is_permitted() {
        assert!(check(0, 0, &LIMITS).is_ok());
    }

    #[test]
    fn zero_compressed_with_data_is_suspicious() {
        let err = check(0, 100, &LIMITS).unwrap_err();
        assert!(matches!(err, ExtractError::SuspiciousRatio { .. }));
    }

    #[test]
    fn ratio_over_limit_rejects() {
        // 2000/10 = 200, over the 100:1 threshold.
        let err = check(10, 2000, &LIMITS).unwrap_err();
        assert!(matches!(err, ExtractError::SuspiciousRatio { .. }));
    }

    #[test]
    fn ratio_under_limit_permits() {
        // 500/10 = 50.
        assert!(check(10, 500, &LIMITS).is_ok());
    }

    #[test]
    fn oversize_rejects_before_ratio_is_considered() {
        let err = check(0, LIMITS.max_bytes + 1, &LIMITS).unwrap_err();
        assert!(matches!(err, ExtractError::TooLarge { .. }));
    }

    #[test]
    fn size_exactly_at_limit_permits() {
        assert!(check(LIMITS.max_bytes, LIMITS.max_bytes, &LIMITS).is_ok());
    }
}
