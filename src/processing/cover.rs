//! Covering blocks for address ranges.

use crate::models::{common_prefix_len, cut_addr, IpAssignmentPool, Route};
use std::net::Ipv4Addr;

/// Turn assignment ranges into one covering route per range.
///
/// Each block is the common leading-bit prefix of the range's start and end,
/// so a range that is not aligned on a power of two gets a block larger than
/// the range itself. This is one superset block per range, not a minimal
/// multi-block cover.
///
/// Ranges with `start >= end` are skipped without an error, as are ranges
/// whose endpoints are not IPv4 addresses.
pub fn cover_blocks_for_ranges(ranges: &[IpAssignmentPool]) -> Vec<Route> {
    let mut result = Vec::new();

    for range in ranges {
        let (start, end) = match (
            range.ip_range_start.trim().parse::<Ipv4Addr>(),
            range.ip_range_end.trim().parse::<Ipv4Addr>(),
        ) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                log::warn!(
                    "Skipping range with invalid address: {} - {}",
                    range.ip_range_start,
                    range.ip_range_end
                );
                continue;
            }
        };

        if u32::from(start) >= u32::from(end) {
            log::debug!("Skipping empty or inverted range {start} - {end}");
            continue;
        }

        let prefix = common_prefix_len(start, end);
        match cut_addr(start, prefix) {
            Ok(network) => result.push(Route::lan(format!("{network}/{prefix}"))),
            Err(e) => log::warn!("Skipping range {start} - {end}: {e}"),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(ranges: &[(&str, &str)]) -> Vec<String> {
        let ranges: Vec<IpAssignmentPool> = ranges
            .iter()
            .map(|(s, e)| IpAssignmentPool::new(s, e))
            .collect();
        cover_blocks_for_ranges(&ranges)
            .into_iter()
            .map(|r| {
                assert_eq!(r.via, None);
                r.target
            })
            .collect()
    }

    #[test]
    fn test_cover_aligned_24() {
        assert_eq!(targets(&[("10.0.0.0", "10.0.0.255")]), vec!["10.0.0.0/24"]);
        assert_eq!(
            cover_blocks_for_ranges(&[IpAssignmentPool::new("10.0.0.0", "10.0.0.255")]),
            vec![Route::lan("10.0.0.0/24")]
        );
    }

    #[test]
    fn test_cover_usable_range_gives_same_block() {
        assert_eq!(
            targets(&[("10.121.15.1", "10.121.15.254")]),
            vec!["10.121.15.0/24"]
        );
    }

    #[test]
    fn test_cover_unaligned_range_is_superset() {
        // 10.0.0.254 - 10.0.1.1 crosses a /24 boundary
        assert_eq!(targets(&[("10.0.0.254", "10.0.1.1")]), vec!["10.0.0.0/23"]);
        // three addresses
        assert_eq!(targets(&[("10.0.0.1", "10.0.0.3")]), vec!["10.0.0.0/30"]);
    }

    #[test]
    fn test_cover_skips_invalid() {
        assert!(targets(&[("10.0.0.5", "10.0.0.5")]).is_empty());
        assert!(targets(&[("10.0.0.9", "10.0.0.1")]).is_empty());
        assert!(targets(&[("fd00::1", "fd00::ff")]).is_empty());
        assert_eq!(
            targets(&[
                ("10.0.0.9", "10.0.0.1"),
                ("172.25.0.0", "172.25.255.255"),
            ]),
            vec!["172.25.0.0/16"]
        );
    }
}
