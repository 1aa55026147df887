//! Sequential bind-probe port allocation (§4.2).
//!
//! Uniqueness is guaranteed by a successful `bind`; the rotating offset only
//! reduces collisions between two concurrent starts racing the same range
//! (§5 "Port allocation").

use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::sync::Mutex;

use crate::ProcessError;

/// Default range list, tried in order after any caller-supplied custom
/// ranges (§4.2).
pub const DEFAULT_PORT_RANGES: &[(u16, u16)] = &[
    (49152, 65535),
    (32768, 49151),
    (8000, 8999),
    (9000, 9999),
    (10000, 19999),
    (20000, 29999),
    (30000, 32767),
];

/// Allocates free loopback ports by probing `bind` across an ordered list
/// of ranges.
pub struct PortAllocator {
    ranges: Vec<(u16, u16)>,
    offset: Mutex<usize>,
}

impl PortAllocator {
    /// `custom_ranges` are tried before the built-in defaults.
    pub fn new(custom_ranges: Vec<(u16, u16)>) -> Self {
        let mut ranges = custom_ranges;
        ranges.extend_from_slice(DEFAULT_PORT_RANGES);
        Self {
            ranges,
            offset: Mutex::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Vec::new())
    }

    /// Probe-bind across every configured range until one yields a free
    /// port, or fail with [`ProcessError::PortExhaustion`].
    pub fn allocate(&self) -> Result<u16, ProcessError> {
        let rotation = {
            let mut guard = self.offset.lock().unwrap();
            let current = *guard;
            *guard = guard.wrapping_add(1);
            current
        };

        let mut last_err = None;
        for &(start, end) in &self.ranges {
            match Self::probe_range(start, end, rotation) {
                Ok(port) => return Ok(port),
                Err(e) => last_err = Some(e),
            }
        }

        Err(ProcessError::PortExhaustion {
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no ranges configured")
            }),
        })
    }

    fn probe_range(start: u16, end: u16, rotation: usize) -> std::io::Result<u16> {
        let span = (end as u32).saturating_sub(start as u32) + 1;
        let mut last_err = None;
        for i in 0..span {
            let candidate = start as u32 + (i + rotation as u32) % span;
            let port = candidate as u16;
            let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, port);
            match TcpListener::bind(addr) {
                Ok(listener) => {
                    drop(listener);
                    return Ok(port);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "empty range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_a_bindable_port_in_range() {
        let allocator = PortAllocator::new(vec![(20100, 20110)]);
        let port = allocator.allocate().unwrap();
        assert!((20100..=20110).contains(&port));
        // the port must actually be free right after allocation returns
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, port);
        assert!(TcpListener::bind(addr).is_ok());
    }

    #[test]
    fn distinct_allocations_rotate_across_a_tiny_range() {
        let allocator = PortAllocator::new(vec![(20200, 20202)]);
        let first = allocator.allocate().unwrap();
        let second = allocator.allocate().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn exhaustion_surfaces_the_underlying_bind_error() {
        // Bind the entire tiny range up front so allocation has nowhere to go.
        let _holds: Vec<_> = (20300..=20301)
            .map(|p| TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, p)).unwrap())
            .collect();
        let allocator = PortAllocator::new(vec![(20300, 20301)]);
        let err = allocator.allocate().unwrap_err();
        assert!(matches!(err, ProcessError::PortExhaustion { .. }));
    }

    #[test]
    fn custom_ranges_are_tried_before_defaults() {
        let allocator = PortAllocator::new(vec![(20400, 20400)]);
        let port = allocator.allocate().unwrap();
        assert_eq!(port, 20400);
    }
}
