//! Request-id generation for outbound GP calls (§4.1).

use crate::envelope::RpcId;

/// A fresh, opaque, unique id for one outbound GP request.
pub fn new_request_id() -> RpcId {
    RpcId::String(uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_distinct_ids() {
        let a = new_request_id();
        let b = new_request_id();
        assert_ne!(a, b);
    }
}
