pub mod ddb {
    pub mod publisher;
}
pub mod events;
pub mod factory;
pub mod memory {
    pub mod publisher;
}
pub mod sns {
    pub mod publisher;
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum GatewayPublisherVia {
    Sns,
    LocalDynamoDB,
    InMemory,
}

#[cfg(test)]
mod tests {
    use crate::gateway::GatewayPublisherVia;

    #[tokio::test]
    async fn test_should_create_publisher_via() {
        let _ = GatewayPublisherVia::Sns;
        let _ = GatewayPublisherVia::LocalDynamoDB;
        assert_ne!(GatewayPublisherVia::InMemory, GatewayPublisherVia::Sns);
    }
}
