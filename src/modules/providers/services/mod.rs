pub mod intasend;
pub mod provider_trait;

pub use intasend::IntaSendClient;
pub use provider_trait::{
    CollectionRequest, PaymentProvider, PayoutRequest, ProviderAck, ProviderState,
};
