pub mod services;

pub use services::{
    CollectionRequest, IntaSendClient, PaymentProvider, PayoutRequest, ProviderAck, ProviderState,
};
