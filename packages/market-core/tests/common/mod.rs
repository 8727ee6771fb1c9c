//! Shared helpers for integration tests: an empty fixture store plus auth
//! contexts and listing payload builders.

#![allow(dead_code)]

use market_core::common::{AuthContext, CategoryId, ProfileId};
use market_core::domains::listings::{Deal, ListingKind, NewListing, PropertyDetails};

/// Install a log subscriber for a test run. Call at the top of a test while
/// debugging; honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn admin() -> AuthContext {
    AuthContext::new(ProfileId::random(), true)
}

pub fn resident() -> AuthContext {
    AuthContext::new(ProfileId::random(), false)
}

pub fn new_service(title: &str, category: Option<CategoryId>) -> NewListing {
    NewListing {
        // Overwritten by submit_listing with the calling principal.
        owner: ProfileId::random(),
        kind: ListingKind::Service,
        category,
        title: title.to_string(),
        description: format!("{title} para moradores do condomínio"),
        whatsapp: "(11) 98765-4321".to_string(),
        property: None,
    }
}

pub fn new_property(title: &str, deal: Deal) -> NewListing {
    NewListing {
        owner: ProfileId::random(),
        kind: ListingKind::Property,
        category: None,
        title: title.to_string(),
        description: format!("{title}, ótima localização"),
        whatsapp: "11 91234-5678".to_string(),
        property: Some(PropertyDetails {
            deal,
            price: "R$ 450.000".to_string(),
            bedrooms: 2,
            garage_covered: true,
            is_renovated: false,
        }),
    }
}
