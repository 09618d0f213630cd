//! Fixed test identifiers for deterministic tests

// Resource identifiers
pub const TEST_RESOURCE_ALICE: &str = "resource-alice";
pub const TEST_RESOURCE_BOB: &str = "resource-bob";

/// Resource identifier that is never issued a token.
pub const TEST_RESOURCE_UNKNOWN: &str = "resource-unknown";

// Static API key for servers spawned with the API key check enabled
pub const TEST_API_KEY: &str = "test-api-key-do-not-use-in-production";

// Request credential names matching the service defaults
pub const TOKEN_HEADER: &str = "X-Auth-Token";
pub const API_KEY_HEADER: &str = "X-API-KEY";
