/// Species cache key prefix
const SPECIES_PREFIX: &str = "species:";

/// Cache key for one species. The species string is used verbatim.
pub fn species_key(species: &str) -> String {
    format!("{}{}", SPECIES_PREFIX, species)
}

/// Rate counter key for an endpoint and client address.
pub fn rate_limit_key(endpoint: &str, client_address: &str) -> String {
    format!("{}/{}", endpoint, client_address)
}
