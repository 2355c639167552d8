// Personalized recommendations: the aggregation flow behind the "For You" page.
// Pure pieces (extractor, suggestions, recency, forecast, presentation) carry no I/O;
// resolver and service reach the backend only through `InsightsApi`.

pub mod extractor;
pub mod forecast;
pub mod handlers;
pub mod presentation;
pub mod recency;
pub mod resolver;
pub mod service;
pub mod suggestions;
pub mod view;

#[cfg(test)]
pub mod testing;
