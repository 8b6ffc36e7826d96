// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup
// - infrastructure: Postgres repositories, change feed, room hub, SMS
// - presentation: HTTP/WS handlers and routing
// - application: ports, use cases, access policy and the change relay
// - domain: school records and their validation

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
